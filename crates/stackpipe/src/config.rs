use std::path::PathBuf;

use stackpipe_core::page::MAX_PAGE_SIZE;
use stackpipe_core::resource::ResourceType;

pub const DEFAULT_API_BASE: &str = "https://api.stackexchange.com/2.3";

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// File the log stream is appended to (in addition to the console)
    #[clap(
        long,
        env = "STACKPIPE_LOG_FILE",
        global = true,
        default_value = "pipeline.log"
    )]
    pub log_file: PathBuf,

    /// Whether to display additional information.
    #[clap(long, env = "STACKPIPE_VERBOSE", global = true, default_value = "false")]
    pub verbose: bool,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Options {
    /// Output directory for CSV files
    #[arg(short, long, env = "STACKPIPE_OUTPUT_DIR", default_value = "output")]
    pub output_dir: PathBuf,

    /// Stack Exchange site to query
    #[arg(long, env = "STACKPIPE_SITE", default_value = "stackoverflow")]
    pub site: String,

    /// Number of records requested per page
    #[arg(
        long,
        env = "STACKPIPE_PAGE_SIZE",
        default_value_t = MAX_PAGE_SIZE,
        value_parser = clap::value_parser!(u32).range(1..=MAX_PAGE_SIZE as i64)
    )]
    pub page_size: u32,

    /// Stop each resource type after this many pages
    #[arg(long, env = "STACKPIPE_MAX_PAGES")]
    pub max_pages: Option<u32>,

    /// Base URL of the Stack Exchange API
    #[arg(long, env = "STACKPIPE_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "STACKPIPE_TIMEOUT", default_value = "30")]
    pub timeout: u64,

    /// Resource types to fetch (repeatable): questions, posts, users, tags, comments
    #[arg(short, long = "resource", value_name = "TYPE")]
    pub resources: Vec<ResourceType>,
}

impl Options {
    /// Resource types to run, in the fixed processing order
    ///
    /// An empty selection means all of them.
    pub fn selected_resources(&self) -> Vec<ResourceType> {
        ResourceType::ALL
            .into_iter()
            .filter(|r| self.resources.is_empty() || self.resources.contains(r))
            .collect()
    }
}
