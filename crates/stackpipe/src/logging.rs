use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use log::LevelFilter;
use stackpipe_core::error::{PipelineError, TransformError};
use stackpipe_core::page::StopReason;
use stackpipe_core::report::{Reporter, Stage};
use stackpipe_core::resource::ResourceType;

use crate::prelude::*;

/// Name shown in every log line
const LOGGER_NAME: &str = "stackpipe";

/// Writes every log line to the log file and to the console
///
/// Both sinks are always attempted; the file error wins if both fail.
struct Tee<C, F> {
    console: C,
    file: F,
}

impl<C: Write, F: Write> Write for Tee<C, F> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let file = self.file.write_all(buf);
        let console = self.console.write_all(buf);
        file.and(console)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let file = self.file.flush();
        let console = self.console.flush();
        file.and(console)
    }
}

/// Install the process-wide logger
///
/// Call once at startup; pair with [`flush`] before exit. `RUST_LOG` takes
/// precedence over the level picked from `--verbose`.
pub fn init(global: &crate::Global) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&global.log_file)
        .with_context(|| f!("Failed to open log file {}", global.log_file.display()))?;

    let level = if global.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
                LOGGER_NAME,
                record.level(),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(Tee {
            console: io::stderr(),
            file,
        })))
        .try_init()
        .map_err(|e| eyre!("Failed to initialize logging: {}", e))
}

pub fn flush() {
    log::logger().flush();
}

/// Reporter backed by the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn stage(&self, resource: ResourceType, stage: Stage) {
        match stage {
            Stage::Fetching => log::info!("Fetching Stack Overflow {resource}."),
            Stage::Failed => log::warn!("Failed to process Stack Overflow {resource}."),
            _ => log::debug!("[{resource}] {stage}"),
        }
    }

    fn page_fetched(&self, resource: ResourceType, page: u32, records: usize) {
        log::info!("[{resource}] page {page}: {records} records");
    }

    fn backoff(&self, resource: ResourceType, page: u32, secs: u64) {
        log::warn!("[{resource}] API requested a {secs}s backoff after page {page}");
    }

    fn pagination_stopped(&self, resource: ResourceType, page: u32, reason: StopReason) {
        match reason {
            StopReason::QuotaExhausted | StopReason::PageLimit => {
                log::warn!("[{resource}] stopped after page {page}: {reason}")
            }
            StopReason::Exhausted | StopReason::EmptyPage => {
                log::info!("[{resource}] stopped after page {page}: {reason}")
            }
        }
    }

    fn transform_error(&self, resource: ResourceType, error: &TransformError) {
        log::warn!("[{resource}] {error}; value left unconverted");
    }

    fn written(&self, resource: ResourceType, path: &Path, rows: usize) {
        log::info!(
            "Fetched Stack Overflow {resource} successfully: {rows} rows written to {}",
            path.display()
        );
    }

    fn failed(&self, resource: ResourceType, error: &PipelineError) {
        log::error!("[{resource}] {error}");
    }
}
