use crate::prelude::{println, *};
use clap::Parser;
use stackpipe_core::report::Stage;

mod config;
mod error;
mod fetch;
mod logging;
mod pipeline;
mod prelude;
mod writer;

pub use config::Global;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Fetch Stack Overflow questions, posts, users, tags and comments into CSV files"
)]
pub struct App {
    #[clap(flatten)]
    options: config::Options,

    #[clap(flatten)]
    global: Global,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let app = App::parse();
    logging::init(&app.global)?;

    let result = run(app).await;

    logging::flush();
    result
}

async fn run(app: App) -> Result<()> {
    let reporter = logging::LogReporter;
    let resources = app.options.selected_resources();
    let fetcher = fetch::Fetcher::new(&app.options).map_err(Error::from)?;

    log::info!("Starting the data pipeline.");
    let summary =
        pipeline::run_all(&fetcher, &app.options.output_dir, &resources, &reporter).await;
    log::info!("Data pipeline completed.");

    if app.global.verbose {
        print_summary(&summary);
    }

    if summary.is_success() {
        Ok(())
    } else {
        Err(Error::ResourcesFailed {
            failed: summary.failed(),
            total: resources.len(),
        }
        .into())
    }
}

fn print_summary(summary: &pipeline::Summary) {
    let mut table = new_table();
    table.add_row(prettytable::row!["RESOURCE", "STATE", "ROWS", "DATE ERRORS", "OUTPUT"]);

    for outcome in &summary.outcomes {
        let output = match (&outcome.path, &outcome.error) {
            (Some(path), _) => path.display().to_string(),
            (None, Some(err)) => err.to_string(),
            (None, None) => String::new(),
        };
        let state = if outcome.stage == Stage::Done {
            outcome.stage.to_string()
        } else {
            outcome.stage.to_string().to_uppercase()
        };
        table.add_row(prettytable::row![
            outcome.resource,
            state,
            outcome.records,
            outcome.transform_errors,
            output
        ]);
    }

    println!();
    table.printstd();
}
