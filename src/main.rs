use anyhow::Result;
use clap::Parser;

mod app;
mod args;
mod participant;
mod report;
mod stimuli;

use app::App;
use args::Args;

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("nback={}", log_level).parse()?)
                .add_directive(format!("nback_experiment={}", log_level).parse()?),
        )
        .try_init();

    let app = App::new(args)?;
    app.run()?;

    Ok(())
}
