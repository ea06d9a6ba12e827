use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use scrollfeed::app::AppContext;
use scrollfeed::cli::{commands, Cli, Commands};
use scrollfeed::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    cli.apply_overrides(&mut config)?;

    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Render {
            out,
            pages,
            open,
            status,
        } => {
            commands::render_feed(&ctx, &out, pages, open, status).await?;
        }
        Commands::Items => {
            commands::list_items(&ctx).await?;
        }
        Commands::Check => {
            commands::check_sources(&ctx).await?;
        }
    }

    Ok(())
}
