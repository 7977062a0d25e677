//! Lorekeeper - build a story knowledge base from manuscripts.

use clap::Parser;
use lorekeeper_cli::commands;
use lorekeeper_cli::{Cli, Command, Config, Context, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run() -> lorekeeper_cli::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // Override profile if specified
    if let Some(profile_name) = cli.profile {
        config.switch_profile(profile_name)?;
    }

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    let mut ctx = Context {
        config,
        db: cli.db,
        api_key: cli.api_key,
    };

    match cli.command {
        Command::Segment(args) => commands::execute_segment(args, &ctx, &formatter),
        Command::Import(args) => commands::execute_import(args, &ctx, &formatter).await,
        Command::Resume => commands::execute_resume(&ctx, &formatter).await,
        Command::Restart => commands::execute_restart(&ctx, &formatter),
        Command::Entries(args) => commands::execute_entries(args, &ctx, &formatter),
        Command::Duplicates => commands::execute_duplicates(&ctx, &formatter),
        Command::Merge(args) => commands::execute_merge(args, &ctx, &formatter).await,
        Command::Profile(args) => commands::execute_profile(args, &mut ctx.config, &formatter),
    }
}
