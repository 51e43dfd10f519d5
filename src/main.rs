use clap::Parser;
use taskflow::cli::commands::Cli;
use taskflow::cli::handlers;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Log to stderr, filtered by RUST_LOG. The TUI owns the terminal, so it
/// stays silent unless asked.
fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_tui(data_dir: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let start = handlers::resolve_start(data_dir)?;
    taskflow::tui::run(&start)
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        None => {
            // No subcommand → launch TUI
            init_tracing("off");
            run_tui(cli.data_dir.as_deref())
        }
        Some(_) => {
            init_tracing("warn");
            handlers::dispatch(cli)
        }
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
