use anyhow::Result;
use clap::Parser;
use tickerbot::log::init_logging;

/// Feed one chat message through the bot and print the reply.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long)]
    config_path: Option<String>,

    /// Sender name used by the greeting commands
    #[arg(short, long, default_value = "User")]
    sender: String,

    /// Raw message text, e.g. "/ytd AAPL"
    message: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = tickerbot::run(cli.config_path.as_deref(), &cli.message, &cli.sender).await;
    match &result {
        Ok(Some(reply)) => println!("{reply}"),
        Ok(None) => tracing::info!("No reply for this message"),
        Err(e) => tracing::error!(error = %e, "Message handling failed"),
    }

    result.map(|_| ())
}
