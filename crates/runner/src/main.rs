use clap::Parser;
use log::{error, info};
use luatrader_runner::{Session, Settings};
use std::path::PathBuf;

const EXIT_FAILURE: i32 = 1;

#[derive(Parser)]
#[command(author, version, about = "Futures trading client for the QUIK terminal")]
struct Cli {
    /// Settings file (JSON)
    #[arg(long)]
    config: PathBuf,
    /// Client key; may be omitted when only one client is configured
    #[arg(long)]
    client: Option<String>,
    /// Follow advice without sending orders
    #[arg(long)]
    quiet: bool,
}

/// Every path leaves through `std::process::exit`: stdin is read on a
/// blocking thread that would otherwise hold up runtime shutdown.
#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let settings = match Settings::from_file(&cli.config) {
        Ok(settings) => settings,
        Err(e) => {
            error!("{}", e);
            std::process::exit(EXIT_FAILURE);
        }
    };

    // No candle storage is wired: advisors warm up on the bars the terminal returns.
    info!("[luatrader] no stored history, using terminal bars only");

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let result = Session::new(settings)
        .with_client(cli.client)
        .with_quiet(cli.quiet)
        .run(stdin)
        .await;

    let code = match result {
        Ok(()) => 0,
        Err(e) => {
            error!("{}", e);
            EXIT_FAILURE
        }
    };
    std::process::exit(code);
}
