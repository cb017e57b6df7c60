mod commands;
mod surface;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc::UnboundedSender;
use tracing_subscriber::EnvFilter;
use url::Url;
use vg_client::{stream, HttpApi, Inbound, Session, SessionConfig};
use vg_core::LiveView;

#[derive(Parser)]
#[command(name = "vg", about = "Live webhook validation dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Watch live validation results for one app.
    Watch {
        /// App id to subscribe to.
        #[arg(long)]
        app: String,
        /// Dashboard server base URL; defaults to $VIGIL_SERVER.
        #[arg(long)]
        server: Option<String>,
        /// Push channel URL; derived from the server URL when omitted.
        #[arg(long)]
        channel: Option<String>,
        /// Stored-log page size for the initial load and `more`.
        #[arg(long, default_value_t = 50)]
        page_size: u32,
        /// Stats refresh cadence in seconds.
        #[arg(long, default_value_t = 5)]
        stats_interval: u64,
        /// Coverage refresh cadence in seconds.
        #[arg(long, default_value_t = 10)]
        coverage_interval: u64,
        /// Directory exported reports are written to.
        #[arg(long)]
        report_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Watch {
            app,
            server,
            channel,
            page_size,
            stats_interval,
            coverage_interval,
            report_dir,
        } => {
            let config = SessionConfig {
                stats_every: Duration::from_secs(stats_interval.max(1)),
                coverage_every: Duration::from_secs(coverage_interval.max(1)),
                report_dir: report_dir.unwrap_or_else(|| PathBuf::from(".")),
            };
            if let Err(message) = watch(app, server, channel, page_size, config).await {
                eprintln!("{message}");
                std::process::exit(1);
            }
        }
    }
}

async fn watch(
    app: String,
    server: Option<String>,
    channel: Option<String>,
    page_size: u32,
    config: SessionConfig,
) -> Result<(), String> {
    let server = server
        .or_else(|| std::env::var("VIGIL_SERVER").ok())
        .unwrap_or_else(|| "http://127.0.0.1:5000".to_string());
    let base = Url::parse(&server).map_err(|err| format!("invalid server url: {err}"))?;
    let channel = match channel {
        Some(raw) => Url::parse(&raw).map_err(|err| format!("invalid channel url: {err}"))?,
        None => channel_url(&base)?,
    };

    let api = HttpApi::new(base, app.clone()).map_err(|err| err.to_string())?;
    let session = Session::new(
        api,
        surface::TerminalSurface::new(),
        LiveView::new(app.clone(), page_size),
        config,
    );

    let tx = session.sender();
    tokio::spawn(stream::run(channel, app, tx.clone()));
    tokio::spawn(read_commands(tx));

    session.run().await;
    Ok(())
}

/// Derive the websocket endpoint from the HTTP base URL.
fn channel_url(base: &Url) -> Result<Url, String> {
    let mut url = base.clone();
    let scheme = if base.scheme() == "https" { "wss" } else { "ws" };
    url.set_scheme(scheme)
        .map_err(|()| format!("cannot derive channel url from {base}"))?;
    url.set_path("ws");
    Ok(url)
}

async fn read_commands(tx: UnboundedSender<Inbound>) {
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        match commands::parse(&line) {
            Ok(commands::Parsed::Command(command)) => {
                let quitting = command == vg_client::Command::Quit;
                if tx.send(Inbound::Command(command)).is_err() || quitting {
                    return;
                }
            }
            Ok(commands::Parsed::Help) => println!("{}", commands::HELP),
            Ok(commands::Parsed::Empty) => {}
            Err(message) => eprintln!("{message}"),
        }
    }
    // stdin closed; end the session.
    let _ = tx.send(Inbound::Command(vg_client::Command::Quit));
}

#[cfg(test)]
mod tests {
    use super::channel_url;
    use url::Url;

    #[test]
    fn channel_url_swaps_scheme_and_path() {
        let base = Url::parse("http://localhost:5000").unwrap();
        assert_eq!(channel_url(&base).unwrap().as_str(), "ws://localhost:5000/ws");

        let secure = Url::parse("https://dash.example.com/api").unwrap();
        assert_eq!(
            channel_url(&secure).unwrap().as_str(),
            "wss://dash.example.com/ws"
        );
    }
}
