use std::io::Write;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use majority_client::config::ClientConfig;
use majority_client::protocol::RoundResults;
use majority_client::telemetry;
use majority_client::ui::command::{Command, HELP};
use majority_client::ui::render::render_text;
use majority_client::{resolve_api_base, GameClient, SubmissionKind, TunnelHeader, UiState};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Parser)]
#[command(name = "majority-player")]
#[command(about = "Terminal player client for Majority Rules")]
struct Args {
    /// Display name to join with (asked for interactively when omitted)
    #[arg(short, long)]
    name: Option<String>,

    /// Game server origin; overrides MAJORITY_API_BASE
    #[arg(long)]
    api_base: Option<String>,

    /// Poll period in milliseconds; overrides MAJORITY_POLL_INTERVAL_MS
    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// When to send the tunnel skip-warning header
    #[arg(long)]
    tunnel_header: Option<TunnelArg>,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TunnelArg {
    Auto,
    Always,
    Never,
}

impl From<TunnelArg> for TunnelHeader {
    fn from(arg: TunnelArg) -> Self {
        match arg {
            TunnelArg::Auto => TunnelHeader::Auto,
            TunnelArg::Always => TunnelHeader::Always,
            TunnelArg::Never => TunnelHeader::Never,
        }
    }
}

fn build_config(args: &Args) -> Result<ClientConfig, majority_client::ClientError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(api_base) = &args.api_base {
        config.api_base = resolve_api_base(Some(api_base))?;
    }
    if let Some(millis) = args.poll_interval_ms {
        config = config.with_poll_interval(Duration::from_millis(millis));
    }
    if let Some(tunnel) = args.tunnel_header {
        config = config.with_tunnel_header(tunnel.into());
    }
    Ok(config)
}

fn spawn_renderer(mut rx: watch::Receiver<UiState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let text = render_text(&rx.borrow_and_update());
            println!("\n{text}");
        }
    })
}

fn prompt(label: &str) {
    print!("{label}");
    let _ = std::io::stdout().flush();
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    telemetry::init_tracing(args.verbose);

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_message());
            std::process::exit(1);
        }
    };
    println!("🎲 Majority Rules player connecting to {}", config.api_base);

    let client = match GameClient::builder().with_config(config).build() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("❌ {}", e.user_message());
            std::process::exit(1);
        }
    };
    let renderer = spawn_renderer(client.subscribe());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let mut name = args.name.clone();
    loop {
        let candidate = match name.take() {
            Some(candidate) => candidate,
            None => {
                prompt("Name: ");
                match lines.next_line().await {
                    Ok(Some(line)) => line,
                    _ => return,
                }
            }
        };
        if client.join(&candidate).await.is_ok() {
            break;
        }
    }
    println!("{HELP}");

    while let Ok(Some(line)) = lines.next_line().await {
        let Some(command) = Command::parse(&line) else {
            continue;
        };
        let outcome = match command {
            Command::Answer(text) => {
                client.set_input(SubmissionKind::Answer, text);
                client.submit_answer().await.map(|_| ())
            }
            Command::Guess(text) => {
                client.set_input(SubmissionKind::Guess, text);
                client.submit_guess().await.map(|_| ())
            }
            Command::Results => client.fetch_results().await.map(|payload| {
                if let Some(results) = RoundResults::from_payload(&payload) {
                    println!("{}", results.summary());
                }
            }),
            Command::Scores => client
                .fetch_scoreboard()
                .await
                .map(|_| ())
                .inspect_err(|e| println!("Scoreboard unavailable: {}", e.user_message())),
            Command::Help => {
                println!("{HELP}");
                Ok(())
            }
            Command::Quit => break,
            Command::Unknown(raw) => {
                println!("Unknown command '{raw}'. {HELP}");
                Ok(())
            }
        };
        // Failures are already shown through the presentation model.
        if let Err(err) = outcome {
            debug!(error = %err, "command failed");
        }
    }

    client.shutdown();
    renderer.abort();
    println!("👋 Bye");
}
