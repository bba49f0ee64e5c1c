mod config;
mod loopback;

use std::{path::PathBuf, sync::Arc};

use {
    anyhow::Context,
    clap::{Parser, Subcommand},
    futures::future::join_all,
    secrecy::ExposeSecret,
    tokio::{
        io::{AsyncBufReadExt, BufReader},
        task::JoinHandle,
    },
    tracing::{info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    flowchat_channels::CloseSignal,
    flowchat_twitch::{InboundMessage, TwitchChatNode, config::resolve, node::NodeCapabilities},
};

use crate::{
    config::HarnessConfig,
    loopback::{LoggingRefresher, LoggingSessionFactory, TracingHost},
};

#[derive(Parser)]
#[command(name = "flowchat", about = "flowchat: Twitch chat node harness")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a chat node against a loopback transport. Inbound messages are
    /// read from stdin, one JSON payload per line.
    Run {
        #[arg(short, long, env = "FLOWCHAT_CONFIG")]
        config: PathBuf,
    },
    /// Check a harness config without starting the node.
    Validate {
        #[arg(short, long, env = "FLOWCHAT_CONFIG")]
        config: PathBuf,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "flowchat starting");

    match cli.command {
        Commands::Run { config } => run(HarnessConfig::load(&config)?).await,
        Commands::Validate { config } => validate(&HarnessConfig::load(&config)?),
    }
}

async fn run(harness: HarnessConfig) -> anyhow::Result<()> {
    let node_id = harness.node_id().to_string();
    let node = TwitchChatNode::new(node_id.clone(), harness.node_value()?, NodeCapabilities {
        host: Arc::new(TracingHost::new(node_id.clone())),
        registry: Arc::new(harness.registry(Arc::new(LoggingRefresher))),
        sessions: Arc::new(LoggingSessionFactory),
    });
    node.initialized().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending = PendingSends::default();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("failed to read stdin")?,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            },
        };
        let Some(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(&line) {
            Ok(payload) => {
                if let Some(send) = node.input(InboundMessage::new(payload)) {
                    pending.push(send);
                }
            },
            Err(e) => warn!(error = %e, "skipping line that is not JSON"),
        }
    }

    // Let queued sends settle so their outcome is logged before teardown.
    pending.settle().await;

    let (signal, done) = CloseSignal::new();
    node.close(signal).await;
    if done.await.is_err() {
        warn!(node_id = %node_id, "close hook dropped without completing");
    }
    info!(node_id = %node_id, "node closed");
    Ok(())
}

/// Send tasks that haven't settled yet. Finished ones are dropped on every
/// push, so a long dry run only keeps what is actually in flight.
#[derive(Default)]
struct PendingSends {
    sends: Vec<JoinHandle<()>>,
}

impl PendingSends {
    fn push(&mut self, send: JoinHandle<()>) {
        self.sends.retain(|send| !send.is_finished());
        self.sends.push(send);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.sends.len()
    }

    async fn settle(self) {
        for result in join_all(self.sends).await {
            if let Err(e) = result {
                warn!(error = %e, "send task aborted");
            }
        }
    }
}

fn validate(harness: &HarnessConfig) -> anyhow::Result<()> {
    let registry = harness.registry(Arc::new(LoggingRefresher));
    let resolved = resolve(&harness.node, &registry)?;
    if resolved.auth.refresh_token().expose_secret().trim().is_empty() {
        anyhow::bail!("authentication node has an empty twitch_refresh_token");
    }
    eprintln!(
        "node '{}' ok: channel '{}', {} auth node(s) registered",
        harness.node_id(),
        resolved.channel,
        registry.list().len()
    );
    Ok(())
}
