use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use pagewatch::host;
use pagewatch::kernel::probe::ReqwestProbe;
use pagewatch::kernel::render::TracingRenderSink;
use pagewatch::perf::{ManualTimingSource, NavigationTiming};
use pagewatch::telemetry::{ClickEvent, PageContext};
use pagewatch::{Page, PageDeps, WatchConfig};

#[derive(Parser, Debug)]
#[command(name = "pagewatch", about = "Service status, redirect checks and page telemetry")]
struct Cli {
    /// JSON config file. Missing file means defaults.
    #[arg(long, env = "PAGEWATCH_CONFIG", default_value = "pagewatch.json")]
    config: PathBuf,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Flags win over the config file and `PAGEWATCH_*` variables.
#[derive(Args, Debug, Default)]
struct Overrides {
    #[arg(long, global = true)]
    health_url: Option<String>,
    #[arg(long, global = true)]
    poll_interval_secs: Option<u64>,
    #[arg(long, global = true)]
    poll_timeout_secs: Option<u64>,
    #[arg(long, global = true)]
    notification_ttl_secs: Option<u64>,
    #[arg(long, global = true)]
    loading_flash_secs: Option<u64>,
    #[arg(long, global = true)]
    redirect_timeout_secs: Option<u64>,
    #[arg(long, global = true)]
    trackable_class: Option<String>,
    #[arg(long, global = true)]
    session_file: Option<PathBuf>,
}

impl Overrides {
    fn apply(self, mut config: WatchConfig) -> pagewatch::error::Result<WatchConfig> {
        if let Some(v) = self.health_url {
            config.health_url = v;
        }
        if let Some(v) = self.poll_interval_secs {
            config.poll_interval_secs = v;
        }
        if let Some(v) = self.poll_timeout_secs {
            config.poll_timeout_secs = v;
        }
        if let Some(v) = self.notification_ttl_secs {
            config.notification_ttl_secs = v;
        }
        if let Some(v) = self.loading_flash_secs {
            config.loading_flash_secs = v;
        }
        if let Some(v) = self.redirect_timeout_secs {
            config.redirect.timeout_secs = v;
        }
        if let Some(v) = self.trackable_class {
            config.trackable_class = v;
        }
        if let Some(v) = self.session_file {
            config.session_file = Some(v);
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Host a page session until Ctrl+C or `quit` on stdin.
    Run,
    /// Poll the health endpoint once.
    Status,
    /// Run one redirect test.
    Redirect {
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        expect: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = WatchConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?
        .apply_env()
        .context("applying PAGEWATCH_* overrides")?;
    let mut config = cli.overrides.apply(config).context("applying flags")?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(config).await,
        Command::Status => {
            let probe = Arc::new(ReqwestProbe::new()?);
            let report = host::status_once(&config, probe, Arc::new(TracingRenderSink)).await;
            println!("{}: {}", report.label, report.description);
            Ok(())
        }
        Command::Redirect { source, expect } => {
            if let Some(s) = source {
                config.redirect.source_url = s;
            }
            if let Some(e) = expect {
                config.redirect.expected_target = e;
            }
            let probe = Arc::new(ReqwestProbe::new()?);
            let result = host::redirect_once(&config, probe, Arc::new(TracingRenderSink)).await;
            println!("{:?}: {}", result.outcome, result.detail);
            Ok(())
        }
    }
}

fn boot(config: WatchConfig, fetch_start: Instant) -> Result<(Page, mpsc::Sender<ClickEvent>)> {
    let (click_tx, click_rx) = mpsc::channel(100);
    let timing = Arc::new(ManualTimingSource::new());

    let dcl_start = fetch_start.elapsed();
    let page = Page::start(
        config,
        PageDeps {
            probe: Arc::new(ReqwestProbe::new()?),
            sink: Arc::new(TracingRenderSink),
            timing: timing.clone(),
            context: PageContext {
                path: "/".to_string(),
                referrer: String::new(),
                user_agent: format!("pagewatch/{}", env!("CARGO_PKG_VERSION")),
            },
            clicks: click_rx,
            metrics: None,
        },
    )?;
    let dcl_end = fetch_start.elapsed();

    timing.set_navigation(NavigationTiming {
        fetch_start: 0.0,
        dom_content_loaded_event_start: dcl_start.as_secs_f64() * 1000.0,
        dom_content_loaded_event_end: dcl_end.as_secs_f64() * 1000.0,
        load_event_start: dcl_end.as_secs_f64() * 1000.0,
        load_event_end: fetch_start.elapsed().as_secs_f64() * 1000.0,
    });
    page.on_load();

    Ok((page, click_tx))
}

async fn run(config: WatchConfig) -> Result<()> {
    let (page, clicks) = boot(config, Instant::now())?;
    tracing::info!("page active; commands: {}", host::COMMAND_HELP);

    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("cannot listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };
    host::drive(&page, &clicks, BufReader::new(tokio::io::stdin()), ctrl_c).await?;

    let summary = page.analytics.summary();
    tracing::info!(events = summary.total_events, clicks = summary.button_clicks, "session summary");
    page.shutdown().await;
    Ok(())
}
