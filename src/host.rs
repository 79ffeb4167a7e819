//! Driving a page from a line-oriented command stream, plus the one-shot checks
//! the CLI runs without hosting a whole page.

use anyhow::{Context, Result};
use std::future::Future;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::WatchConfig;
use crate::kernel::probe::HttpProbe;
use crate::kernel::render::RenderSink;
use crate::monitor::{StatusMonitor, StatusReport};
use crate::page::Page;
use crate::redirect::{RedirectCheckResult, RedirectVerifier};
use crate::telemetry::{ClickEvent, Payload};

pub const COMMAND_HELP: &str =
    "status | redirect | loading | click <class> <href|-> <text> | track <name> [json] | summary | export | quit";

/// Feeds `input` lines to the page until `quit` or `shutdown` resolves.
///
/// End of input only stops reading. The page keeps running until `shutdown`.
pub async fn drive<R, S>(
    page: &Page,
    clicks: &mpsc::Sender<ClickEvent>,
    input: R,
    shutdown: S,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut lines = input.lines();
    let mut input_open = true;

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            line = lines.next_line(), if input_open => match line.context("reading commands")? {
                Some(line) => {
                    if !handle_command(page, clicks, line.trim()).await? {
                        break;
                    }
                }
                None => {
                    debug!("command input closed, waiting for shutdown");
                    input_open = false;
                }
            }
        }
    }
    Ok(())
}

/// Returns `false` when the session should end.
pub async fn handle_command(page: &Page, clicks: &mpsc::Sender<ClickEvent>, line: &str) -> Result<bool> {
    let mut parts = line.splitn(2, ' ');
    let verb = parts.next().unwrap_or_default();
    let rest = parts.next().unwrap_or_default();

    match verb {
        "" => {}
        "quit" | "exit" => return Ok(false),
        "status" => {
            page.check_status().await;
        }
        "redirect" => {
            page.test_redirect().await;
        }
        "loading" => page.show_loading(),
        "click" => {
            let mut args = rest.splitn(3, ' ');
            let class = args.next().unwrap_or_default();
            let href = args.next().filter(|h| *h != "-");
            let text = args.next().unwrap_or_default();
            clicks
                .send(ClickEvent::new(&[class], text, href))
                .await
                .context("click stream closed")?;
        }
        "track" => {
            let mut args = rest.splitn(2, ' ');
            let name = args.next().unwrap_or_default();
            let payload: Payload = match args.next().map(serde_json::from_str) {
                Some(Ok(p)) => p,
                Some(Err(e)) => {
                    warn!("track payload must be a JSON object: {}", e);
                    return Ok(true);
                }
                None => Payload::new(),
            };
            page.track(name, payload);
        }
        "summary" => println!("{}", serde_json::to_string_pretty(&page.analytics.summary())?),
        "export" => println!("{}", page.analytics.buffer().export_json()?),
        other => warn!("unknown command: {}", other),
    }
    Ok(true)
}

/// A single health poll, with no page and no background timer.
pub async fn status_once(
    config: &WatchConfig,
    probe: Arc<dyn HttpProbe>,
    sink: Arc<dyn RenderSink>,
) -> StatusReport {
    StatusMonitor::new(probe, sink, config.health_url.clone(), config.poll_timeout())
        .poll()
        .await
}

/// A single redirect test against the configured source and target.
pub async fn redirect_once(
    config: &WatchConfig,
    probe: Arc<dyn HttpProbe>,
    sink: Arc<dyn RenderSink>,
) -> RedirectCheckResult {
    let target = &config.redirect;
    RedirectVerifier::new(probe, sink, config.redirect_timeout(), config.notification_ttl())
        .test_redirect(&target.source_url, &target.expected_target)
        .await
}
