mod common;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

use common::{Reply, ScriptedProbe};
use pagewatch::host;
use pagewatch::kernel::render::RecordingRenderSink;
use pagewatch::monitor::StatusState;
use pagewatch::perf::ManualTimingSource;
use pagewatch::redirect::RedirectOutcome;
use pagewatch::telemetry::{ClickEvent, PageContext};
use pagewatch::{Page, PageDeps, WatchConfig};

fn page_with(probe: &Arc<ScriptedProbe>) -> (Page, mpsc::Sender<ClickEvent>) {
    let (clicks, click_rx) = mpsc::channel(16);
    let page = Page::start(
        WatchConfig::default(),
        PageDeps {
            probe: probe.clone(),
            sink: Arc::new(RecordingRenderSink::new()),
            timing: Arc::new(ManualTimingSource::new()),
            context: PageContext::default(),
            clicks: click_rx,
            metrics: None,
        },
    )
    .expect("page starts");
    (page, clicks)
}

#[tokio::test(start_paused = true)]
async fn test_polling_continues_after_input_closes() {
    let probe = Arc::new(ScriptedProbe::new());
    let (page, clicks) = page_with(&probe);
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let session = host::drive(&page, &clicks, &b""[..], async {
        let _ = stop_rx.await;
    });
    let operator = async {
        tokio::time::sleep(Duration::from_secs(61)).await;
        // Immediate poll plus the 30 s and 60 s ticks, all after input hit EOF.
        assert_eq!(probe.health_calls(), 3, "page must outlive its command input");
        stop_tx.send(()).unwrap();
    };

    let (outcome, ()) = tokio::join!(session, operator);
    outcome.expect("session ends cleanly on shutdown");
    page.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_commands_reach_the_page_until_quit() {
    let probe = Arc::new(ScriptedProbe::new());
    let (page, clicks) = page_with(&probe);
    probe.push_redirect(302, Some("https://example.com/landing"));

    let input: &[u8] = b"click btn - Save\n\
        track signup {\"plan\":\"pro\"}\n\
        track rejected {not json\n\
        bogus\n\
        redirect\n\
        quit\n\
        status\n";
    host::drive(&page, &clicks, input, std::future::pending::<()>())
        .await
        .expect("quit ends the session");
    tokio::time::sleep(Duration::from_millis(10)).await;

    let names: Vec<String> = page.analytics.events().into_iter().map(|e| e.name).collect();
    assert!(names.contains(&"button_click".to_string()));
    assert!(names.contains(&"signup".to_string()));
    assert!(!names.contains(&"rejected".to_string()), "malformed payload is dropped");
    assert_eq!(probe.head_calls(), 1);
    // Only the page's own first poll; `status` came after `quit`.
    assert_eq!(probe.health_calls(), 1);

    page.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_status_once_sends_one_health_request() {
    let probe = Arc::new(ScriptedProbe::new());
    let sink = Arc::new(RecordingRenderSink::new());
    probe.push_health(Reply::Status(503));

    let report = host::status_once(&WatchConfig::default(), probe.clone(), sink.clone()).await;
    tokio::time::sleep(Duration::from_secs(120)).await;

    assert_eq!(report.state, StatusState::Warning);
    assert_eq!(probe.health_calls(), 1, "no background poller in one-shot mode");
    assert_eq!(probe.head_calls(), 0);
    assert_eq!(sink.last_status().map(|r| r.state), Some(StatusState::Warning));
}

#[tokio::test(start_paused = true)]
async fn test_redirect_once_skips_health_and_page_view() {
    let probe = Arc::new(ScriptedProbe::new());
    let sink = Arc::new(RecordingRenderSink::new());
    let mut config = WatchConfig::default();
    config.redirect.expected_target = "good.example.com".into();
    probe.push_redirect(301, Some("https://good.example.com/"));

    let result = host::redirect_once(&config, probe.clone(), sink.clone()).await;
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert_eq!(result.outcome, RedirectOutcome::Success);
    assert_eq!(probe.head_calls(), 1);
    assert_eq!(probe.health_calls(), 0);
    assert!(sink.last_status().is_none());
    assert!(sink.visible_notifications().is_empty(), "notification still expires on its own");
}
