use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use pagewatch::kernel::probe::{HttpProbe, ReqwestProbe};
use pagewatch::kernel::render::RecordingRenderSink;
use pagewatch::monitor::{StatusMonitor, StatusState};
use pagewatch::redirect::{RedirectOutcome, RedirectVerifier};

/// Minimal loopback HTTP server answering by request path.
async fn serve() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else { break };
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                let request = String::from_utf8_lossy(&buf);
                let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();

                let response = match path.as_str() {
                    "/health" => "HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok".to_string(),
                    "/degraded" => "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string(),
                    "/go" => "HTTP/1.1 302 Found\r\nLocation: https://good.example.com/path\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string(),
                    "/moved" => "HTTP/1.1 301 Moved Permanently\r\nLocation: https://other.example.net/\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string(),
                    _ => "HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string(),
                };
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    addr
}

async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

#[tokio::test]
async fn test_redirect_is_not_followed() {
    let addr = serve().await;
    let probe = ReqwestProbe::direct().unwrap();

    let response = probe
        .head_no_redirect(&format!("http://{}/go", addr), Duration::from_secs(5))
        .await
        .unwrap();

    assert_eq!(response.status, 302);
    assert_eq!(response.location.as_deref(), Some("https://good.example.com/path"));
}

#[tokio::test]
async fn test_verifier_over_real_http() {
    let addr = serve().await;
    let probe = Arc::new(ReqwestProbe::direct().unwrap());
    let sink = Arc::new(RecordingRenderSink::new());
    let verifier = RedirectVerifier::new(probe, sink.clone(), Duration::from_secs(5), Duration::from_secs(5));

    let ok = verifier.test_redirect(&format!("http://{}/go", addr), "good.example.com").await;
    let mismatch = verifier.test_redirect(&format!("http://{}/moved", addr), "good.example.com").await;
    let plain = verifier.test_redirect(&format!("http://{}/", addr), "good.example.com").await;

    assert_eq!(ok.outcome, RedirectOutcome::Success);
    assert_eq!(ok.detail, "https://good.example.com/path");
    assert_eq!(mismatch.outcome, RedirectOutcome::DomainMismatch);
    assert_eq!(plain.outcome, RedirectOutcome::UnexpectedStatus);
    assert_eq!(plain.detail, "200");
    assert_eq!(sink.visible_notifications().len(), 3);
}

#[tokio::test]
async fn test_unreachable_host_is_network_failure() {
    let addr = closed_port().await;
    let probe = Arc::new(ReqwestProbe::direct().unwrap());
    let sink = Arc::new(RecordingRenderSink::new());

    let verifier = RedirectVerifier::new(probe.clone(), sink.clone(), Duration::from_secs(5), Duration::from_secs(5));
    let result = verifier.test_redirect(&format!("http://{}/go", addr), "good.example.com").await;
    assert_eq!(result.outcome, RedirectOutcome::NetworkFailure);
    assert!(!result.detail.is_empty());

    let monitor = StatusMonitor::new(probe, sink, format!("http://{}/health", addr), Duration::from_secs(5));
    assert_eq!(monitor.poll().await.state, StatusState::Error);
}

#[tokio::test]
async fn test_health_statuses_over_real_http() {
    let addr = serve().await;
    let probe = Arc::new(ReqwestProbe::direct().unwrap());
    let sink = Arc::new(RecordingRenderSink::new());

    let healthy = StatusMonitor::new(probe.clone(), sink.clone(), format!("http://{}/health", addr), Duration::from_secs(5));
    let degraded = StatusMonitor::new(probe, sink, format!("http://{}/degraded", addr), Duration::from_secs(5));

    assert_eq!(healthy.poll().await.state, StatusState::Active);
    assert_eq!(degraded.poll().await.state, StatusState::Warning);
}
