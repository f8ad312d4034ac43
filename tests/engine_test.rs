//! Integration tests for the probing engine: classifier, redaction,
//! placeholder totality, timeout behavior and transport error surfacing.

use hostprint::config::Config;
use hostprint::redact::{redact, DIGEST_HEX_LEN};
use hostprint::report::SessionController;
use hostprint::rtc::{CandidateSet, ScriptedSource};
use hostprint::signal::SignalResult;
use std::time::Duration;

#[test]
fn test_scenario_classifier_buckets() {
    let mut set = CandidateSet::new();
    set.push("candidate:1 1 udp 2 192.168.1.5 54321 typ host");
    set.push("candidate:2 1 udp 2 4.4.4.4 3478 typ srflx");

    let summary = set.summarize();
    assert_eq!(summary.private, vec!["192.168.1.5"]);
    assert_eq!(summary.public, vec!["4.4.4.4"]);
    assert_eq!(summary.kinds, vec!["host", "srflx"]);
}

#[test]
fn test_scenario_digest_stability() {
    let value = serde_json::json!({"a": 1, "b": 2});
    let first = redact(&value).unwrap();
    let second = redact(&value).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.as_hex().len(), DIGEST_HEX_LEN);
    assert_eq!(second.as_hex().len(), DIGEST_HEX_LEN);
}

#[test]
fn test_scenario_absent_capability_is_unsupported() {
    // A probe whose host capability is entirely absent yields unsupported,
    // and assemble preserves that exact marker, never error.
    let absent = hostprint::probe::battery::read_from(std::path::Path::new(
        "/nonexistent/hostprint/power_supply",
    ));
    assert!(absent.is_unsupported());

    let mut controller = SessionController::new(Config::default());
    controller.state_mut().battery = Some(absent.clone());

    let report = controller.assemble();
    assert_eq!(report.battery, absent);
    assert!(!matches!(report.battery, SignalResult::Error { .. }));
}

#[test]
fn test_assemble_is_total_before_any_probe() {
    let controller = SessionController::new(Config::default());
    let report = controller.assemble();

    // Every section is present and carries one of the four shapes.
    let json = serde_json::to_value(&report).unwrap();
    for (name, _) in report.section_status() {
        let status = json[name]["status"].as_str().unwrap();
        assert!(
            matches!(status, "collected" | "unsupported" | "not_collected" | "error"),
            "section {name} has unexpected status {status}"
        );
        assert_ne!(status, "collected", "nothing has been collected yet");
    }
}

#[tokio::test]
async fn test_guard_timeout_and_no_late_mutation() {
    let deadline = Duration::from_millis(50);
    let result: SignalResult<u32> = hostprint::guard(std::future::pending(), deadline).await;
    assert_eq!(result, SignalResult::error("timeout after 50ms"));

    // Merge the timeout result; a late resolution cannot appear afterwards
    // because the probe future was dropped at expiry.
    let mut controller = SessionController::new(Config::default());
    controller.state_mut().battery = Some(SignalResult::error("timeout after 50ms"));

    tokio::time::sleep(Duration::from_millis(100)).await;
    let report = controller.assemble();
    assert_eq!(report.battery, SignalResult::error("timeout after 50ms"));
}

#[tokio::test]
async fn test_gather_cap_bounds_never_completing_source() {
    let mut config = Config::default();
    config.gather_cap = Duration::from_millis(100);
    let mut controller = SessionController::new(config);

    let source = ScriptedSource::never_completing(
        &["candidate:1 1 udp 2 10.0.0.8 9 typ host"],
        Duration::from_secs(10),
    );

    let started = std::time::Instant::now();
    controller.collect_transport_from(Box::new(source)).await;
    assert!(started.elapsed() < Duration::from_secs(3));

    let report = controller.assemble();
    let summary = report.transport.value().expect("collected");
    assert_eq!(summary.private, vec!["10.0.0.8"]);
}

#[cfg(feature = "transport")]
mod transport_tests {
    use hostprint::config::Config;
    use hostprint::report::SessionController;
    use hostprint::{TransportClient, TransportConfig, TransportError};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// One-shot HTTP responder: reads a full request, writes `response`,
    /// closes the connection.
    async fn one_shot_server(response: String) -> std::net::SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();

            // Read headers, then any declared body.
            let mut buf = Vec::new();
            let mut chunk = [0_u8; 1024];
            let (header_end, content_length) = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break (buf.len(), 0);
                }
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    let headers = String::from_utf8_lossy(&buf[..pos]).to_string();
                    let length = headers
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            if name.eq_ignore_ascii_case("content-length") {
                                value.trim().parse::<usize>().ok()
                            } else {
                                None
                            }
                        })
                        .unwrap_or(0);
                    break (pos + 4, length);
                }
            };
            while buf.len() < header_end + content_length {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }

            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        addr
    }

    async fn full_report() -> hostprint::Report {
        let mut controller = SessionController::new(Config::default());
        controller.collect_eager().await;
        controller.assemble()
    }

    #[tokio::test]
    async fn test_scenario_non_2xx_surfaces_status_and_message() {
        let body = "maintenance";
        let addr = one_shot_server(format!(
            "HTTP/1.1 503 Service Unavailable\r\n\
             Content-Type: text/plain\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\r\n{}",
            body.len(),
            body
        ))
        .await;

        let client = TransportClient::new(TransportConfig::new(
            format!("http://{addr}"),
            Duration::from_secs(5),
        ))
        .unwrap();

        let report = full_report().await;
        let err = client.submit(&report).await.expect_err("must fail");
        match err {
            TransportError::Server { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "maintenance");
            }
            other => panic!("expected server error, got: {other}"),
        }
    }

    #[tokio::test]
    async fn test_successful_submission_parses_receipt() {
        let body = r#"{"ok":true,"id":"r-42","digest":"ab12cd"}"#;
        let addr = one_shot_server(format!(
            "HTTP/1.1 200 OK\r\n\
             Content-Type: application/json\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\r\n{}",
            body.len(),
            body
        ))
        .await;

        let client = TransportClient::new(TransportConfig::new(
            format!("http://{addr}"),
            Duration::from_secs(5),
        ))
        .unwrap();

        let report = full_report().await;
        let receipt = client.submit(&report).await.expect("must succeed");
        assert!(receipt.ok);
        assert_eq!(receipt.id.as_deref(), Some("r-42"));
        assert_eq!(receipt.digest.as_deref(), Some("ab12cd"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_a_network_error() {
        // Discard port; nothing listens there.
        let client = TransportClient::new(TransportConfig::new(
            "http://127.0.0.1:9",
            Duration::from_millis(500),
        ))
        .unwrap();

        let err = client.health().await.expect_err("must fail");
        assert!(matches!(err, TransportError::Network(_)));
    }
}
