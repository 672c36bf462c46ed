//! Drives the real HTTP client against the stub backend on a loopback port.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use outreach::api_client::{ApiError, RequestClient};
use outreach::config::RequestConfig;
use outreach::models::PersonalInfo;
use outreach::services::{extract_job_data, generate_email};
use outreach::storage::{MemoryStore, PersonalInfoStore};
use outreach::stub::{self, StubState};
use outreach::wizard::{Wizard, WizardStep};
use tokio::net::TcpListener;

const POSTING: &str = "https://boards.greenhouse.io/hooli/jobs/frontend-engineer";

async fn start_stub(latency: Duration) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(stub::serve(listener, StubState::new(latency)));
    addr
}

fn client(addr: SocketAddr, timeout: Duration, max_retries: u32) -> RequestClient {
    let config = RequestConfig::new(&format!("http://{addr}"), timeout, max_retries).unwrap();
    RequestClient::new(config).unwrap()
}

fn personal_info() -> PersonalInfo {
    PersonalInfo {
        name: "Dana Scully".to_string(),
        email: "dana@example.com".to_string(),
        skills: "React component libraries and accessibility audits".to_string(),
        portfolio: Some("https://dana.dev".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_extraction_is_idempotent_over_http() {
    let addr = start_stub(Duration::ZERO).await;
    let client = client(addr, Duration::from_secs(5), 0);

    let first = extract_job_data(&client, POSTING).await.unwrap();
    let second = extract_job_data(&client, POSTING).await.unwrap();

    assert_eq!(first, second);
    assert!(!first.role.is_empty());
    assert!(!first.company.is_empty());
}

#[tokio::test]
async fn test_unprocessable_request_is_not_retried() {
    let addr = start_stub(Duration::ZERO).await;
    let client = client(addr, Duration::from_secs(5), 2);

    let started = Instant::now();
    let err = extract_job_data(&client, "not a url").await.unwrap_err();

    match err.0 {
        ApiError::Server { status, detail } => {
            assert_eq!(status, 422);
            assert!(detail.contains("Invalid job URL"));
        }
        other => panic!("expected server error, got {other:?}"),
    }
    // No backoff sleep happened.
    assert!(started.elapsed() < Duration::from_millis(900));
}

#[tokio::test]
async fn test_connection_refused_is_retried_then_reported() {
    // Grab a free port, then close it so connections are refused.
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let client = client(addr, Duration::from_secs(5), 1);

    let started = Instant::now();
    let err = client
        .call("/health", reqwest::Method::GET, None)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Network(_)), "got {err:?}");
    assert!(started.elapsed() >= Duration::from_millis(1000));
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let addr = start_stub(Duration::from_secs(2)).await;
    let client = client(addr, Duration::from_millis(200), 0);

    let err = extract_job_data(&client, POSTING).await.unwrap_err();

    assert!(matches!(err.0, ApiError::Timeout(_)), "got {:?}", err.0);
}

#[tokio::test]
async fn test_generated_email_is_personalized() {
    let addr = start_stub(Duration::ZERO).await;
    let client = client(addr, Duration::from_secs(5), 0);

    let job = extract_job_data(&client, POSTING).await.unwrap();
    let email = generate_email(&client, &job, &personal_info()).await.unwrap();

    assert!(email.subject.contains(&job.company));
    assert!(email.content.contains("Dana Scully"));
    assert!(email.content.contains("https://dana.dev"));
    let score = email.confidence_score.unwrap();
    assert!((0.0..=1.0).contains(&score));
    assert!(email.personalization_level.is_some());
}

#[tokio::test]
async fn test_wizard_runs_against_stub() {
    let addr = start_stub(Duration::ZERO).await;
    let store = PersonalInfoStore::new(Arc::new(MemoryStore::default()));
    let mut wizard = Wizard::new(client(addr, Duration::from_secs(5), 0), store);

    wizard.submit_url(POSTING).await.unwrap();
    assert_eq!(wizard.step(), WizardStep::Review);
    wizard.confirm_review().unwrap();
    wizard.submit_personal_info(personal_info()).await.unwrap();

    let session = wizard.session();
    assert_eq!(session.step, WizardStep::Result);
    assert!(session.error.is_none());
    assert!(session.email.confidence_score.is_some());
}
