//! End-to-end tests against an in-process notifications service.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use notifications_client::proto::{
    NotificationsService, NotificationsServiceServer, NotifyRequest, NotifyResponse,
};
use notifications_client::{
    ClientConfig, ClientError, EnvConfig, EventType, MapSource, NoopReporter, Notification,
    NotificationParams, NotifyClient, Scope, Severity, TransportError,
};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::{Request, Response, Status};

#[derive(Clone, Copy)]
enum Behaviour {
    Accept,
    FailFirst(u32),
    Reject,
    Stall(Duration),
}

#[derive(Clone)]
struct TestService {
    behaviour: Behaviour,
    calls: Arc<AtomicU32>,
    received: Arc<Mutex<Vec<NotifyRequest>>>,
}

impl TestService {
    fn new(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            calls: Arc::new(AtomicU32::new(0)),
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[tonic::async_trait]
impl NotificationsService for TestService {
    async fn notify(
        &self,
        request: Request<NotifyRequest>,
    ) -> Result<Response<NotifyResponse>, Status> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        match self.behaviour {
            Behaviour::Accept => {}
            Behaviour::FailFirst(n) if call <= n => {
                return Err(Status::unavailable("warming up"));
            }
            Behaviour::FailFirst(_) => {}
            Behaviour::Reject => return Err(Status::invalid_argument("rejected")),
            Behaviour::Stall(delay) => tokio::time::sleep(delay).await,
        }

        self.received.lock().unwrap().push(request.into_inner());
        Ok(Response::new(NotifyResponse {
            notification_id: format!("n-{call}"),
        }))
    }
}

async fn spawn_server(service: TestService) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(
        tonic::transport::Server::builder()
            .add_service(NotificationsServiceServer::new(service))
            .serve_with_incoming(TcpListenerStream::new(listener)),
    );
    addr
}

fn config(addr: SocketAddr) -> notifications_client::ClientConfigBuilder {
    ClientConfig::builder()
        .server_address(addr.to_string())
        .origin("go-warmups")
        .timeout(Duration::from_secs(5))
        .retry_interval(Duration::from_millis(10))
}

async fn connect(addr: SocketAddr, max_retries: u32) -> NotifyClient {
    NotifyClient::connect_with_reporter(
        config(addr).max_retries(max_retries).build().unwrap(),
        Arc::new(NoopReporter),
    )
    .await
    .unwrap()
}

fn high_bounce() -> Notification {
    Notification::new(
        "dc5e5aa5-ccdd-4cc7-be00-ccfa5ec37058",
        Scope::Warmup,
        EventType::HighBounce,
        Severity::Warning,
    )
    .with_title("Bounce rate above threshold")
    .with_content("The bounce rate is above the acceptable limit.")
    .with_metadata_entry("bounce_rate", "0.5")
}

#[tokio::test]
async fn delivers_every_field_with_configured_origin() {
    let service = TestService::new(Behaviour::Accept);
    let addr = spawn_server(service.clone()).await;
    let client = connect(addr, 3).await;

    client.notify(high_bounce()).await.unwrap();

    assert_eq!(service.calls(), 1);
    let received = service.received.lock().unwrap();
    let request = &received[0];
    assert_eq!(request.project_id, "dc5e5aa5-ccdd-4cc7-be00-ccfa5ec37058");
    assert_eq!(request.scope, "WARMUP");
    assert_eq!(request.r#type, "HIGH_BOUNCE");
    assert_eq!(request.severity, "WARNING");
    assert_eq!(request.title, "Bounce rate above threshold");
    assert_eq!(request.content, "The bounce rate is above the acceptable limit.");
    assert_eq!(request.origin, "go-warmups");
    assert_eq!(request.metadata.get("bounce_rate").map(String::as_str), Some("0.5"));
}

#[tokio::test]
async fn untyped_payload_is_validated_before_sending() {
    let service = TestService::new(Behaviour::Accept);
    let addr = spawn_server(service.clone()).await;
    let client = connect(addr, 3).await;

    let params: NotificationParams = serde_json::from_value(serde_json::json!({
        "project_id": "p-1",
        "scope": "INVALID",
        "type": "HIGH_BOUNCE",
        "severity": "INFO"
    }))
    .unwrap();
    let err = client.notify(params).await.unwrap_err();

    assert_eq!(err.invalid_field_name(), Some("scope"));
    assert_eq!(service.calls(), 0);
}

#[tokio::test]
async fn transient_failures_are_retried() {
    let service = TestService::new(Behaviour::FailFirst(2));
    let addr = spawn_server(service.clone()).await;
    let client = connect(addr, 3).await;

    client.notify(high_bounce()).await.unwrap();

    assert_eq!(service.calls(), 3);
    assert_eq!(service.received.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn rejection_is_retried_until_exhausted() {
    let service = TestService::new(Behaviour::Reject);
    let addr = spawn_server(service.clone()).await;
    let client = connect(addr, 2).await;
    let start = Instant::now();

    let err = client.notify(high_bounce()).await.unwrap_err();

    assert_eq!(service.calls(), 3);
    assert!(start.elapsed() >= Duration::from_millis(20));
    match err {
        ClientError::DispatchExhausted {
            attempts,
            source: TransportError::Status(status),
        } => {
            assert_eq!(attempts, 3);
            assert_eq!(status.code(), tonic::Code::InvalidArgument);
        }
        other => panic!("expected DispatchExhausted, got {other:?}"),
    }
}

#[tokio::test]
async fn stalled_server_is_cut_off_at_the_deadline() {
    let service = TestService::new(Behaviour::Stall(Duration::from_secs(5)));
    let addr = spawn_server(service.clone()).await;
    let client = NotifyClient::connect_with_reporter(
        config(addr)
            .timeout(Duration::from_millis(300))
            .max_retries(3)
            .build()
            .unwrap(),
        Arc::new(NoopReporter),
    )
    .await
    .unwrap();
    let start = Instant::now();

    let err = client.notify(high_bounce()).await.unwrap_err();

    assert_eq!(err.attempts(), Some(1));
    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(service.calls(), 1);
}

#[tokio::test]
async fn closed_client_rejects_notifications() {
    let service = TestService::new(Behaviour::Accept);
    let addr = spawn_server(service.clone()).await;
    let client = connect(addr, 0).await;

    client.close().await.unwrap();
    client.close().await.unwrap();

    let err = client.notify(high_bounce()).await.unwrap_err();
    assert!(matches!(err, ClientError::Closed));
    assert_eq!(service.calls(), 0);
}

#[tokio::test]
async fn connects_from_environment_configuration() {
    let service = TestService::new(Behaviour::Accept);
    let addr = spawn_server(service.clone()).await;

    let env = EnvConfig::new(
        MapSource::new()
            .with("NOTIFICATIONS_SERVER_ADDRESS", addr.to_string())
            .with("NOTIFICATIONS_ORIGIN", "billing")
            .with("NOTIFICATIONS_TIMEOUT", "2s"),
    );
    let config = ClientConfig::builder_from_env(&env).build().unwrap();
    let client = NotifyClient::connect(config).await.unwrap();

    client
        .notify(Notification::new(
            "p-7",
            Scope::Project,
            EventType::ImportCompleted,
            Severity::Info,
        ))
        .await
        .unwrap();

    assert_eq!(service.received.lock().unwrap()[0].origin, "billing");
}
