//! Channel abstraction and the gRPC connection manager.

use std::fmt::Display;
use std::future::Future;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rustls::pki_types::CertificateDer;
use rustls::pki_types::pem::PemObject;
use tokio::time::Instant;
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint};
use tracing::debug;

use crate::config::{ClientConfig, TransportSecurity};
use crate::error::{ClientError, ClientResult, TransportError};
use crate::proto::{NotificationsServiceClient, NotifyRequest, NotifyResponse};

/// Acknowledgement returned by the service for an accepted notification.
pub type Ack = NotifyResponse;

/// An open connection to the notifications service.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Sends one request. Must give up once `deadline` has passed.
    async fn send(&self, request: &NotifyRequest, deadline: Instant) -> Result<Ack, TransportError>;

    /// Releases transport resources. Calling it again is a no-op.
    async fn close(&self) -> Result<(), TransportError>;
}

/// [`NotificationChannel`] backed by a tonic channel.
pub struct GrpcChannel {
    address: String,
    client: Mutex<Option<NotificationsServiceClient<Channel>>>,
}

impl GrpcChannel {
    pub fn new(address: impl Into<String>, channel: Channel) -> Self {
        Self {
            address: address.into(),
            client: Mutex::new(Some(NotificationsServiceClient::new(channel))),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn is_closed(&self) -> bool {
        self.client.lock().is_none()
    }
}

#[async_trait]
impl NotificationChannel for GrpcChannel {
    async fn send(&self, request: &NotifyRequest, deadline: Instant) -> Result<Ack, TransportError> {
        // tonic clients share the underlying channel, so cloning is cheap.
        let mut client = self.client.lock().clone().ok_or(TransportError::Closed)?;

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(TransportError::DeadlineExceeded);
        }

        let mut call = tonic::Request::new(request.clone());
        call.set_timeout(remaining);

        debug!(
            address = %self.address,
            project_id = %request.project_id,
            event_type = %request.r#type,
            "sending notification"
        );

        let response = client.notify(call).await?;
        Ok(response.into_inner())
    }

    async fn close(&self) -> Result<(), TransportError> {
        if self.client.lock().take().is_some() {
            debug!(address = %self.address, "channel closed");
        }
        Ok(())
    }
}

/// Opens a channel as described by `config`.
///
/// TLS certificates are loaded before dialing. The dial itself is bounded by
/// the configured timeout.
pub async fn connect(config: &ClientConfig) -> ClientResult<GrpcChannel> {
    let uri = config.endpoint_uri();
    let mut endpoint = Endpoint::from_shared(uri.clone())
        .map_err(|e| ClientError::connection(&uri, e.to_string()))?
        .connect_timeout(config.timeout());

    if let TransportSecurity::Tls(cert_path) = config.transport_security() {
        let tls = load_tls_config(cert_path).await?;
        endpoint = endpoint
            .tls_config(tls)
            .map_err(|e| ClientError::connection(&uri, e.to_string()))?;
    }

    debug!(address = %uri, timeout = ?config.timeout(), "connecting to notifications service");

    let channel = dial_within(&uri, config.timeout(), endpoint.connect()).await?;

    Ok(GrpcChannel::new(uri, channel))
}

/// Runs `dial`, failing with a connection error if it does not finish within `limit`.
async fn dial_within<T, E>(
    uri: &str,
    limit: Duration,
    dial: impl Future<Output = Result<T, E>>,
) -> ClientResult<T>
where
    E: Display,
{
    tokio::time::timeout(limit, dial)
        .await
        .map_err(|_| ClientError::connection(uri, format!("timed out after {limit:?}")))?
        .map_err(|e| ClientError::connection(uri, e.to_string()))
}

/// Builds a TLS configuration trusting the PEM CA certificate(s) at `path`.
pub async fn load_tls_config(path: &Path) -> ClientResult<ClientTlsConfig> {
    let pem = tokio::fs::read(path)
        .await
        .map_err(|e| ClientError::certificate_load(path, e.to_string()))?;

    let certs = CertificateDer::pem_slice_iter(&pem)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ClientError::certificate_load(path, format!("invalid PEM: {e:?}")))?;
    if certs.is_empty() {
        return Err(ClientError::certificate_load(path, "no certificate found"));
    }

    Ok(ClientTlsConfig::new().ca_certificate(Certificate::from_pem(pem)))
}
