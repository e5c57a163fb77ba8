//! Client for the notifications service.
//!
//! Producer services use [`NotifyClient`] to send typed, validated events
//! (campaign alerts, warmup issues, system status changes) over gRPC without
//! re-implementing transport, retries or validation.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use notifications_client::{ClientConfig, EventType, Notification, NotifyClient, Scope, Severity};
//!
//! let config = ClientConfig::builder()
//!     .server_address("notifications-service:50051")
//!     .origin("go-warmups")
//!     .timeout(Duration::from_secs(5))
//!     .max_retries(2)
//!     .build()?;
//! let client = NotifyClient::connect(config).await?;
//!
//! let notification = Notification::new(project_id, Scope::Warmup, EventType::HighBounce, Severity::Warning)
//!     .with_title("Bounce rate above threshold")
//!     .with_metadata_entry("bounce_rate", "0.5");
//! client.notify(notification).await?;
//! client.close().await?;
//! ```

pub mod client;
pub mod config;
pub mod dispatch;
pub mod env;
pub mod error;
pub mod logging;
pub mod proto;
pub mod record;
pub mod reporter;
pub mod request;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use client::NotifyClient;
pub use config::{ClientConfig, ClientConfigBuilder, TransportSecurity};
pub use dispatch::RetryDispatcher;
pub use env::{ConfigSource, EnvConfig, MapSource, ProcessEnv};
pub use error::{ClientError, ClientResult, TransportError};
pub use record::{EventType, IntoNotification, Notification, NotificationParams, Scope, Severity};
pub use reporter::{ErrorReporter, NoopReporter, TracingReporter};
pub use request::build_request;
pub use transport::{Ack, GrpcChannel, NotificationChannel};
