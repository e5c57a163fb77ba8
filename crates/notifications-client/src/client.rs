//! Public entry point tying validation, request building and dispatch together.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::dispatch::{RetryDispatcher, deadline_after};
use crate::error::{ClientError, ClientResult};
use crate::record::IntoNotification;
use crate::reporter::{ErrorReporter, TracingReporter};
use crate::request::build_request;
use crate::transport::{self, NotificationChannel};

/// Client for the notifications service.
///
/// Owns a single long-lived channel opened at construction. `notify` may be
/// called concurrently from many tasks; the channel is shared. After
/// [`close`](Self::close) every `notify` fails with [`ClientError::Closed`].
pub struct NotifyClient {
    config: ClientConfig,
    channel: RwLock<Option<Arc<dyn NotificationChannel>>>,
    dispatcher: RetryDispatcher,
}

impl NotifyClient {
    /// Connects to the configured server, reporting failed attempts through `tracing`.
    pub async fn connect(config: ClientConfig) -> ClientResult<Self> {
        Self::connect_with_reporter(config, Arc::new(TracingReporter)).await
    }

    pub async fn connect_with_reporter(
        config: ClientConfig,
        reporter: Arc<dyn ErrorReporter>,
    ) -> ClientResult<Self> {
        let channel = transport::connect(&config).await?;
        info!(
            address = %channel.address(),
            origin = %config.origin(),
            "notifications client connected"
        );
        Ok(Self::from_channel(config, Arc::new(channel), reporter))
    }

    /// Builds a client over an already open channel.
    pub fn from_channel(
        config: ClientConfig,
        channel: Arc<dyn NotificationChannel>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        let dispatcher = RetryDispatcher::new(config.max_retries(), config.retry_interval(), reporter);
        Self {
            config,
            channel: RwLock::new(Some(channel)),
            dispatcher,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn is_closed(&self) -> bool {
        self.channel.read().is_none()
    }

    /// Sends a notification, bounded by the configured timeout.
    ///
    /// Fails with [`ClientError::Closed`] if the client is closed before or
    /// while the notification is dispatched.
    pub async fn notify(&self, notification: impl IntoNotification) -> ClientResult<()> {
        let deadline = deadline_after(self.config.timeout());
        self.notify_with_deadline(notification, deadline).await
    }

    /// Sends a notification, bounded by `deadline` instead of the configured timeout.
    pub async fn notify_with_deadline(
        &self,
        notification: impl IntoNotification,
        deadline: Instant,
    ) -> ClientResult<()> {
        let request = build_request(notification, self.config.origin())?;
        let channel = self.channel.read().clone().ok_or(ClientError::Closed)?;

        let ack = self
            .dispatcher
            .dispatch(channel.as_ref(), &request, deadline)
            .await?;
        debug!(
            notification_id = %ack.notification_id,
            project_id = %request.project_id,
            "notification sent"
        );
        Ok(())
    }

    /// Closes the channel. Closing an already closed client is a no-op.
    pub async fn close(&self) -> ClientResult<()> {
        let Some(channel) = self.channel.write().take() else {
            return Ok(());
        };
        channel.close().await?;
        info!("notifications client closed");
        Ok(())
    }
}
