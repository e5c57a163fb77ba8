//! Send-with-retry over a [`NotificationChannel`].
//!
//! A dispatch makes up to `max_retries + 1` attempts with a fixed
//! `retry_interval` between them and no delay before the first. The first
//! acknowledged attempt ends the dispatch. Every failed attempt is logged and
//! handed to the [`ErrorReporter`] with its 1-based attempt number. Transport
//! errors other than a closed channel are retried alike.
//!
//! The deadline bounds the whole sequence: sends in flight when it passes
//! fail with [`TransportError::DeadlineExceeded`], waits are cut short, and
//! no attempt is started after it.
//!
//! A channel that reports [`TransportError::Closed`] ends the dispatch at once
//! with [`ClientError::Closed`]: the client was closed while the notification
//! was in flight and no later attempt can succeed.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult, TransportError};
use crate::proto::NotifyRequest;
use crate::reporter::ErrorReporter;
use crate::transport::{Ack, NotificationChannel};

/// Stand-in for an unbounded wait; `Instant` cannot represent `Duration::MAX`.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// `now + after`, saturating to a far-future instant instead of overflowing.
pub(crate) fn deadline_after(after: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(after).unwrap_or(now + FAR_FUTURE)
}

pub struct RetryDispatcher {
    max_retries: u32,
    retry_interval: Duration,
    reporter: Arc<dyn ErrorReporter>,
}

impl RetryDispatcher {
    pub fn new(max_retries: u32, retry_interval: Duration, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self {
            max_retries,
            retry_interval,
            reporter,
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn retry_interval(&self) -> Duration {
        self.retry_interval
    }

    /// Sends `request` until it is acknowledged, attempts run out, or `deadline` passes.
    ///
    /// On failure returns [`ClientError::DispatchExhausted`] wrapping the last
    /// transport error and the number of attempts made.
    pub async fn dispatch(
        &self,
        channel: &dyn NotificationChannel,
        request: &NotifyRequest,
        deadline: Instant,
    ) -> ClientResult<Ack> {
        let max_attempts = self.max_retries.saturating_add(1);
        let mut attempts = 0u32;
        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                if Instant::now() >= deadline {
                    break;
                }
                tokio::time::sleep_until(deadline_after(self.retry_interval).min(deadline)).await;
                if Instant::now() >= deadline {
                    debug!(attempts, "deadline reached while waiting to retry");
                    break;
                }
            }

            attempts += 1;
            let result = tokio::time::timeout_at(deadline, channel.send(request, deadline))
                .await
                .unwrap_or(Err(TransportError::DeadlineExceeded));

            match result {
                Ok(ack) => {
                    debug!(
                        attempt = attempts,
                        notification_id = %ack.notification_id,
                        "notification acknowledged"
                    );
                    return Ok(ack);
                }
                Err(TransportError::Closed) => {
                    debug!(attempt = attempts, "channel closed during dispatch");
                    return Err(ClientError::Closed);
                }
                Err(e) => {
                    warn!(
                        attempt = attempts,
                        max_attempts,
                        error = %e,
                        "notification attempt failed"
                    );
                    self.reporter.report(
                        &format!("attempt {attempts} failed to send notification"),
                        &e,
                    );
                    last_err = Some(e);
                }
            }
        }

        Err(ClientError::DispatchExhausted {
            attempts,
            source: last_err.unwrap_or(TransportError::DeadlineExceeded),
        })
    }
}
