//! Channel and reporter doubles shared by unit tests.

use std::error::Error as StdError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;

use crate::error::TransportError;
use crate::proto::NotifyRequest;
use crate::reporter::ErrorReporter;
use crate::transport::{Ack, NotificationChannel};

/// Fails the first `fail_for_attempts` sends, then acknowledges. Reports
/// [`TransportError::Closed`] once closed.
#[derive(Default)]
pub(crate) struct FlakyChannel {
    pub fail_for_attempts: u32,
    pub hang: bool,
    pub attempts: Arc<AtomicU32>,
    pub sent: Arc<Mutex<Vec<NotifyRequest>>>,
    pub closed: Arc<AtomicBool>,
}

impl FlakyChannel {
    pub fn failing_for(attempts: u32) -> Self {
        Self {
            fail_for_attempts: attempts,
            ..Default::default()
        }
    }

    pub fn always_failing() -> Self {
        Self::failing_for(u32::MAX)
    }

    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Default::default()
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationChannel for FlakyChannel {
    async fn send(&self, request: &NotifyRequest, _deadline: Instant) -> Result<Ack, TransportError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        if self.hang {
            std::future::pending::<()>().await;
        }
        if attempt <= self.fail_for_attempts {
            return Err(TransportError::other(format!("forced failure {attempt}")));
        }
        self.sent.lock().push(request.clone());
        Ok(Ack {
            notification_id: format!("n-{attempt}"),
        })
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Keeps every report it receives.
#[derive(Default)]
pub(crate) struct RecordingReporter {
    pub reports: Mutex<Vec<(String, String)>>,
}

impl RecordingReporter {
    pub fn descriptions(&self) -> Vec<String> {
        self.reports.lock().iter().map(|(d, _)| d.clone()).collect()
    }
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, description: &str, cause: &(dyn StdError + 'static)) {
        self.reports
            .lock()
            .push((description.to_string(), cause.to_string()));
    }
}
