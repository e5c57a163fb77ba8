//! Wire request assembly.

use crate::error::ClientResult;
use crate::proto::NotifyRequest;
use crate::record::{IntoNotification, Notification};

/// Validates `notification` and maps it onto a [`NotifyRequest`] stamped with `origin`.
///
/// Validation failures are returned unchanged; nothing is sent for them.
pub fn build_request(notification: impl IntoNotification, origin: &str) -> ClientResult<NotifyRequest> {
    let notification = notification.into_notification()?;
    Ok(to_wire(notification, origin))
}

fn to_wire(notification: Notification, origin: &str) -> NotifyRequest {
    NotifyRequest {
        project_id: notification.project_id,
        scope: notification.scope.to_string(),
        r#type: notification.event_type.to_string(),
        title: notification.title,
        content: notification.content,
        severity: notification.severity.to_string(),
        origin: origin.to_string(),
        metadata: notification.metadata,
    }
}
