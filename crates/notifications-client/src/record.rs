//! Notification records and their closed vocabularies.
//!
//! [`Notification`] is the typed record: its enumerated fields cannot hold a
//! value outside their vocabulary. [`NotificationParams`] is the untyped
//! boundary for payloads that arrive as plain strings (deserialized JSON,
//! environment-driven producers) and is validated before it becomes a
//! [`Notification`].

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::VariantNames;

use crate::error::{ClientError, ClientResult};

/// What the notification is about.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::VariantNames,
    strum::AsRefStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Scope {
    Campaign,
    Project,
    System,
    Warmup,
}

/// Event category.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::VariantNames,
    strum::AsRefStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Blacklist,
    HighBounce,
    DeliverabilityDrop,
    Completed,
    Failed,
    Issues,
    ImportCompleted,
    StateChange,
    DailySummary,
    Paused,
    Bounce,
    SpamComplaints,
}

/// Severity level of a notification.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::VariantNames,
    strum::AsRefStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

/// A validated notification event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub project_id: String,
    pub scope: Scope,
    pub event_type: EventType,
    pub severity: Severity,
    pub title: String,
    pub content: String,
    pub metadata: HashMap<String, String>,
}

impl Notification {
    pub fn new(
        project_id: impl Into<String>,
        scope: Scope,
        event_type: EventType,
        severity: Severity,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            scope,
            event_type,
            severity,
            title: String::new(),
            content: String::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_metadata_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Untyped notification payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationParams {
    pub project_id: String,
    pub scope: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub severity: String,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

impl NotificationParams {
    /// Checks severity, scope and type against their vocabularies, in that order.
    ///
    /// The first field outside its vocabulary is reported as
    /// [`ClientError::InvalidField`] together with the accepted names.
    pub fn validate(&self) -> ClientResult<()> {
        self.parse_fields().map(|_| ())
    }

    fn parse_fields(&self) -> ClientResult<(Severity, Scope, EventType)> {
        let severity = parse_field::<Severity>("severity", &self.severity)?;
        let scope = parse_field::<Scope>("scope", &self.scope)?;
        let event_type = parse_field::<EventType>("type", &self.event_type)?;
        Ok((severity, scope, event_type))
    }
}

impl TryFrom<NotificationParams> for Notification {
    type Error = ClientError;

    fn try_from(params: NotificationParams) -> ClientResult<Self> {
        let (severity, scope, event_type) = params.parse_fields()?;
        Ok(Self {
            project_id: params.project_id,
            scope,
            event_type,
            severity,
            title: params.title,
            content: params.content,
            metadata: params.metadata.unwrap_or_default(),
        })
    }
}

impl From<Notification> for NotificationParams {
    fn from(notification: Notification) -> Self {
        Self {
            project_id: notification.project_id,
            scope: notification.scope.to_string(),
            event_type: notification.event_type.to_string(),
            title: notification.title,
            content: notification.content,
            severity: notification.severity.to_string(),
            metadata: Some(notification.metadata),
        }
    }
}

/// Anything the client can turn into a [`Notification`].
pub trait IntoNotification {
    fn into_notification(self) -> ClientResult<Notification>;
}

impl IntoNotification for Notification {
    fn into_notification(self) -> ClientResult<Notification> {
        Ok(self)
    }
}

impl IntoNotification for NotificationParams {
    fn into_notification(self) -> ClientResult<Notification> {
        Notification::try_from(self)
    }
}

fn parse_field<T>(field: &'static str, value: &str) -> ClientResult<T>
where
    T: FromStr + VariantNames,
{
    value
        .parse::<T>()
        .map_err(|_| ClientError::invalid_field(field, value, T::VARIANTS))
}
