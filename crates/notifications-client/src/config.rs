use std::path::PathBuf;
use std::time::Duration;

use crate::env::{ConfigSource, EnvConfig};
use crate::error::{ClientError, ClientResult};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(2);

pub const SERVER_ADDRESS_KEY: &str = "NOTIFICATIONS_SERVER_ADDRESS";
pub const ORIGIN_KEY: &str = "NOTIFICATIONS_ORIGIN";
pub const TIMEOUT_KEY: &str = "NOTIFICATIONS_TIMEOUT";
pub const MAX_RETRIES_KEY: &str = "NOTIFICATIONS_MAX_RETRIES";
pub const RETRY_INTERVAL_KEY: &str = "NOTIFICATIONS_RETRY_INTERVAL";
pub const TLS_CERT_PATH_KEY: &str = "NOTIFICATIONS_TLS_CERT_PATH";

/// How the channel to the notifications service is secured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TransportSecurity {
    #[default]
    Plaintext,
    /// TLS, trusting the PEM CA certificate at the given path.
    Tls(PathBuf),
}

/// Immutable client configuration. Build it with [`ClientConfig::builder`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    server_address: String,
    origin: String,
    timeout: Duration,
    max_retries: u32,
    retry_interval: Duration,
    transport_security: TransportSecurity,
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Seeds a builder from `NOTIFICATIONS_*` keys. Later builder calls override them.
    pub fn builder_from_env<S: ConfigSource>(env: &EnvConfig<S>) -> ClientConfigBuilder {
        let max_retries = env.get_int(MAX_RETRIES_KEY, i64::from(DEFAULT_MAX_RETRIES));
        let max_retries = u32::try_from(max_retries).unwrap_or_else(|_| {
            tracing::warn!(
                key = MAX_RETRIES_KEY,
                value = max_retries,
                "out of range, using default {}",
                DEFAULT_MAX_RETRIES
            );
            DEFAULT_MAX_RETRIES
        });

        ClientConfigBuilder {
            server_address: env.raw(SERVER_ADDRESS_KEY),
            origin: env.raw(ORIGIN_KEY),
            timeout: env.get_duration(TIMEOUT_KEY, DEFAULT_TIMEOUT),
            max_retries,
            retry_interval: env.get_duration(RETRY_INTERVAL_KEY, DEFAULT_RETRY_INTERVAL),
            transport_security: env
                .raw(TLS_CERT_PATH_KEY)
                .map(|path| TransportSecurity::Tls(PathBuf::from(path)))
                .unwrap_or_default(),
        }
    }

    pub fn server_address(&self) -> &str {
        &self.server_address
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Dial timeout, and the overall deadline for a `notify` call without one.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn retry_interval(&self) -> Duration {
        self.retry_interval
    }

    pub fn transport_security(&self) -> &TransportSecurity {
        &self.transport_security
    }

    /// Endpoint URI, adding a scheme matching the transport security when missing.
    pub fn endpoint_uri(&self) -> String {
        let address = self.server_address.trim();
        if address.contains("://") {
            return address.to_string();
        }
        match self.transport_security {
            TransportSecurity::Plaintext => format!("http://{address}"),
            TransportSecurity::Tls(_) => format!("https://{address}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfigBuilder {
    server_address: Option<String>,
    origin: Option<String>,
    timeout: Duration,
    max_retries: u32,
    retry_interval: Duration,
    transport_security: TransportSecurity,
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self {
            server_address: None,
            origin: None,
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_interval: DEFAULT_RETRY_INTERVAL,
            transport_security: TransportSecurity::Plaintext,
        }
    }
}

impl ClientConfigBuilder {
    #[must_use]
    pub fn server_address(mut self, address: impl Into<String>) -> Self {
        self.server_address = Some(address.into());
        self
    }

    /// Identifies the producing service on every notification.
    #[must_use]
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Retries after the first attempt; `n` allows up to `n + 1` sends.
    #[must_use]
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    #[must_use]
    pub fn retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    #[must_use]
    pub fn tls(mut self, cert_path: impl Into<PathBuf>) -> Self {
        self.transport_security = TransportSecurity::Tls(cert_path.into());
        self
    }

    #[must_use]
    pub fn plaintext(mut self) -> Self {
        self.transport_security = TransportSecurity::Plaintext;
        self
    }

    pub fn build(self) -> ClientResult<ClientConfig> {
        let origin = self
            .origin
            .filter(|o| !o.trim().is_empty())
            .ok_or_else(|| ClientError::configuration("origin must be set"))?;
        let server_address = self
            .server_address
            .filter(|a| !a.trim().is_empty())
            .ok_or_else(|| ClientError::configuration("server address must be set"))?;

        Ok(ClientConfig {
            server_address,
            origin,
            timeout: self.timeout,
            max_retries: self.max_retries,
            retry_interval: self.retry_interval,
            transport_security: self.transport_security,
        })
    }
}
