//! Client configuration.

use encoding_rs::{Encoding, UTF_8};
use std::time::Duration;

use crate::encoding::encoding_for_label;
use crate::error::ApiError;

/// Primary UniSender API host, used on even attempts.
pub const PRIMARY_HOST: &str = "https://api.unisender.com/ru/api/";

/// Fallback UniSender API host, used on odd attempts.
pub const FALLBACK_HOST: &str = "https://www.api.unisender.com/ru/api/";

/// Attempts per call when none is configured.
pub const DEFAULT_RETRY_COUNT: u32 = 4;

/// Per-attempt timeout when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// The two hosts a call alternates between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hosts {
    pub primary: String,
    pub fallback: String,
}

impl Hosts {
    /// Base URL for a zero-based attempt index: even picks the primary host, odd the fallback.
    pub fn for_attempt(&self, attempt: u32) -> &str {
        if attempt % 2 == 0 {
            &self.primary
        } else {
            &self.fallback
        }
    }
}

impl Default for Hosts {
    fn default() -> Self {
        Self {
            primary: PRIMARY_HOST.to_string(),
            fallback: FALLBACK_HOST.to_string(),
        }
    }
}

/// Settings fixed for the lifetime of a [`Client`](crate::Client).
///
/// Only `test_mode` may change after construction, through [`ClientConfig::set_test_mode`].
#[derive(Clone)]
pub struct ClientConfig {
    api_key: String,
    encoding: &'static Encoding,
    retry_count: u32,
    timeout: Option<Duration>,
    test_mode: bool,
    compression: bool,
    hosts: Hosts,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            encoding: UTF_8,
            retry_count: DEFAULT_RETRY_COUNT,
            timeout: None,
            test_mode: false,
            compression: false,
            hosts: Hosts::default(),
        }
    }

    /// Declared encoding of [`Param::Raw`](crate::Param::Raw) values.
    pub fn encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Sets the encoding by label, e.g. `"windows-1251"`.
    pub fn encoding_label(self, label: &str) -> Result<Self, ApiError> {
        let encoding = encoding_for_label(label)
            .ok_or_else(|| ApiError::Config(format!("unknown encoding '{}'", label)))?;
        Ok(self.encoding(encoding))
    }

    pub fn retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }

    /// Timeout for a single attempt, in seconds.
    pub fn timeout_secs(mut self, seconds: u64) -> Self {
        self.timeout = Some(Duration::from_secs(seconds));
        self
    }

    pub fn test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }

    pub fn compression(mut self, compression: bool) -> Self {
        self.compression = compression;
        self
    }

    pub fn hosts(mut self, primary: impl Into<String>, fallback: impl Into<String>) -> Self {
        self.hosts = Hosts {
            primary: primary.into(),
            fallback: fallback.into(),
        };
        self
    }

    pub fn set_test_mode(&mut self, test_mode: bool) {
        self.test_mode = test_mode;
    }

    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn source_encoding(&self) -> &'static Encoding {
        self.encoding
    }

    pub fn attempts(&self) -> u32 {
        self.retry_count
    }

    /// Effective per-attempt timeout.
    pub fn request_timeout(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT)
    }

    pub fn is_test_mode(&self) -> bool {
        self.test_mode
    }

    pub fn is_compressed(&self) -> bool {
        self.compression
    }

    pub fn host_pair(&self) -> &Hosts {
        &self.hosts
    }

    pub(crate) fn validate(&self) -> Result<(), ApiError> {
        if self.retry_count == 0 {
            return Err(ApiError::Config(
                "retry_count must be at least 1".to_string(),
            ));
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(ApiError::Config(
                "timeout must be a positive number of seconds".to_string(),
            ));
        }
        if self.api_key.is_empty() {
            return Err(ApiError::Config("api_key must not be empty".to_string()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("encoding", &self.encoding.name())
            .field("retry_count", &self.retry_count)
            .field("timeout", &self.timeout)
            .field("test_mode", &self.test_mode)
            .field("compression", &self.compression)
            .field("hosts", &self.hosts)
            .finish()
    }
}
