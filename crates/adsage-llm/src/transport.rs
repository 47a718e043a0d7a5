//! Retry policy and response classification for chat-completion calls

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::StatusCode;
use std::time::Duration;

use crate::GenerationError;

/// How often and how patiently a stage call is retried.
///
/// Only server errors and network failures are retried; the wait grows
/// linearly with each retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub const DEFAULT: Self = Self {
        max_retries: 2,
        base_delay: Duration::from_secs(1),
    };

    /// Wait before retry number `retry` (1-based), or `None` once exhausted.
    pub fn delay(&self, retry: u32) -> Option<Duration> {
        (retry >= 1 && retry <= self.max_retries).then(|| self.base_delay * retry)
    }
}

/// What to do with an HTTP status from a provider.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Disposition {
    Accept,
    Retry,
    Fail(GenerationError),
}

pub(crate) fn classify(status: StatusCode, provider: &str) -> Disposition {
    match status {
        s if s.is_success() => Disposition::Accept,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Disposition::Fail(
            GenerationError::ProviderAuth(format!("{provider} rejected the API key: {status}")),
        ),
        StatusCode::TOO_MANY_REQUESTS => Disposition::Fail(GenerationError::ProviderQuota(
            format!("{provider} rate limit exceeded: {status}"),
        )),
        s if s.is_server_error() => Disposition::Retry,
        _ => Disposition::Fail(GenerationError::Transport(format!(
            "{provider} returned {status}"
        ))),
    }
}

static URL_WITH_CREDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(https?://)[^:@\s]+:[^@\s]+@").unwrap());

static BEARER_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(bearer\s+)[A-Za-z0-9._~+/=-]+").unwrap());

/// Provider key shapes (`sk-...`, `gsk_...`) and other long opaque tokens
static POTENTIAL_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^A-Za-z0-9_-])(?:sk-|gsk_)?[A-Za-z0-9_-]{32,}(?:[^A-Za-z0-9_-]|$)").unwrap()
});

/// Strip credentials from a transport error before it is logged or returned.
pub(crate) fn redact(message: &str) -> String {
    let redacted = URL_WITH_CREDS.replace_all(message, "$1[REDACTED]@");
    let redacted = BEARER_TOKEN.replace_all(&redacted, "$1[REDACTED]");
    POTENTIAL_KEY
        .replace_all(&redacted, "[REDACTED_KEY]")
        .into_owned()
}
