use thiserror::Error;

/// Unified error type for the library.
///
/// This aggregates provider-adapter failures and the errors raised by the
/// resilience layer itself into one actionable taxonomy. Callers see exactly
/// one of: a direct result, the original fatal error, a
/// [`Error::RateLimitExceeded`] (waiting disabled), or a
/// [`Error::RetryExhausted`] wrapping the last transient failure.
#[derive(Debug, Error)]
pub enum Error {
    /// Caller misuse (empty messages, invalid record fields). Never retried.
    #[error("validation error: {0}")]
    Validation(String),

    /// Invalid or incomplete component configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Authentication failure against a provider. Never retried.
    #[error("authentication failed for provider '{provider}': {message}")]
    Authentication { provider: String, message: String },

    /// The provider rejected the call with a rate-limit response, optionally
    /// carrying a server-supplied wait hint in seconds.
    #[error("provider '{provider}' rate limited: {message}")]
    RateLimited {
        provider: String,
        message: String,
        retry_after: Option<f64>,
    },

    /// The provider call timed out.
    #[error("request to provider '{provider}' timed out: {message}")]
    Timeout { provider: String, message: String },

    /// Generic provider API error; the adapter flags whether it is transient.
    #[error("api error from provider '{provider}' (status {status:?}): {message}")]
    Api {
        provider: String,
        status: Option<u16>,
        message: String,
        retryable: bool,
    },

    /// Raised by the rate limiter itself when a limit is breached and
    /// waiting is disabled.
    #[error(
        "rate limit exceeded for provider '{provider}': {limit_type} at {current}/{limit}"
    )]
    RateLimitExceeded {
        provider: String,
        limit_type: LimitType,
        current: u64,
        limit: u64,
        retry_after_seconds: Option<f64>,
    },

    /// Raised by the retry policy after the final attempt, wrapping the last
    /// transient failure so callers have one exhaustion type regardless of
    /// root cause.
    #[error("all {attempts} attempts against provider '{provider}' failed: {last_error}")]
    RetryExhausted {
        provider: String,
        attempts: u32,
        last_error: Box<Error>,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse error classification used by the retry policy and event payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Configuration,
    Authentication,
    RateLimited,
    Timeout,
    Api,
    RateLimitExceeded,
    RetryExhausted,
    Serialization,
}

/// Which configured limit a rate limiter breached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitType {
    RequestsPerMinute,
    TokensPerMinute,
    RequestsPerDay,
}

impl std::fmt::Display for LimitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            LimitType::RequestsPerMinute => "requests_per_minute",
            LimitType::TokensPerMinute => "tokens_per_minute",
            LimitType::RequestsPerDay => "requests_per_day",
        })
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::Configuration(_) => ErrorKind::Configuration,
            Error::Authentication { .. } => ErrorKind::Authentication,
            Error::RateLimited { .. } => ErrorKind::RateLimited,
            Error::Timeout { .. } => ErrorKind::Timeout,
            Error::Api { .. } => ErrorKind::Api,
            Error::RateLimitExceeded { .. } => ErrorKind::RateLimitExceeded,
            Error::RetryExhausted { .. } => ErrorKind::RetryExhausted,
            Error::Serialization(_) => ErrorKind::Serialization,
        }
    }

    /// Stable string label for the error class, used in log lines and event
    /// payloads instead of the full display message.
    pub fn error_type(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Validation => "validation",
            ErrorKind::Configuration => "configuration",
            ErrorKind::Authentication => "authentication",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Api => "api_error",
            ErrorKind::RateLimitExceeded => "rate_limit_exceeded",
            ErrorKind::RetryExhausted => "retry_exhausted",
            ErrorKind::Serialization => "serialization",
        }
    }

    /// Server-supplied wait hint in seconds, if the failure carries one.
    pub fn retry_after(&self) -> Option<f64> {
        match self {
            Error::RateLimited { retry_after, .. } => *retry_after,
            Error::RateLimitExceeded {
                retry_after_seconds, ..
            } => *retry_after_seconds,
            _ => None,
        }
    }
}
