use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for Canvass.
///
/// Each subsystem defines its own error variant. Library callers can match on
/// these to decide recovery strategy; internal code continues to use
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum BotError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Survey / Conversation ───────────────────────────────────────────
    #[error("survey: {0}")]
    Survey(#[from] SurveyError),

    // ── Transport ───────────────────────────────────────────────────────
    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Survey errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SurveyError {
    /// A text or voice message arrived while no question was in flight.
    /// The user is told to restart with /start.
    #[error("no question is awaiting an answer")]
    OrphanedInput,

    #[error("catalog: {0}")]
    Catalog(String),
}

// ─── Transport errors ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("telegram {method} failed ({status}): {body}")]
    Delivery {
        method: String,
        status: String,
        body: String,
    },

    #[error("poll failed: {0}")]
    Poll(String),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, BotError>;
