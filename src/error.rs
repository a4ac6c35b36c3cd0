use thiserror::Error;

/// Failure modes of a completion exchange.
///
/// Every variant is rendered into a synthetic assistant message at the
/// submission boundary; none of them abort the session.
#[derive(Debug, Error)]
pub enum ChatError {
    /// No API key configured; detected before any network activity.
    #[error("OpenAI API key not configured. Set OPENAI_API_KEY or add it to the config file.")]
    MissingApiKey,

    /// The service answered with a non-success status.
    #[error("{0}")]
    Api(String),

    /// The request never reached the service.
    #[error("Network error: failed to connect to the OpenAI API. Check your internet connection.")]
    Network(#[source] reqwest::Error),

    /// Anything else; passed through unchanged.
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}
