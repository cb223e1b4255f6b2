use thiserror::Error;

#[derive(Debug, Error)]
pub enum GtmError {
    #[error("escalation not found: {0}")]
    EscalationNotFound(String),

    #[error("agent config not found: {0}")]
    ConfigNotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("orchestration agent is not ready, retry shortly")]
    NotReady,

    #[error("state store error: {0}")]
    Store(String),

    #[error("persisted state is unreadable: {0}")]
    CorruptState(String),

    #[error("unsupported state version {0}")]
    UnsupportedVersion(u32),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl GtmError {
    /// True for lookups that failed because the id does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            GtmError::EscalationNotFound(_) | GtmError::ConfigNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, GtmError>;
