use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("not a botforge workspace (no botforge.yaml in {0})")]
    NotInitialized(String),

    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("subsystem not found: {0}")]
    SubsystemNotFound(String),

    #[error("action not found: {0}")]
    ActionNotFound(String),

    #[error("state not found: {0}")]
    StateNotFound(String),

    #[error("command not found: {0}")]
    CommandNotFound(String),

    #[error("component definition not found: {0}")]
    DefinitionNotFound(String),

    #[error("invalid identifier '{0}': must be a Java identifier")]
    InvalidIdentifier(String),

    #[error("invalid end condition: {0}")]
    InvalidEndCondition(String),

    #[error("invalid parallel end: {0}")]
    InvalidParallelEnd(String),

    #[error("malformed project file: {0}")]
    MalformedProject(String),

    #[error("duplicate placeholder name: {0}")]
    DuplicatePlaceholder(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
