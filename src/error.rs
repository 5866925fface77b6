use thiserror::Error;

/// Wildcard compilation errors
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("wildcard pattern is empty")]
    Empty,

    #[error("wildcard pattern \"{pattern}\" did not compile: {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Failure to produce an instance from a type identifier
#[derive(Debug, Error)]
pub enum InstantiationError {
    #[error("type not found: {0}")]
    TypeNotFound(String),

    #[error("type {type_id} is not {expected}")]
    MissingCapability {
        type_id: String,
        expected: &'static str,
    },

    #[error("failed to construct {type_id}: {reason}")]
    ConstructionFailed { type_id: String, reason: String },
}

/// Failure while loading a configured action module
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("action module not found: {0}")]
    NotFound(String),

    #[error("invalid type pattern: {0}")]
    InvalidPattern(#[from] PatternError),

    #[error(transparent)]
    Instantiation(#[from] InstantiationError),
}

/// Errors raised while assembling an intrusion detector.
///
/// Only `DetectorResolution` is fatal; the loader isolates the others per
/// module or per action and reports them alongside the detector.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to resolve intrusion detector type \"{type_id}\"")]
    DetectorResolution {
        type_id: String,
        #[source]
        source: InstantiationError,
    },

    #[error("failed to load action module \"{module}\"")]
    ModuleLoad {
        module: String,
        #[source]
        source: ModuleError,
    },

    #[error("failed to load action \"{name}\"")]
    ActionInstantiation {
        name: String,
        #[source]
        source: InstantiationError,
    },
}

impl LoadError {
    /// Whether this error aborts loading
    pub fn is_fatal(&self) -> bool {
        matches!(self, LoadError::DetectorResolution { .. })
    }
}

pub type Result<T> = std::result::Result<T, LoadError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_only_resolution_is_fatal() {
        let fatal = LoadError::DetectorResolution {
            type_id: "corp::Missing".to_string(),
            source: InstantiationError::TypeNotFound("corp::Missing".to_string()),
        };
        let module = LoadError::ModuleLoad {
            module: "corp".to_string(),
            source: ModuleError::NotFound("corp".to_string()),
        };

        assert!(fatal.is_fatal());
        assert!(!module.is_fatal());
    }

    #[test]
    fn test_action_error_names_action() {
        let err = LoadError::ActionInstantiation {
            name: "page".to_string(),
            source: InstantiationError::ConstructionFailed {
                type_id: "corp::Pager".to_string(),
                reason: "no pager configured".to_string(),
            },
        };

        assert_eq!(err.to_string(), "failed to load action \"page\"");
        let cause = err.source().map(|s| s.to_string()).unwrap_or_default();
        assert!(cause.contains("no pager configured"));
    }
}
