use std::path::PathBuf;

/// Coarse classification used by callers that branch on failure mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ConfigMissing,
    Network,
    Io,
    Parse,
    DuplicateId,
    NotFound,
    MissingFile,
}

#[derive(Debug, thiserror::Error)]
pub enum TetherError {
    #[error("configuration missing: {0}")]
    ConfigMissing(String),

    #[error("{context}: {detail}")]
    Network { context: String, detail: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("session {0} already exists")]
    DuplicateId(String),

    #[error("session {0} not found")]
    NotFound(String),

    #[error("file not found: {}", .0.display())]
    MissingFile(PathBuf),
}

pub type Result<T> = std::result::Result<T, TetherError>;

impl TetherError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn network(context: impl Into<String>, detail: impl ToString) -> Self {
        Self::Network {
            context: context.into(),
            detail: detail.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigMissing(_) => ErrorKind::ConfigMissing,
            Self::Network { .. } => ErrorKind::Network,
            Self::Io { .. } => ErrorKind::Io,
            Self::Parse(_) => ErrorKind::Parse,
            Self::DuplicateId(_) => ErrorKind::DuplicateId,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::MissingFile(_) => ErrorKind::MissingFile,
        }
    }
}

impl From<serde_json::Error> for TetherError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_one_to_one() {
        assert_eq!(
            TetherError::ConfigMissing("api_url".into()).kind(),
            ErrorKind::ConfigMissing
        );
        assert_eq!(
            TetherError::network("upload-url", "HTTP 500").kind(),
            ErrorKind::Network
        );
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(TetherError::io("read queue", io).kind(), ErrorKind::Io);
        assert_eq!(
            TetherError::MissingFile(PathBuf::from("/t/x.log")).kind(),
            ErrorKind::MissingFile
        );
    }

    #[test]
    fn display_includes_context() {
        let err = TetherError::network("request upload urls", "status code 500");
        assert_eq!(err.to_string(), "request upload urls: status code 500");
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err = TetherError::io("write /q/queue.json", io);
        assert_eq!(err.to_string(), "write /q/queue.json: disk full");
    }

    #[test]
    fn serde_errors_become_parse() {
        let err: TetherError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }
}
