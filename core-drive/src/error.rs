use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriveError {
    #[error("Remote error: {0}")]
    Remote(#[from] BridgeError),

    #[error("{operation} rejected after {attempts} attempt(s): {source}")]
    Rejected {
        operation: &'static str,
        attempts: u32,
        #[source]
        source: BridgeError,
    },

    #[error("{operation} failed after {attempts} attempt(s): {last}")]
    RetriesExhausted {
        operation: &'static str,
        attempts: u32,
        last: BridgeError,
    },

    #[error("Local I/O error on {path}: {source}")]
    LocalIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Transfer error: {0}")]
    Transfer(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl DriveError {
    /// Number of remote attempts made before giving up, if a remote call was involved.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            DriveError::Rejected { attempts, .. } | DriveError::RetriesExhausted { attempts, .. } => {
                Some(*attempts)
            }
            _ => None,
        }
    }

    /// HTTP status of the last remote failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            DriveError::Remote(e)
            | DriveError::Rejected { source: e, .. }
            | DriveError::RetriesExhausted { last: e, .. } => e.status(),
            _ => None,
        }
    }
}

/// Raised by [`RecencyCache::try_evict`](crate::cache::RecencyCache::try_evict).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvictError {
    #[error("{0} is not cached")]
    NotCached(String),
}

pub type Result<T> = std::result::Result<T, DriveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = DriveError::RetriesExhausted {
            operation: "list_children",
            attempts: 3,
            last: BridgeError::Status {
                status: 503,
                message: "Backend Error".to_string(),
            },
        };
        assert_eq!(
            error.to_string(),
            "list_children failed after 3 attempt(s): Remote returned status 503: Backend Error"
        );
        assert_eq!(error.attempts(), Some(3));
        assert_eq!(error.status(), Some(503));
    }

    #[test]
    fn test_local_errors_have_no_status() {
        let error = DriveError::LocalIo {
            path: "essay.pdf".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(error.status(), None);
        assert_eq!(error.attempts(), None);
        assert_eq!(
            EvictError::NotCached("abc".to_string()).to_string(),
            "abc is not cached"
        );
    }
}
