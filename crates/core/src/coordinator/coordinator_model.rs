use serde::{Deserialize, Serialize};

use crate::errors::ErrorKind;
use crate::settings::SourceKind;

/// Result of a single coordinator operation.
///
/// Operations never return `Err`: a failure leaves `data` empty, records the
/// error kind in `failure` and explains it in `status`.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationOutcome<T> {
    pub data: Option<T>,
    pub status: String,
    pub failure: Option<ErrorKind>,
}

impl<T> OperationOutcome<T> {
    pub fn success(data: T, status: impl Into<String>) -> Self {
        Self {
            data: Some(data),
            status: status.into(),
            failure: None,
        }
    }

    pub fn failed(kind: ErrorKind, status: impl Into<String>) -> Self {
        Self {
            data: None,
            status: status.into(),
            failure: Some(kind),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Observable snapshot of a coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinatorState {
    /// Store that serves every operation.
    pub source: SourceKind,
    /// True when the preferred store failed and the fixture took over.
    pub fell_back: bool,
    pub loading: bool,
    pub status: String,
    /// Number of records in the working set.
    pub vehicle_count: usize,
}
