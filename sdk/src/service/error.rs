// Copyright 2018-2021 Cargill Incorporated
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::error::Error;
use std::fmt;

use crate::error::{
    ConflictError, InternalError, InvalidStateError, ResourceTemporarilyUnavailableError,
    ValidationError,
};
use crate::store::ProcurementStoreError;

/// Represents errors of procurement operations
#[derive(Debug)]
pub enum ProcurementError {
    /// Required data is missing or invalid; retrying without changes fails again
    ValidationError(ValidationError),
    /// The document's state forbids the operation, or it changed since it was read
    InvalidStateError(InvalidStateError),
    /// Another document conflicts with the operation and has to be dealt with first
    ConflictError(ConflictError),
    NotFoundError(String),
    InternalError(InternalError),
    ResourceTemporarilyUnavailableError(ResourceTemporarilyUnavailableError),
}

impl Error for ProcurementError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ProcurementError::ValidationError(err) => Some(err),
            ProcurementError::InvalidStateError(err) => Some(err),
            ProcurementError::ConflictError(err) => Some(err),
            ProcurementError::NotFoundError(_) => None,
            ProcurementError::InternalError(err) => Some(err),
            ProcurementError::ResourceTemporarilyUnavailableError(err) => Some(err),
        }
    }
}

impl fmt::Display for ProcurementError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProcurementError::ValidationError(err) => err.fmt(f),
            ProcurementError::InvalidStateError(err) => err.fmt(f),
            ProcurementError::ConflictError(err) => err.fmt(f),
            ProcurementError::NotFoundError(ref s) => write!(f, "Not found: {}", s),
            ProcurementError::InternalError(err) => err.fmt(f),
            ProcurementError::ResourceTemporarilyUnavailableError(err) => err.fmt(f),
        }
    }
}

impl From<ValidationError> for ProcurementError {
    fn from(err: ValidationError) -> Self {
        ProcurementError::ValidationError(err)
    }
}

impl From<InvalidStateError> for ProcurementError {
    fn from(err: InvalidStateError) -> Self {
        ProcurementError::InvalidStateError(err)
    }
}

impl From<ConflictError> for ProcurementError {
    fn from(err: ConflictError) -> Self {
        ProcurementError::ConflictError(err)
    }
}

impl From<InternalError> for ProcurementError {
    fn from(err: InternalError) -> Self {
        ProcurementError::InternalError(err)
    }
}

impl From<ProcurementStoreError> for ProcurementError {
    fn from(err: ProcurementStoreError) -> Self {
        match err {
            ProcurementStoreError::InternalError(err) => ProcurementError::InternalError(err),
            ProcurementStoreError::ConflictError(err) => ProcurementError::ConflictError(err),
            ProcurementStoreError::InvalidStateError(err) => {
                ProcurementError::InvalidStateError(err)
            }
            ProcurementStoreError::ResourceTemporarilyUnavailableError(err) => {
                ProcurementError::ResourceTemporarilyUnavailableError(err)
            }
            ProcurementStoreError::NotFoundError(msg) => ProcurementError::NotFoundError(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConflictType;

    #[test]
    fn test_store_error_conversion() {
        let err = ProcurementError::from(ProcurementStoreError::ConflictError(
            ConflictError::new(ConflictType::Unique, "vendor already assigned".to_string()),
        ));
        match err {
            ProcurementError::ConflictError(ref inner) => {
                assert_eq!(inner.conflict_type(), ConflictType::Unique)
            }
            ref other => panic!("Expected ConflictError, got {:?}", other),
        }
        assert_eq!(err.to_string(), "vendor already assigned");

        let err = ProcurementError::from(ProcurementStoreError::NotFoundError(
            "RFQ rfq-1".to_string(),
        ));
        assert_eq!(err.to_string(), "Not found: RFQ rfq-1");
    }
}
