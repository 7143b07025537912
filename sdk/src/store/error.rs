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
};
#[cfg(feature = "sqlite")]
use crate::error::ConflictType;

/// Represents ProcurementStore errors
#[derive(Debug)]
pub enum ProcurementStoreError {
    InternalError(InternalError),
    /// A uniqueness rule of the store would be broken, e.g. a vendor assigned twice to an RFQ
    ConflictError(ConflictError),
    /// The record was changed since it was read
    InvalidStateError(InvalidStateError),
    ResourceTemporarilyUnavailableError(ResourceTemporarilyUnavailableError),
    NotFoundError(String),
}

impl ProcurementStoreError {
    pub(crate) fn stale(label: &str) -> Self {
        ProcurementStoreError::InvalidStateError(InvalidStateError::with_message(format!(
            "{} was modified concurrently, re-fetch it and try again",
            label
        )))
    }
}

impl Error for ProcurementStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ProcurementStoreError::InternalError(err) => Some(err),
            ProcurementStoreError::ConflictError(err) => Some(err),
            ProcurementStoreError::InvalidStateError(err) => Some(err),
            ProcurementStoreError::ResourceTemporarilyUnavailableError(err) => Some(err),
            ProcurementStoreError::NotFoundError(_) => None,
        }
    }
}

impl fmt::Display for ProcurementStoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProcurementStoreError::InternalError(err) => err.fmt(f),
            ProcurementStoreError::ConflictError(err) => err.fmt(f),
            ProcurementStoreError::InvalidStateError(err) => err.fmt(f),
            ProcurementStoreError::ResourceTemporarilyUnavailableError(err) => err.fmt(f),
            ProcurementStoreError::NotFoundError(ref s) => write!(f, "Element not found: {}", s),
        }
    }
}

impl From<InternalError> for ProcurementStoreError {
    fn from(err: InternalError) -> Self {
        ProcurementStoreError::InternalError(err)
    }
}

#[cfg(feature = "sqlite")]
impl From<diesel::result::Error> for ProcurementStoreError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ) => ProcurementStoreError::ConflictError(ConflictError::from_source(
                ConflictType::Unique,
                Box::new(err),
            )),
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::ForeignKeyViolation,
                _,
            ) => ProcurementStoreError::ConflictError(ConflictError::from_source(
                ConflictType::DependentDocument,
                Box::new(err),
            )),
            _ => ProcurementStoreError::InternalError(InternalError::from_source(Box::new(err))),
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<diesel::r2d2::PoolError> for ProcurementStoreError {
    fn from(err: diesel::r2d2::PoolError) -> ProcurementStoreError {
        ProcurementStoreError::ResourceTemporarilyUnavailableError(
            ResourceTemporarilyUnavailableError::from_source(Box::new(err)),
        )
    }
}
