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

//! Module containing ConflictError implementation.

use std::error;
use std::fmt;

/// The kind of conflict that was detected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConflictType {
    /// A uniqueness constraint would be violated, e.g. assigning a vendor twice to one RFQ.
    Unique,
    /// Another document still depends on the one being changed, e.g. cancelling a request
    /// whose RFQ still exists.
    DependentDocument,
}

impl fmt::Display for ConflictType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConflictType::Unique => f.write_str("Unique"),
            ConflictType::DependentDocument => f.write_str("DependentDocument"),
        }
    }
}

/// An error returned when an operation conflicts with another entity.
///
/// The caller has to resolve the conflicting entity first; the operation itself had no effect.
#[derive(Debug)]
pub struct ConflictError {
    conflict_type: ConflictType,
    message: String,
    source: Option<Box<dyn error::Error>>,
}

impl ConflictError {
    /// Constructs a new `ConflictError` of the given type with a message.
    ///
    /// # Examples
    ///
    /// ```
    /// use procurement_sdk::error::{ConflictError, ConflictType};
    ///
    /// let err = ConflictError::new(ConflictType::Unique, "vendor already assigned".to_string());
    /// assert_eq!(format!("{}", err), "vendor already assigned");
    /// ```
    pub fn new(conflict_type: ConflictType, message: String) -> Self {
        Self {
            conflict_type,
            message,
            source: None,
        }
    }

    /// Constructs a new `ConflictError` from an underlying error, such as a database unique
    /// index violation.
    pub fn from_source(conflict_type: ConflictType, source: Box<dyn error::Error>) -> Self {
        Self {
            conflict_type,
            message: source.to_string(),
            source: Some(source),
        }
    }

    pub fn conflict_type(&self) -> ConflictType {
        self.conflict_type
    }
}

impl error::Error for ConflictError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        self.source.as_deref()
    }
}

impl fmt::Display for ConflictError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InternalError;

    /// Tests that a conflict built from a source displays the source message and exposes the
    /// conflict type.
    #[test]
    fn test_from_source() {
        let err = ConflictError::from_source(
            ConflictType::Unique,
            Box::new(InternalError::with_message(
                "UNIQUE constraint failed".to_string(),
            )),
        );

        assert_eq!(err.conflict_type(), ConflictType::Unique);
        assert_eq!(format!("{}", err), "UNIQUE constraint failed");
        assert!(error::Error::source(&err).is_some());
    }
}
