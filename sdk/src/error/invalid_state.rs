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

//! Module containing InvalidStateError implementation.

use std::error;
use std::fmt;

/// An error returned when an operation is attempted from a state that forbids it.
///
/// Examples are awarding a bid that was never submitted, creating an RFQ from a request that
/// is not approved, or committing a change to a document that was modified concurrently. The
/// caller should re-fetch the document before deciding what to do next.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidStateError {
    message: String,
}

impl InvalidStateError {
    /// Constructs a new `InvalidStateError` with a specified message string.
    ///
    /// # Examples
    ///
    /// ```
    /// use procurement_sdk::error::InvalidStateError;
    ///
    /// let err = InvalidStateError::with_message("bid BID00001 is draft".to_string());
    /// assert_eq!(format!("{}", err), "bid BID00001 is draft");
    /// ```
    pub fn with_message(message: String) -> Self {
        Self { message }
    }
}

impl error::Error for InvalidStateError {}

impl fmt::Display for InvalidStateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", &self.message)
    }
}
