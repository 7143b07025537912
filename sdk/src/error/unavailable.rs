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

//! Module containing ResourceTemporarilyUnavailableError implementation.

use std::error;
use std::fmt;
use std::time::Duration;

/// An error which may succeed if the operation is retried later, such as an exhausted
/// connection pool.
///
/// Only derivation operations (`create_rfq`, award) are safe to retry blindly; their
/// precondition checks reject a second execution.
#[derive(Debug)]
pub struct ResourceTemporarilyUnavailableError {
    source: Box<dyn error::Error>,
    retry_duration_hint: Option<Duration>,
}

impl ResourceTemporarilyUnavailableError {
    /// Constructs a new `ResourceTemporarilyUnavailableError` from a specified source error.
    ///
    /// # Examples
    ///
    /// ```
    /// use procurement_sdk::error::ResourceTemporarilyUnavailableError;
    ///
    /// let io_err = std::io::Error::new(std::io::ErrorKind::Other, "pool exhausted");
    /// let err = ResourceTemporarilyUnavailableError::from_source(Box::new(io_err));
    /// assert_eq!(format!("{}", err), "pool exhausted");
    /// ```
    pub fn from_source(source: Box<dyn error::Error>) -> Self {
        Self {
            source,
            retry_duration_hint: None,
        }
    }

    /// Constructs a new `ResourceTemporarilyUnavailableError` with a suggested delay before the
    /// caller retries.
    pub fn from_source_with_hint(
        source: Box<dyn error::Error>,
        retry_duration_hint: Duration,
    ) -> Self {
        Self {
            source,
            retry_duration_hint: Some(retry_duration_hint),
        }
    }

    pub fn retry_duration_hint(&self) -> Option<Duration> {
        self.retry_duration_hint
    }
}

impl error::Error for ResourceTemporarilyUnavailableError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

impl fmt::Display for ResourceTemporarilyUnavailableError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InternalError;

    #[test]
    fn test_display_from_source_with_hint() {
        let err = ResourceTemporarilyUnavailableError::from_source_with_hint(
            Box::new(InternalError::with_message("pool exhausted".to_string())),
            Duration::new(5, 0),
        );
        assert_eq!(format!("{}", err), "pool exhausted");
        assert_eq!(err.retry_duration_hint(), Some(Duration::new(5, 0)));
    }
}
