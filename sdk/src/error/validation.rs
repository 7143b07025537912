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

//! Module containing ValidationError implementation.

use std::error;
use std::fmt;

/// An error returned when required data is missing or malformed.
///
/// Typical causes are a request submitted without lines, a bid line priced at zero, or a
/// discount outside of `[0, 100]`. The caller must correct the data; retrying the same call
/// fails the same way.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    /// Constructs a new `ValidationError` for the named field.
    ///
    /// The message should explain why the value is invalid without repeating the field name,
    /// since `Display` combines both.
    ///
    /// # Examples
    ///
    /// ```
    /// use procurement_sdk::error::ValidationError;
    ///
    /// let err = ValidationError::new(
    ///     "lines".to_string(),
    ///     "at least one line is required".to_string(),
    /// );
    /// assert_eq!(format!("{}", err), "at least one line is required (lines)");
    /// ```
    pub fn new(field: String, message: String) -> Self {
        Self { field, message }
    }

    /// Returns the name of the invalid field.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns the explanation of why the field is invalid.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl error::Error for ValidationError {}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", &self.message, &self.field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let err = ValidationError::new("price_unit".to_string(), "must be positive".to_string());
        assert_eq!(err.field(), "price_unit");
        assert_eq!(err.message(), "must be positive");
    }
}
