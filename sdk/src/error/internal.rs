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

//! Module containing InternalError implementation.

use std::error;
use std::fmt;

struct Source {
    prefix: Option<String>,
    source: Box<dyn error::Error>,
}

/// An error which is returned for reasons internal to the function.
///
/// Storage failures, poisoned locks and collaborator failures that carry no information the
/// caller could act on are reported with this error.
pub struct InternalError {
    message: Option<String>,
    source: Option<Source>,
}

impl InternalError {
    /// Constructs a new `InternalError` from a specified source error.
    ///
    /// The display of this error is the display of the source, unmodified.
    ///
    /// # Examples
    ///
    /// ```
    /// use procurement_sdk::error::InternalError;
    ///
    /// let io_err = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
    /// let internal_error = InternalError::from_source(Box::new(io_err));
    /// assert_eq!(format!("{}", internal_error), "disk full");
    /// ```
    pub fn from_source(source: Box<dyn error::Error>) -> Self {
        Self {
            message: None,
            source: Some(Source {
                prefix: None,
                source,
            }),
        }
    }

    /// Constructs a new `InternalError` from a specified source error and prefix string.
    ///
    /// The display of this error is `format!("{}: {}", prefix, source)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use procurement_sdk::error::InternalError;
    ///
    /// let io_err = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
    /// let internal_error =
    ///     InternalError::from_source_with_prefix(Box::new(io_err), "Unable to save bid".into());
    /// assert_eq!(format!("{}", internal_error), "Unable to save bid: disk full");
    /// ```
    pub fn from_source_with_prefix(source: Box<dyn error::Error>, prefix: String) -> Self {
        Self {
            message: None,
            source: Some(Source {
                prefix: Some(prefix),
                source,
            }),
        }
    }

    /// Constructs a new `InternalError` with a specified message string.
    ///
    /// # Examples
    ///
    /// ```
    /// use procurement_sdk::error::InternalError;
    ///
    /// let internal_error = InternalError::with_message("lock poisoned".to_string());
    /// assert_eq!(format!("{}", internal_error), "lock poisoned");
    /// ```
    pub fn with_message(message: String) -> Self {
        Self {
            message: Some(message),
            source: None,
        }
    }
}

impl error::Error for InternalError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        self.source.as_ref().map(|s| s.source.as_ref())
    }
}

impl fmt::Display for InternalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.message, &self.source) {
            (Some(m), _) => write!(f, "{}", m),
            (None, Some(Source { prefix: Some(p), source })) => write!(f, "{}: {}", p, source),
            (None, Some(Source { prefix: None, source })) => write!(f, "{}", source),
            (None, None) => write!(f, "{}", std::any::type_name::<InternalError>()),
        }
    }
}

impl fmt::Debug for InternalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        const TYPE_NAME: &str = "InternalError";

        match (&self.message, &self.source) {
            (Some(m), Some(s)) => write!(
                f,
                "{} {{ message: {:?}, source: {:?} }}",
                TYPE_NAME, m, s.source
            ),
            (Some(m), None) => write!(f, "{} {{ message: {:?} }}", TYPE_NAME, m),
            (None, Some(Source { prefix: Some(p), source })) => write!(
                f,
                "{} {{ prefix: {:?}, source: {:?} }}",
                TYPE_NAME, p, source
            ),
            (None, Some(Source { prefix: None, source })) => {
                write!(f, "{} {{ source: {:?} }}", TYPE_NAME, source)
            }
            (None, None) => write!(f, "{}", TYPE_NAME),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests that an error built from a source with a prefix displays as `prefix: source` and
    /// keeps the source reachable through `Error::source`.
    #[test]
    fn test_display_from_source_with_prefix() {
        let err = InternalError::from_source_with_prefix(
            Box::new(InternalError::with_message("lock poisoned".to_string())),
            "Cannot access bids".to_string(),
        );

        assert_eq!(format!("{}", err), "Cannot access bids: lock poisoned");
        assert!(error::Error::source(&err).is_some());
    }

    /// Tests the debug representation of a message-only error.
    #[test]
    fn test_debug_with_message() {
        let err = InternalError::with_message("lock poisoned".to_string());
        assert_eq!(
            format!("{:?}", err),
            "InternalError { message: \"lock poisoned\" }"
        );
    }
}
