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

//! Human-readable document references.
//!
//! Every request, RFQ, bid and purchase order gets a reference such as `PR00042` when it is
//! first stored. References are issued by a `SequenceAllocator`, are unique per document kind
//! and are never reused.

#[cfg(feature = "sqlite")]
mod diesel;
mod memory;

use std::fmt;

use crate::error::InternalError;

#[cfg(feature = "sqlite")]
pub use self::diesel::DieselSequenceAllocator;
pub use memory::MemorySequenceAllocator;

/// The reference used when the allocator fails; creation of the document is never blocked by
/// a missing reference.
pub const PLACEHOLDER_REFERENCE: &str = "New";

/// The document kinds that draw references. RFQs and purchase orders share one sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    PurchaseRequest,
    PurchaseOrder,
    Bid,
}

impl DocumentKind {
    pub fn code(&self) -> &'static str {
        match self {
            DocumentKind::PurchaseRequest => "purchase.request",
            DocumentKind::PurchaseOrder => "purchase.order",
            DocumentKind::Bid => "purchase.rfq.bid",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// How the references of one document kind are rendered: a prefix followed by the counter
/// value padded with zeros.
#[derive(Clone, Debug, PartialEq)]
pub struct SequenceFormat {
    prefix: String,
    padding: usize,
}

impl SequenceFormat {
    pub fn new(prefix: &str, padding: usize) -> Self {
        Self {
            prefix: prefix.to_string(),
            padding,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn padding(&self) -> usize {
        self.padding
    }

    /// Renders the counter value `value` as a reference.
    ///
    /// # Examples
    ///
    /// ```
    /// use procurement_sdk::sequence::SequenceFormat;
    ///
    /// assert_eq!(SequenceFormat::new("PR", 5).render(42), "PR00042");
    /// ```
    pub fn render(&self, value: u64) -> String {
        format!("{}{:0width$}", self.prefix, value, width = self.padding)
    }
}

/// Issues unique, monotonically increasing references per document kind.
pub trait SequenceAllocator: Send + Sync {
    /// Returns the next reference for `kind`.
    fn next(&self, kind: DocumentKind) -> Result<String, InternalError>;
}
