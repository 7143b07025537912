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

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{DocumentKind, SequenceAllocator, SequenceFormat};
use crate::config::ProcurementConfig;
use crate::error::InternalError;

/// An in-process allocator. Clones share the same counters.
#[derive(Clone)]
pub struct MemorySequenceAllocator {
    formats: Arc<HashMap<DocumentKind, SequenceFormat>>,
    counters: Arc<Mutex<HashMap<DocumentKind, u64>>>,
}

impl MemorySequenceAllocator {
    /// Creates an allocator using the sequence formats of `config`, starting every counter at 1.
    pub fn new(config: &ProcurementConfig) -> Self {
        let formats = [
            DocumentKind::PurchaseRequest,
            DocumentKind::PurchaseOrder,
            DocumentKind::Bid,
        ]
        .iter()
        .map(|kind| (*kind, config.sequence_format(*kind).clone()))
        .collect();

        MemorySequenceAllocator {
            formats: Arc::new(formats),
            counters: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl SequenceAllocator for MemorySequenceAllocator {
    fn next(&self, kind: DocumentKind) -> Result<String, InternalError> {
        let format = self.formats.get(&kind).ok_or_else(|| {
            InternalError::with_message(format!("No sequence defined for {}", kind))
        })?;

        let mut counters = self.counters.lock().map_err(|_| {
            InternalError::with_message("Cannot access sequences: mutex lock poisoned".to_string())
        })?;
        let counter = counters.entry(kind).or_insert(0);
        *counter += 1;

        Ok(format.render(*counter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProcurementConfigBuilder;

    /// Tests that each kind draws from its own counter and that RFQs and purchase orders share
    /// the purchase order sequence.
    #[test]
    fn test_references_per_kind() {
        let config = ProcurementConfigBuilder::default()
            .build()
            .expect("Unable to build configuration");
        let allocator = MemorySequenceAllocator::new(&config);

        assert_eq!(allocator.next(DocumentKind::PurchaseRequest).unwrap(), "PR00001");
        assert_eq!(allocator.next(DocumentKind::PurchaseRequest).unwrap(), "PR00002");
        assert_eq!(allocator.next(DocumentKind::PurchaseOrder).unwrap(), "P00001");
        assert_eq!(allocator.next(DocumentKind::Bid).unwrap(), "BID00001");
        assert_eq!(allocator.next(DocumentKind::PurchaseOrder).unwrap(), "P00002");
    }

    #[test]
    fn test_clones_share_counters() {
        let config = ProcurementConfigBuilder::default()
            .build()
            .expect("Unable to build configuration");
        let allocator = MemorySequenceAllocator::new(&config);
        let other = allocator.clone();

        assert_eq!(allocator.next(DocumentKind::Bid).unwrap(), "BID00001");
        assert_eq!(other.next(DocumentKind::Bid).unwrap(), "BID00002");
    }
}
