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

//! The procurement engine.
//!
//! `ProcurementService` runs every operation on requests, RFQs, vendor assignments, bids and
//! awards. Each operation reads what it needs from the store, checks the transition against
//! the procurement workflow, and commits its changes in one store call. Side channels (audit
//! log, notifications, email) are only called after the commit; their failures are returned as
//! warnings in an `Outcome` and never undo the operation.

mod award;
mod bid;
mod error;
mod request;
mod rfq;
mod vendor;

#[cfg(test)]
pub(crate) mod testing;

use std::error::Error;
use std::fmt;

use crate::bid::Bid;
use crate::collaborators::{
    AuditLog, Directory, EmailDispatcher, MemoryAuditLog, MemoryDirectory, NoopEmailDispatcher,
    NoopNotificationScheduler, NotificationScheduler, Warning, WarningKind,
};
use crate::config::{ProcurementConfig, ProcurementConfigBuilder};
use crate::purchase_order::PurchaseOrder;
use crate::purchase_request::PurchaseRequest;
use crate::rfq::{Rfq, RfqAggregate, VendorAssignment};
use crate::sequence::{
    DocumentKind, MemorySequenceAllocator, SequenceAllocator, PLACEHOLDER_REFERENCE,
};
use crate::store::{ProcurementStore, ProcurementStoreError, RfqChangeSet};
use crate::tax::{StandardTaxCalculator, TaxCalculator};
use crate::workflow::{check_transition, procurement_workflow, Workflow};

pub use error::ProcurementError;

pub struct ProcurementService {
    store: Box<dyn ProcurementStore>,
    config: ProcurementConfig,
    sequences: Box<dyn SequenceAllocator>,
    tax_calculator: Box<dyn TaxCalculator>,
    audit_log: Box<dyn AuditLog>,
    notifications: Box<dyn NotificationScheduler>,
    email: Box<dyn EmailDispatcher>,
    directory: Box<dyn Directory>,
    workflow: Workflow,
}

impl ProcurementService {
    pub fn config(&self) -> &ProcurementConfig {
        &self.config
    }

    pub fn get_purchase_request(
        &self,
        request_id: &str,
    ) -> Result<PurchaseRequest, ProcurementError> {
        self.store
            .get_purchase_request(request_id)?
            .ok_or_else(|| {
                ProcurementError::NotFoundError(format!("purchase request {}", request_id))
            })
    }

    pub fn list_purchase_requests(&self) -> Result<Vec<PurchaseRequest>, ProcurementError> {
        Ok(self.store.list_purchase_requests()?)
    }

    /// Fetches an RFQ with its vendor assignments and bids.
    pub fn get_rfq(&self, rfq_id: &str) -> Result<RfqAggregate, ProcurementError> {
        self.store
            .get_rfq(rfq_id)?
            .ok_or_else(|| ProcurementError::NotFoundError(format!("RFQ {}", rfq_id)))
    }

    pub fn list_vendor_assignments(
        &self,
        rfq_id: &str,
    ) -> Result<Vec<VendorAssignment>, ProcurementError> {
        Ok(self.get_rfq(rfq_id)?.assignments)
    }

    pub fn list_bids(&self, rfq_id: &str) -> Result<Vec<Bid>, ProcurementError> {
        Ok(self.get_rfq(rfq_id)?.bids)
    }

    pub fn get_bid(&self, bid_id: &str) -> Result<Bid, ProcurementError> {
        self.store
            .get_bid(bid_id)?
            .ok_or_else(|| ProcurementError::NotFoundError(format!("bid {}", bid_id)))
    }

    pub fn get_purchase_order(
        &self,
        purchase_order_id: &str,
    ) -> Result<PurchaseOrder, ProcurementError> {
        self.store
            .get_purchase_order(purchase_order_id)?
            .ok_or_else(|| {
                ProcurementError::NotFoundError(format!("purchase order {}", purchase_order_id))
            })
    }

    pub fn list_purchase_orders(&self) -> Result<Vec<PurchaseOrder>, ProcurementError> {
        Ok(self.store.list_purchase_orders()?)
    }

    /// Draws the next reference for `kind`, falling back to the placeholder if the allocator
    /// fails.
    fn next_reference(&self, kind: DocumentKind, warnings: &mut Vec<Warning>) -> String {
        match self.sequences.next(kind) {
            Ok(reference) => reference,
            Err(err) => {
                warn!("Unable to allocate a {} reference: {}", kind, err);
                warnings.push(Warning::new(
                    WarningKind::SequenceFallback,
                    format!(
                        "No {} reference could be allocated, using {}: {}",
                        kind, PLACEHOLDER_REFERENCE, err
                    ),
                ));
                PLACEHOLDER_REFERENCE.to_string()
            }
        }
    }

    fn post_audit(&self, document_id: &str, message: &str, warnings: &mut Vec<Warning>) {
        if let Err(err) = self.audit_log.post(document_id, message) {
            warn!("Unable to post audit event on {}: {}", document_id, err);
            warnings.push(Warning::new(
                WarningKind::AuditFailed,
                format!("Audit event was not recorded: {}", err),
            ));
        }
    }

    /// Commits changes to an RFQ aggregate and returns the RFQ at its new version.
    fn commit_rfq(&self, changes: RfqChangeSet) -> Result<Rfq, ProcurementError> {
        let mut rfq = changes.rfq().clone();
        let label = rfq.label();
        self.committed(self.store.commit_rfq_changes(changes), &label)?;
        rfq.version += 1;
        Ok(rfq)
    }

    /// Loads a bid together with the RFQ aggregate it belongs to. The returned bid is the copy
    /// read with the aggregate.
    fn load_bid(&self, bid_id: &str) -> Result<(RfqAggregate, Bid), ProcurementError> {
        let rfq_id = self.get_bid(bid_id)?.rfq_id().to_string();
        let aggregate = self.get_rfq(&rfq_id)?;
        let bid = aggregate
            .bid(bid_id)
            .cloned()
            .ok_or_else(|| ProcurementError::NotFoundError(format!("bid {}", bid_id)))?;
        Ok((aggregate, bid))
    }

    /// Converts a store failure, logging rejected concurrent changes.
    fn committed<T>(
        &self,
        result: Result<T, ProcurementStoreError>,
        document: &str,
    ) -> Result<T, ProcurementError> {
        result.map_err(|err| {
            if let ProcurementStoreError::InvalidStateError(_) = err {
                warn!("Rejected a concurrent change of {}", document);
            }
            ProcurementError::from(err)
        })
    }

    fn check_transition(
        &self,
        subworkflow: &str,
        document: &str,
        from: &str,
        to: &str,
    ) -> Result<(), ProcurementError> {
        check_transition(&self.workflow, subworkflow, document, from, to)?;
        debug!("Moving {} from {} to {}", document, from, to);
        Ok(())
    }
}

/// Represents ProcurementServiceBuilder errors
#[derive(Debug)]
pub enum ProcurementServiceBuildError {
    /// Returned when a required field was not set
    MissingRequiredField(String),
}

impl Error for ProcurementServiceBuildError {}

impl fmt::Display for ProcurementServiceBuildError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ProcurementServiceBuildError::MissingRequiredField(ref s) => {
                write!(f, "Missing required field: {}", s)
            }
        }
    }
}

/// Builder used to assemble a `ProcurementService`.
///
/// Only the store is required. Without explicit collaborators the service uses an in-memory
/// sequence allocator, the standard tax calculator, an in-memory audit log, an empty
/// directory, and neither notifies anyone nor sends email.
#[derive(Default)]
pub struct ProcurementServiceBuilder {
    store: Option<Box<dyn ProcurementStore>>,
    config: Option<ProcurementConfig>,
    sequences: Option<Box<dyn SequenceAllocator>>,
    tax_calculator: Option<Box<dyn TaxCalculator>>,
    audit_log: Option<Box<dyn AuditLog>>,
    notifications: Option<Box<dyn NotificationScheduler>>,
    email: Option<Box<dyn EmailDispatcher>>,
    directory: Option<Box<dyn Directory>>,
}

impl ProcurementServiceBuilder {
    pub fn new() -> Self {
        ProcurementServiceBuilder::default()
    }

    pub fn with_store<S: ProcurementStore + 'static>(mut self, store: S) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    pub fn with_config(mut self, config: ProcurementConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_sequence_allocator<A: SequenceAllocator + 'static>(mut self, sequences: A) -> Self {
        self.sequences = Some(Box::new(sequences));
        self
    }

    pub fn with_tax_calculator<T: TaxCalculator + 'static>(mut self, calculator: T) -> Self {
        self.tax_calculator = Some(Box::new(calculator));
        self
    }

    pub fn with_audit_log<L: AuditLog + 'static>(mut self, audit_log: L) -> Self {
        self.audit_log = Some(Box::new(audit_log));
        self
    }

    pub fn with_notification_scheduler<N: NotificationScheduler + 'static>(
        mut self,
        notifications: N,
    ) -> Self {
        self.notifications = Some(Box::new(notifications));
        self
    }

    pub fn with_email_dispatcher<E: EmailDispatcher + 'static>(mut self, email: E) -> Self {
        self.email = Some(Box::new(email));
        self
    }

    pub fn with_directory<D: Directory + 'static>(mut self, directory: D) -> Self {
        self.directory = Some(Box::new(directory));
        self
    }

    pub fn build(self) -> Result<ProcurementService, ProcurementServiceBuildError> {
        let store = self.store.ok_or_else(|| {
            ProcurementServiceBuildError::MissingRequiredField("store".to_string())
        })?;

        let config = match self.config {
            Some(config) => config,
            None => ProcurementConfigBuilder::default().build().map_err(|_| {
                ProcurementServiceBuildError::MissingRequiredField("config".to_string())
            })?,
        };

        let sequences = self
            .sequences
            .unwrap_or_else(|| Box::new(MemorySequenceAllocator::new(&config)));

        Ok(ProcurementService {
            store,
            sequences,
            tax_calculator: self
                .tax_calculator
                .unwrap_or_else(|| Box::new(StandardTaxCalculator::new())),
            audit_log: self
                .audit_log
                .unwrap_or_else(|| Box::new(MemoryAuditLog::new())),
            notifications: self
                .notifications
                .unwrap_or_else(|| Box::new(NoopNotificationScheduler)),
            email: self
                .email
                .unwrap_or_else(|| Box::new(NoopEmailDispatcher)),
            directory: self
                .directory
                .unwrap_or_else(|| Box::new(MemoryDirectory::new())),
            workflow: procurement_workflow(),
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryProcurementStore;

    #[test]
    fn test_builder_requires_store() {
        match ProcurementServiceBuilder::new().build() {
            Err(ProcurementServiceBuildError::MissingRequiredField(field)) => {
                assert_eq!(field, "store")
            }
            Ok(_) => panic!("Expected MissingRequiredField, got a service"),
        }

        let service = ProcurementServiceBuilder::new()
            .with_store(MemoryProcurementStore::new())
            .build()
            .expect("Unable to build service");
        assert_eq!(service.config().company(), "My Company");
    }
}
