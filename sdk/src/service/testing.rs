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

//! Fixtures shared by the service tests.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{ProcurementService, ProcurementServiceBuilder};
use crate::bid::{Bid, BidLineUpdate};
use crate::collaborators::{
    AuditLog, EmailDispatcher, Employee, MemoryAuditLog, MemoryDirectory, MemoryEmailDispatcher,
    MemoryNotificationScheduler, NotificationScheduler,
};
use crate::error::InternalError;
use crate::product::Product;
use crate::purchase_request::{PurchaseRequest, PurchaseRequestDraft, RequestLineDraft};
use crate::rfq::{Rfq, Vendor, VendorAssignment};
use crate::sequence::{DocumentKind, SequenceAllocator};
use crate::store::MemoryProcurementStore;

pub struct Harness {
    pub service: ProcurementService,
    pub audit: MemoryAuditLog,
    pub notifications: MemoryNotificationScheduler,
    pub email: MemoryEmailDispatcher,
    pub directory: MemoryDirectory,
}

impl Harness {
    pub fn new() -> Self {
        Harness::configured(|builder| builder)
    }

    /// Builds a harness with recording collaborators, then lets `configure` replace any of
    /// them.
    pub fn configured<F>(configure: F) -> Self
    where
        F: FnOnce(ProcurementServiceBuilder) -> ProcurementServiceBuilder,
    {
        let audit = MemoryAuditLog::new();
        let notifications = MemoryNotificationScheduler::new();
        let email = MemoryEmailDispatcher::new();
        let directory = MemoryDirectory::new();

        let builder = ProcurementServiceBuilder::new()
            .with_store(MemoryProcurementStore::new())
            .with_audit_log(audit.clone())
            .with_notification_scheduler(notifications.clone())
            .with_email_dispatcher(email.clone())
            .with_directory(directory.clone());
        let service = configure(builder)
            .build()
            .expect("Unable to build service");

        Harness {
            service,
            audit,
            notifications,
            email,
            directory,
        }
    }

    pub fn requester() -> Employee {
        Employee::new("emp-1", "Marc Demo")
            .with_department("Research")
            .with_user_id("user-marc")
    }

    /// A draft with two desks at 100 and four chairs at 50.
    pub fn draft() -> PurchaseRequestDraft {
        PurchaseRequestDraft::new(Harness::requester())
            .with_description("Office refit")
            .with_line(RequestLineDraft::new(
                Product::new("desk", "Desk"),
                dec!(2),
                dec!(100),
            ))
            .with_line(RequestLineDraft::new(
                Product::new("chair", "Chair").with_purchase_uom("Box"),
                dec!(4),
                dec!(50),
            ))
    }

    pub fn draft_request(&self) -> PurchaseRequest {
        self.service
            .create_purchase_request(Harness::draft())
            .expect("Unable to create request")
            .into_value()
    }

    pub fn approved_request(&self) -> PurchaseRequest {
        let request = self.draft_request();
        self.service
            .submit_request(request.id())
            .expect("Unable to submit request");
        self.service
            .approve_request(request.id(), "Mitchell Admin")
            .expect("Unable to approve request")
            .into_value()
    }

    pub fn rfq(&self) -> Rfq {
        let request = self.approved_request();
        self.service
            .create_rfq(request.id(), "Mitchell Admin")
            .expect("Unable to create RFQ")
            .into_value()
    }

    pub fn assign(&self, rfq: &Rfq, vendor_id: &str, email: Option<&str>) -> VendorAssignment {
        let mut vendor = Vendor::new(vendor_id, &format!("Vendor {}", vendor_id));
        if let Some(email) = email {
            vendor = vendor.with_email(email);
        }
        self.service
            .assign_vendor(rfq.id(), vendor, None)
            .expect("Unable to assign vendor")
    }

    /// Creates a bid for `assignment`, prices its lines in order, and submits it.
    pub fn submitted_bid(&self, assignment: &VendorAssignment, prices: &[Decimal]) -> Bid {
        let bid = self.priced_bid(assignment, prices);
        self.service
            .submit_bid(bid.id())
            .expect("Unable to submit bid")
    }

    pub fn priced_bid(&self, assignment: &VendorAssignment, prices: &[Decimal]) -> Bid {
        let mut bid = self
            .service
            .create_bid(assignment.rfq_id(), assignment.id())
            .expect("Unable to create bid")
            .into_value();
        let line_ids: Vec<String> = bid.lines().iter().map(|l| l.id().to_string()).collect();
        for (line_id, price) in line_ids.iter().zip(prices) {
            bid = self
                .service
                .update_bid_line(
                    bid.id(),
                    line_id,
                    BidLineUpdate::new().with_price_unit(*price),
                )
                .expect("Unable to price bid line");
        }
        bid
    }
}

/// A collaborator that is always unavailable.
#[derive(Clone, Copy)]
pub struct Unavailable;

fn unavailable() -> InternalError {
    InternalError::with_message("service unavailable".to_string())
}

impl AuditLog for Unavailable {
    fn post(&self, _document_id: &str, _message: &str) -> Result<(), InternalError> {
        Err(unavailable())
    }
}

impl NotificationScheduler for Unavailable {
    fn schedule(
        &self,
        _assignee_id: &str,
        _summary: &str,
        _note: &str,
    ) -> Result<(), InternalError> {
        Err(unavailable())
    }
}

impl EmailDispatcher for Unavailable {
    fn send(
        &self,
        _contact: &str,
        _template_ref: &str,
        _document_ref: &str,
    ) -> Result<(), InternalError> {
        Err(unavailable())
    }
}

impl SequenceAllocator for Unavailable {
    fn next(&self, _kind: DocumentKind) -> Result<String, InternalError> {
        Err(unavailable())
    }
}
