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

//! SQLite implementation of the procurement store.

pub(in crate::store) mod models;
mod operations;
pub(crate) mod schema;

use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sqlite::SqliteConnection;

use super::{ProcurementStore, ProcurementStoreError, RfqChangeSet};
use crate::bid::Bid;
use crate::error::ResourceTemporarilyUnavailableError;
use crate::purchase_order::PurchaseOrder;
use crate::purchase_request::PurchaseRequest;
use crate::rfq::{Rfq, RfqAggregate, VendorAssignment};

use operations::add_purchase_request::AddPurchaseRequestOperation as _;
use operations::add_rfq::AddRfqOperation as _;
use operations::add_vendor_assignment::AddVendorAssignmentOperation as _;
use operations::commit_rfq_changes::CommitRfqChangesOperation as _;
use operations::get_bid::GetBidOperation as _;
use operations::get_purchase_order::GetPurchaseOrderOperation as _;
use operations::get_purchase_request::GetPurchaseRequestOperation as _;
use operations::get_rfq::GetRfqOperation as _;
use operations::list_purchase_orders::ListPurchaseOrdersOperation as _;
use operations::list_purchase_requests::ListPurchaseRequestsOperation as _;
use operations::remove_purchase_request::RemovePurchaseRequestOperation as _;
use operations::remove_rfq::RemoveRfqOperation as _;
use operations::update_purchase_request::UpdatePurchaseRequestOperation as _;
use operations::ProcurementStoreOperations;

/// How long a connection waits for another connection's write lock before giving up.
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Prepares every pooled SQLite connection for concurrent writers.
///
/// Writes run in immediate transactions; with a busy timeout a second writer waits for the
/// first to finish instead of failing with "database is locked", and then sees its changes.
#[derive(Debug, Clone, Copy)]
pub struct SqliteConnectionCustomizer {
    busy_timeout: Duration,
}

impl SqliteConnectionCustomizer {
    pub fn new(busy_timeout: Duration) -> Self {
        SqliteConnectionCustomizer { busy_timeout }
    }
}

impl Default for SqliteConnectionCustomizer {
    fn default() -> Self {
        SqliteConnectionCustomizer::new(DEFAULT_BUSY_TIMEOUT)
    }
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqliteConnectionCustomizer {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {};",
            self.busy_timeout.as_millis()
        ))
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Manages procurement documents in a database
#[derive(Clone)]
pub struct DieselProcurementStore<C: diesel::Connection + 'static> {
    connection_pool: Pool<ConnectionManager<C>>,
}

impl<C: diesel::Connection> DieselProcurementStore<C> {
    /// Creates a new DieselProcurementStore
    ///
    /// # Arguments
    ///
    ///  * `connection_pool`: connection pool to the database
    pub fn new(connection_pool: Pool<ConnectionManager<C>>) -> Self {
        DieselProcurementStore { connection_pool }
    }

    fn connection(
        &self,
    ) -> Result<diesel::r2d2::PooledConnection<ConnectionManager<C>>, ProcurementStoreError> {
        self.connection_pool.get().map_err(|err| {
            ProcurementStoreError::ResourceTemporarilyUnavailableError(
                ResourceTemporarilyUnavailableError::from_source(Box::new(err)),
            )
        })
    }
}

impl ProcurementStore for DieselProcurementStore<SqliteConnection> {
    fn add_purchase_request(&self, request: PurchaseRequest) -> Result<(), ProcurementStoreError> {
        ProcurementStoreOperations::new(&*self.connection()?).add_purchase_request(request)
    }

    fn get_purchase_request(
        &self,
        request_id: &str,
    ) -> Result<Option<PurchaseRequest>, ProcurementStoreError> {
        ProcurementStoreOperations::new(&*self.connection()?).get_purchase_request(request_id)
    }

    fn list_purchase_requests(&self) -> Result<Vec<PurchaseRequest>, ProcurementStoreError> {
        ProcurementStoreOperations::new(&*self.connection()?).list_purchase_requests()
    }

    fn update_purchase_request(
        &self,
        request: PurchaseRequest,
    ) -> Result<(), ProcurementStoreError> {
        ProcurementStoreOperations::new(&*self.connection()?).update_purchase_request(request)
    }

    fn remove_purchase_request(
        &self,
        request_id: &str,
        version: i64,
    ) -> Result<(), ProcurementStoreError> {
        ProcurementStoreOperations::new(&*self.connection()?)
            .remove_purchase_request(request_id, version)
    }

    fn add_rfq(&self, request: PurchaseRequest, rfq: Rfq) -> Result<(), ProcurementStoreError> {
        ProcurementStoreOperations::new(&*self.connection()?).add_rfq(request, rfq)
    }

    fn get_rfq(&self, rfq_id: &str) -> Result<Option<RfqAggregate>, ProcurementStoreError> {
        ProcurementStoreOperations::new(&*self.connection()?).get_rfq(rfq_id)
    }

    fn remove_rfq(&self, rfq_id: &str, version: i64) -> Result<(), ProcurementStoreError> {
        ProcurementStoreOperations::new(&*self.connection()?).remove_rfq(rfq_id, version)
    }

    fn add_vendor_assignment(
        &self,
        rfq_version: i64,
        assignment: VendorAssignment,
    ) -> Result<(), ProcurementStoreError> {
        ProcurementStoreOperations::new(&*self.connection()?)
            .add_vendor_assignment(rfq_version, assignment)
    }

    fn commit_rfq_changes(&self, changes: RfqChangeSet) -> Result<(), ProcurementStoreError> {
        ProcurementStoreOperations::new(&*self.connection()?).commit_rfq_changes(changes)
    }

    fn get_bid(&self, bid_id: &str) -> Result<Option<Bid>, ProcurementStoreError> {
        ProcurementStoreOperations::new(&*self.connection()?).get_bid(bid_id)
    }

    fn get_purchase_order(
        &self,
        purchase_order_id: &str,
    ) -> Result<Option<PurchaseOrder>, ProcurementStoreError> {
        ProcurementStoreOperations::new(&*self.connection()?).get_purchase_order(purchase_order_id)
    }

    fn list_purchase_orders(&self) -> Result<Vec<PurchaseOrder>, ProcurementStoreError> {
        ProcurementStoreOperations::new(&*self.connection()?).list_purchase_orders()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{Arc, Barrier};
    use std::thread;

    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use crate::award::AwardOptions;
    use crate::bid::BidState;
    use crate::rfq::{AssignmentStatus, Vendor};
    use crate::service::testing::Harness;
    use crate::service::ProcurementError;
    use crate::store::{create_procurement_store, ConnectionUri};

    fn sqlite_harness() -> Harness {
        Harness::configured(|builder| {
            builder.with_store(
                create_procurement_store(&ConnectionUri::Sqlite(":memory:".to_string()))
                    .expect("Unable to create sqlite store"),
            )
        })
    }

    /// Verifies that requests keep their lines and version across writes.
    #[test]
    fn test_purchase_request_round_trip() {
        let harness = sqlite_harness();
        let request = harness.draft_request();

        let fetched = harness
            .service
            .get_purchase_request(request.id())
            .expect("Unable to fetch request");
        assert_eq!(fetched, request);
        assert_eq!(fetched.lines().len(), 2);
        assert_eq!(fetched.lines()[1].uom(), "Box");

        let submitted = harness
            .service
            .submit_request(request.id())
            .expect("Unable to submit request")
            .into_value();
        assert_eq!(
            harness
                .service
                .get_purchase_request(request.id())
                .expect("Unable to fetch request"),
            submitted
        );
        assert_eq!(
            harness
                .service
                .list_purchase_requests()
                .expect("Unable to list requests"),
            vec![submitted]
        );
    }

    /// Verifies that a write made against an old version is refused.
    #[test]
    fn test_stale_request_update() {
        let store = create_procurement_store(&ConnectionUri::Sqlite(":memory:".to_string()))
            .expect("Unable to create sqlite store");
        let harness = Harness::new();
        let request = harness.draft_request();

        store
            .add_purchase_request(request.clone())
            .expect("Unable to add request");
        store
            .update_purchase_request(request.clone())
            .expect("Unable to update request");

        match store.update_purchase_request(request.clone()) {
            Err(ProcurementStoreError::InvalidStateError(err)) => assert!(err
                .to_string()
                .contains("was modified concurrently")),
            res => panic!("Expected InvalidStateError, got {:?}", res),
        }
        match store.remove_purchase_request("missing", 0) {
            Err(ProcurementStoreError::NotFoundError(_)) => (),
            res => panic!("Expected NotFoundError, got {:?}", res),
        }

        store
            .remove_purchase_request(request.id(), request.version() + 1)
            .expect("Unable to remove request");
        assert_eq!(
            store
                .get_purchase_request(request.id())
                .expect("Unable to fetch request"),
            None
        );
    }

    /// Verifies the whole flow from request to purchase order is persisted.
    #[test]
    fn test_award_round_trip() {
        let harness = sqlite_harness();
        let rfq = harness.rfq();
        let winner_assignment = harness.assign(&rfq, "v-1", Some("sales@woodcorner.example"));
        let loser_assignment = harness.assign(&rfq, "v-2", None);
        let winner = harness.submitted_bid(&winner_assignment, &[dec!(90), dec!(45)]);
        let loser = harness.submitted_bid(&loser_assignment, &[dec!(95), dec!(50)]);

        let order = harness
            .service
            .award_bid(winner.id(), AwardOptions::new())
            .expect("Unable to award bid")
            .into_value();

        let aggregate = harness.service.get_rfq(rfq.id()).expect("Unable to fetch RFQ");
        assert!(aggregate.rfq().is_awarded());
        assert_eq!(aggregate.rfq().lines().len(), 2);
        assert_eq!(aggregate.assignments().len(), 2);
        assert_eq!(aggregate.bid(winner.id()).map(|b| b.state()), Some(BidState::Awarded));
        assert_eq!(aggregate.bid(loser.id()).map(|b| b.state()), Some(BidState::Rejected));
        assert_eq!(
            aggregate.assignment(loser_assignment.id()).map(|a| a.status()),
            Some(AssignmentStatus::Rejected)
        );
        assert_eq!(
            aggregate.bid(winner.id()).map(|b| b.amount_total()),
            Some(dec!(360))
        );

        assert_eq!(
            harness
                .service
                .get_purchase_order(order.id())
                .expect("Unable to fetch order"),
            order
        );
        assert_eq!(
            harness
                .service
                .list_purchase_orders()
                .expect("Unable to list orders"),
            vec![order]
        );

        match harness.service.award_bid(loser.id(), AwardOptions::new()) {
            Err(ProcurementError::InvalidStateError(_)) => (),
            res => panic!("Expected InvalidStateError, got {:?}", res.map(|o| o.into_value())),
        }
    }

    /// Verifies that a vendor can only be assigned once to an RFQ.
    #[test]
    fn test_duplicate_vendor_assignment() {
        let harness = sqlite_harness();
        let rfq = harness.rfq();
        harness.assign(&rfq, "v-1", None);

        let vendor = Vendor::new("v-1", "Vendor v-1");
        match harness.service.assign_vendor(rfq.id(), vendor, None) {
            Err(ProcurementError::ConflictError(_)) => (),
            res => panic!("Expected ConflictError, got {:?}", res),
        }
    }

    /// Verifies that deleting an RFQ removes its assignments and bids.
    #[test]
    fn test_delete_rfq() {
        let harness = sqlite_harness();
        let rfq = harness.rfq();
        let assignment = harness.assign(&rfq, "v-1", None);
        let bid = harness.priced_bid(&assignment, &[dec!(90), dec!(45)]);

        harness
            .service
            .delete_rfq(rfq.id())
            .expect("Unable to delete RFQ");

        match harness.service.get_rfq(rfq.id()) {
            Err(ProcurementError::NotFoundError(_)) => (),
            res => panic!("Expected NotFoundError, got {:?}", res.map(|a| a.into_rfq())),
        }
        match harness.service.get_bid(bid.id()) {
            Err(ProcurementError::NotFoundError(_)) => (),
            res => panic!("Expected NotFoundError, got {:?}", res),
        }
    }

    /// Verifies that concurrent awards against a database file leave exactly one winner and
    /// that every other writer waits for the lock and then fails on the stale RFQ version.
    #[test]
    fn test_concurrent_awards_on_file_database() {
        let dir = tempfile::TempDir::new().expect("Unable to create temp dir");
        let path = dir.path().join("procurement.db");
        let harness = Harness::configured(|builder| {
            builder.with_store(
                create_procurement_store(&ConnectionUri::Sqlite(
                    path.to_string_lossy().into_owned(),
                ))
                .expect("Unable to create sqlite store"),
            )
        });
        let rfq = harness.rfq();
        let bids: Vec<String> = (1..=4)
            .map(|n| {
                let assignment = harness.assign(&rfq, &format!("v-{}", n), None);
                harness
                    .submitted_bid(&assignment, &[dec!(90), dec!(45)])
                    .id()
                    .to_string()
            })
            .collect();

        let service = Arc::new(harness.service);
        let barrier = Arc::new(Barrier::new(bids.len()));
        let handles: Vec<_> = bids
            .iter()
            .cloned()
            .map(|bid_id| {
                let service = Arc::clone(&service);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    match service.award_bid(&bid_id, AwardOptions::new()) {
                        Ok(_) => Some(true),
                        Err(ProcurementError::InvalidStateError(_)) => Some(false),
                        Err(_) => None,
                    }
                })
            })
            .collect();

        let results: Vec<Option<bool>> = handles
            .into_iter()
            .map(|handle| handle.join().expect("thread panicked"))
            .collect();
        assert_eq!(results.iter().filter(|r| **r == Some(true)).count(), 1);
        assert_eq!(results.iter().filter(|r| **r == Some(false)).count(), 3);

        let aggregate = service.get_rfq(rfq.id()).expect("Unable to fetch RFQ");
        assert!(aggregate.rfq().is_awarded());
        assert_eq!(
            aggregate
                .bids()
                .iter()
                .filter(|bid| bid.state() == BidState::Awarded)
                .count(),
            1
        );
        assert_eq!(
            service
                .list_purchase_orders()
                .expect("Unable to list orders")
                .len(),
            1
        );
    }
}
