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

//! Persistence of procurement documents.
//!
//! A `ProcurementStore` keeps purchase requests, RFQ aggregates and purchase orders. Every
//! method is one unit of work: it is applied entirely or not at all. Requests and RFQs carry a
//! version; writes name the version they were read at and fail with an `InvalidStateError`
//! when another writer got there first, which serializes all changes per request and per RFQ.

#[cfg(feature = "sqlite")]
pub mod diesel;
mod error;
mod memory;

use std::str::FromStr;

use crate::bid::Bid;
use crate::error::InternalError;
use crate::purchase_order::PurchaseOrder;
use crate::purchase_request::PurchaseRequest;
use crate::rfq::{Rfq, RfqAggregate, VendorAssignment};

#[cfg(feature = "sqlite")]
pub use self::diesel::{DieselProcurementStore, SqliteConnectionCustomizer};
pub use error::ProcurementStoreError;
pub use memory::MemoryProcurementStore;

/// The changes to one RFQ aggregate that must be committed together.
///
/// `rfq` is written as a whole and must carry the version it was read at. Assignments and bids
/// are inserted or replaced by id; a purchase order, if any, is inserted.
#[derive(Clone, Debug, PartialEq)]
pub struct RfqChangeSet {
    pub(crate) rfq: Rfq,
    pub(crate) assignments: Vec<VendorAssignment>,
    pub(crate) bids: Vec<Bid>,
    pub(crate) purchase_order: Option<PurchaseOrder>,
}

impl RfqChangeSet {
    pub fn new(rfq: Rfq) -> Self {
        RfqChangeSet {
            rfq,
            assignments: Vec::new(),
            bids: Vec::new(),
            purchase_order: None,
        }
    }

    pub fn with_assignment(mut self, assignment: VendorAssignment) -> Self {
        self.assignments.push(assignment);
        self
    }

    pub fn with_bid(mut self, bid: Bid) -> Self {
        self.bids.push(bid);
        self
    }

    pub fn with_purchase_order(mut self, purchase_order: PurchaseOrder) -> Self {
        self.purchase_order = Some(purchase_order);
        self
    }

    pub fn rfq(&self) -> &Rfq {
        &self.rfq
    }

    pub fn assignments(&self) -> &[VendorAssignment] {
        &self.assignments
    }

    pub fn bids(&self) -> &[Bid] {
        &self.bids
    }

    pub fn purchase_order(&self) -> Option<&PurchaseOrder> {
        self.purchase_order.as_ref()
    }
}

pub trait ProcurementStore: Send + Sync {
    /// Adds a new purchase request with its lines.
    fn add_purchase_request(&self, request: PurchaseRequest) -> Result<(), ProcurementStoreError>;

    /// Fetches a purchase request with its lines.
    fn get_purchase_request(
        &self,
        request_id: &str,
    ) -> Result<Option<PurchaseRequest>, ProcurementStoreError>;

    /// Lists all purchase requests, oldest first.
    fn list_purchase_requests(&self) -> Result<Vec<PurchaseRequest>, ProcurementStoreError>;

    /// Replaces a purchase request and its lines.
    ///
    /// # Arguments
    ///
    ///  * `request` - The new content, carrying the version it was read at
    fn update_purchase_request(&self, request: PurchaseRequest)
        -> Result<(), ProcurementStoreError>;

    /// Removes a purchase request and its lines.
    fn remove_purchase_request(
        &self,
        request_id: &str,
        version: i64,
    ) -> Result<(), ProcurementStoreError>;

    /// Stores a new RFQ together with the request it was derived from.
    ///
    /// # Arguments
    ///
    ///  * `request` - The updated request, carrying the version it was read at
    ///  * `rfq` - The new RFQ
    fn add_rfq(&self, request: PurchaseRequest, rfq: Rfq) -> Result<(), ProcurementStoreError>;

    /// Fetches an RFQ with its assignments and bids.
    fn get_rfq(&self, rfq_id: &str) -> Result<Option<RfqAggregate>, ProcurementStoreError>;

    /// Removes an RFQ with its assignments and bids.
    fn remove_rfq(&self, rfq_id: &str, version: i64) -> Result<(), ProcurementStoreError>;

    /// Adds a vendor assignment to an RFQ.
    ///
    /// Fails with a `ConflictError` if the vendor is already assigned to the RFQ, and with an
    /// `InvalidStateError` if the RFQ changed since `rfq_version`.
    fn add_vendor_assignment(
        &self,
        rfq_version: i64,
        assignment: VendorAssignment,
    ) -> Result<(), ProcurementStoreError>;

    /// Commits changes to an RFQ aggregate.
    fn commit_rfq_changes(&self, changes: RfqChangeSet) -> Result<(), ProcurementStoreError>;

    /// Fetches a single bid.
    fn get_bid(&self, bid_id: &str) -> Result<Option<Bid>, ProcurementStoreError>;

    fn get_purchase_order(
        &self,
        purchase_order_id: &str,
    ) -> Result<Option<PurchaseOrder>, ProcurementStoreError>;

    /// Lists all purchase orders, oldest first.
    fn list_purchase_orders(&self) -> Result<Vec<PurchaseOrder>, ProcurementStoreError>;
}

impl<PS> ProcurementStore for Box<PS>
where
    PS: ProcurementStore + ?Sized,
{
    fn add_purchase_request(&self, request: PurchaseRequest) -> Result<(), ProcurementStoreError> {
        (**self).add_purchase_request(request)
    }

    fn get_purchase_request(
        &self,
        request_id: &str,
    ) -> Result<Option<PurchaseRequest>, ProcurementStoreError> {
        (**self).get_purchase_request(request_id)
    }

    fn list_purchase_requests(&self) -> Result<Vec<PurchaseRequest>, ProcurementStoreError> {
        (**self).list_purchase_requests()
    }

    fn update_purchase_request(
        &self,
        request: PurchaseRequest,
    ) -> Result<(), ProcurementStoreError> {
        (**self).update_purchase_request(request)
    }

    fn remove_purchase_request(
        &self,
        request_id: &str,
        version: i64,
    ) -> Result<(), ProcurementStoreError> {
        (**self).remove_purchase_request(request_id, version)
    }

    fn add_rfq(&self, request: PurchaseRequest, rfq: Rfq) -> Result<(), ProcurementStoreError> {
        (**self).add_rfq(request, rfq)
    }

    fn get_rfq(&self, rfq_id: &str) -> Result<Option<RfqAggregate>, ProcurementStoreError> {
        (**self).get_rfq(rfq_id)
    }

    fn remove_rfq(&self, rfq_id: &str, version: i64) -> Result<(), ProcurementStoreError> {
        (**self).remove_rfq(rfq_id, version)
    }

    fn add_vendor_assignment(
        &self,
        rfq_version: i64,
        assignment: VendorAssignment,
    ) -> Result<(), ProcurementStoreError> {
        (**self).add_vendor_assignment(rfq_version, assignment)
    }

    fn commit_rfq_changes(&self, changes: RfqChangeSet) -> Result<(), ProcurementStoreError> {
        (**self).commit_rfq_changes(changes)
    }

    fn get_bid(&self, bid_id: &str) -> Result<Option<Bid>, ProcurementStoreError> {
        (**self).get_bid(bid_id)
    }

    fn get_purchase_order(
        &self,
        purchase_order_id: &str,
    ) -> Result<Option<PurchaseOrder>, ProcurementStoreError> {
        (**self).get_purchase_order(purchase_order_id)
    }

    fn list_purchase_orders(&self) -> Result<Vec<PurchaseOrder>, ProcurementStoreError> {
        (**self).list_purchase_orders()
    }
}

/// Creates a `ProcurementStore` for the given connection
///
/// # Arguments
///
/// * `connection_uri` - The storage the store operates on. SQLite databases are migrated to
///   the current schema before the store is returned.
pub fn create_procurement_store(
    connection_uri: &ConnectionUri,
) -> Result<Box<dyn ProcurementStore>, InternalError> {
    match connection_uri {
        ConnectionUri::Memory => Ok(Box::new(MemoryProcurementStore::new())),
        #[cfg(feature = "sqlite")]
        ConnectionUri::Sqlite(conn_str) => {
            use ::diesel::r2d2::{ConnectionManager, Pool};

            let connection_manager =
                ConnectionManager::<::diesel::sqlite::SqliteConnection>::new(conn_str);
            let mut pool_builder = Pool::builder()
                .connection_customizer(Box::new(SqliteConnectionCustomizer::default()));
            // A new database is created for each connection to the in-memory SQLite
            // implementation; to ensure that every operation sees the same database, only one
            // connection is allowed.
            if conn_str == ":memory:" {
                pool_builder = pool_builder.max_size(1);
            }
            let pool = pool_builder.build(connection_manager).map_err(|err| {
                InternalError::from_source_with_prefix(
                    Box::new(err),
                    "Failed to build connection pool".to_string(),
                )
            })?;

            {
                let conn = pool.get().map_err(|err| {
                    InternalError::from_source_with_prefix(
                        Box::new(err),
                        "Failed to get a connection for migrations".to_string(),
                    )
                })?;
                crate::migrations::run_sqlite_migrations(&*conn).map_err(|err| {
                    InternalError::from_source_with_prefix(
                        Box::new(err),
                        "Failed to migrate the database".to_string(),
                    )
                })?;
            }

            Ok(Box::new(DieselProcurementStore::new(pool)))
        }
    }
}

/// The storage a `ProcurementStore` can be created for
#[derive(Clone, Debug, PartialEq)]
pub enum ConnectionUri {
    Memory,
    #[cfg(feature = "sqlite")]
    Sqlite(String),
}

impl FromStr for ConnectionUri {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "memory" => Ok(ConnectionUri::Memory),
            #[cfg(feature = "sqlite")]
            _ => Ok(ConnectionUri::Sqlite(s.into())),
            #[cfg(not(feature = "sqlite"))]
            _ => Err(InternalError::with_message(format!(
                "No compatible connection type: {}",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_uri() {
        assert_eq!(
            "memory".parse::<ConnectionUri>().expect("valid uri"),
            ConnectionUri::Memory
        );
        #[cfg(feature = "sqlite")]
        assert_eq!(
            "procurement.db".parse::<ConnectionUri>().expect("valid uri"),
            ConnectionUri::Sqlite("procurement.db".to_string())
        );
        #[cfg(not(feature = "sqlite"))]
        assert!("procurement.db".parse::<ConnectionUri>().is_err());
    }

    #[test]
    fn test_create_memory_store() {
        let store = create_procurement_store(&ConnectionUri::Memory).expect("store created");
        assert!(store
            .list_purchase_requests()
            .expect("requests listed")
            .is_empty());
    }
}
