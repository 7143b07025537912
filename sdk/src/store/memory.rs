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
use std::sync::{Arc, Mutex, MutexGuard};

use super::{ProcurementStore, ProcurementStoreError, RfqChangeSet};
use crate::bid::Bid;
use crate::error::{ConflictError, ConflictType, InternalError};
use crate::purchase_order::PurchaseOrder;
use crate::purchase_request::PurchaseRequest;
use crate::rfq::{Rfq, RfqAggregate, VendorAssignment};

#[derive(Default)]
struct Records {
    requests: Vec<PurchaseRequest>,
    rfqs: HashMap<String, RfqAggregate>,
    purchase_orders: Vec<PurchaseOrder>,
}

/// Implementation of ProcurementStore that keeps every document in memory. Useful for when
/// persistence isn't necessary.
///
/// All records sit behind a single lock, so each call is serialized against every other.
#[derive(Clone, Default)]
pub struct MemoryProcurementStore {
    inner: Arc<Mutex<Records>>,
}

impl MemoryProcurementStore {
    pub fn new() -> Self {
        MemoryProcurementStore::default()
    }

    fn records(&self) -> Result<MutexGuard<Records>, ProcurementStoreError> {
        self.inner.lock().map_err(|_| {
            ProcurementStoreError::InternalError(InternalError::with_message(
                "Cannot access procurement records: mutex lock poisoned".to_string(),
            ))
        })
    }
}

fn bump_rfq(stored: &mut Rfq, update: Rfq) -> Result<(), ProcurementStoreError> {
    if stored.version != update.version {
        return Err(ProcurementStoreError::stale(&stored.label()));
    }
    let version = stored.version + 1;
    *stored = update;
    stored.version = version;
    Ok(())
}

fn upsert_by_id<T, F>(items: &mut Vec<T>, item: T, id: F)
where
    F: Fn(&T) -> &str,
{
    let key = id(&item).to_string();
    match items.iter_mut().find(|existing| id(existing) == key) {
        Some(existing) => *existing = item,
        None => items.push(item),
    }
}

impl ProcurementStore for MemoryProcurementStore {
    fn add_purchase_request(&self, request: PurchaseRequest) -> Result<(), ProcurementStoreError> {
        let mut records = self.records()?;
        if records.requests.iter().any(|r| r.id == request.id) {
            return Err(ProcurementStoreError::ConflictError(ConflictError::new(
                ConflictType::Unique,
                format!("Purchase request {} already exists", request.id),
            )));
        }
        records.requests.push(request);
        Ok(())
    }

    fn get_purchase_request(
        &self,
        request_id: &str,
    ) -> Result<Option<PurchaseRequest>, ProcurementStoreError> {
        Ok(self
            .records()?
            .requests
            .iter()
            .find(|r| r.id == request_id)
            .cloned())
    }

    fn list_purchase_requests(&self) -> Result<Vec<PurchaseRequest>, ProcurementStoreError> {
        Ok(self.records()?.requests.clone())
    }

    fn update_purchase_request(
        &self,
        request: PurchaseRequest,
    ) -> Result<(), ProcurementStoreError> {
        let mut records = self.records()?;
        let stored = records
            .requests
            .iter_mut()
            .find(|r| r.id == request.id)
            .ok_or_else(|| {
                ProcurementStoreError::NotFoundError(format!("purchase request {}", request.id))
            })?;

        if stored.version != request.version {
            return Err(ProcurementStoreError::stale(&stored.label()));
        }
        let version = stored.version + 1;
        *stored = request;
        stored.version = version;
        Ok(())
    }

    fn remove_purchase_request(
        &self,
        request_id: &str,
        version: i64,
    ) -> Result<(), ProcurementStoreError> {
        let mut records = self.records()?;
        let position = records
            .requests
            .iter()
            .position(|r| r.id == request_id)
            .ok_or_else(|| {
                ProcurementStoreError::NotFoundError(format!("purchase request {}", request_id))
            })?;

        if records.requests[position].version != version {
            return Err(ProcurementStoreError::stale(
                &records.requests[position].label(),
            ));
        }
        records.requests.remove(position);
        Ok(())
    }

    fn add_rfq(&self, request: PurchaseRequest, rfq: Rfq) -> Result<(), ProcurementStoreError> {
        let mut records = self.records()?;
        if records.rfqs.contains_key(&rfq.id) {
            return Err(ProcurementStoreError::ConflictError(ConflictError::new(
                ConflictType::Unique,
                format!("RFQ {} already exists", rfq.id),
            )));
        }

        let stored = records
            .requests
            .iter_mut()
            .find(|r| r.id == request.id)
            .ok_or_else(|| {
                ProcurementStoreError::NotFoundError(format!("purchase request {}", request.id))
            })?;
        if stored.version != request.version {
            return Err(ProcurementStoreError::stale(&stored.label()));
        }
        let version = stored.version + 1;
        *stored = request;
        stored.version = version;

        records.rfqs.insert(
            rfq.id.clone(),
            RfqAggregate {
                rfq,
                assignments: Vec::new(),
                bids: Vec::new(),
            },
        );
        Ok(())
    }

    fn get_rfq(&self, rfq_id: &str) -> Result<Option<RfqAggregate>, ProcurementStoreError> {
        Ok(self.records()?.rfqs.get(rfq_id).cloned())
    }

    fn remove_rfq(&self, rfq_id: &str, version: i64) -> Result<(), ProcurementStoreError> {
        let mut records = self.records()?;
        let aggregate = records
            .rfqs
            .get(rfq_id)
            .ok_or_else(|| ProcurementStoreError::NotFoundError(format!("RFQ {}", rfq_id)))?;

        if aggregate.rfq.version != version {
            return Err(ProcurementStoreError::stale(&aggregate.rfq.label()));
        }
        records.rfqs.remove(rfq_id);
        Ok(())
    }

    fn add_vendor_assignment(
        &self,
        rfq_version: i64,
        assignment: VendorAssignment,
    ) -> Result<(), ProcurementStoreError> {
        let mut records = self.records()?;
        let aggregate = records.rfqs.get_mut(&assignment.rfq_id).ok_or_else(|| {
            ProcurementStoreError::NotFoundError(format!("RFQ {}", assignment.rfq_id))
        })?;

        if aggregate
            .assignments
            .iter()
            .any(|a| a.vendor.id() == assignment.vendor.id())
        {
            return Err(ProcurementStoreError::ConflictError(ConflictError::new(
                ConflictType::Unique,
                format!(
                    "Vendor {} is already assigned to {}",
                    assignment.vendor.name(),
                    aggregate.rfq.label()
                ),
            )));
        }
        if aggregate.rfq.version != rfq_version {
            return Err(ProcurementStoreError::stale(&aggregate.rfq.label()));
        }

        aggregate.rfq.version += 1;
        aggregate.assignments.push(assignment);
        Ok(())
    }

    fn commit_rfq_changes(&self, changes: RfqChangeSet) -> Result<(), ProcurementStoreError> {
        let mut records = self.records()?;
        let RfqChangeSet {
            rfq,
            assignments,
            bids,
            purchase_order,
        } = changes;

        if let Some(po) = &purchase_order {
            if records.purchase_orders.iter().any(|p| p.id == po.id) {
                return Err(ProcurementStoreError::ConflictError(ConflictError::new(
                    ConflictType::Unique,
                    format!("Purchase order {} already exists", po.id),
                )));
            }
        }

        let aggregate = records
            .rfqs
            .get_mut(&rfq.id)
            .ok_or_else(|| ProcurementStoreError::NotFoundError(format!("RFQ {}", rfq.id)))?;
        bump_rfq(&mut aggregate.rfq, rfq)?;

        for assignment in assignments {
            upsert_by_id(&mut aggregate.assignments, assignment, |a| a.id.as_str());
        }
        for bid in bids {
            upsert_by_id(&mut aggregate.bids, bid, |b| b.id.as_str());
        }
        if let Some(po) = purchase_order {
            records.purchase_orders.push(po);
        }
        Ok(())
    }

    fn get_bid(&self, bid_id: &str) -> Result<Option<Bid>, ProcurementStoreError> {
        Ok(self
            .records()?
            .rfqs
            .values()
            .flat_map(|aggregate| aggregate.bids.iter())
            .find(|bid| bid.id == bid_id)
            .cloned())
    }

    fn get_purchase_order(
        &self,
        purchase_order_id: &str,
    ) -> Result<Option<PurchaseOrder>, ProcurementStoreError> {
        Ok(self
            .records()?
            .purchase_orders
            .iter()
            .find(|po| po.id == purchase_order_id)
            .cloned())
    }

    fn list_purchase_orders(&self) -> Result<Vec<PurchaseOrder>, ProcurementStoreError> {
        Ok(self.records()?.purchase_orders.clone())
    }
}
