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

pub(super) mod add_purchase_request;
pub(super) mod add_rfq;
pub(super) mod add_vendor_assignment;
pub(super) mod commit_rfq_changes;
pub(super) mod get_bid;
pub(super) mod get_purchase_order;
pub(super) mod get_purchase_request;
pub(super) mod get_rfq;
pub(super) mod list_purchase_orders;
pub(super) mod list_purchase_requests;
pub(super) mod remove_purchase_request;
pub(super) mod remove_rfq;
pub(super) mod update_purchase_request;

use diesel::prelude::*;

use super::schema::{purchase_request, rfq};
use crate::store::ProcurementStoreError;

pub(super) struct ProcurementStoreOperations<'a, C> {
    conn: &'a C,
}

impl<'a, C> ProcurementStoreOperations<'a, C>
where
    C: diesel::Connection,
{
    pub fn new(conn: &'a C) -> Self {
        ProcurementStoreOperations { conn }
    }
}

/// Explains why a versioned write of a purchase request touched no row.
fn request_not_written(
    conn: &SqliteConnection,
    request_id: &str,
) -> Result<ProcurementStoreError, ProcurementStoreError> {
    let reference = purchase_request::table
        .filter(purchase_request::request_id.eq(request_id))
        .select(purchase_request::reference)
        .first::<String>(conn)
        .optional()?;

    Ok(match reference {
        Some(reference) => {
            ProcurementStoreError::stale(&format!("purchase request {}", reference))
        }
        None => ProcurementStoreError::NotFoundError(format!("purchase request {}", request_id)),
    })
}

/// Explains why a versioned write of an RFQ touched no row.
fn rfq_not_written(
    conn: &SqliteConnection,
    rfq_id: &str,
) -> Result<ProcurementStoreError, ProcurementStoreError> {
    let reference = rfq::table
        .filter(rfq::rfq_id.eq(rfq_id))
        .select(rfq::reference)
        .first::<String>(conn)
        .optional()?;

    Ok(match reference {
        Some(reference) => ProcurementStoreError::stale(&format!("RFQ {}", reference)),
        None => ProcurementStoreError::NotFoundError(format!("RFQ {}", rfq_id)),
    })
}
