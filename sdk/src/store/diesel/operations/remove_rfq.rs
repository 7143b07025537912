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

use diesel::{dsl::delete, prelude::*};

use super::{rfq_not_written, ProcurementStoreOperations};
use crate::store::diesel::schema::{bid, bid_line, rfq, rfq_line, vendor_assignment};
use crate::store::ProcurementStoreError;

pub(in crate::store::diesel) trait RemoveRfqOperation {
    fn remove_rfq(&self, rfq_id: &str, version: i64) -> Result<(), ProcurementStoreError>;
}

impl<'a> RemoveRfqOperation for ProcurementStoreOperations<'a, SqliteConnection> {
    fn remove_rfq(&self, rfq_id: &str, version: i64) -> Result<(), ProcurementStoreError> {
        self.conn.immediate_transaction::<_, ProcurementStoreError, _>(|| {
            let removed = delete(
                rfq::table
                    .filter(rfq::rfq_id.eq(rfq_id))
                    .filter(rfq::version.eq(version)),
            )
            .execute(self.conn)?;
            if removed == 0 {
                return Err(rfq_not_written(self.conn, rfq_id)?);
            }

            let bid_ids = bid::table
                .filter(bid::rfq_id.eq(rfq_id))
                .select(bid::bid_id)
                .load::<String>(self.conn)?;
            delete(bid_line::table.filter(bid_line::bid_id.eq_any(bid_ids))).execute(self.conn)?;
            delete(bid::table.filter(bid::rfq_id.eq(rfq_id))).execute(self.conn)?;
            delete(vendor_assignment::table.filter(vendor_assignment::rfq_id.eq(rfq_id)))
                .execute(self.conn)?;
            delete(rfq_line::table.filter(rfq_line::rfq_id.eq(rfq_id))).execute(self.conn)?;

            Ok(())
        })
    }
}
