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

use diesel::prelude::*;

use super::get_bid::load_bid;
use super::ProcurementStoreOperations;
use crate::rfq::RfqAggregate;
use crate::store::diesel::{
    models::{
        make_rfq, make_vendor_assignment, BidModel, RfqLineModel, RfqModel, VendorAssignmentModel,
    },
    schema::{bid, rfq, rfq_line, vendor_assignment},
};
use crate::store::ProcurementStoreError;

pub(in crate::store::diesel) trait GetRfqOperation {
    fn get_rfq(&self, rfq_id: &str) -> Result<Option<RfqAggregate>, ProcurementStoreError>;
}

impl<'a> GetRfqOperation for ProcurementStoreOperations<'a, SqliteConnection> {
    fn get_rfq(&self, rfq_id: &str) -> Result<Option<RfqAggregate>, ProcurementStoreError> {
        // One read transaction so the aggregate is never torn by a concurrent commit.
        self.conn.transaction::<_, ProcurementStoreError, _>(|| {
            let model = match rfq::table
                .filter(rfq::rfq_id.eq(rfq_id))
                .first::<RfqModel>(self.conn)
                .optional()?
            {
                Some(model) => model,
                None => return Ok(None),
            };

            let lines = rfq_line::table
                .filter(rfq_line::rfq_id.eq(rfq_id))
                .order((rfq_line::sequence.asc(), rfq_line::id.asc()))
                .load::<RfqLineModel>(self.conn)?;

            let assignments = vendor_assignment::table
                .filter(vendor_assignment::rfq_id.eq(rfq_id))
                .order(vendor_assignment::id.asc())
                .load::<VendorAssignmentModel>(self.conn)?
                .into_iter()
                .map(make_vendor_assignment)
                .collect::<Result<Vec<_>, _>>()?;

            let bids = bid::table
                .filter(bid::rfq_id.eq(rfq_id))
                .order(bid::id.asc())
                .load::<BidModel>(self.conn)?
                .into_iter()
                .map(|model| load_bid(self.conn, model))
                .collect::<Result<Vec<_>, _>>()?;

            Ok(Some(RfqAggregate {
                rfq: make_rfq(model, lines)?,
                assignments,
                bids,
            }))
        })
    }
}
