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

use super::ProcurementStoreOperations;
use crate::bid::Bid;
use crate::store::diesel::{
    models::{make_bid, BidLineModel, BidModel},
    schema::{bid, bid_line},
};
use crate::store::ProcurementStoreError;

pub(in crate::store::diesel) trait GetBidOperation {
    fn get_bid(&self, bid_id: &str) -> Result<Option<Bid>, ProcurementStoreError>;
}

impl<'a> GetBidOperation for ProcurementStoreOperations<'a, SqliteConnection> {
    fn get_bid(&self, bid_id: &str) -> Result<Option<Bid>, ProcurementStoreError> {
        let model = bid::table
            .filter(bid::bid_id.eq(bid_id))
            .first::<BidModel>(self.conn)
            .optional()?;

        match model {
            Some(model) => load_bid(self.conn, model).map(Some),
            None => Ok(None),
        }
    }
}

pub(super) fn load_bid(
    conn: &SqliteConnection,
    model: BidModel,
) -> Result<Bid, ProcurementStoreError> {
    let lines = bid_line::table
        .filter(bid_line::bid_id.eq(&model.bid_id))
        .order((bid_line::sequence.asc(), bid_line::id.asc()))
        .load::<BidLineModel>(conn)?;

    make_bid(model, lines)
}
