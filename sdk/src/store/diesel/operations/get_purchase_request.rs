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
use crate::purchase_request::PurchaseRequest;
use crate::store::diesel::{
    models::{make_purchase_request, PurchaseRequestLineModel, PurchaseRequestModel},
    schema::{purchase_request, purchase_request_line},
};
use crate::store::ProcurementStoreError;

pub(in crate::store::diesel) trait GetPurchaseRequestOperation {
    fn get_purchase_request(
        &self,
        request_id: &str,
    ) -> Result<Option<PurchaseRequest>, ProcurementStoreError>;
}

impl<'a> GetPurchaseRequestOperation for ProcurementStoreOperations<'a, SqliteConnection> {
    fn get_purchase_request(
        &self,
        request_id: &str,
    ) -> Result<Option<PurchaseRequest>, ProcurementStoreError> {
        let model = purchase_request::table
            .filter(purchase_request::request_id.eq(request_id))
            .first::<PurchaseRequestModel>(self.conn)
            .optional()?;

        match model {
            Some(model) => load_purchase_request(self.conn, model).map(Some),
            None => Ok(None),
        }
    }
}

pub(super) fn load_purchase_request(
    conn: &SqliteConnection,
    model: PurchaseRequestModel,
) -> Result<PurchaseRequest, ProcurementStoreError> {
    let lines = purchase_request_line::table
        .filter(purchase_request_line::request_id.eq(&model.request_id))
        .order((purchase_request_line::sequence.asc(), purchase_request_line::id.asc()))
        .load::<PurchaseRequestLineModel>(conn)?;

    make_purchase_request(model, lines)
}
