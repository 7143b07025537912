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

use super::get_purchase_request::load_purchase_request;
use super::ProcurementStoreOperations;
use crate::purchase_request::PurchaseRequest;
use crate::store::diesel::{models::PurchaseRequestModel, schema::purchase_request};
use crate::store::ProcurementStoreError;

pub(in crate::store::diesel) trait ListPurchaseRequestsOperation {
    fn list_purchase_requests(&self) -> Result<Vec<PurchaseRequest>, ProcurementStoreError>;
}

impl<'a> ListPurchaseRequestsOperation for ProcurementStoreOperations<'a, SqliteConnection> {
    fn list_purchase_requests(&self) -> Result<Vec<PurchaseRequest>, ProcurementStoreError> {
        purchase_request::table
            .order(purchase_request::id.asc())
            .load::<PurchaseRequestModel>(self.conn)?
            .into_iter()
            .map(|model| load_purchase_request(self.conn, model))
            .collect()
    }
}
