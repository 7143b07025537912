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

use diesel::{dsl::insert_into, prelude::*};

use super::ProcurementStoreOperations;
use crate::purchase_request::PurchaseRequest;
use crate::store::diesel::{
    models::{make_request_line_models, NewPurchaseRequestModel},
    schema::{purchase_request, purchase_request_line},
};
use crate::store::ProcurementStoreError;

pub(in crate::store::diesel) trait AddPurchaseRequestOperation {
    fn add_purchase_request(&self, request: PurchaseRequest) -> Result<(), ProcurementStoreError>;
}

impl<'a> AddPurchaseRequestOperation for ProcurementStoreOperations<'a, SqliteConnection> {
    fn add_purchase_request(&self, request: PurchaseRequest) -> Result<(), ProcurementStoreError> {
        self.conn.immediate_transaction::<_, ProcurementStoreError, _>(|| {
            insert_into(purchase_request::table)
                .values(NewPurchaseRequestModel::from(&request))
                .execute(self.conn)?;

            insert_into(purchase_request_line::table)
                .values(&make_request_line_models(&request))
                .execute(self.conn)?;

            Ok(())
        })
    }
}
