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

use super::get_purchase_order::load_purchase_order;
use super::ProcurementStoreOperations;
use crate::purchase_order::PurchaseOrder;
use crate::store::diesel::{models::PurchaseOrderModel, schema::purchase_order};
use crate::store::ProcurementStoreError;

pub(in crate::store::diesel) trait ListPurchaseOrdersOperation {
    fn list_purchase_orders(&self) -> Result<Vec<PurchaseOrder>, ProcurementStoreError>;
}

impl<'a> ListPurchaseOrdersOperation for ProcurementStoreOperations<'a, SqliteConnection> {
    fn list_purchase_orders(&self) -> Result<Vec<PurchaseOrder>, ProcurementStoreError> {
        purchase_order::table
            .order(purchase_order::id.asc())
            .load::<PurchaseOrderModel>(self.conn)?
            .into_iter()
            .map(|model| load_purchase_order(self.conn, model))
            .collect()
    }
}
