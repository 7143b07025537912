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
use crate::purchase_order::PurchaseOrder;
use crate::store::diesel::{
    models::{make_purchase_order, PurchaseOrderLineModel, PurchaseOrderModel},
    schema::{purchase_order, purchase_order_line},
};
use crate::store::ProcurementStoreError;

pub(in crate::store::diesel) trait GetPurchaseOrderOperation {
    fn get_purchase_order(
        &self,
        purchase_order_id: &str,
    ) -> Result<Option<PurchaseOrder>, ProcurementStoreError>;
}

impl<'a> GetPurchaseOrderOperation for ProcurementStoreOperations<'a, SqliteConnection> {
    fn get_purchase_order(
        &self,
        purchase_order_id: &str,
    ) -> Result<Option<PurchaseOrder>, ProcurementStoreError> {
        let model = purchase_order::table
            .filter(purchase_order::purchase_order_id.eq(purchase_order_id))
            .first::<PurchaseOrderModel>(self.conn)
            .optional()?;

        match model {
            Some(model) => load_purchase_order(self.conn, model).map(Some),
            None => Ok(None),
        }
    }
}

pub(super) fn load_purchase_order(
    conn: &SqliteConnection,
    model: PurchaseOrderModel,
) -> Result<PurchaseOrder, ProcurementStoreError> {
    let lines = purchase_order_line::table
        .filter(purchase_order_line::purchase_order_id.eq(&model.purchase_order_id))
        .order((purchase_order_line::sequence.asc(), purchase_order_line::id.asc()))
        .load::<PurchaseOrderLineModel>(conn)?;

    make_purchase_order(model, lines)
}
