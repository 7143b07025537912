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

use diesel::{
    dsl::{delete, insert_into, update},
    prelude::*,
};

use super::{request_not_written, ProcurementStoreOperations};
use crate::purchase_request::PurchaseRequest;
use crate::store::diesel::{
    models::{make_request_line_models, NewPurchaseRequestModel},
    schema::{purchase_request, purchase_request_line},
};
use crate::store::ProcurementStoreError;

pub(in crate::store::diesel) trait UpdatePurchaseRequestOperation {
    fn update_purchase_request(&self, request: PurchaseRequest)
        -> Result<(), ProcurementStoreError>;
}

impl<'a> UpdatePurchaseRequestOperation for ProcurementStoreOperations<'a, SqliteConnection> {
    fn update_purchase_request(
        &self,
        request: PurchaseRequest,
    ) -> Result<(), ProcurementStoreError> {
        self.conn.immediate_transaction::<_, ProcurementStoreError, _>(|| {
            write_request(self.conn, &request)
        })
    }
}

/// Replaces a stored request if it is still at the version `request` was read at.
pub(super) fn write_request(
    conn: &SqliteConnection,
    request: &PurchaseRequest,
) -> Result<(), ProcurementStoreError> {
    let mut model = NewPurchaseRequestModel::from(request);
    model.version = request.version + 1;

    let updated = update(
        purchase_request::table
            .filter(purchase_request::request_id.eq(&request.id))
            .filter(purchase_request::version.eq(request.version)),
    )
    .set(&model)
    .execute(conn)?;
    if updated == 0 {
        return Err(request_not_written(conn, &request.id)?);
    }

    delete(purchase_request_line::table.filter(purchase_request_line::request_id.eq(&request.id)))
        .execute(conn)?;
    insert_into(purchase_request_line::table)
        .values(&make_request_line_models(request))
        .execute(conn)?;

    Ok(())
}
