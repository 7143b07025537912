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

use super::{request_not_written, ProcurementStoreOperations};
use crate::store::diesel::schema::{purchase_request, purchase_request_line};
use crate::store::ProcurementStoreError;

pub(in crate::store::diesel) trait RemovePurchaseRequestOperation {
    fn remove_purchase_request(
        &self,
        request_id: &str,
        version: i64,
    ) -> Result<(), ProcurementStoreError>;
}

impl<'a> RemovePurchaseRequestOperation for ProcurementStoreOperations<'a, SqliteConnection> {
    fn remove_purchase_request(
        &self,
        request_id: &str,
        version: i64,
    ) -> Result<(), ProcurementStoreError> {
        self.conn.immediate_transaction::<_, ProcurementStoreError, _>(|| {
            let removed = delete(
                purchase_request::table
                    .filter(purchase_request::request_id.eq(request_id))
                    .filter(purchase_request::version.eq(version)),
            )
            .execute(self.conn)?;
            if removed == 0 {
                return Err(request_not_written(self.conn, request_id)?);
            }

            delete(
                purchase_request_line::table
                    .filter(purchase_request_line::request_id.eq(request_id)),
            )
            .execute(self.conn)?;

            Ok(())
        })
    }
}
