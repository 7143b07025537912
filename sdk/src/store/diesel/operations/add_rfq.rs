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

use super::update_purchase_request::write_request;
use super::ProcurementStoreOperations;
use crate::purchase_request::PurchaseRequest;
use crate::rfq::Rfq;
use crate::store::diesel::{
    models::{make_rfq_line_models, NewRfqModel},
    schema::{rfq, rfq_line},
};
use crate::store::ProcurementStoreError;

pub(in crate::store::diesel) trait AddRfqOperation {
    fn add_rfq(&self, request: PurchaseRequest, rfq: Rfq) -> Result<(), ProcurementStoreError>;
}

impl<'a> AddRfqOperation for ProcurementStoreOperations<'a, SqliteConnection> {
    fn add_rfq(&self, request: PurchaseRequest, new_rfq: Rfq) -> Result<(), ProcurementStoreError> {
        self.conn.immediate_transaction::<_, ProcurementStoreError, _>(|| {
            write_request(self.conn, &request)?;

            insert_into(rfq::table)
                .values(NewRfqModel::from(&new_rfq))
                .execute(self.conn)?;
            insert_into(rfq_line::table)
                .values(&make_rfq_line_models(&new_rfq)?)
                .execute(self.conn)?;

            Ok(())
        })
    }
}
