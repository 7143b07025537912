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

use super::{rfq_not_written, ProcurementStoreOperations};
use crate::error::{ConflictError, ConflictType};
use crate::store::diesel::{
    models::{
        make_bid_line_models, make_purchase_order_line_models, make_rfq_line_models, NewBidModel,
        NewPurchaseOrderModel, NewRfqModel, NewVendorAssignmentModel,
    },
    schema::{
        bid, bid_line, purchase_order, purchase_order_line, rfq, rfq_line, vendor_assignment,
    },
};
use crate::store::{ProcurementStoreError, RfqChangeSet};

pub(in crate::store::diesel) trait CommitRfqChangesOperation {
    fn commit_rfq_changes(&self, changes: RfqChangeSet) -> Result<(), ProcurementStoreError>;
}

impl<'a> CommitRfqChangesOperation for ProcurementStoreOperations<'a, SqliteConnection> {
    fn commit_rfq_changes(&self, changes: RfqChangeSet) -> Result<(), ProcurementStoreError> {
        self.conn.immediate_transaction::<_, ProcurementStoreError, _>(|| {
            if let Some(order) = &changes.purchase_order {
                let existing = purchase_order::table
                    .filter(purchase_order::purchase_order_id.eq(&order.id))
                    .count()
                    .get_result::<i64>(self.conn)?;
                if existing > 0 {
                    return Err(ProcurementStoreError::ConflictError(ConflictError::new(
                        ConflictType::Unique,
                        format!("Purchase order {} already exists", order.id),
                    )));
                }
            }

            let changed_rfq = &changes.rfq;
            let mut model = NewRfqModel::from(changed_rfq);
            model.version = changed_rfq.version + 1;
            let updated = update(
                rfq::table
                    .filter(rfq::rfq_id.eq(&changed_rfq.id))
                    .filter(rfq::version.eq(changed_rfq.version)),
            )
            .set(&model)
            .execute(self.conn)?;
            if updated == 0 {
                return Err(rfq_not_written(self.conn, &changed_rfq.id)?);
            }

            delete(rfq_line::table.filter(rfq_line::rfq_id.eq(&changed_rfq.id)))
                .execute(self.conn)?;
            insert_into(rfq_line::table)
                .values(&make_rfq_line_models(changed_rfq)?)
                .execute(self.conn)?;

            for assignment in &changes.assignments {
                let model = NewVendorAssignmentModel::from(assignment);
                let updated = update(
                    vendor_assignment::table
                        .filter(vendor_assignment::assignment_id.eq(&assignment.id)),
                )
                .set(&model)
                .execute(self.conn)?;
                if updated == 0 {
                    insert_into(vendor_assignment::table)
                        .values(&model)
                        .execute(self.conn)?;
                }
            }

            for changed_bid in &changes.bids {
                let model = NewBidModel::from(changed_bid);
                let updated = update(bid::table.filter(bid::bid_id.eq(&changed_bid.id)))
                    .set(&model)
                    .execute(self.conn)?;
                if updated == 0 {
                    insert_into(bid::table).values(&model).execute(self.conn)?;
                }

                delete(bid_line::table.filter(bid_line::bid_id.eq(&changed_bid.id)))
                    .execute(self.conn)?;
                insert_into(bid_line::table)
                    .values(&make_bid_line_models(changed_bid)?)
                    .execute(self.conn)?;
            }

            if let Some(order) = &changes.purchase_order {
                insert_into(purchase_order::table)
                    .values(NewPurchaseOrderModel::from(order))
                    .execute(self.conn)?;
                insert_into(purchase_order_line::table)
                    .values(&make_purchase_order_line_models(order)?)
                    .execute(self.conn)?;
            }

            Ok(())
        })
    }
}
