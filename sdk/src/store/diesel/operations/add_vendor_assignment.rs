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
    dsl::{insert_into, update},
    prelude::*,
};

use super::{rfq_not_written, ProcurementStoreOperations};
use crate::error::{ConflictError, ConflictType};
use crate::rfq::VendorAssignment;
use crate::store::diesel::{
    models::NewVendorAssignmentModel,
    schema::{rfq, vendor_assignment},
};
use crate::store::ProcurementStoreError;

pub(in crate::store::diesel) trait AddVendorAssignmentOperation {
    fn add_vendor_assignment(
        &self,
        rfq_version: i64,
        assignment: VendorAssignment,
    ) -> Result<(), ProcurementStoreError>;
}

impl<'a> AddVendorAssignmentOperation for ProcurementStoreOperations<'a, SqliteConnection> {
    fn add_vendor_assignment(
        &self,
        rfq_version: i64,
        assignment: VendorAssignment,
    ) -> Result<(), ProcurementStoreError> {
        self.conn.immediate_transaction::<_, ProcurementStoreError, _>(|| {
            let reference = rfq::table
                .filter(rfq::rfq_id.eq(&assignment.rfq_id))
                .select(rfq::reference)
                .first::<String>(self.conn)
                .optional()?
                .ok_or_else(|| {
                    ProcurementStoreError::NotFoundError(format!("RFQ {}", assignment.rfq_id))
                })?;

            let duplicates = vendor_assignment::table
                .filter(vendor_assignment::rfq_id.eq(&assignment.rfq_id))
                .filter(vendor_assignment::vendor_id.eq(assignment.vendor.id()))
                .count()
                .get_result::<i64>(self.conn)?;
            if duplicates > 0 {
                return Err(ProcurementStoreError::ConflictError(ConflictError::new(
                    ConflictType::Unique,
                    format!(
                        "Vendor {} is already assigned to RFQ {}",
                        assignment.vendor.name(),
                        reference
                    ),
                )));
            }

            let updated = update(
                rfq::table
                    .filter(rfq::rfq_id.eq(&assignment.rfq_id))
                    .filter(rfq::version.eq(rfq_version)),
            )
            .set(rfq::version.eq(rfq_version + 1))
            .execute(self.conn)?;
            if updated == 0 {
                return Err(rfq_not_written(self.conn, &assignment.rfq_id)?);
            }

            insert_into(vendor_assignment::table)
                .values(NewVendorAssignmentModel::from(&assignment))
                .execute(self.conn)?;

            Ok(())
        })
    }
}
