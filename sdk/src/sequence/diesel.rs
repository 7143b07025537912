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

use std::collections::HashMap;

use diesel::{
    dsl::{insert_into, update},
    prelude::*,
    r2d2::{ConnectionManager, Pool},
};

use super::{DocumentKind, SequenceAllocator, SequenceFormat};
use crate::config::ProcurementConfig;
use crate::error::InternalError;
use crate::store::diesel::schema::document_sequence;

/// An allocator whose counters live in the `document_sequence` table, so references stay
/// unique across processes sharing the database.
#[derive(Clone)]
pub struct DieselSequenceAllocator {
    connection_pool: Pool<ConnectionManager<SqliteConnection>>,
    formats: HashMap<DocumentKind, SequenceFormat>,
}

impl DieselSequenceAllocator {
    pub fn new(
        connection_pool: Pool<ConnectionManager<SqliteConnection>>,
        config: &ProcurementConfig,
    ) -> Self {
        let formats = [
            DocumentKind::PurchaseRequest,
            DocumentKind::PurchaseOrder,
            DocumentKind::Bid,
        ]
        .iter()
        .map(|kind| (*kind, config.sequence_format(*kind).clone()))
        .collect();

        DieselSequenceAllocator {
            connection_pool,
            formats,
        }
    }
}

impl SequenceAllocator for DieselSequenceAllocator {
    fn next(&self, kind: DocumentKind) -> Result<String, InternalError> {
        let format = self.formats.get(&kind).ok_or_else(|| {
            InternalError::with_message(format!("No sequence defined for {}", kind))
        })?;

        let conn = self.connection_pool.get().map_err(|err| {
            InternalError::from_source_with_prefix(
                Box::new(err),
                "Failed to get a connection for sequences".to_string(),
            )
        })?;

        let value = conn
            .immediate_transaction::<_, diesel::result::Error, _>(|| {
                // The update takes the write lock before the counter is read back.
                let updated = update(
                    document_sequence::table.filter(document_sequence::kind.eq(kind.code())),
                )
                .set(document_sequence::next_value.eq(document_sequence::next_value + 1))
                .execute(&*conn)?;

                if updated == 0 {
                    insert_into(document_sequence::table)
                        .values((
                            document_sequence::kind.eq(kind.code()),
                            document_sequence::next_value.eq(2),
                        ))
                        .execute(&*conn)?;
                    return Ok(1);
                }

                document_sequence::table
                    .filter(document_sequence::kind.eq(kind.code()))
                    .select(document_sequence::next_value)
                    .first::<i64>(&*conn)
                    .map(|next_value| next_value - 1)
            })
            .map_err(|err| InternalError::from_source(Box::new(err)))?;

        Ok(format.render(value as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::ProcurementConfigBuilder;
    use crate::migrations::run_sqlite_migrations;

    fn create_pool() -> Pool<ConnectionManager<SqliteConnection>> {
        let pool = Pool::builder()
            .max_size(1)
            .build(ConnectionManager::<SqliteConnection>::new(":memory:"))
            .expect("Failed to build connection pool");

        run_sqlite_migrations(&*pool.get().expect("Failed to get connection for migrations"))
            .expect("Failed to run migrations");

        pool
    }

    /// Tests that counters persist per kind and that clones draw from the same table.
    #[test]
    fn test_references_per_kind() {
        let config = ProcurementConfigBuilder::default()
            .build()
            .expect("Unable to build configuration");
        let allocator = DieselSequenceAllocator::new(create_pool(), &config);
        let other = allocator.clone();

        assert_eq!(allocator.next(DocumentKind::PurchaseRequest).unwrap(), "PR00001");
        assert_eq!(other.next(DocumentKind::PurchaseRequest).unwrap(), "PR00002");
        assert_eq!(allocator.next(DocumentKind::PurchaseOrder).unwrap(), "P00001");
        assert_eq!(allocator.next(DocumentKind::Bid).unwrap(), "BID00001");
        assert_eq!(other.next(DocumentKind::PurchaseOrder).unwrap(), "P00002");
    }
}
