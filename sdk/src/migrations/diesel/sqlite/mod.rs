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

use diesel::{sqlite::SqliteConnection, Connection, RunQueryDsl};

use crate::error::ResourceTemporarilyUnavailableError;
use crate::migrations::error::MigrationsError;
use crate::store::diesel::schema::{
    bid, bid_line, document_sequence, purchase_order, purchase_order_line, purchase_request,
    purchase_request_line, rfq, rfq_line, vendor_assignment,
};

embed_migrations!("./src/migrations/diesel/sqlite/migrations");

/// Run database migrations to create the procurement tables
///
/// # Arguments
///
/// * `conn` - Connection to database
///
pub fn run_migrations(conn: &SqliteConnection) -> Result<(), MigrationsError> {
    embedded_migrations::run(conn).map_err(|err| {
        MigrationsError::ResourceTemporarilyUnavailableError(
            ResourceTemporarilyUnavailableError::from_source(Box::new(err)),
        )
    })?;

    info!("Successfully applied procurement migrations");

    Ok(())
}

/// Removes every document and sequence counter, leaving the schema in place.
pub fn clear_database(conn: &SqliteConnection) -> Result<(), MigrationsError> {
    conn.immediate_transaction::<_, MigrationsError, _>(|| {
        diesel::delete(purchase_order_line::table).execute(conn)?;
        diesel::delete(purchase_order::table).execute(conn)?;
        diesel::delete(bid_line::table).execute(conn)?;
        diesel::delete(bid::table).execute(conn)?;
        diesel::delete(vendor_assignment::table).execute(conn)?;
        diesel::delete(rfq_line::table).execute(conn)?;
        diesel::delete(rfq::table).execute(conn)?;
        diesel::delete(purchase_request_line::table).execute(conn)?;
        diesel::delete(purchase_request::table).execute(conn)?;
        diesel::delete(document_sequence::table).execute(conn)?;

        Ok(())
    })?;

    info!("Cleared procurement database");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use diesel::{dsl::insert_into, ExpressionMethods, QueryDsl};

    /// Verifies that migrations can be applied twice and that clearing keeps the schema.
    #[test]
    fn test_migrate_and_clear() {
        let conn = SqliteConnection::establish(":memory:").expect("Unable to open database");
        run_migrations(&conn).expect("Unable to run migrations");
        run_migrations(&conn).expect("Unable to rerun migrations");

        insert_into(document_sequence::table)
            .values((
                document_sequence::kind.eq("purchase.request"),
                document_sequence::next_value.eq(7i64),
            ))
            .execute(&conn)
            .expect("Unable to insert counter");

        clear_database(&conn).expect("Unable to clear database");

        let remaining = document_sequence::table
            .count()
            .get_result::<i64>(&conn)
            .expect("Unable to count counters");
        assert_eq!(remaining, 0);
    }
}
