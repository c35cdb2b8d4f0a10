// III-IV
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Database abstraction in terms of the operations needed by the server.

use crate::model::*;
use futures::TryStreamExt;
#[cfg(feature = "postgres")]
use recbook_core::db::postgres;
#[cfg(any(feature = "sqlite", test))]
use recbook_core::db::sqlite;
use recbook_core::db::{DbError, DbResult, Executor};
use sqlx::Row;
#[cfg(feature = "postgres")]
use sqlx::postgres::PgRow;
#[cfg(any(feature = "sqlite", test))]
use sqlx::sqlite::SqliteRow;


/// Initializes the database schema.
pub async fn init_schema(ex: &mut Executor) -> DbResult<()> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => postgres::run_schema(ex, include_str!("postgres.sql")).await,

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => sqlite::run_schema(ex, include_str!("sqlite.sql")).await,

        #[allow(unreachable_patterns)]
        _ => unreachable!(),
    }
}

#[cfg(feature = "postgres")]
impl TryFrom<PgRow> for Record {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let id: i32 = row.try_get("id").map_err(postgres::map_sqlx_error)?;
        let band: String = row.try_get("band").map_err(postgres::map_sqlx_error)?;
        let song: String = row.try_get("song").map_err(postgres::map_sqlx_error)?;
        Ok(Record::new(RecordId::from_i32(id), Band::new(band), Song::new(song)))
    }
}

#[cfg(any(feature = "sqlite", test))]
impl TryFrom<SqliteRow> for Record {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
        let band: String = row.try_get("band").map_err(sqlite::map_sqlx_error)?;
        let song: String = row.try_get("song").map_err(sqlite::map_sqlx_error)?;
        Ok(Record::new(RecordId::from_i64(id)?, Band::new(band), Song::new(song)))
    }
}

/// Gets all existing records sorted by their identifier.
pub(crate) async fn list_records(ex: &mut Executor) -> DbResult<Vec<Record>> {
    let mut records = vec![];
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT id, band, song FROM records ORDER BY id";
            let mut rows = sqlx::query(query_str).fetch(&mut **ex);
            while let Some(row) = rows.try_next().await.map_err(postgres::map_sqlx_error)? {
                records.push(Record::try_from(row)?);
            }
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT id, band, song FROM records ORDER BY id";
            let mut rows = sqlx::query(query_str).fetch(&mut **ex);
            while let Some(row) = rows.try_next().await.map_err(sqlite::map_sqlx_error)? {
                records.push(Record::try_from(row)?);
            }
        }

        #[allow(unreachable_patterns)]
        _ => unreachable!(),
    }
    Ok(records)
}

/// Gets the record identified by `id`.
pub(crate) async fn get_record(ex: &mut Executor, id: RecordId) -> DbResult<Record> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT id, band, song FROM records WHERE id = $1";
            let row = sqlx::query(query_str)
                .bind(id.as_i32())
                .fetch_one(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            Record::try_from(row)
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT id, band, song FROM records WHERE id = ?";
            let row = sqlx::query(query_str)
                .bind(id.as_i32())
                .fetch_one(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            Record::try_from(row)
        }

        #[allow(unreachable_patterns)]
        _ => unreachable!(),
    }
}

/// Creates a new record for `band` and `song` and returns it with the identifier that the
/// database assigned to it.
pub(crate) async fn create_record(ex: &mut Executor, band: Band, song: Song) -> DbResult<Record> {
    let id: i32 = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "INSERT INTO records (band, song) VALUES ($1, $2) RETURNING id";
            let row = sqlx::query(query_str)
                .bind(band.as_ref())
                .bind(song.as_ref())
                .fetch_one(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("id").map_err(postgres::map_sqlx_error)?
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "INSERT INTO records (band, song) VALUES (?, ?) RETURNING id";
            let row = sqlx::query(query_str)
                .bind(band.as_ref())
                .bind(song.as_ref())
                .fetch_one(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            let id: i64 = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
            RecordId::from_i64(id)?.as_i32()
        }

        #[allow(unreachable_patterns)]
        _ => unreachable!(),
    };
    Ok(Record::new(RecordId::from_i32(id), band, song))
}

/// Deletes the record identified by `id`.
pub(crate) async fn delete_record(ex: &mut Executor, id: RecordId) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "DELETE FROM records WHERE id = $1";
            let done = sqlx::query(query_str)
                .bind(id.as_i32())
                .execute(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "DELETE FROM records WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(id.as_i32())
                .execute(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unreachable_patterns)]
        _ => unreachable!(),
    };

    match rows_affected {
        0 => Err(DbError::NotFound),
        1 => Ok(()),
        _ => Err(DbError::BackendError("Deletion affected more than one row".to_owned())),
    }
}
