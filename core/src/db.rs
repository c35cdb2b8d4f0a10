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

//! Generic abstraction to access different database systems.
//!
//! The facilities in this module provide an abstraction over different database systems such as
//! PostgreSQL and SQLite.  The PostgreSQL backend is for production use and the SQLite backend is
//! primarily intended to support unit tests.
//!
//! Every database is backed by a bounded connection pool that is created once at startup.  Each
//! operation obtains an `Executor` from the pool, which returns the connection to the pool when
//! dropped.

use crate::model::ModelError;
use async_trait::async_trait;
use std::sync::LazyLock;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

/// Database errors.  Any unexpected errors that come from the database are classified as
/// `BackendError`, but errors we know about have more specific types.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DbError {
    /// Indicates that a request to create an entry failed because it already exists.
    #[error("Already exists")]
    AlreadyExists,

    /// Catch-all error type for unexpected database errors.
    #[error("Database error: {0}")]
    BackendError(String),

    /// Indicates a failure processing the data that already exists in the database.
    #[error("Data integrity error: {0}")]
    DataIntegrityError(String),

    /// Indicates that a requested entry does not exist.
    #[error("Data not found")]
    NotFound,

    /// Indicates that the database is not available (maybe because it cannot be reached or
    /// because there are too many active concurrent connections).
    #[error("Database unavailable")]
    Unavailable,
}

impl From<ModelError> for DbError {
    fn from(e: ModelError) -> Self {
        DbError::DataIntegrityError(e.to_string())
    }
}

/// Result type for this module.
pub type DbResult<T> = Result<T, DbError>;

/// A database executor that can talk to multiple database implementations.
///
/// This type provides a generic mechanism to access a typed connection, which is needed by sqlx
/// to offer type safety guarantees during query construction.  Users of this type are forced to
/// destructure it and issue different calls for each database.
pub enum Executor {
    /// A PostgreSQL connection checked out of the pool.
    #[cfg(feature = "postgres")]
    Postgres(postgres::PostgresExecutor),

    /// A SQLite connection checked out of the pool.
    #[cfg(feature = "sqlite")]
    Sqlite(sqlite::SqliteExecutor),
}

/// Abstraction over the database connection pool.
#[async_trait]
pub trait Db {
    /// Obtains an executor backed by a connection from the pool.
    ///
    /// This would be better called `executor` but this method is used so frequently that it makes
    /// call sites too verbose.
    async fn ex(&self) -> DbResult<Executor>;

    /// Closes the pool, waiting for all checked out connections to be returned.
    async fn close(&self);
}

/// Matches SQL line comments so that they can be stripped out of schema definitions.
static COMMENT_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::RegexBuilder::new("--.*$").multi_line(true).build().expect("Hardcoded regex is valid")
});

/// Splits a `schema` file into its individual statements.
///
/// Comments are stripped out first so that we can safely separate the statements by looking for
/// semicolons.  Empty statements are dropped.
pub fn split_schema(schema: &str) -> Vec<String> {
    COMMENT_RE
        .replace_all(schema, "")
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Macros to help instantiate tests for multiple database systems.
#[cfg(any(test, feature = "testutils"))]
pub mod testutils {
    pub use paste::paste;

    /// Instantiates the `module::name` test for the database configured by `setup`.
    ///
    /// The `extra` metadata parameter can be used to tag the generated tests.
    #[macro_export]
    macro_rules! generate_one_test [
        ( $name:ident, $setup:expr, $module:path $(, #[$extra:meta] )? ) => {
            #[tokio::test]
            $(#[$extra])?
            async fn $name() {
                $crate::db::testutils::paste! {
                    $module :: [< $name >]($setup).await;
                }
            }
        }
    ];

    pub use generate_one_test;

    /// Instantiates a collection of tests for a specific database system.
    ///
    /// The database implementation to run the tests against is determined by the `setup`
    /// expression, which needs to return a database object.  The returned database should also
    /// have been initialized with the desired schema.
    ///
    /// The `extra` metadata parameter can be used to tag the generated tests.
    #[macro_export]
    macro_rules! generate_tests [
        ( #[$extra:meta], $setup:expr, $module:path $(, $name:ident)+ ) => {
            $(
                $crate::db::testutils::generate_one_test!($name, $setup, $module, #[$extra]);
            )+
        };

        ( $setup:expr, $module:path $(, $name:ident)+ ) => {
            $(
                $crate::db::testutils::generate_one_test!($name, $setup, $module);
            )+
        };
    ];

    pub use generate_tests;
}


#[cfg(all(test, any(feature = "postgres", feature = "sqlite")))]
mod backend_tests {
    use super::*;
    use sqlx::Row;
    use std::sync::Arc;

    /// Runs a `query` on `ex` and does not care about its results.  The `query` must be valid for
    /// all possible database implementations.
    async fn exec(ex: &mut Executor, query: &str) {
        match ex {
            #[cfg(feature = "postgres")]
            Executor::Postgres(conn) => {
                sqlx::query(query).execute(&mut **conn).await.unwrap();
            }

            #[cfg(feature = "sqlite")]
            Executor::Sqlite(conn) => {
                sqlx::query(query).execute(&mut **conn).await.unwrap();
            }
        }
    }

    /// Runs a `query` on `ex` that fetches a single row with an `i64` value on `column` and returns
    /// that value.  The `query` must be valid for all possible database implementations.
    async fn query_i64(ex: &mut Executor, column: &str, query: &str) -> i64 {
        match ex {
            #[cfg(feature = "postgres")]
            Executor::Postgres(conn) => {
                let row = sqlx::query(query).fetch_one(&mut **conn).await.unwrap();
                row.try_get(column).unwrap()
            }

            #[cfg(feature = "sqlite")]
            Executor::Sqlite(conn) => {
                let row = sqlx::query(query).fetch_one(&mut **conn).await.unwrap();
                row.try_get(column).unwrap()
            }
        }
    }

    pub(super) async fn test_direct_execution(db: Arc<dyn Db + Send + Sync>) {
        exec(&mut db.ex().await.unwrap(), "CREATE TABLE test (i INTEGER)").await;
        exec(&mut db.ex().await.unwrap(), "INSERT INTO test (i) VALUES (3)").await;
        assert_eq!(
            1,
            query_i64(&mut db.ex().await.unwrap(), "count", "SELECT COUNT(*) AS count FROM test")
                .await
        );
        db.close().await;
    }

    pub(super) async fn test_concurrent_executors(db: Arc<dyn Db + Send + Sync>) {
        let mut ex1 = db.ex().await.unwrap();
        let mut ex2 = db.ex().await.unwrap();
        assert_eq!(1, query_i64(&mut ex1, "one", "SELECT 1 AS one").await);
        assert_eq!(1, query_i64(&mut ex2, "one", "SELECT 1 AS one").await);
        drop(ex1);
        drop(ex2);
        db.close().await;
    }

    pub(super) async fn test_executor_after_drop(db: Arc<dyn Db + Send + Sync>) {
        {
            let mut ex = db.ex().await.unwrap();
            assert_eq!(2, query_i64(&mut ex, "two", "SELECT 2 AS two").await);
        }

        let mut ex = db.ex().await.unwrap();
        assert_eq!(3, query_i64(&mut ex, "three", "SELECT 3 AS three").await);
        drop(ex);
        db.close().await;
    }

    /// Instantiates tests that need concurrent access to the database.  These tests cannot write
    /// to the database.
    #[macro_export]
    macro_rules! generate_db_ro_concurrent_tests [
        ( $setup:expr $(, #[$extra:meta])? ) => {
            $crate::db::testutils::generate_tests!(
                $( #[$extra], )?
                $setup,
                $crate::db::backend_tests,
                test_concurrent_executors,
                test_executor_after_drop
            );
        }
    ];

    pub(super) use generate_db_ro_concurrent_tests;

    /// Instantiates tests that need write access to the test database.
    #[macro_export]
    macro_rules! generate_db_rw_tests [
        ( $setup:expr $(, #[$extra:meta])? ) => {
            $crate::db::testutils::generate_tests!(
                $( #[$extra], )?
                $setup,
                $crate::db::backend_tests,
                test_direct_execution
            );
        }
    ];

    pub(super) use generate_db_rw_tests;
}
