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

//! Test utilities for the REST API.

use crate::db;
use crate::driver::Driver;
use crate::model::*;
use crate::rest::app;
use axum::Router;
use recbook_core::db::{Db, Executor};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub(crate) struct TestContext {
    db: Arc<dyn Db + Send + Sync>,
    app: Router,
}

impl TestContext {
    pub(crate) async fn setup() -> Self {
        Self::setup_with_static_dir(&PathBuf::from("static")).await
    }

    pub(crate) async fn setup_with_static_dir(static_dir: &Path) -> Self {
        let db = Arc::new(recbook_core::db::sqlite::testutils::setup().await);
        db::init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        let driver = Driver::new(db.clone());
        let app = app(driver, static_dir.to_owned());
        Self { db, app }
    }

    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    pub(crate) fn into_app(self) -> Router {
        self.app
    }

    pub(crate) async fn close(&self) {
        self.db.close().await;
    }

    /// Removes the records table so that every subsequent query against it fails.
    pub(crate) async fn drop_records_table(&self) {
        match self.db.ex().await.unwrap() {
            Executor::Sqlite(mut ex) => {
                sqlx::query("DROP TABLE records").execute(&mut *ex).await.unwrap();
            }

            #[allow(unreachable_patterns)]
            _ => unreachable!(),
        }
    }

    pub(crate) async fn create_record<B: Into<String>, S: Into<String>>(
        &self,
        band: B,
        song: S,
    ) -> Record {
        db::create_record(
            &mut self.db.ex().await.unwrap(),
            Band::new(band.into()),
            Song::new(song.into()),
        )
        .await
        .unwrap()
    }

    pub(crate) async fn has_record(&self, id: RecordId) -> bool {
        db::get_record(&mut self.db.ex().await.unwrap(), id).await.is_ok()
    }

    pub(crate) async fn get_record(&self, id: RecordId) -> Record {
        db::get_record(&mut self.db.ex().await.unwrap(), id).await.unwrap()
    }
}
