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

//! Entry point to the REST server.

use crate::driver::Driver;
use crate::model::RecordId;
use axum::Router;
use axum::http::Uri;
use log::debug;
use recbook_core::db::DbError;
use recbook_core::rest::{RestError, RestResult};
use std::path::PathBuf;
use tower_http::services::ServeDir;

mod book_delete;
mod book_get;
mod book_page_get;
mod book_post;
mod book_put;
mod record_delete;
mod record_get;
mod record_post;
mod records_get;
mod root_get;
#[cfg(test)]
mod testutils;

/// Parses the `{id}` segment of a record route.
///
/// An identifier that cannot be parsed cannot match any row, so it is reported as not found.
fn parse_record_id(raw: &str) -> RestResult<RecordId> {
    raw.parse::<RecordId>().map_err(|e| {
        debug!("{}", e);
        RestError::NotFound(DbError::NotFound.to_string())
    })
}

/// Answers requests that did not match any route.
async fn fallback_handler(uri: Uri) -> RestError {
    RestError::NotFound(format!("No route for {}", uri.path()))
}

/// Creates the router for the application.
///
/// Files under `static_dir` are served as-is under the `/static/` prefix.
pub(crate) fn app(driver: Driver, static_dir: PathBuf) -> Router {
    use axum::routing::{get, post};

    // The router requires parameters at the same position to share a name, which is why the
    // band segment of the create route is called `id` too.  Handlers extract by position.
    Router::new()
        .route("/", get(root_get::handler))
        .route(
            "/books/:title",
            get(book_get::handler)
                .post(book_post::handler)
                .put(book_put::handler)
                .delete(book_delete::handler),
        )
        .route("/books/:title/page/:page", get(book_page_get::handler))
        .route("/records", get(records_get::handler))
        .route("/records/:id", get(record_get::handler).delete(record_delete::handler))
        .route("/records/:id/:song", post(record_post::handler))
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(fallback_handler)
        .with_state(driver)
}
