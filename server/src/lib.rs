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

//! REST service that exposes stub book endpoints and a persistent collection of records.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use log::{error, info};
use recbook_core::db::Db;
use recbook_core::env::get_optional_var;
use std::error::Error;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

pub mod db;
pub(crate) mod driver;
use driver::Driver;
pub(crate) mod model;
mod rest;
use rest::app;

/// Default port to listen on when none is configured.
const DEFAULT_PORT: u16 = 8080;

/// Default directory from which to serve static files when none is configured.
const DEFAULT_STATIC_DIR: &str = "static";

/// Configuration of the HTTP front of the service.
#[derive(Debug, PartialEq)]
pub struct ServiceOptions {
    /// Port to listen on.
    pub port: u16,

    /// Directory whose contents are served under `/static/`.
    pub static_dir: PathBuf,
}

impl ServiceOptions {
    /// Initializes the options from environment variables whose name is prefixed with the given
    /// `prefix`.
    ///
    /// This will use `<prefix>_PORT` and `<prefix>_STATIC_DIR`, both of which are optional.
    pub fn from_env(prefix: &str) -> Result<ServiceOptions, String> {
        Ok(ServiceOptions {
            port: get_optional_var::<u16>(prefix, "PORT")?.unwrap_or(DEFAULT_PORT),
            static_dir: get_optional_var::<PathBuf>(prefix, "STATIC_DIR")?
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR)),
        })
    }
}

/// Serves the application on `bind_addr` until interrupted.
///
/// The `db` must have been initialized with the schema already.  The caller retains ownership of
/// the pool and is expected to close it once this returns.
///
/// While it'd be nice to push this responsibility to `main`, doing so would force us to expose many
/// crate-internal types to the public, which in turn would make dead code detection harder.
pub async fn serve(
    bind_addr: impl Into<SocketAddr>,
    db: Arc<dyn Db + Send + Sync>,
    static_dir: PathBuf,
) -> Result<(), Box<dyn Error>> {
    let driver = Driver::new(db);
    let app = app(driver, static_dir);

    let listener = tokio::net::TcpListener::bind(bind_addr.into()).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

/// Waits until the process receives an interrupt.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Interrupted; shutting down"),
        Err(e) => error!("Cannot listen for interrupts: {}", e),
    }
}
