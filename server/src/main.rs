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

//! Entry point to the recbook service.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use log::error;
use recbook_core::db::Db;
use recbook_core::db::postgres::{PostgresDb, PostgresOptions};
use recbook_server::db::init_schema;
use recbook_server::{ServiceOptions, serve};
use std::error::Error;
use std::net::Ipv4Addr;
use std::process;
use std::sync::Arc;

/// Sets up the database and runs the service until it is interrupted.
async fn run() -> Result<(), Box<dyn Error>> {
    let service_opts = ServiceOptions::from_env("RECBOOK")?;
    let db_opts = PostgresOptions::from_env("PGSQL_PROD")?;

    let db = Arc::new(PostgresDb::connect(db_opts)?);
    let result = async {
        init_schema(&mut db.ex().await?).await?;
        serve((Ipv4Addr::UNSPECIFIED, service_opts.port), db.clone(), service_opts.static_dir)
            .await
    }
    .await;
    db.close().await;
    result
}

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(e) = run().await {
        error!("{}", e);
        process::exit(1);
    }
}
