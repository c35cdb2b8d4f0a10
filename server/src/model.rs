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

//! High-level data types.

use derive_getters::Getters;
use derive_more::{AsRef, Constructor, Display};
use recbook_core::model::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Identifier of a record as assigned by the database.
///
/// Identifiers are never generated by the service: they only come from the database or from
/// untrusted input that names an existing record.
#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub(crate) struct RecordId(i32);

impl RecordId {
    /// Creates a record identifier from its raw database representation.
    pub(crate) fn from_i32(id: i32) -> Self {
        Self(id)
    }

    /// Creates a record identifier from an `i64` with range validation.
    ///
    /// SQLite hands out 64-bit integer keys but PostgreSQL, which is what we run in production,
    /// only has 32-bit ones, so we reject anything that does not fit.
    #[cfg(any(feature = "sqlite", test))]
    pub(crate) fn from_i64(id: i64) -> ModelResult<Self> {
        match i32::try_from(id) {
            Ok(id) => Ok(Self(id)),
            Err(e) => Err(ModelError(format!("Record id {} cannot be represented: {}", id, e))),
        }
    }

    /// Returns the identifier as an `i32` for use in database queries.
    pub(crate) fn as_i32(&self) -> i32 {
        self.0
    }
}

impl FromStr for RecordId {
    type Err = ModelError;

    fn from_str(s: &str) -> ModelResult<Self> {
        match s.parse::<i32>() {
            Ok(id) => Ok(Self(id)),
            Err(e) => Err(ModelError(format!("Invalid record id '{}': {}", s, e))),
        }
    }
}

/// Name of the band that performs a record.
#[derive(AsRef, Clone, Constructor, Debug, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub(crate) struct Band(String);

/// Name of the song in a record.
#[derive(AsRef, Clone, Constructor, Debug, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub(crate) struct Song(String);

/// A persisted record.
#[derive(Constructor, Debug, Getters, Serialize)]
#[cfg_attr(test, derive(Deserialize, PartialEq))]
#[serde(rename_all = "PascalCase")]
pub(crate) struct Record {
    /// The identifier assigned by the database.
    id: RecordId,

    /// The band that performs the record.
    band: Band,

    /// The song in the record.
    song: Song,
}
