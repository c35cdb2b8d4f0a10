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

//! Operations on records.

use crate::db;
use crate::driver::Driver;
use crate::model::*;
use recbook_core::driver::DriverResult;

impl Driver {
    /// Gets all existing records.
    pub(crate) async fn list_records(self) -> DriverResult<Vec<Record>> {
        let records = db::list_records(&mut self.db.ex().await?).await?;
        Ok(records)
    }

    /// Gets the record identified by `id`.
    pub(crate) async fn get_record(self, id: RecordId) -> DriverResult<Record> {
        let record = db::get_record(&mut self.db.ex().await?, id).await?;
        Ok(record)
    }

    /// Creates a new record for `band` and `song`.
    pub(crate) async fn create_record(self, band: Band, song: Song) -> DriverResult<Record> {
        let record = db::create_record(&mut self.db.ex().await?, band, song).await?;
        Ok(record)
    }

    /// Deletes the existing record identified by `id`.
    pub(crate) async fn delete_record(self, id: RecordId) -> DriverResult<()> {
        db::delete_record(&mut self.db.ex().await?, id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::testutils::*;
    use recbook_core::db::DbError;
    use recbook_core::driver::DriverError;

    #[tokio::test]
    async fn test_list_records_none() {
        let context = TestContext::setup().await;

        let records = context.driver().list_records().await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_list_records_some() {
        let context = TestContext::setup().await;

        let record1 = context.create_record("beatles", "help").await;
        let record2 = context.create_record("kinks", "lola").await;

        let records = context.driver().list_records().await.unwrap();
        assert_eq!(vec![record1, record2], records);
    }

    #[tokio::test]
    async fn test_get_record_ok() {
        let context = TestContext::setup().await;

        context.create_record("beatles", "help").await;
        let exp_record = context.create_record("kinks", "lola").await;

        let record = context.driver().get_record(*exp_record.id()).await.unwrap();
        assert_eq!(exp_record, record);
    }

    #[tokio::test]
    async fn test_get_record_not_found() {
        let context = TestContext::setup().await;

        assert_eq!(
            DriverError::NotFound("Data not found".to_owned()),
            context.driver().get_record(RecordId::from_i32(999)).await.unwrap_err()
        );
    }

    #[tokio::test]
    async fn test_create_record_then_get() {
        let context = TestContext::setup().await;

        let record = context
            .driver()
            .create_record(Band::new("beatles".to_owned()), Song::new("help".to_owned()))
            .await
            .unwrap();
        assert_eq!(&Band::new("beatles".to_owned()), record.band());
        assert_eq!(&Song::new("help".to_owned()), record.song());

        assert_eq!(record, db::get_record(&mut context.ex().await, *record.id()).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_record_ok() {
        let context = TestContext::setup().await;

        let record = context.create_record("beatles", "help").await;

        context.driver().delete_record(*record.id()).await.unwrap();

        assert_eq!(
            DbError::NotFound,
            db::get_record(&mut context.ex().await, *record.id()).await.unwrap_err()
        );
    }

    #[tokio::test]
    async fn test_delete_record_not_found() {
        let context = TestContext::setup().await;

        assert_eq!(
            DriverError::NotFound("Data not found".to_owned()),
            context.driver().delete_record(RecordId::from_i32(999)).await.unwrap_err()
        );
    }

    #[tokio::test]
    async fn test_operations_after_close_are_unavailable() {
        let context = TestContext::setup().await;
        context.close().await;

        assert_eq!(
            DriverError::Unavailable("Database unavailable".to_owned()),
            context.driver().list_records().await.unwrap_err()
        );
        assert_eq!(
            DriverError::Unavailable("Database unavailable".to_owned()),
            context
                .driver()
                .create_record(Band::new("beatles".to_owned()), Song::new("help".to_owned()))
                .await
                .unwrap_err()
        );
    }
}
