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

//! API to acknowledge a request to read a book.

use axum::extract::Path;

/// API handler.
pub(crate) async fn handler(Path(title): Path<String>) -> String {
    format!("GET /books/{}\n", title)
}

#[cfg(test)]
mod tests {
    use crate::rest::testutils::*;
    use axum::http;
    use recbook_core::rest::testutils::*;

    fn route(title: &str) -> (http::Method, String) {
        (http::Method::GET, format!("/books/{}", title))
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;

        let body = OneShotBuilder::new(context.into_app(), route("dune"))
            .send_empty()
            .await
            .take_body_as_text()
            .await;
        assert_eq!("GET /books/dune\n", body);
    }

    #[tokio::test]
    async fn test_percent_decoded() {
        let context = TestContext::setup().await;

        let body = OneShotBuilder::new(context.into_app(), route("the%20hobbit"))
            .send_empty()
            .await
            .take_body_as_text()
            .await;
        assert_eq!("GET /books/the hobbit\n", body);
    }
}
