//! REST client for the comment board backend.

use serde_json::json;

use kiosk_http::{check_status, ensure_success, ApiError};

use crate::query::BoardQuery;
use crate::tree::{comments_from_value, Comment};

/// HTTP client for the comment board backend.
pub struct CommentsApi {
    client: reqwest::Client,
    base_url: String,
}

impl CommentsApi {
    /// Create a new API client.
    ///
    /// * `base_url` - service base, e.g. `http://host:8080/tree_comments/api`.
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Create an API client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling across clients).
    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Fetch one page of the comment tree.
    ///
    /// Sends `GET /comments` with the full query state. `page`, `limit`,
    /// `sort` and `search` are always present (the filter goes out even
    /// when empty); `parent` is added only when scoping the read to one
    /// subtree.
    pub async fn list(
        &self,
        query: &BoardQuery,
        parent: Option<&str>,
    ) -> Result<Vec<Comment>, ApiError> {
        let mut request = self
            .client
            .get(format!("{}/comments", self.base_url))
            .query(&[
                ("page", query.page.to_string()),
                ("limit", query.page_size.to_string()),
                ("sort", query.sort.as_str().to_string()),
                ("search", query.search.clone()),
            ]);
        if let Some(parent) = parent {
            request = request.query(&[("parent", parent)]);
        }

        let response = ensure_success(request.send().await?).await?;
        let payload = response.json::<serde_json::Value>().await?;
        let comments = comments_from_value(payload)?;

        tracing::debug!(page = query.page, count = comments.len(), "Loaded comment page");
        Ok(comments)
    }

    /// Create a comment.
    ///
    /// `parent` of `None` posts a new root comment, `Some` a reply. The
    /// `{"message"}` acknowledgement body is not used.
    pub async fn create(&self, text: &str, parent: Option<&str>) -> Result<(), ApiError> {
        let mut body = json!({ "text": text });
        if let Some(parent) = parent {
            body["parent"] = json!(parent);
        }

        let response = self
            .client
            .post(format!("{}/comments", self.base_url))
            .json(&body)
            .send()
            .await?;

        check_status(response).await
    }

    /// Delete a comment together with its reply subtree.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(format!("{}/comments/{}", self.base_url, id))
            .send()
            .await?;

        check_status(response).await
    }
}
