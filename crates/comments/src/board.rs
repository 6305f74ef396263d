//! The comment board component.
//!
//! Owns the query state and the API client. The board never edits a page
//! in place: every mutation posts its request and then reloads the page
//! it lands on, so the rendered tree always reflects the backend.

use kiosk_core::error::CoreError;
use kiosk_core::text::require_text;
use kiosk_http::ApiError;

use crate::api::CommentsApi;
use crate::query::{BoardQuery, SortOrder};
use crate::tree::Comment;

/// One loaded screenful of the board.
#[derive(Debug, Clone)]
pub struct BoardPage {
    /// Root comments with their reply trees.
    pub comments: Vec<Comment>,
    /// Page number the load was issued for.
    pub page: u32,
}

/// Errors surfaced by board operations.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    /// The backend or the transport rejected the request.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Local input validation failed; no request was sent.
    #[error(transparent)]
    Invalid(#[from] CoreError),
}

/// The comment board: query state plus the operations that move it.
///
/// A failed mutation leaves the query state and the last rendered page
/// untouched; the caller decides how to surface the error.
pub struct CommentBoard {
    api: CommentsApi,
    query: BoardQuery,
}

impl CommentBoard {
    pub fn new(api: CommentsApi) -> Self {
        Self {
            api,
            query: BoardQuery::default(),
        }
    }

    /// Current query state.
    pub fn query(&self) -> &BoardQuery {
        &self.query
    }

    /// Load the page for the current query state.
    ///
    /// The backend answers a search with no hits as a 404; that reads as
    /// an empty page here, in line with the lenient list decoding.
    pub async fn refresh(&self) -> Result<BoardPage, BoardError> {
        let comments = match self.api.list(&self.query, None).await {
            Ok(comments) => comments,
            Err(ApiError::Api { status: 404, .. }) => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(BoardPage {
            comments,
            page: self.query.page,
        })
    }

    /// Apply a search filter and reload from the first page.
    pub async fn search(&mut self, text: &str) -> Result<BoardPage, BoardError> {
        self.query.set_search(text);
        self.refresh().await
    }

    /// Change the sort order and reload the current page.
    pub async fn set_sort(&mut self, sort: SortOrder) -> Result<BoardPage, BoardError> {
        self.query.set_sort(sort);
        self.refresh().await
    }

    /// Advance one page and reload.
    pub async fn next_page(&mut self) -> Result<BoardPage, BoardError> {
        self.query.next_page();
        self.refresh().await
    }

    /// Step back one page and reload.
    ///
    /// At page 1 this is a local no-op: no request is issued and `None`
    /// is returned.
    pub async fn prev_page(&mut self) -> Result<Option<BoardPage>, BoardError> {
        if !self.query.prev_page() {
            return Ok(None);
        }
        Ok(Some(self.refresh().await?))
    }

    /// Post a new root comment, then reload.
    pub async fn post_root(&self, text: &str) -> Result<BoardPage, BoardError> {
        let text = require_text("comment text", text)?;
        self.api.create(text, None).await?;
        tracing::info!("Posted root comment");
        self.refresh().await
    }

    /// Post a reply under `parent`, then reload.
    pub async fn post_reply(&self, parent: &str, text: &str) -> Result<BoardPage, BoardError> {
        let text = require_text("reply text", text)?;
        self.api.create(text, Some(parent)).await?;
        tracing::info!(parent, "Posted reply");
        self.refresh().await
    }

    /// Delete a comment and its subtree, then reload.
    ///
    /// Asking the user is the front-end's job; by the time this runs the
    /// deletion is decided.
    pub async fn delete(&self, id: &str) -> Result<BoardPage, BoardError> {
        self.api.delete(id).await?;
        tracing::info!(id, "Deleted comment");
        self.refresh().await
    }
}
