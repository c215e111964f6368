//! Watermark pagination.
//!
//! The contract pages by id: `after` is the largest id seen on the previous
//! page and the next page holds at most [`PAGE_SIZE`] entries with larger ids.
//! Pages are re-sorted newest first for display. A full page is the only
//! signal that another page may exist.

use chess_core::ChessGameSummary;
use tracing::{debug, warn};

use crate::contract::{ChessContract, GamesFilter};
use crate::error::{ClientError, Result};

pub const PAGE_SIZE: usize = 25;

/// Back/forward navigation over watermark pages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageCursor {
    watermarks: Vec<u64>,
}

impl PageCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// `after` value for the current page.
    pub fn after(&self) -> Option<u64> {
        self.watermarks.last().copied()
    }

    /// 1-indexed page number.
    pub fn page_number(&self) -> usize {
        self.watermarks.len() + 1
    }

    pub fn has_previous_page(&self) -> bool {
        !self.watermarks.is_empty()
    }

    pub fn has_next_page(page_len: usize) -> bool {
        page_len >= PAGE_SIZE
    }

    /// Advance past a page with these ids. An empty page leaves the cursor where it is.
    pub fn next_page(&mut self, ids: impl IntoIterator<Item = u64>) {
        if let Some(max) = ids.into_iter().max() {
            self.watermarks.push(max);
        }
    }

    pub fn previous_page(&mut self) {
        self.watermarks.pop();
    }

    /// Filters change page boundaries, so any filter change starts over.
    pub fn reset(&mut self) {
        self.watermarks.clear();
    }
}

/// Fetch every page matching `filter`, stopping at the first short page.
/// A full page whose ids do not rise above `after` is a [`ClientError::StalledPage`].
pub async fn fetch_all_games(
    contract: &ChessContract,
    filter: GamesFilter,
) -> Result<Vec<ChessGameSummary>> {
    let mut cursor = PageCursor::new();
    let mut all = Vec::new();

    loop {
        let page = contract
            .get_games(GamesFilter {
                after: cursor.after(),
                ..filter.clone()
            })
            .await?;
        debug!(page = cursor.page_number(), len = page.len(), "Fetched games page");

        let full = PageCursor::has_next_page(page.len());
        let after = cursor.after();
        cursor.next_page(page.iter().map(|g| g.game_id));
        all.extend(page);

        if !full {
            return Ok(all);
        }
        if cursor.after() <= after {
            let stuck = after.unwrap_or(0);
            warn!(after = stuck, "Games page did not advance");
            return Err(ClientError::StalledPage(stuck));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use super::*;
    use crate::connection::{Connection, QueryClient};

    #[test]
    fn test_cursor_navigation() {
        let mut cursor = PageCursor::new();
        assert_eq!(cursor.after(), None);
        assert_eq!(cursor.page_number(), 1);
        assert!(!cursor.has_previous_page());

        cursor.next_page([130, 120, 107]);
        assert_eq!(cursor.after(), Some(130));
        assert_eq!(cursor.page_number(), 2);

        cursor.next_page([90, 95]);
        assert_eq!(cursor.after(), Some(95));

        cursor.previous_page();
        assert_eq!(cursor.after(), Some(130));

        cursor.reset();
        assert_eq!(cursor.after(), None);
    }

    #[test]
    fn test_empty_page_does_not_advance() {
        let mut cursor = PageCursor::new();
        cursor.next_page(Vec::<u64>::new());
        assert_eq!(cursor.page_number(), 1);
    }

    #[test]
    fn test_full_page_signals_more() {
        assert!(PageCursor::has_next_page(PAGE_SIZE));
        assert!(!PageCursor::has_next_page(PAGE_SIZE - 1));
        assert!(!PageCursor::has_next_page(0));
    }

    /// Answers every query with the same full page of ids `1..=PAGE_SIZE`.
    #[derive(Default)]
    struct RepeatingPage {
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl QueryClient for RepeatingPage {
        async fn query_contract_smart(&self, _contract: &str, _msg: &Value) -> Result<Value> {
            *self.calls.lock().unwrap() += 1;
            let page: Vec<Value> = (1..=PAGE_SIZE as u64)
                .map(|id| {
                    json!({
                        "game_id": id,
                        "player1": "juno1a",
                        "player2": "juno1b",
                        "block_start": 1
                    })
                })
                .collect();
            Ok(Value::Array(page))
        }
    }

    #[tokio::test]
    async fn test_repeating_page_is_an_error() {
        let client = Arc::new(RepeatingPage::default());
        let connection = Connection::new("http://unused").with_query_client(client.clone());
        let contract = ChessContract::new(connection, "juno1chess");

        let err = fetch_all_games(&contract, GamesFilter::default()).await.unwrap_err();
        assert!(matches!(err, ClientError::StalledPage(25)));
        assert_eq!(*client.calls.lock().unwrap(), 2);
    }
}
