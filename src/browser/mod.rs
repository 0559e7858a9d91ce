//! Driver for the admin transaction dashboard: accumulated listing with
//! cursor pagination, single-batch search, and an additive detail overlay.
//!
//! Every fetch is keyed by a generation counter. Starting a new fetch
//! invalidates any still-in-flight one, so a rapid Load More / search double
//! fire resolves to the most recently started request instead of whichever
//! response happens to arrive last.

pub mod feed;

pub use feed::UserTransactionList;

use crate::error::LimitterError;
use crate::models::{TransactionDetails, TransactionPage, TransactionView};
use crate::services::TransactionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserMode {
    Listing,
    Searching,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchKind {
    FirstPage,
    NextPage,
    Search,
}

/// Handle for one in-flight fetch. Stale tickets are ignored on completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    kind: FetchKind,
}

#[derive(Debug)]
pub enum FetchOutcome {
    Page(TransactionPage),
    SearchResults(Vec<TransactionView>),
}

pub struct AdminBrowser {
    mode: BrowserMode,
    rows: Vec<TransactionView>,
    cursor: Option<String>,
    has_more: bool,
    detail: Option<TransactionDetails>,
    loading: bool,
    generation: u64,
}

impl AdminBrowser {
    pub fn new() -> Self {
        Self {
            mode: BrowserMode::Listing,
            rows: Vec::new(),
            cursor: None,
            has_more: false,
            detail: None,
            loading: false,
            generation: 0,
        }
    }

    pub fn mode(&self) -> BrowserMode {
        self.mode
    }

    pub fn rows(&self) -> &[TransactionView] {
        &self.rows
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn detail(&self) -> Option<&TransactionDetails> {
        self.detail.as_ref()
    }

    /// Starts a fetch, superseding any fetch still in flight.
    pub fn begin(&mut self, kind: FetchKind) -> FetchTicket {
        self.generation += 1;
        self.loading = true;
        FetchTicket {
            generation: self.generation,
            kind,
        }
    }

    /// Applies a completed fetch. Outcomes from superseded tickets are
    /// dropped without touching displayed state; a fetch error keeps the
    /// accumulated rows (re-triggering is a user action, never a retry).
    pub fn complete(&mut self, ticket: FetchTicket, result: Result<FetchOutcome, LimitterError>) {
        if ticket.generation != self.generation {
            tracing::debug!(?ticket.kind, "Discarding stale fetch result");
            return;
        }
        self.loading = false;

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Fetch failed: {}", e);
                return;
            }
        };

        match (ticket.kind, outcome) {
            (FetchKind::FirstPage, FetchOutcome::Page(page)) => {
                self.mode = BrowserMode::Listing;
                self.rows = page.transactions;
                self.cursor = page.cursor;
                self.has_more = page.has_more && !self.rows.is_empty();
            }
            (FetchKind::NextPage, FetchOutcome::Page(page)) => {
                self.mode = BrowserMode::Listing;
                if page.transactions.is_empty() {
                    // An empty page is always terminal.
                    self.has_more = false;
                    self.cursor = None;
                } else {
                    self.rows.extend(page.transactions);
                    self.cursor = page.cursor;
                    self.has_more = page.has_more;
                }
            }
            (FetchKind::Search, FetchOutcome::SearchResults(results)) => {
                self.mode = BrowserMode::Searching;
                self.rows = results;
                self.cursor = None;
                self.has_more = false;
            }
            (kind, outcome) => {
                tracing::warn!(?kind, ?outcome, "Mismatched fetch outcome, ignoring");
                return;
            }
        }
    }

    pub async fn load_first_page<S: TransactionStore + ?Sized>(&mut self, store: &S) {
        let ticket = self.begin(FetchKind::FirstPage);
        let result = store.list_all(None).await.map(FetchOutcome::Page);
        self.complete(ticket, result);
    }

    pub async fn load_more<S: TransactionStore + ?Sized>(&mut self, store: &S) {
        if !self.has_more {
            return;
        }
        let cursor = self.cursor.clone();
        let ticket = self.begin(FetchKind::NextPage);
        let result = store
            .list_all(cursor.as_deref())
            .await
            .map(FetchOutcome::Page);
        self.complete(ticket, result);
    }

    /// An empty or whitespace-only term resets to the first listing page
    /// instead of issuing a search round trip.
    pub async fn submit_search<S: TransactionStore + ?Sized>(&mut self, store: &S, term: &str) {
        if term.trim().is_empty() {
            self.load_first_page(store).await;
            return;
        }
        let ticket = self.begin(FetchKind::Search);
        let result = store.search(term).await.map(FetchOutcome::SearchResults);
        self.complete(ticket, result);
    }

    /// Opens the detail overlay for one row. Overlay state is additive: the
    /// listing or search state underneath is untouched.
    pub async fn show_detail<S: TransactionStore + ?Sized>(
        &mut self,
        store: &S,
        id: &str,
    ) -> Result<(), LimitterError> {
        let details = store.details(id).await?;
        self.detail = Some(details);
        Ok(())
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }
}

impl Default for AdminBrowser {
    fn default() -> Self {
        Self::new()
    }
}
