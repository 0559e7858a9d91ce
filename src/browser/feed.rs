use crate::models::TransactionView;
use crate::services::TransactionStore;

/// Driver for a single user's reverse-chronological transaction feed.
///
/// The feed refetches only when the user identity changes (including
/// absent-to-present). An absent or empty user id never triggers a fetch; a
/// failed fetch degrades to an empty list and is logged, with no retry.
pub struct UserTransactionList {
    user_id: Option<String>,
    rows: Vec<TransactionView>,
    stale: bool,
}

impl UserTransactionList {
    pub fn new() -> Self {
        Self {
            user_id: None,
            rows: Vec::new(),
            stale: false,
        }
    }

    pub fn rows(&self) -> &[TransactionView] {
        &self.rows
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// True when the identity changed since the last refresh.
    pub fn needs_refresh(&self) -> bool {
        self.stale
    }

    /// Records the signed-in identity. An empty id is treated as absent.
    pub fn set_user(&mut self, user_id: Option<&str>) {
        let normalized = user_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        if normalized == self.user_id {
            return;
        }

        self.rows.clear();
        // Nothing to fetch for a signed-out identity.
        self.stale = normalized.is_some();
        self.user_id = normalized;
    }

    pub async fn refresh<S: TransactionStore + ?Sized>(&mut self, store: &S) {
        self.stale = false;
        let Some(user_id) = self.user_id.clone() else {
            self.rows.clear();
            return;
        };

        match store.for_user(&user_id).await {
            Ok(rows) => self.rows = rows,
            Err(e) => {
                tracing::error!(%user_id, "Failed to load transactions: {}", e);
                self.rows.clear();
            }
        }
    }
}

impl Default for UserTransactionList {
    fn default() -> Self {
        Self::new()
    }
}
