use crate::error::LimitterError;
use crate::models::{
    Transaction, TransactionDetails, TransactionPage, TransactionView, User, UserSummary,
    PAGE_SIZE,
};
use anyhow::Result;
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use redis::AsyncCommands;

/// Search is a single best-effort batch, never paginated.
pub const SEARCH_LIMIT: usize = 50;

/// How many recent documents a search scans before giving up.
const SEARCH_SCAN_DEPTH: isize = 500;

/// Opaque pagination token: position of the last returned row in the
/// newest-first ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    pub micros: i64,
    pub id: String,
}

impl PageCursor {
    pub fn from_transaction(tx: &Transaction) -> Self {
        Self {
            micros: tx.timestamp.timestamp_micros(),
            id: tx.id.clone(),
        }
    }

    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(format!("{}:{}", self.micros, self.id))
    }

    pub fn decode(token: &str) -> Result<Self, LimitterError> {
        let invalid = || LimitterError::Validation("Invalid pagination cursor".to_string());
        let raw = URL_SAFE_NO_PAD.decode(token).map_err(|_| invalid())?;
        let raw = String::from_utf8(raw).map_err(|_| invalid())?;
        let (micros, id) = raw.split_once(':').ok_or_else(invalid)?;
        let micros = micros.parse().map_err(|_| invalid())?;
        if id.is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            micros,
            id: id.to_string(),
        })
    }
}

/// Read contract the admin browser and user feed depend on.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// One page of all transactions, newest first. `has_more` is exact
    /// (page_size + 1 fetch, trimmed), not inferred from page length.
    async fn list_all(&self, cursor: Option<&str>) -> Result<TransactionPage, LimitterError>;

    /// Single batch of transactions whose id or owning user id contains
    /// `term`, capped at [`SEARCH_LIMIT`]. Callers handle the empty-term case
    /// by falling back to `list_all(None)`.
    async fn search(&self, term: &str) -> Result<Vec<TransactionView>, LimitterError>;

    /// Transaction joined with its owning user. A missing user degrades to
    /// placeholder fields; a missing transaction is `NotFound`.
    async fn details(&self, id: &str) -> Result<TransactionDetails, LimitterError>;

    /// All of one user's transactions, newest first.
    async fn for_user(&self, user_id: &str) -> Result<Vec<TransactionView>, LimitterError>;

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, LimitterError>;
}

/// Builds a page from a newest-first batch fetched one row past the page size.
fn page_from(mut batch: Vec<Transaction>) -> TransactionPage {
    let has_more = batch.len() > PAGE_SIZE;
    batch.truncate(PAGE_SIZE);
    let cursor = if has_more {
        batch
            .last()
            .map(|tx| PageCursor::from_transaction(tx).encode())
    } else {
        None
    };
    TransactionPage {
        transactions: batch.iter().map(Transaction::to_view).collect(),
        cursor,
        has_more,
    }
}

/// Rows sharing the cursor's timestamp that sort strictly after it. Equal
/// scores order by member, so newest-first means descending id within a tie.
fn ids_after_tie(tied: Vec<String>, cursor_id: &str) -> Vec<String> {
    tied.into_iter()
        .filter(|id| id.as_str() < cursor_id)
        .collect()
}

fn details_from(tx: Transaction, user: Option<User>) -> TransactionDetails {
    TransactionDetails {
        transaction_id: tx.id.clone(),
        payment_method: tx.payment_method.clone(),
        user: user
            .as_ref()
            .map(UserSummary::from)
            .unwrap_or_else(UserSummary::unknown),
        transaction: tx.to_view(),
    }
}

fn matches_term(tx: &Transaction, needle: &str) -> bool {
    tx.id.to_lowercase().contains(needle) || tx.user_id.to_lowercase().contains(needle)
}

/// Document-store backend: JSON documents under `tx:{id}` / `user:{id}` with
/// sorted-set indexes ordering transactions by creation time.
pub struct RedisTransactionStore {
    redis: redis::aio::ConnectionManager,
}

const TX_INDEX: &str = "tx:by_time";

fn tx_key(id: &str) -> String {
    format!("tx:{}", id)
}

fn user_key(id: &str) -> String {
    format!("user:{}", id)
}

fn user_index(user_id: &str) -> String {
    format!("tx:user:{}", user_id)
}

impl RedisTransactionStore {
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let redis = client.get_connection_manager().await?;
        tracing::info!("Transaction store connected");
        Ok(Self { redis })
    }

    pub async fn ping(&self) -> bool {
        let mut redis = self.redis.clone();
        redis::cmd("PING")
            .query_async::<_, String>(&mut redis)
            .await
            .is_ok()
    }

    /// Write path for the payment-completion pipeline and seeding scripts.
    /// Not part of [`TransactionStore`]: the serving layer is read-only.
    pub async fn insert_transaction(&self, tx: &Transaction) -> Result<(), LimitterError> {
        let mut redis = self.redis.clone();
        let doc = serde_json::to_string(tx)
            .map_err(|e| LimitterError::Store(format!("Serialize transaction: {}", e)))?;
        let score = tx.timestamp.timestamp_micros();

        redis.set::<_, _, ()>(tx_key(&tx.id), doc).await?;
        redis.zadd::<_, _, _, ()>(TX_INDEX, &tx.id, score).await?;
        redis
            .zadd::<_, _, _, ()>(user_index(&tx.user_id), &tx.id, score)
            .await?;
        Ok(())
    }

    pub async fn put_user(&self, user: &User) -> Result<(), LimitterError> {
        let mut redis = self.redis.clone();
        let doc = serde_json::to_string(user)
            .map_err(|e| LimitterError::Store(format!("Serialize user: {}", e)))?;
        redis.set::<_, _, ()>(user_key(&user.id), doc).await?;
        Ok(())
    }

    async fn load_docs(&self, ids: &[String]) -> Result<Vec<Transaction>, LimitterError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut redis = self.redis.clone();
        let keys: Vec<String> = ids.iter().map(|id| tx_key(id)).collect();
        let docs: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&keys)
            .query_async(&mut redis)
            .await?;

        let mut transactions = Vec::with_capacity(ids.len());
        for (id, doc) in ids.iter().zip(docs) {
            match doc {
                Some(raw) => match serde_json::from_str(&raw) {
                    Ok(tx) => transactions.push(tx),
                    Err(e) => tracing::warn!("Skipping malformed document {}: {}", id, e),
                },
                // Index entry without a document: deleted out of band.
                None => tracing::warn!("Dangling index entry for {}", id),
            }
        }
        Ok(transactions)
    }
}

#[async_trait]
impl TransactionStore for RedisTransactionStore {
    async fn list_all(&self, cursor: Option<&str>) -> Result<TransactionPage, LimitterError> {
        let mut redis = self.redis.clone();

        // Scores are creation-time micros and can collide. Equal scores sort
        // by member, so a resumed page first drains the rows tied with the
        // cursor's timestamp and only then continues strictly past it.
        let mut ids: Vec<String> = Vec::new();
        let older_bound = match cursor {
            Some(token) => {
                let after = PageCursor::decode(token)?;
                let tied: Vec<String> = redis::cmd("ZREVRANGEBYSCORE")
                    .arg(TX_INDEX)
                    .arg(after.micros)
                    .arg(after.micros)
                    .query_async(&mut redis)
                    .await?;
                ids.extend(ids_after_tie(tied, &after.id));
                format!("({}", after.micros)
            }
            None => "+inf".to_string(),
        };

        if ids.len() < PAGE_SIZE + 1 {
            let older: Vec<String> = redis::cmd("ZREVRANGEBYSCORE")
                .arg(TX_INDEX)
                .arg(older_bound)
                .arg("-inf")
                .arg("LIMIT")
                .arg(0)
                .arg(PAGE_SIZE + 1 - ids.len())
                .query_async(&mut redis)
                .await?;
            ids.extend(older);
        } else {
            ids.truncate(PAGE_SIZE + 1);
        }

        Ok(page_from(self.load_docs(&ids).await?))
    }

    async fn search(&self, term: &str) -> Result<Vec<TransactionView>, LimitterError> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let mut redis = self.redis.clone();
        let ids: Vec<String> = redis
            .zrevrange(TX_INDEX, 0, SEARCH_SCAN_DEPTH - 1)
            .await?;

        let matches = self
            .load_docs(&ids)
            .await?
            .into_iter()
            .filter(|tx| matches_term(tx, &needle))
            .take(SEARCH_LIMIT)
            .map(|tx| tx.to_view())
            .collect();
        Ok(matches)
    }

    async fn details(&self, id: &str) -> Result<TransactionDetails, LimitterError> {
        let mut redis = self.redis.clone();
        let doc: Option<String> = redis.get(tx_key(id)).await?;
        let raw = doc.ok_or_else(|| LimitterError::NotFound(format!("transaction {}", id)))?;
        let tx: Transaction = serde_json::from_str(&raw)
            .map_err(|e| LimitterError::Store(format!("Malformed document {}: {}", id, e)))?;

        let user = self.get_user(&tx.user_id).await?;
        Ok(details_from(tx, user))
    }

    async fn for_user(&self, user_id: &str) -> Result<Vec<TransactionView>, LimitterError> {
        let mut redis = self.redis.clone();
        let ids: Vec<String> = redis.zrevrange(user_index(user_id), 0, -1).await?;
        Ok(self
            .load_docs(&ids)
            .await?
            .iter()
            .map(Transaction::to_view)
            .collect())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, LimitterError> {
        let mut redis = self.redis.clone();
        let doc: Option<String> = redis.get(user_key(user_id)).await?;
        match doc {
            Some(raw) => {
                let user = serde_json::from_str(&raw).map_err(|e| {
                    LimitterError::Store(format!("Malformed user {}: {}", user_id, e))
                })?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::memory::MemoryTransactionStore;
    use super::*;
    use crate::models::{TransactionKind, TransactionStatus};
    use chrono::{Duration, TimeZone, Utc};

    pub(crate) fn seed_transaction(n: i64) -> Transaction {
        let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        Transaction {
            id: format!("tx_{:03}", n),
            user_id: format!("user_{}", n % 3),
            kind: TransactionKind::PlanPurchase {
                plan: "pro".to_string(),
                quantity: 1,
            },
            amount: 999 + n,
            status: TransactionStatus::Completed,
            timestamp: base + Duration::minutes(n),
            payment_method: None,
        }
    }

    fn seeded(count: i64) -> MemoryTransactionStore {
        let store = MemoryTransactionStore::new();
        for n in 0..count {
            store.insert_transaction(seed_transaction(n));
        }
        store
    }

    #[test]
    fn cursor_roundtrips() {
        let cursor = PageCursor {
            micros: 1_700_000_123_456,
            id: "tx_042".to_string(),
        };
        assert_eq!(PageCursor::decode(&cursor.encode()).unwrap(), cursor);
    }

    #[test]
    fn garbage_cursor_is_a_validation_error() {
        assert!(matches!(
            PageCursor::decode("not a cursor!"),
            Err(LimitterError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn twenty_five_rows_paginate_as_ten_ten_five() {
        let store = seeded(25);

        let first = store.list_all(None).await.unwrap();
        assert_eq!(first.transactions.len(), 10);
        assert!(first.has_more);

        let second = store
            .list_all(first.cursor.as_deref())
            .await
            .unwrap();
        assert_eq!(second.transactions.len(), 10);
        assert!(second.has_more);

        let third = store
            .list_all(second.cursor.as_deref())
            .await
            .unwrap();
        assert_eq!(third.transactions.len(), 5);
        assert!(!third.has_more);
        assert!(third.cursor.is_none());
    }

    #[tokio::test]
    async fn exact_multiple_of_page_size_has_no_phantom_page() {
        let store = seeded(20);

        let first = store.list_all(None).await.unwrap();
        let second = store.list_all(first.cursor.as_deref()).await.unwrap();
        assert_eq!(second.transactions.len(), 10);
        assert!(!second.has_more);
        assert!(second.cursor.is_none());
    }

    #[tokio::test]
    async fn following_cursors_reproduces_the_full_sequence() {
        let store = seeded(25);

        let mut seen = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = store.list_all(cursor.as_deref()).await.unwrap();
            seen.extend(
                page.transactions
                    .iter()
                    .map(|v| v.transaction.id.clone()),
            );
            if !page.has_more {
                break;
            }
            cursor = page.cursor;
        }

        let expected: Vec<String> = (0..25).rev().map(|n| format!("tx_{:03}", n)).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn tie_rows_resume_strictly_after_the_cursor() {
        let tied: Vec<String> = ["tx_c", "tx_b", "tx_a"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(ids_after_tie(tied.clone(), "tx_b"), vec!["tx_a".to_string()]);
        assert_eq!(
            ids_after_tie(tied.clone(), "tx_d"),
            vec!["tx_c".to_string(), "tx_b".to_string(), "tx_a".to_string()]
        );
        assert!(ids_after_tie(tied, "tx_a").is_empty());
    }

    #[tokio::test]
    async fn equal_timestamps_at_a_page_boundary_lose_no_rows() {
        let store = MemoryTransactionStore::new();
        let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();

        // Two rows share one timestamp; nine newer rows push the pair onto
        // the first page boundary.
        for id in ["tx_a", "tx_b"] {
            let mut tx = seed_transaction(0);
            tx.id = id.to_string();
            tx.timestamp = base;
            store.insert_transaction(tx);
        }
        for n in 1..=9i64 {
            let mut tx = seed_transaction(n);
            tx.timestamp = base + Duration::minutes(n);
            store.insert_transaction(tx);
        }

        let first = store.list_all(None).await.unwrap();
        assert_eq!(first.transactions.len(), 10);
        assert!(first.has_more);
        assert_eq!(
            first.transactions.last().unwrap().transaction.id,
            "tx_b"
        );

        let second = store.list_all(first.cursor.as_deref()).await.unwrap();
        let ids: Vec<&str> = second
            .transactions
            .iter()
            .map(|v| v.transaction.id.as_str())
            .collect();
        assert_eq!(ids, vec!["tx_a"]);
        assert!(!second.has_more);
    }

    #[tokio::test]
    async fn empty_store_yields_a_terminal_empty_page() {
        let store = MemoryTransactionStore::new();
        let page = store.list_all(None).await.unwrap();
        assert!(page.transactions.is_empty());
        assert!(!page.has_more);
        assert!(page.cursor.is_none());
    }

    #[tokio::test]
    async fn search_matches_transaction_and_user_ids() {
        let store = seeded(5);

        let by_tx = store.search("tx_003").await.unwrap();
        assert_eq!(by_tx.len(), 1);
        assert_eq!(by_tx[0].transaction.id, "tx_003");

        // user_1 owns tx_001 and tx_004
        let by_user = store.search("USER_1").await.unwrap();
        assert_eq!(by_user.len(), 2);
        assert!(by_user.iter().all(|v| v.transaction.user_id == "user_1"));
    }

    #[tokio::test]
    async fn blank_search_term_returns_nothing() {
        let store = seeded(5);
        assert!(store.search("   ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn details_joins_the_owning_user() {
        let store = seeded(3);
        store.put_user(User {
            id: "user_1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            plan: "pro".to_string(),
            is_admin: false,
        });

        let details = store.details("tx_001").await.unwrap();
        assert_eq!(details.transaction_id, "tx_001");
        assert_eq!(details.user.name, "Ada");
        assert_eq!(details.user.email, "ada@example.com");
    }

    #[tokio::test]
    async fn details_with_missing_user_degrades_to_placeholder() {
        let store = seeded(3);
        let details = store.details("tx_002").await.unwrap();
        assert_eq!(details.user.name, "Unknown");
    }

    #[tokio::test]
    async fn details_miss_is_not_found() {
        let store = seeded(1);
        assert!(matches!(
            store.details("tx_999").await,
            Err(LimitterError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn for_user_returns_only_that_users_rows_newest_first() {
        let store = seeded(9);
        let rows = store.for_user("user_2").await.unwrap();
        let ids: Vec<&str> = rows.iter().map(|v| v.transaction.id.as_str()).collect();
        assert_eq!(ids, vec!["tx_008", "tx_005", "tx_002"]);
    }
}
