use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Fixed page size for the admin transaction listing.
pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Completed,
    Pending,
    Failed,
    #[serde(other)]
    Unknown,
}

/// Purchase kind with its kind-specific metadata. Serialized adjacently so the
/// wire shape stays `{"type": ..., "metadata": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "metadata", rename_all = "snake_case")]
pub enum TransactionKind {
    PlanPurchase {
        plan: String,
        #[serde(default = "default_quantity")]
        quantity: u32,
    },
    OverridePurchase {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        site: Option<String>,
        #[serde(default = "default_quantity")]
        quantity: u32,
    },
}

fn default_quantity() -> u32 {
    1
}

/// A completed (or attempted) purchase as stored in the document store.
/// Read-only from the API's perspective; writes happen on the payment
/// completion path outside this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    #[serde(flatten)]
    pub kind: TransactionKind,
    /// Minor units (cents).
    pub amount: i64,
    pub status: TransactionStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
}

impl Transaction {
    /// USD display string with thousands grouping, e.g. `$1,019.99`.
    pub fn formatted_amount(&self) -> String {
        let cents = self.amount.unsigned_abs();
        let sign = if self.amount < 0 { "-" } else { "" };

        let dollars = (cents / 100).to_string();
        let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
        for (i, digit) in dollars.chars().enumerate() {
            if i > 0 && (dollars.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }

        format!("{}${}.{:02}", sign, grouped, cents % 100)
    }

    /// Calendar-date display string, e.g. `Aug 29, 2026`.
    pub fn formatted_date(&self) -> String {
        const MONTHS: [&str; 12] = [
            "Jan", "Feb", "Mar", "Apr", "May", "Jun",
            "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
        ];
        let month = MONTHS[self.timestamp.month0() as usize];
        format!("{} {}, {}", month, self.timestamp.day(), self.timestamp.year())
    }

    pub fn to_view(&self) -> TransactionView {
        TransactionView {
            formatted_amount: self.formatted_amount(),
            formatted_date: self.formatted_date(),
            transaction: self.clone(),
        }
    }
}

/// Wire view of a transaction with the derived display fields attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionView {
    #[serde(flatten)]
    pub transaction: Transaction,
    #[serde(rename = "formattedAmount")]
    pub formatted_amount: String,
    #[serde(rename = "formattedDate")]
    pub formatted_date: String,
}

/// One page of the admin listing. `has_more` is exact: the store fetches one
/// row past the page and trims, so an equal-to-page-size final page does not
/// produce a phantom extra page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionPage {
    pub transactions: Vec<TransactionView>,
    #[serde(rename = "lastDoc")]
    pub cursor: Option<String>,
    pub has_more: bool,
}

impl TransactionPage {
    pub fn empty() -> Self {
        Self {
            transactions: Vec::new(),
            cursor: None,
            has_more: false,
        }
    }
}

/// A transaction joined with the owning user, built on demand for the admin
/// detail view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionDetails {
    pub transaction_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    pub user: super::UserSummary,
    pub transaction: TransactionView,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Transaction {
        Transaction {
            id: "tx_1".to_string(),
            user_id: "user_1".to_string(),
            kind: TransactionKind::PlanPurchase {
                plan: "pro".to_string(),
                quantity: 1,
            },
            amount: 1999,
            status: TransactionStatus::Completed,
            timestamp: Utc.with_ymd_and_hms(2026, 8, 29, 12, 0, 0).unwrap(),
            payment_method: Some("card".to_string()),
        }
    }

    #[test]
    fn formats_minor_units_as_usd() {
        let mut tx = sample();
        assert_eq!(tx.formatted_amount(), "$19.99");
        tx.amount = 5;
        assert_eq!(tx.formatted_amount(), "$0.05");
        tx.amount = 100_000;
        assert_eq!(tx.formatted_amount(), "$1,000.00");
        tx.amount = 123_456_789;
        assert_eq!(tx.formatted_amount(), "$1,234,567.89");
        tx.amount = -1999;
        assert_eq!(tx.formatted_amount(), "-$19.99");
    }

    #[test]
    fn formats_calendar_date() {
        assert_eq!(sample().formatted_date(), "Aug 29, 2026");
    }

    #[test]
    fn kind_serializes_as_type_plus_metadata() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["type"], "plan_purchase");
        assert_eq!(value["metadata"]["plan"], "pro");
        assert_eq!(value["metadata"]["quantity"], 1);
    }

    #[test]
    fn unknown_status_survives_deserialization() {
        let status: TransactionStatus = serde_json::from_str("\"requires_action\"").unwrap();
        assert_eq!(status, TransactionStatus::Unknown);
    }

    #[test]
    fn view_carries_display_fields() {
        let value = serde_json::to_value(sample().to_view()).unwrap();
        assert_eq!(value["formattedAmount"], "$19.99");
        assert_eq!(value["formattedDate"], "Aug 29, 2026");
        assert_eq!(value["id"], "tx_1");
    }
}
