pub mod health;
pub mod payment;
pub mod transactions;

pub use health::*;
pub use payment::*;
pub use transactions::*;

use crate::services::{StripeGateway, TransactionStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TransactionStore>,
    pub gateway: Arc<StripeGateway>,
}
