pub mod gateway;
pub mod store;

pub use gateway::StripeGateway;
pub use store::{PageCursor, RedisTransactionStore, TransactionStore, SEARCH_LIMIT};
