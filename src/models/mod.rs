pub mod payment;
pub mod response;
pub mod transaction;
pub mod user;

pub use payment::*;
pub use response::*;
pub use transaction::*;
pub use user::*;
