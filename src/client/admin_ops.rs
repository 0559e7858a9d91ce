//! Helpers for the `admin-flag` console binary.
//!
//! Granting admin is a deliberate out-of-band operation: the service exposes
//! no route that writes `is_admin`, so the only path is a manual edit of the
//! user document in the store. This module prints those manual steps and can
//! report a user's current flag; it never writes the flag itself.

use crate::error::LimitterError;
use crate::services::{RedisTransactionStore, TransactionStore};

/// Manual, copy-pasteable steps for flipping `is_admin` on one user document.
pub fn grant_instructions(user_id: &str) -> String {
    format!(
        "To grant admin access, edit the user document by hand:\n\
         \n\
         1. Open a redis-cli against the store:\n\
         \n\
         \x20   redis-cli -u $REDIS_URL\n\
         \n\
         2. Fetch the current document:\n\
         \n\
         \x20   GET user:{id}\n\
         \n\
         3. Re-set it with \"is_admin\": true in the JSON body:\n\
         \n\
         \x20   SET user:{id} '<document with \"is_admin\": true>'\n\
         \n\
         4. Verify with this tool:\n\
         \n\
         \x20   admin-flag {id}\n",
        id = user_id
    )
}

/// Current `is_admin` flag for a user, or `None` if the user does not exist.
pub async fn report_admin_flag(
    store: &RedisTransactionStore,
    user_id: &str,
) -> Result<Option<bool>, LimitterError> {
    Ok(store.get_user(user_id).await?.map(|user| user.is_admin))
}
