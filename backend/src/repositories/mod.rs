//! Store traits and their Postgres implementations. Every account state
//! transition is a single conditional UPDATE so concurrent requests for
//! the same account cannot lose writes.

pub mod api_key;
pub mod event;
pub mod memory;
pub mod update;
pub mod user;

use thiserror::Error;

pub use api_key::{ApiKeyStore, PgApiKeyStore};
pub use event::{EventStore, PgEventStore};
pub use memory::{MemoryApiKeyStore, MemoryEventStore, MemoryUpdateStore, MemoryUserStore};
pub use update::{PgUpdateStore, UpdateStore};
pub use user::{PgUserStore, UserStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email is already in use")]
    DuplicateEmail,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Maps a unique-constraint violation on the users email index to the
/// typed duplicate error; everything else passes through.
pub(crate) fn map_unique_email(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db) = err {
        if db.code().as_deref() == Some("23505") {
            return StoreError::DuplicateEmail;
        }
    }
    StoreError::Database(err)
}
