//! Session credential state.
//!
//! One [`SessionStore`] exists per process. It holds the bearer token and
//! identity of the signed-in user and persists the token through a
//! [`CredentialStorage`] backend so a restart stays signed in.

mod credential;
mod storage;
mod store;

pub use credential::{Credential, UserIdentity};
pub(crate) use credential::string_or_number;
pub use storage::{CredentialStorage, FileStorage, MemoryStorage, StorageError};
pub use store::{SessionStore, TOKEN_KEY};
