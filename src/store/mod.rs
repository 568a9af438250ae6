//! In-process stores. Each one owns its collection behind a `tokio::sync::RwLock`
//! and is shared with handlers through an `Arc`.

pub mod credentials;
pub mod users;

pub use self::credentials::{Credential, CredentialStore, DuplicateEmail};
pub use self::users::{NewUser, Role, User, UserChanges, UserStore};
