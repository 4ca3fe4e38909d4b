//! Process-scoped stores.

mod sessions;

pub use sessions::{SessionHandle, SessionStore};
