//! Blob storage contract shared by the record repositories.

mod secure_store;

pub use secure_store::{InMemorySecureStore, SecureStore, StoreError};
