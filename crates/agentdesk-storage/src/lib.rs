//! Concrete storage implementations with encryption at rest.
//! Uses AES-GCM with keys sourced from the OS keyring (or test doubles), both
//! for the record blob store and for the wallet credential vault.

mod cipher;
pub mod key_provider;
pub mod secure_file_store;
pub mod vault;
