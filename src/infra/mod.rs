//! Infrastructure adapters for job and provider storage.

pub mod store;
