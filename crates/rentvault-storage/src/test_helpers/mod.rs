//! Test helpers for crates that drive the gateway against storage.

mod mock_storage;

pub use mock_storage::{MockStorage, StoredObject};
