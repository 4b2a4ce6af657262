// ABOUTME: File-backed client-side storage for easyads.
// ABOUTME: Persists string values by key in a single JSON document under the client home directory.

pub mod local;

pub use local::{LocalStorage, STORAGE_FILE};
