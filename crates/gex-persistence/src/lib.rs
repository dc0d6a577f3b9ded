//! Client preference persistence for the gamma exposure dashboard.
//!
//! Stores small string values (theme preference, notes markup) under fixed
//! keys in a single JSON file.

pub mod error;
pub mod store;

pub use error::{PersistenceError, PersistenceResult};
pub use store::{PreferenceStore, NOTES_KEY, THEME_KEY};
