//! Sheet store implementations.

pub mod auth;
pub mod google;
pub mod memory;

pub use auth::{RefreshingToken, SheetsAuth};
pub use google::GoogleSheetsStore;
pub use memory::InMemorySheetStore;
