//! Storage layer: a JSON document of journals, articles, repositories and
//! preprints standing in for the publishing platform's database.

mod error;
mod json;

pub use error::StoreError;
pub use json::JsonStore;
