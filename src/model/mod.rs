//! Data carried between the page, the API and the panels.

pub mod types;

pub use types::{Query, ResultRecord};
