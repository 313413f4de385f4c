//! Pipeline module - dataset construction, fairness metrics and mitigation

pub mod audit;
pub mod dataset;
pub mod error;
pub mod group;
pub mod loader;
pub mod metric;
pub mod reweighing;
pub mod schema;
pub mod split;
pub mod weights;

pub use audit::*;
pub use dataset::*;
pub use error::{FairnessError, Result};
pub use group::GroupSelector;
pub use loader::*;
pub use metric::*;
pub use reweighing::*;
pub use schema::*;
pub use split::*;
pub use weights::*;
