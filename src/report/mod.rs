//! Report module - presenting and exporting audit results

pub mod export;
pub mod summary;

pub use export::*;
pub use summary::*;
