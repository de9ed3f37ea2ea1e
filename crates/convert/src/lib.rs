//! IFC-to-DuckDB conversion front-end.
//!
//! The conversion itself (schema extraction, geometry, property sets) is done by
//! the external `ifc2duckdb` Python package. This crate opens the source
//! document, hands it to that package through a small embedded shim and reports
//! where the database ended up.

mod document;
mod error;
mod patcher;

pub use document::IfcDocument;
pub use error::ConvertError;
pub use patcher::{Converter, PatchOptions, Patcher};
