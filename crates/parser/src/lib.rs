//! Small hand-written scanners used by the rest of the workspace.
//! - `script`: split SQL text into statements without breaking quoted text or comments
//! - `step`: read the HEADER section of an ISO-10303-21 (IFC) file

pub mod script;
pub mod step;

pub use script::{Statement, split_statements};
pub use step::{StepError, StepHeader, parse_header};
