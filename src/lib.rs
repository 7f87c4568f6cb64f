pub mod actual;
pub mod cli;
pub mod config;
pub mod error;
pub mod ground_truth;
pub mod pipeline;
pub mod report;
pub mod scoring;
pub mod store;
pub mod util;

pub use actual::ActualDoc;
pub use error::{ErrorClass, SplitCheckError};
pub use ground_truth::{ExpectedDoc, ExpectedResultSet, PageEntry};
pub use report::{DocValidationResult, OverallValidationResult};
pub use scoring::{validate_doc, validate_split};
