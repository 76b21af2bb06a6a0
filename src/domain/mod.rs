//! Domain layer for the records standardizer
//!
//! Architecture: Domain Model - Pure data for birth records and their derived summaries
//! - Records and record sets are plain string-keyed tables, independent of file formats
//! - Resolved addresses and summary rows are value objects produced by the services
//! - Error types express the failure vocabulary shared by every layer

pub mod records;
pub mod run;
pub mod summary;

// Re-export main domain types for convenience
pub use records::*;
pub use run::*;
pub use summary::*;
