//! Tabular exam-results export: typed rows, exam-name normalization and
//! the selection queries behind the analysis tool's filters.

pub mod record;
pub mod resolver;
pub mod table;

pub use record::{CENTRALIZED_EXAM, ExamRecord, SchoolLevel};
pub use resolver::resolve;
pub use table::ExamTable;
