//! Durable formats around a label session: result exports, taxonomy mapping
//! files, and the JSON history file.

pub mod errors;
pub mod export;
pub mod history_file;
pub mod mapping_file;

pub use errors::FormatError;
pub use export::{export_session, render_export, ExportFormat, ExportReport, LabelDistribution};
pub use history_file::{history_backend, open_session, JsonHistoryFile};
pub use mapping_file::{taxonomy_to_json, write_taxonomy};
