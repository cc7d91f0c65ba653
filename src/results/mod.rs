//! The results dataset engine.
//!
//! Everything between a downloaded prediction CSV and what the dashboard
//! renders: decoding, the correction overlay, filtered/paginated views,
//! chart aggregations, and CSV export.

pub mod analytics;
pub mod browser;
pub mod confusion;
pub mod decode;
pub mod export;
pub mod label;
pub mod query;
pub mod store;

pub use browser::ResultsBrowser;
pub use decode::{DecodeError, PredictionRow, decode};
pub use label::{InvalidLabelError, Label};
pub use query::{PageDescriptor, QueryPredicate, RESULT_PAGE_SIZE};
pub use store::{CorrectionError, RowStore};
