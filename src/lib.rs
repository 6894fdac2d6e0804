//! Weekly plan vs. inventory reconciliation.
//!
//! Joins a weekly demand/production plan against multi-location stock and
//! prior shortage-report comments, producing the shortage report for a
//! chosen date window. The core pipeline is a pure, synchronous function
//! over in-memory record sets; CSV loading and serialization live at the
//! edges in [`ShortfallModel`] and [`ShortageReport`].

pub mod comments;
pub mod dates;
pub mod error;
pub mod join;
pub mod key;
pub mod model;
pub mod pipeline;
pub mod plan;
pub mod report;
pub mod schema;
pub mod stock;

pub use dates::DateRange;
pub use error::ReconcileError;
pub use model::ShortfallModel;
pub use pipeline::{build_shortage_report, ReconcileInputs};
pub use report::ShortageReport;
