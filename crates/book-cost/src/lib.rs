//! Print-production costing for custom printed books.
//!
//! A request flows one way through four pure calculations:
//! format → [`impose_format`] → [`SheetDemand`] → [`PriceCurve`] → [`compute_cost`].

pub mod constants;
mod cost;
mod curve;
mod demand;
mod imposition;
mod process;
mod types;

pub use cost::{CostBreakdown, compute_breakdown, compute_cost, quote_table};
pub use curve::{PriceCurve, progress};
pub use demand::SheetDemand;
pub use imposition::{ImpositionFit, impose_format, pages_per_sheet};
pub use process::*;
pub use types::*;
