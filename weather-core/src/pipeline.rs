//! Raw API documents in, display record and chart specifications out.

pub mod chart;
pub mod normalize;
pub mod series;

pub use chart::{ChartBundle, compose};
pub use normalize::normalize;
pub use series::build_series;
