//! Exposure series transformation and the chart rendering boundary.
//!
//! - `build_series`: raw exposure records → downsampled, sign-normalized
//!   `ChartSeries`
//! - `ChartStyle`: theme-derived rendering parameters
//! - `ChartRenderer`: the narrow capability the pipeline renders through;
//!   implementations own pixels, never data decisions

pub mod renderer;
pub mod style;
pub mod transform;

pub use renderer::{Card, CardView, ChartRenderer, LogRenderer, ERROR_LOADING_DATA};
pub use style::{ChartStyle, LegendOrientation};
pub use transform::{build_series, sample_series, series_title, TARGET_BAR_COUNT};
