// Library exports for chartlayout

pub mod axis;
pub mod chart;
pub mod chart_types;
pub mod config;
pub mod csv_reader;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod legend;
pub mod logging;
pub mod palette;
pub mod render;
pub mod series;
pub mod tooltip;
pub mod value;

pub use chart::{Chart, ChartBuilder, ChartEvent};
pub use config::ChartOptions;
pub use error::{ChartError, Result};
pub use render::{RecordingRenderer, Renderer};
pub use value::Value;
