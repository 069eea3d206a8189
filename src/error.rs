// Error types for chart construction

use thiserror::Error;

/// Errors that stop a chart from being laid out.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ChartError {
    #[error("renderer has no mounted surface to draw on")]
    MissingSurface,

    #[error("surface size {width}x{height} must be positive and finite")]
    InvalidSurface { width: f64, height: f64 },

    #[error("tick size {0} must be positive and finite to synthesize ticks")]
    InvalidTickSize(f64),

    #[error("cannot synthesize ticks between {min} and {max}")]
    InvalidTickRange { min: f64, max: f64 },

    #[error("chart type '{0}' is enabled in the options but not registered")]
    UnknownChartType(String),
}

pub type Result<T> = std::result::Result<T, ChartError>;
