// Chart options: every field optional, defaults applied by the component that reads it

use crate::axis::Tick;
use indexmap::IndexMap;
use serde::Deserialize;

/// Top-level chart options
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartOptions {
    /// Surface width, defaults to the renderer's surface
    pub width: Option<f64>,
    /// Surface height, defaults to the renderer's surface
    pub height: Option<f64>,
    /// Series colors, generated from the palette when empty
    pub colors: Vec<String>,
    /// Axes keyed by name ("x", "y", ...), built in this order
    pub axis: IndexMap<String, AxisConfig>,
    /// No legend unless configured
    pub legend: Option<LegendConfig>,
    pub grid: GridConfig,
    /// Remaining keys are chart-type sub-objects, e.g. `"line": {}`
    #[serde(flatten)]
    pub charts: IndexMap<String, serde_json::Value>,
}

impl ChartOptions {
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn with_axis(mut self, key: impl Into<String>, config: AxisConfig) -> Self {
        self.axis.insert(key.into(), config);
        self
    }

    pub fn with_chart(mut self, name: impl Into<String>, options: serde_json::Value) -> Self {
        self.charts.insert(name.into(), options);
        self
    }

    /// Options sub-object of a chart type, `None` when the type is absent,
    /// `null` or `false`
    pub fn chart_options(&self, name: &str) -> Option<&serde_json::Value> {
        self.charts
            .get(name)
            .filter(|v| !matches!(v, serde_json::Value::Null | serde_json::Value::Bool(false)))
    }
}

/// Axis options as supplied by the caller
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AxisConfig {
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Tick spacing in data units
    pub tick_size: Option<f64>,
    /// Tick spacing in pixels
    pub tick_width: Option<f64>,
    pub ticks: Option<Vec<Tick>>,
    /// Counter-clockwise rotation in degrees
    #[serde(alias = "rotateDegrees")]
    pub rotate: Option<f64>,
    /// Leading blank tick slots
    pub pop: Option<usize>,
    pub begin_x: Option<f64>,
    pub begin_y: Option<f64>,
    /// Clockwise label rotation in degrees
    #[serde(alias = "labelRotateDegrees")]
    pub label_rotate: Option<f64>,
    #[serde(alias = "enable")]
    pub enabled: Option<bool>,
    pub font_size: Option<f64>,
}

/// Horizontal or vertical legend placement: a keyword or a pixel offset
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Placement {
    Offset(f64),
    Keyword(String),
}

impl From<&str> for Placement {
    fn from(keyword: &str) -> Self {
        Placement::Keyword(keyword.to_string())
    }
}

impl From<f64> for Placement {
    fn from(offset: f64) -> Self {
        Placement::Offset(offset)
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    #[default]
    Rect,
    Circle,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct LegendConfig {
    /// `[horizontal, vertical]`
    pub position: (Placement, Placement),
    /// Item text template, `{name}` is replaced by the display name
    pub format: String,
    pub font_size: f64,
    pub direction: Direction,
    pub item_type: ItemType,
}

impl Default for LegendConfig {
    fn default() -> Self {
        LegendConfig {
            position: (Placement::from("right"), Placement::from("top")),
            format: "{name}".to_string(),
            font_size: 12.0,
            direction: Direction::Vertical,
            item_type: ItemType::Rect,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct GridConfig {
    pub enable_row: bool,
    pub enable_column: bool,
    pub color: String,
    #[serde(alias = "stroke-width")]
    pub stroke_width: f64,
    pub opacity: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            enable_row: false,
            enable_column: false,
            color: "#ccc".to_string(),
            stroke_width: 1.0,
            opacity: 0.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_options() {
        let options = ChartOptions::from_json_str(
            r#"{
                "width": 640,
                "colors": ["red"],
                "axis": {
                    "y": {"tickSize": 5, "enable": false},
                    "x": {"ticks": ["a", 2]}
                },
                "legend": {"position": ["center", 40], "direction": "horizontal"},
                "grid": {"enableRow": true, "stroke-width": 2},
                "line": {"dots": true},
                "bar": false
            }"#,
        )
        .unwrap();

        assert_eq!(options.width, Some(640.0));
        assert_eq!(options.height, None);
        let keys: Vec<&String> = options.axis.keys().collect();
        assert_eq!(keys, vec!["y", "x"]);
        assert_eq!(options.axis["y"].tick_size, Some(5.0));
        assert_eq!(options.axis["y"].enabled, Some(false));
        assert_eq!(
            options.axis["x"].ticks,
            Some(vec![Tick::Label("a".to_string()), Tick::Number(2.0)])
        );

        let legend = options.legend.as_ref().unwrap();
        assert_eq!(legend.position, (Placement::from("center"), Placement::Offset(40.0)));
        assert_eq!(legend.direction, Direction::Horizontal);
        assert_eq!(legend.format, "{name}");

        assert!(options.grid.enable_row);
        assert_eq!(options.grid.stroke_width, 2.0);
        assert_eq!(options.grid.color, "#ccc");

        assert!(options.chart_options("line").is_some());
        assert!(options.chart_options("bar").is_none());
        assert!(options.chart_options("pie").is_none());
    }

    #[test]
    fn test_empty_options() {
        let options = ChartOptions::from_json_str("{}").unwrap();
        assert_eq!(options, ChartOptions::default());
    }
}
