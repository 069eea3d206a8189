// Chart orchestration: series, axes, legend, grid, then the chart types

use crate::axis::{Axis, Tick};
use crate::config::{AxisConfig, ChartOptions};
use crate::error::{ChartError, Result};
use crate::geometry::Size;
use crate::grid::{Grid, GridLines};
use crate::legend::{Legend, ToggleChange};
use crate::palette::ColorPalette;
use crate::render::{Handle, PointerEvent, Renderer};
use crate::series::DataSeries;
use crate::value::Value;
use indexmap::IndexMap;
use std::fmt;
use std::rc::Rc;

/// Y axes stand upright unless configured otherwise
const DEFAULT_Y_ROTATE: f64 = 90.0;
/// Leading blank slot on the x axis
const DEFAULT_X_POP: usize = 1;

/// Lifecycle notifications, in emission order
#[derive(Debug, Clone, PartialEq)]
pub enum ChartEvent {
    DataInitialized { buckets: usize },
    AxisInitialized { axes: Vec<String> },
    /// `items` is `None` when no legend was configured or the series is empty
    LegendInitialized { items: Option<usize> },
    GridInitialized { rows: usize, columns: usize },
    Finished,
    /// A legend item was activated after construction
    LegendToggled(ToggleChange),
}

type Observer = Box<dyn FnMut(&ChartEvent)>;

/// Everything a chart type may draw against
pub struct ChartContext<'a> {
    pub series: &'a DataSeries,
    pub axes: &'a IndexMap<String, Axis>,
    pub legend: Option<&'a Legend>,
    pub grid: &'a Grid,
    pub colors: &'a [String],
    pub surface: Size,
    pub renderer: &'a mut dyn Renderer,
}

impl ChartContext<'_> {
    pub fn axis(&self, name: &str) -> Option<&Axis> {
        self.axes.get(name)
    }

    /// Color of bucket `index`, wrapping around the assigned colors
    pub fn color(&self, index: usize) -> &str {
        if self.colors.is_empty() {
            return "#000";
        }
        &self.colors[index % self.colors.len()]
    }
}

/// A drawing strategy for one kind of chart
pub trait ChartType {
    /// Draw with the options sub-object the chart type was enabled with
    fn draw(&self, ctx: &mut ChartContext<'_>, options: &serde_json::Value) -> Result<()>;
}

/// Named chart types, drawn in registration order
#[derive(Default)]
pub struct ChartTypeRegistry {
    types: IndexMap<String, Box<dyn ChartType>>,
}

impl ChartTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a chart type. A replaced type keeps its position.
    pub fn register(&mut self, name: impl Into<String>, chart_type: impl ChartType + 'static) {
        self.types.insert(name.into(), Box::new(chart_type));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    fn iter(&self) -> impl Iterator<Item = (&str, &dyn ChartType)> {
        self.types.iter().map(|(name, t)| (name.as_str(), t.as_ref()))
    }
}

impl fmt::Debug for ChartTypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.types.keys()).finish()
    }
}

/// Collects data, options, chart types and observers, then lays the chart out
pub struct ChartBuilder {
    data: Value,
    options: ChartOptions,
    registry: ChartTypeRegistry,
    observers: Vec<Observer>,
}

impl Default for ChartBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartBuilder {
    /// Empty data, default options and the built-in chart types
    pub fn new() -> Self {
        ChartBuilder {
            data: Value::List(Vec::new()),
            options: ChartOptions::default(),
            registry: ChartTypeRegistry::with_defaults(),
            observers: Vec::new(),
        }
    }

    pub fn data(mut self, data: impl Into<Value>) -> Self {
        self.data = data.into();
        self
    }

    pub fn options(mut self, options: ChartOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the chart types wholesale
    pub fn registry(mut self, registry: ChartTypeRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn register(mut self, name: impl Into<String>, chart_type: impl ChartType + 'static) -> Self {
        self.registry.register(name, chart_type);
        self
    }

    pub fn subscribe(mut self, observer: impl FnMut(&ChartEvent) + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    /// Lay out the chart on `renderer`.
    ///
    /// Fails when the renderer has no surface, the surface size is not
    /// positive, an axis cannot synthesize its ticks or an enabled chart type
    /// is not registered.
    pub fn build<R: Renderer>(self, mut renderer: R) -> Result<Chart<R>> {
        let ChartBuilder {
            data,
            options,
            registry,
            mut observers,
        } = self;

        let surface = resolve_surface(&options, &renderer)?;
        if let Some(name) = options
            .charts
            .keys()
            .find(|name| options.chart_options(name).is_some() && !registry.contains(name))
        {
            return Err(ChartError::UnknownChartType(name.clone()));
        }

        // 1. Data
        let series = Rc::new(DataSeries::normalize(data));
        emit(&mut observers, ChartEvent::DataInitialized { buckets: series.len() });

        let colors = ColorPalette::from_colors(options.colors.clone()).assign(series.len());

        // 2. Axes
        let axes = build_axes(&options, &series, surface, &mut renderer)?;
        emit(
            &mut observers,
            ChartEvent::AxisInitialized {
                axes: axes.keys().cloned().collect(),
            },
        );

        let x_layout = axes.get("x").map(Axis::layout);
        let y_layout = axes.get("y").map(Axis::layout);

        // 3. Legend
        let legend = match &options.legend {
            Some(config) if !series.is_empty() => Some(Legend::new(
                &series,
                &colors,
                x_layout.as_ref(),
                config,
                surface,
                &mut renderer,
            )),
            _ => None,
        };
        emit(
            &mut observers,
            ChartEvent::LegendInitialized {
                items: legend.as_ref().map(|l| l.items().len()),
            },
        );

        // 4. Grid
        let lines = GridLines::from_axes(&options.grid, x_layout.as_ref(), y_layout.as_ref());
        let grid = Grid::new(&options.grid, &lines, &mut renderer);
        emit(
            &mut observers,
            ChartEvent::GridInitialized {
                rows: grid.rows().len(),
                columns: grid.columns().len(),
            },
        );

        // 5. Chart types
        {
            let mut ctx = ChartContext {
                series: &series,
                axes: &axes,
                legend: legend.as_ref(),
                grid: &grid,
                colors: &colors,
                surface,
                renderer: &mut renderer,
            };
            for (name, chart_type) in registry.iter() {
                if let Some(chart_options) = options.chart_options(name) {
                    tracing::debug!(chart = name, "drawing chart type");
                    chart_type.draw(&mut ctx, chart_options)?;
                }
            }
        }

        emit(&mut observers, ChartEvent::Finished);

        Ok(Chart {
            renderer,
            surface,
            series,
            axes,
            legend,
            grid,
            colors,
            observers,
        })
    }
}

/// A laid-out chart owning its renderer
pub struct Chart<R: Renderer> {
    renderer: R,
    surface: Size,
    series: Rc<DataSeries>,
    axes: IndexMap<String, Axis>,
    legend: Option<Legend>,
    grid: Grid,
    colors: Vec<String>,
    observers: Vec<Observer>,
}

impl<R: Renderer> Chart<R> {
    pub fn builder() -> ChartBuilder {
        ChartBuilder::new()
    }

    /// Route a pointer event from the host. Legend clicks toggle their item
    /// and notify observers with [`ChartEvent::LegendToggled`].
    pub fn handle_pointer(&mut self, handle: Handle, event: PointerEvent) -> Option<ToggleChange> {
        let change = self
            .legend
            .as_mut()?
            .handle_pointer(handle, event, &mut self.renderer)?;
        emit(&mut self.observers, ChartEvent::LegendToggled(change));
        Some(change)
    }

    /// Toggle legend item `index` as if its swatch had been clicked
    pub fn toggle_legend_item(&mut self, index: usize) -> Option<ToggleChange> {
        let change = self.legend.as_mut()?.toggle(index, &mut self.renderer)?;
        emit(&mut self.observers, ChartEvent::LegendToggled(change));
        Some(change)
    }

    pub fn surface(&self) -> Size {
        self.surface
    }

    pub fn series(&self) -> &DataSeries {
        &self.series
    }

    pub fn axis(&self, name: &str) -> Option<&Axis> {
        self.axes.get(name)
    }

    pub fn axes(&self) -> &IndexMap<String, Axis> {
        &self.axes
    }

    pub fn legend(&self) -> Option<&Legend> {
        self.legend.as_ref()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }
}

impl<R: Renderer> fmt::Debug for Chart<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chart")
            .field("surface", &self.surface)
            .field("series", &self.series)
            .field("axes", &self.axes.keys().collect::<Vec<_>>())
            .field("legend", &self.legend.is_some())
            .field("colors", &self.colors)
            .finish_non_exhaustive()
    }
}

fn emit(observers: &mut [Observer], event: ChartEvent) {
    tracing::debug!(?event, "chart event");
    for observer in observers.iter_mut() {
        observer(&event);
    }
}

/// Configured size, falling back to the mounted surface
fn resolve_surface(options: &ChartOptions, renderer: &dyn Renderer) -> Result<Size> {
    let mounted = renderer.surface().ok_or(ChartError::MissingSurface)?;
    let width = options.width.unwrap_or(mounted.width);
    let height = options.height.unwrap_or(mounted.height);
    let valid = |v: f64| v.is_finite() && v > 0.0;
    if !valid(width) || !valid(height) {
        return Err(ChartError::InvalidSurface { width, height });
    }
    Ok(Size::new(width, height))
}

/// Per-axis defaults that depend on the series
fn axis_defaults(name: &str, config: &AxisConfig, series: &DataSeries) -> AxisConfig {
    let mut config = config.clone();
    match name {
        "y" => {
            config.rotate.get_or_insert(DEFAULT_Y_ROTATE);
            if config.ticks.as_ref().map_or(true, Vec::is_empty) {
                let range = series.range();
                config.max = config.max.or(range.max);
                config.min = config.min.or(range.min);
            }
        }
        "x" => {
            config.pop.get_or_insert(DEFAULT_X_POP);
            if config.ticks.is_none() {
                config.ticks = Some(series.labels().into_iter().map(Tick::from).collect());
            }
        }
        _ => {}
    }
    config
}

fn build_axes(
    options: &ChartOptions,
    series: &Rc<DataSeries>,
    surface: Size,
    renderer: &mut dyn Renderer,
) -> Result<IndexMap<String, Axis>> {
    let mut axes = IndexMap::with_capacity(options.axis.len());
    let mut center_x = None;
    let mut center_y = None;

    for (name, config) in &options.axis {
        let config = axis_defaults(name, config, series);
        let axis = Axis::new(&config, Rc::clone(series), surface, renderer)?;
        match name.as_str() {
            "x" if config.begin_x.is_none() => {
                center_x = Some((surface.width - axis.axis_length()) / 2.0);
            }
            "y" if config.begin_y.is_none() => {
                center_y = Some((surface.height - axis.axis_length()) / 2.0 + axis.axis_length());
            }
            _ => {}
        }
        axes.insert(name.clone(), axis);
    }

    // Center the plot when neither origin was pinned
    if let (Some(x), Some(y)) = (center_x, center_y) {
        for axis in axes.values_mut() {
            axis.set_position(x, y, renderer);
        }
    }

    Ok(axes)
}
