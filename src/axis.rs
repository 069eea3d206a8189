// Axis layout: tick synthesis, data-to-surface mapping and the drawn axis

use crate::config::AxisConfig;
use crate::error::{ChartError, Result};
use crate::geometry::{PathCommand, Point, Size};
use crate::render::{Attrs, Handle, Renderer};
use crate::series::{DataSeries, ValueKey};
use serde::Deserialize;
use std::fmt;
use std::rc::Rc;

pub const DEFAULT_TICK_SIZE: f64 = 1.0;
pub const DEFAULT_TICK_WIDTH: f64 = 30.0;
pub const DEFAULT_FONT_SIZE: f64 = 12.0;
/// Distance of the default origin from the left and bottom surface edges
pub const ORIGIN_INSET: f64 = 30.0;
const LABEL_MARGIN: f64 = 10.0;
const TICK_HEIGHT: f64 = 3.0;
/// Synthesis widens its step rather than emit more ticks than this
pub const MAX_SYNTHESIZED_TICKS: usize = 10_000;

/// A labeled position along an axis
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Tick {
    Number(f64),
    Label(String),
}

impl Tick {
    /// Numeric reading of the tick. Blank labels read as 0, numeric labels
    /// are parsed, anything else has no value.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Tick::Number(n) => Some(*n),
            Tick::Label(s) if s.trim().is_empty() => Some(0.0),
            Tick::Label(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tick::Number(n) => write!(f, "{}", n),
            Tick::Label(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Tick {
    fn from(n: f64) -> Self {
        Tick::Number(n)
    }
}

impl From<&str> for Tick {
    fn from(s: &str) -> Self {
        Tick::Label(s.to_string())
    }
}

impl From<String> for Tick {
    fn from(s: String) -> Self {
        Tick::Label(s)
    }
}

/// Surface positions of every slot: pop slots first, then one per tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickPositions {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// What other components need to know about a laid-out axis
#[derive(Debug, Clone, PartialEq)]
pub struct AxisLayout {
    pub origin: Point,
    pub ticks: Vec<Tick>,
    pub axis_length: f64,
    pub tick_positions: TickPositions,
}

/// Ticks synthesized from a range, with the step actually used
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedTicks {
    pub ticks: Vec<Tick>,
    pub step: f64,
}

/// Ticks from `min` in steps of `step`: every tick up to and including
/// `max`, plus one more past it.
///
/// A range that would need more than [`MAX_SYNTHESIZED_TICKS`] ticks gets
/// its step multiplied up until it fits.
pub fn synthesize_ticks(min: f64, max: f64, step: f64) -> Result<SynthesizedTicks> {
    if !step.is_finite() || step <= 0.0 {
        return Err(ChartError::InvalidTickSize(step));
    }
    if !min.is_finite() || !max.is_finite() {
        return Err(ChartError::InvalidTickRange { min, max });
    }

    let step = widen_step(min, max, step);
    let mut ticks = vec![Tick::Number(min)];
    let mut k = 1usize;
    let mut tick = min;
    while tick <= max {
        if ticks.len() >= MAX_SYNTHESIZED_TICKS {
            tracing::warn!(min, max, step, "tick synthesis stopped at the tick limit");
            break;
        }
        tick = min + k as f64 * step;
        ticks.push(Tick::Number(tick));
        k += 1;
    }
    Ok(SynthesizedTicks { ticks, step })
}

fn widen_step(min: f64, max: f64, step: f64) -> f64 {
    let limit = MAX_SYNTHESIZED_TICKS as f64;
    let needed = ((max - min) / step).floor() + 2.0;
    if needed <= limit {
        return step;
    }
    let factor = (needed / (limit - 2.0)).ceil();
    let widened = step * factor;
    if !widened.is_finite() {
        return step;
    }
    tracing::warn!(min, max, step, widened, "widening tick step to stay under the tick limit");
    widened
}

/// A drawn axis and its coordinate mapping
#[derive(Debug, Clone)]
pub struct Axis {
    series: Rc<DataSeries>,
    ticks: Vec<Tick>,
    tick_size: f64,
    tick_width: f64,
    rotate: f64,
    pop: usize,
    begin_x: f64,
    begin_y: f64,
    axis_length: f64,
    path: Handle,
    labels: Vec<Handle>,
}

impl Axis {
    /// Merge `config` with defaults, synthesize missing ticks and draw the
    /// axis line and labels.
    pub fn new(
        config: &AxisConfig,
        series: Rc<DataSeries>,
        surface: Size,
        renderer: &mut dyn Renderer,
    ) -> Result<Self> {
        let tick_size = config.tick_size.unwrap_or(DEFAULT_TICK_SIZE);
        let tick_width = config.tick_width.unwrap_or(DEFAULT_TICK_WIDTH);
        let rotate = config.rotate.unwrap_or(0.0);
        let pop = config.pop.unwrap_or(0);
        let label_rotate = config.label_rotate.unwrap_or(0.0);
        let enabled = config.enabled.unwrap_or(true);
        let font_size = config.font_size.unwrap_or(DEFAULT_FONT_SIZE);

        let (ticks, tick_size) = match &config.ticks {
            Some(ticks) if !ticks.is_empty() => (ticks.clone(), tick_size),
            _ => {
                let synthesized = synthesize_ticks(
                    config.min.unwrap_or(0.0),
                    config.max.unwrap_or(0.0),
                    tick_size,
                )?;
                (synthesized.ticks, synthesized.step)
            }
        };

        let begin_x = config.begin_x.unwrap_or(ORIGIN_INSET);
        let begin_y = config.begin_y.unwrap_or(surface.height - ORIGIN_INSET);

        // 1. Axis line, drawn horizontally
        let mut commands = vec![PathCommand::MoveTo(begin_x, begin_y)];
        let segments = pop + ticks.len().saturating_sub(1);
        for _ in 0..segments {
            commands.push(PathCommand::HorizontalBy(tick_width));
            commands.push(PathCommand::VerticalBy(TICK_HEIGHT));
            commands.push(PathCommand::VerticalBy(-TICK_HEIGHT));
        }

        // 2. Labels below the line (above it once the axis is rotated)
        let screen_angle = (360.0 - rotate).rem_euclid(360.0);
        let label_offset = if rotate > 0.0 { -LABEL_MARGIN } else { LABEL_MARGIN };
        let mut labels = Vec::with_capacity(ticks.len());
        for (i, tick) in ticks.iter().enumerate() {
            let x = begin_x + (i + pop) as f64 * tick_width;
            let y = begin_y + label_offset;
            let label = renderer.draw_text(x, y, &tick.to_string());
            renderer.set_attributes(label, &Attrs::new().font_size(font_size));
            if screen_angle != 0.0 {
                renderer.rotate(label, screen_angle, begin_x, begin_y);
            }
            if label_rotate != 0.0 {
                let bounds = renderer.measure_bounds(label);
                renderer.rotate(label, label_rotate, x, y);
                renderer.translate(label, bounds.width / 2.0, 0.0);
            }
            labels.push(label);
        }

        let path = renderer.draw_path(&commands);

        // Hidden axes still answer coordinate queries
        if !enabled {
            renderer.hide(path);
            for &label in &labels {
                renderer.hide(label);
            }
        }

        // 3. Rotate into place
        if screen_angle != 0.0 {
            renderer.rotate(path, screen_angle, begin_x, begin_y);
        }
        if rotate > 0.0 {
            renderer.scale(path, 1.0, -1.0, begin_x, begin_y);
        }

        let axis_length = tick_width * (ticks.len() + pop).saturating_sub(1) as f64;

        tracing::debug!(
            ticks = ticks.len(),
            rotate,
            pop,
            begin_x,
            begin_y,
            axis_length,
            "axis laid out"
        );

        Ok(Axis {
            series,
            ticks,
            tick_size,
            tick_width,
            rotate,
            pop,
            begin_x,
            begin_y,
            axis_length,
            path,
            labels,
        })
    }

    fn radians(&self) -> f64 {
        self.rotate.to_radians()
    }

    /// Surface x of a series index (fractional indices interpolate)
    pub fn get_x(&self, index: f64) -> f64 {
        self.radians().cos() * (index + self.pop as f64) * self.tick_width + self.begin_x
    }

    /// Surface x of a tick value, found by linear scan (last match wins)
    pub fn get_x_for_tick(&self, tick: &Tick) -> Option<f64> {
        let index = self.ticks.iter().rposition(|t| t == tick)?;
        Some(self.get_x(index as f64))
    }

    /// Surface y of the series value at `index`, or of its `key` sub-value.
    ///
    /// `None` when the bucket does not exist or the value is not numeric.
    pub fn get_y(&self, index: usize, key: Option<&ValueKey>) -> Option<f64> {
        let bucket = self.series.get(index)?;
        let value = match key {
            None => bucket.data.as_number()?,
            Some(key) => bucket.value_at(key)?.as_number()?,
        };
        let first = self.ticks.first().and_then(Tick::as_number).unwrap_or(0.0);
        Some(
            self.begin_y
                - self.radians().sin() * (value - first - self.pop as f64) * self.tick_width
                    / self.tick_size,
        )
    }

    /// Positions of every pop slot, then of every tick.
    ///
    /// The first tick shares the last pop slot, so with `pop > 0` tick `j`
    /// sits at slot `pop - 1 + j`.
    pub fn get_ticks_pos(&self) -> TickPositions {
        let (sin, cos) = self.radians().sin_cos();
        let first_tick_slot = self.pop.saturating_sub(1);
        let slots = (0..self.pop).chain((0..self.ticks.len()).map(|j| first_tick_slot + j));
        let mut positions = TickPositions::default();
        for k in slots {
            let distance = k as f64 * self.tick_width;
            positions.x.push(self.begin_x + distance * cos);
            positions.y.push(self.begin_y - distance * sin);
        }
        positions
    }

    /// Move the origin to `(x, y)` by translating the drawn elements by the
    /// difference from the current origin.
    pub fn set_position(&mut self, x: f64, y: f64, renderer: &mut dyn Renderer) {
        let dx = x - self.begin_x;
        let dy = y - self.begin_y;
        self.begin_x = x;
        self.begin_y = y;
        renderer.translate(self.path, dx, dy);
        for &label in &self.labels {
            renderer.translate(label, dx, dy);
        }
        tracing::trace!(x, y, dx, dy, "axis repositioned");
    }

    pub fn origin(&self) -> Point {
        Point::new(self.begin_x, self.begin_y)
    }

    pub fn ticks(&self) -> &[Tick] {
        &self.ticks
    }

    pub fn axis_length(&self) -> f64 {
        self.axis_length
    }

    pub fn rotate(&self) -> f64 {
        self.rotate
    }

    pub fn pop(&self) -> usize {
        self.pop
    }

    pub fn tick_width(&self) -> f64 {
        self.tick_width
    }

    pub fn series(&self) -> &DataSeries {
        &self.series
    }

    pub fn path_handle(&self) -> Handle {
        self.path
    }

    pub fn label_handles(&self) -> &[Handle] {
        &self.labels
    }

    pub fn layout(&self) -> AxisLayout {
        AxisLayout {
            origin: self.origin(),
            ticks: self.ticks.clone(),
            axis_length: self.axis_length,
            tick_positions: self.get_ticks_pos(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingRenderer;
    use crate::value::Value;

    const SURFACE: Size = Size::new(400.0, 300.0);

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "{} != {}", actual, expected);
    }

    fn numbers(ticks: &[Tick]) -> Vec<f64> {
        ticks.iter().filter_map(Tick::as_number).collect()
    }

    fn series() -> Rc<DataSeries> {
        Rc::new(DataSeries::normalize(Value::list([
            Value::from(5),
            Value::list([1, 2, 3]),
            Value::map([("p", 7), ("q", 12)]),
        ])))
    }

    #[test]
    fn test_synthesize_includes_one_tick_past_max() {
        assert_eq!(numbers(&synthesize_ticks(0.0, 10.0, 5.0).unwrap().ticks), vec![0.0, 5.0, 10.0, 15.0]);
        assert_eq!(numbers(&synthesize_ticks(0.0, 9.0, 5.0).unwrap().ticks), vec![0.0, 5.0, 10.0]);
        assert_eq!(numbers(&synthesize_ticks(3.0, 1.0, 1.0).unwrap().ticks), vec![3.0]);
        assert_eq!(synthesize_ticks(0.0, 10.0, 5.0).unwrap().step, 5.0);
    }

    #[test]
    fn test_synthesize_rejects_bad_steps() {
        assert_eq!(synthesize_ticks(0.0, 10.0, 0.0), Err(ChartError::InvalidTickSize(0.0)));
        assert_eq!(synthesize_ticks(0.0, 10.0, -1.0), Err(ChartError::InvalidTickSize(-1.0)));
        assert!(matches!(
            synthesize_ticks(0.0, f64::INFINITY, 1.0),
            Err(ChartError::InvalidTickRange { .. })
        ));
    }

    #[test]
    fn test_wide_range_widens_step() {
        let synthesized = synthesize_ticks(0.0, 20000.0, 1.0).unwrap();
        assert_eq!(synthesized.step, 3.0);
        assert!(synthesized.ticks.len() <= MAX_SYNTHESIZED_TICKS);
        let last = synthesized.ticks.last().and_then(Tick::as_number).unwrap();
        assert_eq!(last, 20001.0);

        let huge = synthesize_ticks(0.0, 1e12, 1.0).unwrap();
        assert!(huge.ticks.len() <= MAX_SYNTHESIZED_TICKS);
        assert!(huge.ticks.last().and_then(Tick::as_number).unwrap() > 1e12);
    }

    #[test]
    fn test_widened_step_drives_get_y() {
        let mut r = RecordingRenderer::new(SURFACE.width, SURFACE.height);
        let config = AxisConfig {
            max: Some(20000.0),
            rotate: Some(90.0),
            ..Default::default()
        };
        let data = Rc::new(DataSeries::normalize(Value::list([Value::from(3000)])));
        let axis = Axis::new(&config, data, SURFACE, &mut r).unwrap();

        assert!(axis.ticks().len() <= MAX_SYNTHESIZED_TICKS);
        // one tick per 3 units, 30px apart
        assert_close(axis.get_y(0, None).unwrap(), 270.0 - 3000.0 * 30.0 / 3.0);
    }

    #[test]
    fn test_tick_as_number() {
        assert_eq!(Tick::from("").as_number(), Some(0.0));
        assert_eq!(Tick::from(" 4.5").as_number(), Some(4.5));
        assert_eq!(Tick::from("jan").as_number(), None);
    }

    #[test]
    fn test_defaults() {
        let mut r = RecordingRenderer::new(SURFACE.width, SURFACE.height);
        let axis = Axis::new(&AxisConfig { max: Some(2.0), ..Default::default() }, series(), SURFACE, &mut r).unwrap();

        assert_eq!(axis.origin(), Point::new(30.0, 270.0));
        assert_eq!(numbers(axis.ticks()), vec![0.0, 1.0, 2.0, 3.0]);
        assert_close(axis.axis_length(), 90.0);
        assert_eq!(axis.label_handles().len(), 4);
        assert_eq!(r.text_of(axis.label_handles()[1]), Some("1"));
        assert_eq!(r.anchor(axis.label_handles()[1]), Some(Point::new(60.0, 280.0)));
    }

    #[test]
    fn test_get_x_is_linear() {
        let mut r = RecordingRenderer::new(SURFACE.width, SURFACE.height);
        let config = AxisConfig {
            ticks: Some(vec!["a".into(), "b".into(), "c".into()]),
            rotate: Some(30.0),
            pop: Some(1),
            tick_width: Some(40.0),
            ..Default::default()
        };
        let axis = Axis::new(&config, series(), SURFACE, &mut r).unwrap();
        let slope = 30f64.to_radians().cos() * 40.0;

        assert_close(axis.get_x(0.0), 30.0 + 1.0 * 40.0 * 30f64.to_radians().cos());
        for i in 0..5 {
            assert_close(axis.get_x(i as f64 + 1.0) - axis.get_x(i as f64), slope);
        }
        assert_close(axis.get_x_for_tick(&Tick::from("c")).unwrap(), axis.get_x(2.0));
        assert_eq!(axis.get_x_for_tick(&Tick::from("zzz")), None);
    }

    #[test]
    fn test_get_y_on_vertical_axis() {
        let mut r = RecordingRenderer::new(SURFACE.width, SURFACE.height);
        let config = AxisConfig {
            min: Some(0.0),
            max: Some(10.0),
            tick_size: Some(5.0),
            rotate: Some(90.0),
            ..Default::default()
        };
        let axis = Axis::new(&config, series(), SURFACE, &mut r).unwrap();

        assert_close(axis.get_y(0, None).unwrap(), 270.0 - 5.0 * 30.0 / 5.0);
        assert_close(axis.get_y(1, Some(&ValueKey::Index(2))).unwrap(), 270.0 - 3.0 * 6.0);
        assert_close(axis.get_y(2, Some(&ValueKey::from("q"))).unwrap(), 270.0 - 12.0 * 6.0);
        assert_eq!(axis.get_y(1, None), None);
        assert_eq!(axis.get_y(9, None), None);
    }

    #[test]
    fn test_rotated_labels_sit_left_of_vertical_axis() {
        let mut r = RecordingRenderer::new(SURFACE.width, SURFACE.height);
        let config = AxisConfig {
            ticks: Some(vec![0.0.into(), 1.0.into()]),
            rotate: Some(90.0),
            ..Default::default()
        };
        let axis = Axis::new(&config, series(), SURFACE, &mut r).unwrap();

        let second = r.anchor(axis.label_handles()[1]).unwrap();
        assert_close(second.x, 20.0);
        assert_close(second.y, 240.0);

        // line goes up, tick marks point left towards the labels
        let outline = r.outline(axis.path_handle());
        assert_close(outline[1].x, 30.0);
        assert_close(outline[1].y, 240.0);
        assert_close(outline[2].x, 27.0);
    }

    #[test]
    fn test_ticks_pos() {
        let mut r = RecordingRenderer::new(SURFACE.width, SURFACE.height);
        let config = AxisConfig {
            ticks: Some(vec!["a".into(), "b".into()]),
            pop: Some(1),
            ..Default::default()
        };
        let axis = Axis::new(&config, series(), SURFACE, &mut r).unwrap();
        let pos = axis.get_ticks_pos();

        // the first tick shares the pop slot
        assert_eq!(pos.x, vec![30.0, 30.0, 60.0]);
        assert_eq!(pos.y, vec![270.0, 270.0, 270.0]);

        let layout = axis.layout();
        assert_eq!(layout.tick_positions, pos);
        assert_close(layout.axis_length, 60.0);

        let config = AxisConfig { pop: Some(2), ..config };
        let axis = Axis::new(&config, series(), SURFACE, &mut r).unwrap();
        assert_eq!(axis.get_ticks_pos().x, vec![30.0, 60.0, 60.0, 90.0]);
    }

    #[test]
    fn test_ticks_pos_without_pop() {
        let mut r = RecordingRenderer::new(SURFACE.width, SURFACE.height);
        let config = AxisConfig {
            ticks: Some(vec![0.0.into(), 1.0.into()]),
            rotate: Some(90.0),
            ..Default::default()
        };
        let axis = Axis::new(&config, series(), SURFACE, &mut r).unwrap();
        let pos = axis.get_ticks_pos();
        assert_eq!(pos.y.len(), 2);
        assert_close(pos.y[0], 270.0);
        assert_close(pos.y[1], 240.0);
        assert_close(pos.x[1], 30.0);
    }

    #[test]
    fn test_set_position_round_trip() {
        let mut r = RecordingRenderer::new(SURFACE.width, SURFACE.height);
        let config = AxisConfig {
            max: Some(3.0),
            rotate: Some(90.0),
            label_rotate: Some(45.0),
            ..Default::default()
        };
        let mut axis = Axis::new(&config, series(), SURFACE, &mut r).unwrap();
        let handles: Vec<Handle> = std::iter::once(axis.path_handle())
            .chain(axis.label_handles().iter().copied())
            .collect();
        let before: Vec<_> = handles.iter().map(|&h| r.outline(h)).collect();

        axis.set_position(35.0, 275.0, &mut r);
        assert_eq!(axis.origin(), Point::new(35.0, 275.0));
        let moved = r.anchor(axis.path_handle()).unwrap();
        assert_close(moved.x, 35.0);
        assert_close(moved.y, 275.0);

        axis.set_position(30.0, 270.0, &mut r);
        for (h, original) in handles.iter().zip(before) {
            for (p, q) in r.outline(*h).iter().zip(original) {
                assert_close(p.x, q.x);
                assert_close(p.y, q.y);
            }
        }
    }

    #[test]
    fn test_disabled_axis_hidden_but_usable() {
        let mut r = RecordingRenderer::new(SURFACE.width, SURFACE.height);
        let config = AxisConfig { max: Some(1.0), enabled: Some(false), ..Default::default() };
        let axis = Axis::new(&config, series(), SURFACE, &mut r).unwrap();

        assert!(!r.is_visible(axis.path_handle()));
        assert!(axis.label_handles().iter().all(|&h| !r.is_visible(h)));
        assert_close(axis.get_x(1.0), 60.0);
    }

    #[test]
    fn test_zero_tick_size_is_rejected() {
        let mut r = RecordingRenderer::new(SURFACE.width, SURFACE.height);
        let config = AxisConfig { max: Some(5.0), tick_size: Some(0.0), ..Default::default() };
        let err = Axis::new(&config, series(), SURFACE, &mut r).unwrap_err();
        assert_eq!(err, ChartError::InvalidTickSize(0.0));
    }
}
