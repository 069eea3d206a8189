use chartlayout::axis::{Tick, MAX_SYNTHESIZED_TICKS};
use chartlayout::chart::{ChartBuilder, ChartEvent};
use chartlayout::config::ChartOptions;
use chartlayout::geometry::{path_vertices, Point};
use chartlayout::legend::ToggleChange;
use chartlayout::render::bitmap::render_png;
use chartlayout::render::recording::Shape;
use chartlayout::render::{PointerEvent, RecordingRenderer};
use chartlayout::tooltip::{Side, Tooltip};
use chartlayout::{ChartError, Value};
use serde_json::json;
use std::cell::RefCell;
use std::io::Write;
use std::process::{Command, Stdio};
use std::rc::Rc;

/// Helper function to run the chartlayout binary with stdin input
fn run_chartlayout(args: &[&str], input: &str) -> Result<Vec<u8>, String> {
    let mut child = Command::new(env!("CARGO_BIN_EXE_chartlayout"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| format!("Failed to spawn process: {}", e))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(input.as_bytes())
            .map_err(|e| format!("Failed to write to stdin: {}", e))?;
    }

    let output = child
        .wait_with_output()
        .map_err(|e| format!("Failed to wait for process: {}", e))?;

    if output.status.success() {
        Ok(output.stdout)
    } else {
        Err(String::from_utf8_lossy(&output.stderr).to_string())
    }
}

/// Check if bytes are a valid PNG
fn is_valid_png(bytes: &[u8]) -> bool {
    bytes.len() > 8 && bytes[0..8] == [137, 80, 78, 71, 13, 10, 26, 10]
}

fn assert_near(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 1e-9, "{} != {}", actual, expected);
}

const FULL_OPTIONS: &str = r#"{
    "axis": {"x": {}, "y": {"tickSize": 1}},
    "legend": {},
    "grid": {"enableRow": true, "enableColumn": true},
    "line": {"dots": true}
}"#;

fn full_chart() -> (chartlayout::Chart<RecordingRenderer>, Rc<RefCell<Vec<ChartEvent>>>) {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    let chart = ChartBuilder::new()
        .data(Value::from(json!({"a": 1, "b": 3, "c": 2})))
        .options(ChartOptions::from_json_str(FULL_OPTIONS).unwrap())
        .subscribe(move |event| sink.borrow_mut().push(event.clone()))
        .build(RecordingRenderer::new(400.0, 300.0))
        .unwrap();
    (chart, events)
}

#[test]
fn test_lifecycle_events_in_order() {
    let (_chart, events) = full_chart();
    assert_eq!(
        *events.borrow(),
        vec![
            ChartEvent::DataInitialized { buckets: 3 },
            ChartEvent::AxisInitialized {
                axes: vec!["x".to_string(), "y".to_string()]
            },
            ChartEvent::LegendInitialized { items: Some(3) },
            ChartEvent::GridInitialized { rows: 4, columns: 4 },
            ChartEvent::Finished,
        ]
    );
}

#[test]
fn test_axes_centered_on_surface() {
    let (chart, _) = full_chart();
    let x = chart.axis("x").unwrap();
    let y = chart.axis("y").unwrap();

    assert_eq!(x.ticks(), &[Tick::from("a"), Tick::from("b"), Tick::from("c")]);
    assert_eq!(y.ticks().len(), 4);
    assert_eq!(x.axis_length(), 90.0);
    assert_eq!(y.axis_length(), 90.0);
    assert_eq!(x.origin(), Point::new(155.0, 195.0));
    assert_eq!(y.origin(), Point::new(155.0, 195.0));

    assert_near(x.get_x(1.0), 215.0);
    assert_near(y.get_y(1, None).unwrap(), 135.0);
}

#[test]
fn test_grid_follows_ticks() {
    let (chart, _) = full_chart();
    let r = chart.renderer();

    let rows: Vec<Point> = chart.grid().rows().iter().map(|&h| r.anchor(h).unwrap()).collect();
    let expected_rows = [195.0, 165.0, 135.0, 105.0];
    for (row, y) in rows.iter().zip(expected_rows) {
        assert_near(row.x, 155.0);
        assert_near(row.y, y);
    }

    // x has one pop slot, shared by the first tick
    let columns: Vec<f64> = chart.grid().columns().iter().map(|&h| r.anchor(h).unwrap().x).collect();
    for (column, x) in columns.iter().zip([155.0, 155.0, 185.0, 215.0]) {
        assert_near(*column, x);
    }
    let last_column = r.outline(*chart.grid().columns().last().unwrap());
    assert_near(last_column[0].x, 215.0);
    assert_near(last_column[1].y, 195.0 - 90.0);
}

#[test]
fn test_legend_top_right() {
    let (chart, _) = full_chart();
    let legend = chart.legend().unwrap();

    // 7px per character at font size 12
    assert_eq!(legend.total_width(), 7.0 + 15.0 + 10.0 + 20.0);
    assert_eq!(legend.total_height(), 80.0);
    assert_eq!(
        chart.renderer().anchor(legend.border()),
        Some(Point::new(400.0 - 52.0 - 10.0, 10.0))
    );
    let names: Vec<&str> = legend.items().iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[test]
fn test_line_points() {
    let (chart, _) = full_chart();
    let r = chart.renderer();
    let line = r
        .nodes()
        .iter()
        .find_map(|n| match &n.shape {
            Shape::Path(commands) if n.attrs.stroke_linejoin.is_some() => Some(path_vertices(commands)),
            _ => None,
        })
        .unwrap();

    let expected = [(185.0, 195.0), (215.0, 135.0), (245.0, 165.0)];
    assert_eq!(line[0].len(), 3);
    for (p, (x, y)) in line[0].iter().zip(expected) {
        assert_near(p.x, x);
        assert_near(p.y, y);
    }
}

#[test]
fn test_legend_click_toggles_and_notifies() {
    let (mut chart, events) = full_chart();
    let swatch = chart.legend().unwrap().items()[2].swatch;

    assert_eq!(
        chart.handle_pointer(swatch, PointerEvent::Click),
        Some(ToggleChange { index: 2, active: false })
    );
    assert_eq!(chart.renderer().node(swatch).unwrap().attrs.fill.as_deref(), Some("gray"));

    assert_eq!(
        chart.handle_pointer(swatch, PointerEvent::Click),
        Some(ToggleChange { index: 2, active: true })
    );
    assert_eq!(
        chart.renderer().node(swatch).unwrap().attrs.fill.as_deref(),
        Some(chart.colors()[2].as_str())
    );
    assert_eq!(events.borrow().len(), 7);
}

#[test]
fn test_tooltip_over_chart() {
    let (mut chart, _) = full_chart();
    let anchor = Point::new(chart.axis("x").unwrap().get_x(1.0), 135.0);

    let mut tooltip = Tooltip::new();
    tooltip.show(chart.renderer_mut(), anchor, &["b", "3"], Side::Top);
    assert!(tooltip.is_visible());

    tooltip.hide(chart.renderer_mut());
    assert!(!tooltip.is_visible());
}

#[test]
fn test_rotated_custom_axis() {
    let options = ChartOptions::from_json_str(
        r#"{"axis": {"diag": {"rotate": 45, "ticks": [0, 1, 2], "beginX": 50, "beginY": 250}}}"#,
    )
    .unwrap();
    let chart = ChartBuilder::new()
        .data(Value::list([1, 2]))
        .options(options)
        .build(RecordingRenderer::new(400.0, 300.0))
        .unwrap();

    let diag = chart.axis("diag").unwrap();
    let step = 30.0 * 45f64.to_radians().cos();
    assert_near(diag.get_x(2.0), 50.0 + 2.0 * step);
    let positions = diag.get_ticks_pos();
    assert_near(positions.y[1], 250.0 - 30.0 * 45f64.to_radians().sin());
}

#[test]
fn test_errors_surface() {
    let err = ChartBuilder::new()
        .build(RecordingRenderer::unmounted())
        .unwrap_err();
    assert_eq!(err, ChartError::MissingSurface);

    let options = ChartOptions::from_json_str(r#"{"axis": {"y": {"tickSize": 0}}}"#).unwrap();
    let err = ChartBuilder::new()
        .data(Value::list([1, 2]))
        .options(options)
        .build(RecordingRenderer::new(400.0, 300.0))
        .unwrap_err();
    assert_eq!(err, ChartError::InvalidTickSize(0.0));
}

#[test]
fn test_large_range_still_lays_out() {
    let options = ChartOptions::from_json_str(r#"{"axis": {"x": {}, "y": {}}}"#).unwrap();
    let chart = ChartBuilder::new()
        .data(Value::list([0, 20000]))
        .options(options)
        .build(RecordingRenderer::new(400.0, 300.0))
        .unwrap();

    let y = chart.axis("y").unwrap();
    assert!(y.ticks().len() <= MAX_SYNTHESIZED_TICKS);
    assert!(y.get_y(1, None).unwrap() < y.origin().y);
}

#[test]
fn test_render_chart_to_png() {
    let (chart, _) = full_chart();
    let png = render_png(chart.renderer()).unwrap();
    assert!(is_valid_png(&png));
}

#[test]
fn test_cli_json_input() {
    let result = run_chartlayout(&["--width", "320", "--height", "240"], "[1, 4, 2, 3]");
    assert!(result.is_ok(), "Failed: {:?}", result.err());
    assert!(is_valid_png(&result.unwrap()), "Output is not a valid PNG");
}

#[test]
fn test_cli_csv_with_options_file() {
    let path = std::env::temp_dir().join(format!("chartlayout-options-{}.json", std::process::id()));
    std::fs::write(&path, FULL_OPTIONS).unwrap();

    let csv = "day,sales,cost\nmon,10,4\ntue,12,6\nwed,9,5\n";
    let options = path.to_string_lossy().to_string();
    let result = run_chartlayout(&["--csv", "--options", &options], csv);
    let _ = std::fs::remove_file(&path);

    assert!(result.is_ok(), "Failed: {:?}", result.err());
    assert!(is_valid_png(&result.unwrap()));
}

#[test]
fn test_cli_invalid_json() {
    let result = run_chartlayout(&[], "{not json");
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("Failed to parse JSON"));
}

#[test]
fn test_cli_zero_width() {
    let result = run_chartlayout(&["--width", "0"], "[1]");
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("must be positive"));
}
