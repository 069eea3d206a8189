use anyhow::{Context, Result};
use chartlayout::chart::ChartBuilder;
use chartlayout::config::ChartOptions;
use chartlayout::render::bitmap;
use chartlayout::render::RecordingRenderer;
use chartlayout::value::Value;
use chartlayout::{csv_reader, logging};
use clap::Parser;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

const DEFAULT_WIDTH: f64 = 800.0;
const DEFAULT_HEIGHT: f64 = 600.0;

#[derive(Parser, Debug)]
#[command(name = "chartlayout")]
#[command(about = "Lay out a chart from JSON or CSV data and render it as PNG", long_about = None)]
struct Args {
    #[arg(long = "csv", help = "Read stdin as CSV: first column labels, other columns series")]
    csv: bool,

    #[arg(short = 'o', long = "options", help = "JSON file with chart options")]
    options: Option<PathBuf>,

    #[arg(long = "width", help = "Output width in pixels, overrides the options file")]
    width: Option<u32>,

    #[arg(long = "height", help = "Output height in pixels, overrides the options file")]
    height: Option<u32>,
}

fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();

    let mut options = match &args.options {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read options file {}", path.display()))?;
            ChartOptions::from_json_str(&json)
                .with_context(|| format!("Failed to parse options file {}", path.display()))?
        }
        None => ChartOptions::default(),
    };
    if let Some(width) = args.width {
        options.width = Some(f64::from(width));
    }
    if let Some(height) = args.height {
        options.height = Some(f64::from(height));
    }
    let width = *options.width.get_or_insert(DEFAULT_WIDTH);
    let height = *options.height.get_or_insert(DEFAULT_HEIGHT);

    let data = if args.csv {
        let table = csv_reader::read_csv(io::stdin()).context("Failed to read CSV from stdin")?;
        csv_reader::to_series_value(&table).context("Failed to convert CSV to chart data")?
    } else {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read JSON from stdin")?;
        let json: serde_json::Value =
            serde_json::from_str(&input).context("Failed to parse JSON data")?;
        Value::from(json)
    };

    let chart = ChartBuilder::new()
        .data(data)
        .options(options)
        .build(RecordingRenderer::new(width, height))
        .context("Failed to lay out chart")?;

    let png_bytes = bitmap::render_png(chart.renderer()).context("Failed to render chart")?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(&png_bytes)
        .context("Failed to write PNG to stdout")?;
    handle.flush().context("Failed to flush stdout")?;

    Ok(())
}
