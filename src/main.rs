use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use sheetdash::chart::ChartKind;
use sheetdash::render::EXPORT_FILE_NAME;
use sheetdash::session::Session;
use sheetdash::{loader, RenderOptions};

#[derive(Parser, Debug)]
#[command(name = "sheetdash")]
#[command(about = "Turn a spreadsheet into a chart with an insight summary", long_about = None)]
struct Args {
    /// Spreadsheet to load (.xlsx, .xls, .csv or .json records)
    file: PathBuf,

    /// Categorical column for the x axis (default: first categorical column)
    #[arg(long)]
    x: Option<String>,

    /// Numeric column for the y axis (default: first numeric column)
    #[arg(long)]
    y: Option<String>,

    /// Chart type to render
    #[arg(long, value_enum, default_value = "bar")]
    chart: ChartKind,

    /// Keep only rows with this x value (repeatable; default: all values)
    #[arg(long = "include")]
    include: Vec<String>,

    /// Output path for the exported PNG
    #[arg(long, default_value = EXPORT_FILE_NAME)]
    output: PathBuf,

    #[arg(long, default_value_t = 800)]
    width: u32,

    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Print the max/min/mean insight summary
    #[arg(long)]
    summary: bool,

    /// Print the column classification and exit
    #[arg(long)]
    columns: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let table = loader::load_table(&args.file)
        .with_context(|| format!("failed to load '{}'", args.file.display()))?;

    let mut session = Session::new(table).context("failed to initialize session")?;

    if args.columns {
        let classification = session.classification();
        println!("numeric:     {}", classification.numeric.join(", "));
        println!("categorical: {}", classification.categorical.join(", "));
        return Ok(());
    }

    if args.x.is_some() || args.y.is_some() {
        let x = args.x.clone().unwrap_or_else(|| session.selections().x.clone());
        let y = args.y.clone().unwrap_or_else(|| session.selections().y.clone());
        session.set_axes(&x, &y).context("invalid axis selection")?;
    }

    session.set_chart_kind(args.chart);
    if !args.include.is_empty() {
        session.set_included_values(args.include.clone());
    }

    let options = RenderOptions {
        width: args.width,
        height: args.height,
    };
    let view = session.recompute(&options)?;

    std::fs::write(&args.output, &view.download.bytes)
        .with_context(|| format!("failed to write '{}'", args.output.display()))?;
    println!(
        "wrote {} ({} rows plotted)",
        args.output.display(),
        view.spec.len()
    );

    if args.summary {
        match view.summary {
            Some(s) => {
                println!("highest: {:.2} ({})", s.max, s.max_label);
                println!("lowest:  {:.2} ({})", s.min, s.min_label);
                println!("average: {:.2}", s.mean);
            }
            None => println!("no rows match the current filter; summary suppressed"),
        }
    }

    Ok(())
}
