//! Command line front end: names the color of one pixel of an image.
//!
//! `color_namer photo.jpg 120 45 --colors colors.csv`

use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use color_namer::core_modules::image_probe::image_probe;
use color_namer::{Detection, DetectionPipeline, PipelineConfig, pipeline::DEFAULT_COLORS_PATH};
use std::io::IsTerminal;
use std::path::PathBuf;

const PKG_NAME: &str = env!("CARGO_PKG_NAME");
const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

fn cli() -> Command {
    Command::new(PKG_NAME)
        .version(PKG_VERSION)
        .about(PKG_DESCRIPTION)
        .arg(
            Arg::new("IMAGE")
                .help("Image to sample (PNG, JPEG, ...)")
                .required(true)
                .index(1)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("X")
                .help("Column of the pixel, 0 is the left edge")
                .required(true)
                .index(2)
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("Y")
                .help("Row of the pixel, 0 is the top edge")
                .required(true)
                .index(3)
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("colors")
                .long("colors")
                .short('c')
                .value_name("CSV")
                .help("Reference table with R, G, B and color name columns")
                .default_value(DEFAULT_COLORS_PATH)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("swatch")
                .long("swatch")
                .value_name("PNG")
                .help("Also write a 100x100 swatch of the sampled color")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the detection as JSON")
                .action(ArgAction::SetTrue),
        )
}

fn required<T: Clone + Send + Sync + 'static>(matches: &ArgMatches, id: &str) -> anyhow::Result<T> {
    matches
        .get_one::<T>(id)
        .cloned()
        .with_context(|| format!("missing argument {id}"))
}

fn print_detection(detection: &Detection) {
    let (red, green, blue) = detection.rgb();
    println!("Color Name: {}", detection.name);
    println!("RGB: ({}, {}, {})", red, green, blue);
    println!("Hex: {}", detection.pixel.hex());

    if std::io::stdout().is_terminal() {
        let block = " ".repeat(12);
        for _ in 0..3 {
            println!("\x1b[48;2;{};{};{}m{}\x1b[0m", red, green, blue, block);
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let matches = cli().get_matches();
    let image_path: PathBuf = required(&matches, "IMAGE")?;
    let x: u32 = required(&matches, "X")?;
    let y: u32 = required(&matches, "Y")?;
    let colors_path: PathBuf = required(&matches, "colors")?;

    let pipeline = DetectionPipeline::new(PipelineConfig { colors_path });
    let detection = pipeline
        .detect_path(&image_path, x, y)
        .with_context(|| format!("could not name pixel ({x}, {y}) of {}", image_path.display()))?;

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&detection)?);
    } else {
        print_detection(&detection);
    }

    if let Some(swatch_path) = matches.get_one::<PathBuf>("swatch") {
        image_probe::save_swatch(
            swatch_path,
            detection.pixel,
            image_probe::SWATCH_SIZE,
            image_probe::SWATCH_SIZE,
        )?;
        log::info!("swatch written to {}", swatch_path.display());
    }

    Ok(())
}
