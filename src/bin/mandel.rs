extern crate clap;
extern crate env_logger;
extern crate failure;
extern crate image;
extern crate log;
extern crate mandelbrot;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use failure::{err_msg, Error};
use image::pnm::PNMEncoder;
use image::pnm::{PNMSubtype, SampleEncoding};
use image::ColorType;
use log::info;
use mandelbrot::explorer::{DEFAULT_HEIGHT, DEFAULT_MAX_ITERATIONS, DEFAULT_WIDTH, ITERATION_STEP};
use mandelbrot::{Event, Explorer, Frame, WorkerMode};
use std::fmt::Display;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

/// Splits `s` at the first `separator` and parses both halves, or
/// hands back `err`.
fn parse_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(T, T), String> {
    let mut halves = s.splitn(2, separator).map(T::from_str);
    match (halves.next(), halves.next()) {
        (Some(Ok(l)), Some(Ok(r))) => Ok((l, r)),
        _ => Err(err.to_string()),
    }
}

/// Parses `s` as a number between `low` and `high` inclusive.  `what`
/// names the number in the error messages.
fn parse_in_range<T>(s: &str, low: T, high: T, what: &str) -> Result<T, String>
where
    T: FromStr + PartialOrd + Display,
{
    let n = T::from_str(s).map_err(|_| format!("Could not parse {}", what.to_lowercase()))?;
    if n < low || n > high {
        return Err(format!("{} must be between {} and {}", what, low, high));
    }
    Ok(n)
}

const SIZE_ERR: &str = "Could not parse output image size";
const ZOOM_ERR: &str = "Could not parse zoom pixel";
const MAX_ITERATIONS: u32 = 200_000;

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const THREADS: &str = "threads";
const SINGLE: &str = "single";
const ITERATIONS: &str = "iterations";
const ZOOM: &str = "zoom";
const MORE: &str = "more";
const LESS: &str = "less";
const RESET: &str = "reset";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("mandel")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Multi-threaded Mandelbrot explorer")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file (binary PPM)"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("1920x1080")
                .validator(|s| parse_pair::<u16>(&s, 'x', SIZE_ERR).map(|_| ()))
                .help("Size of output image"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(move |s| parse_in_range(&s, 1, max_threads, "Thread count").map(|_| ()))
                .help("Workers used in multi-core mode [default: all processors]"),
        )
        .arg(
            Arg::with_name(SINGLE)
                .long(SINGLE)
                .help("Render on a single core"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .required(false)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .validator(|s| {
                    parse_in_range(&s, 0, MAX_ITERATIONS, "Iteration count").map(|_| ())
                })
                .help("Starting iteration bound [default: 50]"),
        )
        .arg(
            Arg::with_name(ZOOM)
                .long(ZOOM)
                .short("z")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .help("Zoom in at pixel X,Y; may be repeated"),
        )
        .arg(
            Arg::with_name(MORE)
                .long(MORE)
                .multiple(true)
                .help("Raise the iteration bound by 10; may be repeated"),
        )
        .arg(
            Arg::with_name(LESS)
                .long(LESS)
                .multiple(true)
                .help("Lower the iteration bound by 10; may be repeated"),
        )
        .arg(
            Arg::with_name(RESET)
                .long(RESET)
                .help("Reset the view after all other events"),
        )
        .get_matches()
}

/// The events asked for on the command line, in the order they are
/// replayed: worker mode, zooms, iteration changes, reset.
fn events(matches: &ArgMatches) -> Result<Vec<Event>, String> {
    let mut events = vec![];
    if matches.is_present(SINGLE) {
        events.push(Event::SelectWorkers(WorkerMode::Single));
    }
    if let Some(zooms) = matches.values_of(ZOOM) {
        for zoom in zooms {
            let (x, y) = parse_pair(zoom, ',', ZOOM_ERR)?;
            events.push(Event::Zoom { x, y });
        }
    }
    for _ in 0..matches.occurrences_of(MORE) {
        events.push(Event::AdjustIterations(ITERATION_STEP));
    }
    for _ in 0..matches.occurrences_of(LESS) {
        events.push(Event::AdjustIterations(-ITERATION_STEP));
    }
    if matches.is_present(RESET) {
        events.push(Event::Reset);
    }
    Ok(events)
}

fn write_image(outfile: &str, pixels: &[u8], bounds: (u32, u32)) -> Result<(), std::io::Error> {
    let path = Path::new(outfile);
    let output = File::create(&path)?;
    let mut encoder =
        PNMEncoder::new(output).with_subtype(PNMSubtype::Pixmap(SampleEncoding::Binary));
    encoder.encode(pixels, bounds.0, bounds.1, ColorType::RGB(8))?;
    Ok(())
}

fn overlay(explorer: &Explorer, frame: &Frame) {
    let fb = frame.framebuffer();
    println!("RESOLUTION:       {}x{}", fb.width(), fb.height());
    println!("CPU_COUNT:        {}", explorer.processors());
    println!("WORKERS:          {}", frame.workers());
    println!(
        "MODE:             {}",
        match frame.mode() {
            WorkerMode::Single => "SINGLE-CORE",
            WorkerMode::Multi => "MULTI-CORE",
        }
    );
    println!("MAX_ITER:         {}", frame.max_iterations());
    println!("RENDER TIME:      {}ms", frame.elapsed_ms());
}

fn run(matches: &ArgMatches) -> Result<(), Error> {
    let (width, height) = match matches.value_of(SIZE) {
        Some(size) => {
            let (w, h) = parse_pair::<u16>(size, 'x', SIZE_ERR).map_err(err_msg)?;
            (u32::from(w), u32::from(h))
        }
        None => (DEFAULT_WIDTH, DEFAULT_HEIGHT),
    };
    let processors = match matches.value_of(THREADS) {
        Some(t) => usize::from_str(t)?,
        None => num_cpus::get(),
    };
    let iterations = match matches.value_of(ITERATIONS) {
        Some(i) => u32::from_str(i)?,
        None => DEFAULT_MAX_ITERATIONS,
    };
    let events = events(matches).map_err(err_msg)?;

    let mut explorer =
        Explorer::with_processors(width, height, processors)?.with_max_iterations(iterations);
    explorer.rerender()?;
    for event in events {
        let frame = explorer.apply(event)?;
        info!("{:?} rendered in {}ms", event, frame.elapsed_ms());
    }

    if let Some(frame) = explorer.frame() {
        let output = matches.value_of(OUTPUT).unwrap_or("mandel.ppm");
        write_image(output, &frame.framebuffer().to_rgb_bytes(), (width, height))?;
        overlay(&explorer, frame);
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
