use std::io::{self, IsTerminal, Write};

use anyhow::{Context, bail};
use color_namer::{ColorTable, MatchResult, Query, Rgb, closest, closest_or_unknown, image_io};
use serde::Serialize;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod config;

use crate::config::{Config, Target, USAGE};

#[derive(Serialize)]
struct Report<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    coordinates: Option<(u32, u32)>,
    query: [i32; 3],
    #[serde(flatten)]
    result: &'a MatchResult,
}

/// Picks a pixel (or takes a raw RGB triple) and prints the nearest named color.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "color_namer=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}\n\n{USAGE}");
            std::process::exit(2);
        }
    };

    let swatch = std::io::stdout().is_terminal();
    let mut out = std::io::stdout().lock();
    match config.target {
        // usage needs no reference table
        Target::Help => writeln!(out, "{USAGE}")?,
        _ => {
            let table = load_table(&config)?;
            run(&config, &table, &mut out, swatch)?;
        }
    }
    out.flush()?;
    Ok(())
}

// refuse to answer anything until the reference table is valid
fn load_table(config: &Config) -> anyhow::Result<ColorTable> {
    let table = match &config.table {
        Some(path) => ColorTable::from_path(path).with_context(|| format!("loading color table {}", path.display()))?,
        None => ColorTable::embedded().context("loading built-in color table")?,
    };
    tracing::info!(entries = table.len(), "reference colors ready");
    Ok(table)
}

fn run(config: &Config, table: &ColorTable, out: &mut impl Write, swatch: bool) -> anyhow::Result<()> {
    match &config.target {
        Target::Help => writeln!(out, "{USAGE}")?,
        Target::List(n) => {
            let head = &table.entries()[..(*n).min(table.len())];
            if config.json {
                writeln!(out, "{}", serde_json::to_string_pretty(head)?)?;
            } else {
                for e in head {
                    writeln!(out, "{:<24} {:<16} {}", e.name(), e.rgb().to_string(), e.hex())?;
                }
            }
        }
        Target::Rgb(query) => {
            let result = lookup(config, *query, table);
            emit(config, out, None, *query, &result, swatch)?;
        }
        Target::Pixel { image, x, y } => {
            let img = image_io::open_rgb(image).with_context(|| format!("opening {}", image.display()))?;
            // bounds are checked here, never inside the matcher
            let Some(pixel) = image_io::pixel_at(&img, *x, *y) else {
                bail!("({x}, {y}) is outside image bounds {}x{}", img.width(), img.height());
            };
            tracing::debug!(x, y, %pixel, "sampled pixel");
            let result = lookup(config, pixel.into(), table);
            emit(config, out, Some((*x, *y)), pixel.into(), &result, swatch)?;
        }
    }
    Ok(())
}

fn lookup(config: &Config, query: Query, table: &ColorTable) -> MatchResult {
    if config.strict {
        closest_or_unknown(query, table)
    } else {
        closest(query, table)
    }
}

fn emit(
    config: &Config,
    out: &mut impl Write,
    coordinates: Option<(u32, u32)>,
    query: Query,
    result: &MatchResult,
    swatch: bool,
) -> anyhow::Result<()> {
    if config.json {
        let report = Report {
            coordinates,
            query: [query.r, query.g, query.b],
            result,
        };
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        write_text(out, coordinates, query, result, swatch)?;
    }
    Ok(())
}

fn write_text(out: &mut impl Write, coordinates: Option<(u32, u32)>, query: Query, result: &MatchResult, swatch: bool) -> io::Result<()> {
    if let Some((x, y)) = coordinates {
        writeln!(out, "Coordinates: ({x}, {y})")?;
    }
    writeln!(out, "Pixel RGB: ({}, {}, {})", query.r, query.g, query.b)?;
    writeln!(out, "Detected color: {}", result.name)?;
    writeln!(out, "  HEX: {}", result.hex)?;
    if result.distance.is_finite() {
        writeln!(out, "  Distance: {:.2}", result.distance)?;
    }
    if swatch {
        let c = Rgb::from_hex(&result.hex).unwrap_or(Rgb::BLACK);
        writeln!(out, "\x1b[48;2;{};{};{}m            \x1b[0m", c.r, c.g, c.b)?;
    }
    Ok(())
}
