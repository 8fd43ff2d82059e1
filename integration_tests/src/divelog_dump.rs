//! Decode a dive log dump and print its records.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use wavelink::config::dive_log::RECORD_MIN_LEN;
use wavelink::records::{DecodedRecord, Decoder, RecordKind, RecordTypeRegistry};

#[derive(Parser)]
#[command(name = "divelog-dump")]
#[command(about = "Decode dive computer log records from a binary dump")]
struct Args {
    /// Binary log file
    file: PathBuf,

    /// Size of one record in bytes
    #[arg(short, long, default_value_t = RECORD_MIN_LEN)]
    record_len: usize,

    /// Only print the summary
    #[arg(short, long)]
    summary: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn describe(kind: &RecordKind) -> String {
    match kind {
        RecordKind::MixChange { o2, he } => format!("gas switch O2 {}% He {}%", o2, he),
        RecordKind::Start { reason } => format!("dive start ({:?})", reason),
        RecordKind::KeyDown { key1, key2 } => format!("key down {} {}", key1, key2),
        RecordKind::UserMark { order, category } => {
            format!("user mark #{} category {}", order, category)
        }
        RecordKind::Cns { value } => format!("CNS {}%", value),
        RecordKind::ChangeMode {
            o2,
            he,
            measured,
            mode,
        } => format!(
            "mode {:?} O2 {}% He {}%{}",
            mode,
            o2,
            he,
            if *measured { " (measured)" } else { "" }
        ),
        RecordKind::Occurrence { code } => format!("occurrence 0x{:04x}", code),
    }
}

fn print_record(record: &DecodedRecord) {
    let minutes = record.timestamp / 60;
    let seconds = record.timestamp % 60;
    println!(
        "  {} {}",
        format!("{:>4}:{:02}", minutes, seconds).cyan(),
        describe(&record.kind)
    );
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).init();

    if args.record_len < RECORD_MIN_LEN {
        anyhow::bail!(
            "Record length {} is below the minimum of {} bytes",
            args.record_len,
            RECORD_MIN_LEN
        );
    }

    let log_bytes = std::fs::read(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let registry = RecordTypeRegistry::dive_log();
    let decoder = Decoder::new(&registry);

    println!("{}", "Dive Log".bold());
    println!("File: {}", args.file.display());
    println!("Records: {} bytes each", args.record_len);
    println!();

    if !args.summary {
        for record in decoder.records(&log_bytes, args.record_len).decoded() {
            print_record(&record);
        }
    }

    let summary = decoder.decode_log(&log_bytes, args.record_len);

    println!("\n{}", "=".repeat(60));
    println!(
        "  Total: {} decoded, {} dropped",
        summary.decoded.to_string().green(),
        if summary.failed() > 0 {
            summary.failed().to_string().red()
        } else {
            summary.failed().to_string().normal()
        }
    );
    if summary.failed() > 0 {
        println!(
            "  ({} unknown type, {} unknown value, {} truncated)",
            summary.unknown_type, summary.unknown_value, summary.truncated
        );
    }
    println!("{}", "=".repeat(60));

    Ok(())
}
