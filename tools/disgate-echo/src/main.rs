// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 disgate contributors

//! disgate-echo - Echo decoded DIS entity state in real-time
//!
//! Like `tcpdump` for an exercise network, except the output is entities
//! instead of packets.

use chrono::Local;
use clap::Parser;
use colored::*;
use disgate::config::RuntimeConfig;
use disgate::engine::EntityStateReport;
use disgate::relay::{RelayEvent, RelayHub, RelayPolicy};
use disgate::transport::DisReceiver;
use std::io::{self, IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Echo decoded DIS entity state in real-time
#[derive(Parser, Debug)]
#[command(name = "disgate-echo")]
#[command(version)]
#[command(about = "Echo decoded DIS Entity State PDUs to the console")]
struct Args {
    /// UDP port to receive DIS traffic on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Multicast group to join (omit for unicast/broadcast exercises)
    #[arg(short, long)]
    group: Option<std::net::Ipv4Addr>,

    /// Output format: pretty, json, compact
    #[arg(short, long, default_value = "pretty")]
    format: OutputFormat,

    /// Shortcut for --format json
    #[arg(long)]
    json: bool,

    /// Maximum number of entities to print (0 = unlimited)
    #[arg(short = 'n', long, default_value = "0")]
    count: u64,

    /// Show articulation parameters
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Quiet mode - only output data, no headers
    #[arg(short = 'q', long)]
    quiet: bool,
}

#[derive(Clone, Debug, PartialEq)]
enum OutputFormat {
    Pretty,
    Json,
    Compact,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "p" => Ok(OutputFormat::Pretty),
            "json" | "j" => Ok(OutputFormat::Json),
            "compact" | "c" => Ok(OutputFormat::Compact),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

fn main() {
    let args = Args::parse();

    if args.no_color || !io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let format = if args.json {
        OutputFormat::Json
    } else {
        args.format.clone()
    };

    if let Err(e) = run_echo(&args, format) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_echo(args: &Args, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    if !args.quiet {
        print_header(args, &format);
    }

    let hub = RelayHub::new();
    let subscription = hub.subscribe(1024);

    let config = RuntimeConfig {
        port: args.port,
        multicast_group: args.group,
    };
    let receiver = DisReceiver::bind(&config, hub, RelayPolicy::Decoded)?;
    let shutdown = receiver.shutdown_handle();
    let receive_thread = std::thread::spawn(move || receiver.run());

    let mut printed: u64 = 0;
    while running.load(Ordering::SeqCst) {
        if args.count > 0 && printed >= args.count {
            break;
        }

        match subscription.recv_timeout(Duration::from_millis(200)) {
            Ok(RelayEvent::Report(report)) => {
                printed += 1;
                print_report(&report, &format, args.verbose, printed);
                let _ = io::stdout().flush();
            }
            Ok(RelayEvent::Raw { .. }) => {}
            Err(e) if e.is_disconnected() => break,
            Err(_) => {}
        }
    }

    shutdown.shutdown();
    let _ = receive_thread.join();

    if !args.quiet {
        eprintln!("\n{} Received {} entity state(s)", "---".dimmed(), printed);
    }

    Ok(())
}

fn print_header(args: &Args, format: &OutputFormat) {
    let target = match args.group {
        Some(group) => format!("{}:{}", group, args.port),
        None => format!("0.0.0.0:{}", args.port),
    };
    eprintln!(
        "{} {} {} (format={:?})",
        ">>>".green().bold(),
        "Listening for DIS on".bold(),
        target.cyan(),
        format
    );
    eprintln!("{}", "Press Ctrl+C to stop".dimmed());
    eprintln!();
}

fn print_report(report: &EntityStateReport, format: &OutputFormat, verbose: bool, seq: u64) {
    match format {
        OutputFormat::Pretty => print_pretty(report, verbose, seq),
        OutputFormat::Json => print_json(report, seq),
        OutputFormat::Compact => print_compact(report, seq),
    }
}

fn print_pretty(report: &EntityStateReport, verbose: bool, seq: u64) {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
    println!(
        "{} {} {} {}",
        format!("[{}]", timestamp).dimmed(),
        format!("#{}", seq).yellow(),
        report.entity_id.to_string().cyan(),
        report.marking.green().bold(),
    );
    println!(
        "  pos  {:9.5} {:10.5} alt {:8.1} m",
        report.position.latitude_deg, report.position.longitude_deg, report.position.altitude_m
    );
    println!(
        "  att  hdg {:6.1} pitch {:6.1} roll {:6.1}",
        report.attitude.heading_deg, report.attitude.pitch_deg, report.attitude.roll_deg
    );
    if let Some(damage) = report.appearance.damage() {
        println!("  dmg  {}", damage);
    }
    if verbose {
        for param in &report.articulations {
            match param.attached_entity {
                Some(id) => println!("  art  type {} attached {}", param.parameter_type, id),
                None => println!("  art  type {} value {}", param.parameter_type, param.value_hex()),
            }
        }
    }
    println!();
}

fn print_json(report: &EntityStateReport, seq: u64) {
    println!(
        r#"{{"seq":{},"entity":"{}","marking":"{}","lat":{:.6},"lon":{:.6},"alt":{:.1},"heading":{:.1},"pitch":{:.1},"roll":{:.1},"source":"{}"}}"#,
        seq,
        report.entity_id,
        report.marking.escape_default(),
        report.position.latitude_deg,
        report.position.longitude_deg,
        report.position.altitude_m,
        report.attitude.heading_deg,
        report.attitude.pitch_deg,
        report.attitude.roll_deg,
        report.source,
    );
}

fn print_compact(report: &EntityStateReport, seq: u64) {
    println!(
        "#{}: {} '{}' {:.4},{:.4} hdg {:.0}",
        seq,
        report.entity_id,
        report.marking,
        report.position.latitude_deg,
        report.position.longitude_deg,
        report.attitude.heading_deg,
    );
}
