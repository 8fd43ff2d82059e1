//! Hardware-in-the-loop tests for relay/dimmer and RGB nodes.
//!
//! Run with the radio controller attached and a node powered in range.

mod device;

use clap::Parser;
use colored::Colorize;

use wavelink::commands::{CommandTable, DeviceAddress, FirmwareVersion, NodeKind};
use wavelink::config::serial::BAUD_RATE;
use wavelink::transport::TransportConfig;

use device::{open_client, resolve_port};
use tests::{print_results, run_all_tests, NodeUnderTest};

#[derive(Parser)]
#[command(name = "node-tests")]
#[command(about = "Hardware tests for nodes behind the radio controller")]
struct Args {
    /// Serial port of the radio controller (use "auto" to auto-detect)
    #[arg(short, long, default_value = "auto")]
    port: String,

    /// Baud rate
    #[arg(short, long, default_value_t = BAUD_RATE)]
    baud: u32,

    /// Node address, e.g. 12:A7:E4
    #[arg(short, long)]
    node: DeviceAddress,

    /// Node kind: relay or rgb
    #[arg(short, long, default_value = "relay")]
    kind: NodeKind,

    /// Expected firmware version (read from the node when omitted)
    #[arg(short, long)]
    firmware: Option<FirmwareVersion>,

    /// Do not wait for the node to finish processing
    #[arg(long)]
    no_block: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    // Resolve port (auto-detect if "auto")
    let port = resolve_port(&args.port)?;

    println!("{}", "Node Tests".bold());
    println!("Port: {}", port);
    println!("Baud: {}", args.baud);
    println!("Node: {} ({})", args.node, args.kind);
    println!();

    let config = TransportConfig {
        block: !args.no_block,
        ..TransportConfig::default()
    };

    println!("Opening radio controller...");
    let client = open_client(&port, args.baud, config)?;
    println!("{}", "Connected!".green());

    let mut target = NodeUnderTest {
        client,
        node: args.node,
        table: CommandTable::for_kind(args.kind),
        version: args.firmware,
    };

    println!("\nRunning tests...\n");

    let results = run_all_tests(&mut target);
    print_results(&results);

    // Exit with error code if any tests failed
    let failed = results.iter().filter(|r| !r.passed).count();
    if failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}
