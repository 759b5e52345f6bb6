//! `crumbs`: CRUMBS leader for I2C peripherals.
//!
//! Without a subcommand it runs the interactive leader loop on stdin.

use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand};
use crumbs_host::{
    logging, parse_address, usage, Controller, FrameTransport, HostConfig, HostError, HostResult,
    LeaderCommand, SimulatedBus, SimulatedPeripheral,
};
use crumbs_protocol::{
    decode, encode, DecodedFrame, FrameRevision, Message, Revision, RevisionA, RevisionB,
};
use tracing::{error, warn};

#[derive(Debug, Parser)]
#[command(name = "crumbs", version, about = "Exchange CRUMBS messages with I2C peripherals")]
struct Cli {
    /// YAML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// I2C device path (overrides the configuration).
    #[arg(long, global = true)]
    bus: Option<PathBuf>,

    /// Frame revision: "a" (27 bytes, error flags) or "b" (31 bytes, CRC-8).
    #[arg(short, long, global = true)]
    revision: Option<FrameRevision>,

    /// Use an in-memory bus with echo peripherals instead of real hardware.
    #[arg(long, global = true)]
    simulate: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Send one message.
    Send {
        /// Target address (defaults to the configured address).
        #[arg(short, long, value_parser = parse_address)]
        address: Option<u8>,
        #[command(flatten)]
        message: MessageArgs,
    },
    /// Request one message.
    Request {
        /// Target address (defaults to the configured address).
        #[arg(short, long, value_parser = parse_address)]
        address: Option<u8>,
    },
    /// Print the hex frame for a message without touching the bus.
    Encode {
        #[command(flatten)]
        message: MessageArgs,
    },
    /// Decode a hex frame without touching the bus.
    Decode {
        /// Frame bytes as hex.
        #[arg(value_name = "HEX")]
        frame: String,
    },
}

#[derive(Debug, Args)]
struct MessageArgs {
    /// Message type ID.
    type_id: u8,
    /// Command type.
    command_type: u8,
    /// Payload values; exactly as many as the revision carries.
    #[arg(required = true, allow_negative_numbers = true)]
    data: Vec<f32>,
    /// Error flags (revision A only).
    #[arg(long, default_value_t = 0)]
    flags: u8,
}

impl MessageArgs {
    fn to_message<R: Revision>(&self) -> HostResult<Message<R>> {
        if R::REVISION.has_crc() && self.flags != 0 {
            warn!("--flags is ignored for revision {}", R::REVISION);
        }
        Ok(Message::<R>::from_slice(
            self.type_id,
            self.command_type,
            &self.data,
            R::check_from_trailer(self.flags),
        )?)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> HostResult<HostConfig> {
    let mut config = match &cli.config {
        Some(path) => HostConfig::from_file(path)?,
        None => HostConfig::default(),
    };
    if let Some(bus) = &cli.bus {
        config.bus = bus.clone();
    }
    if let Some(revision) = cli.revision {
        config.revision = revision;
    }
    config.validate()?;
    Ok(config)
}

fn run(cli: &Cli) -> HostResult<()> {
    let config = load_config(cli)?;
    match config.revision {
        FrameRevision::A => run_revision::<RevisionA>(cli, &config),
        FrameRevision::B => run_revision::<RevisionB>(cli, &config),
    }
}

fn run_revision<R>(cli: &Cli, config: &HostConfig) -> HostResult<()>
where
    R: Revision,
    DecodedFrame<R>: Display,
{
    match &cli.command {
        Some(Command::Encode { message }) => {
            let frame = encode(&message.to_message::<R>()?);
            println!("{}", hex::encode(frame.as_ref()));
            return Ok(());
        }
        Some(Command::Decode { frame }) => {
            let bytes = hex::decode(frame.trim())
                .map_err(|e| HostError::parse(format!("invalid hex frame: {}", e)))?;
            let decoded = decode::<R>(&bytes)?;
            println!("{}", decoded);
            if !decoded.is_intact() {
                warn!("frame failed CRC check");
            }
            return Ok(());
        }
        _ => {}
    }

    if cli.simulate {
        let bus = config
            .simulated_peripherals
            .iter()
            .fold(SimulatedBus::new(), |bus, &address| {
                bus.with_peripheral(address, SimulatedPeripheral::echo())
            });
        return run_on_bus::<R, _>(cli, config, bus);
    }
    open_hardware_bus::<R>(cli, config)
}

#[cfg(feature = "linux")]
fn open_hardware_bus<R>(cli: &Cli, config: &HostConfig) -> HostResult<()>
where
    R: Revision,
    DecodedFrame<R>: Display,
{
    let bus = crumbs_host::open_linux_bus(&config.bus)?;
    tracing::info!("I2C bus {} opened as controller", config.bus.display());
    run_on_bus::<R, _>(cli, config, bus)
}

#[cfg(not(feature = "linux"))]
fn open_hardware_bus<R: Revision>(_cli: &Cli, config: &HostConfig) -> HostResult<()> {
    Err(HostError::Config(format!(
        "cannot open {}: built without the `linux` feature (use --simulate)",
        config.bus.display()
    )))
}

fn target_address(explicit: Option<u8>, config: &HostConfig) -> HostResult<u8> {
    explicit.or(config.default_address).ok_or_else(|| {
        HostError::Config("no address given and no default_address configured".to_string())
    })
}

fn run_on_bus<R, T>(cli: &Cli, config: &HostConfig, bus: T) -> HostResult<()>
where
    R: Revision,
    T: FrameTransport,
    DecodedFrame<R>: Display,
{
    let mut controller: Controller<T, R> = Controller::new(bus);
    let result = match &cli.command {
        Some(Command::Send { address, message }) => {
            let address = target_address(*address, config)?;
            controller.send_message(&message.to_message::<R>()?, address)
        }
        Some(Command::Request { address }) => {
            let address = target_address(*address, config)?;
            let decoded = controller.request_message(address)?;
            println!("{}", decoded);
            Ok(())
        }
        _ => interactive(&mut controller),
    };
    controller.into_inner();
    result
}

fn interactive<T, R>(controller: &mut Controller<T, R>) -> HostResult<()>
where
    T: FrameTransport,
    R: Revision,
    DecodedFrame<R>: Display,
{
    println!("CRUMBS leader (revision {}) running", R::REVISION);
    println!("{}", usage::<R>());

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("Enter command: ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match LeaderCommand::<R>::parse(&line) {
            Ok(LeaderCommand::Exit) => break,
            Ok(LeaderCommand::Help) => println!("{}", usage::<R>()),
            Ok(LeaderCommand::Send { address, message }) => {
                match controller.send_message(&message, address) {
                    Ok(()) => println!("Message sent."),
                    Err(e) => warn!("{}", e),
                }
            }
            Ok(LeaderCommand::Request { address }) => match controller.request_message(address) {
                Ok(decoded) => {
                    println!("Received response:");
                    println!("{}", decoded);
                }
                Err(e) => {
                    warn!("{}", e);
                    println!("No valid response received.");
                }
            },
            Err(e) => {
                warn!("{}", e);
                println!("Failed to parse command. Type 'help' for usage.");
            }
        }
    }

    println!("Exiting CRUMBS leader.");
    Ok(())
}
