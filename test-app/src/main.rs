// thermlink test application -- CLI tool for exercising the TC-36-25
// backend against real hardware or a mock transport.
//
// Usage:
//   thermlink-test-app --port /dev/ttyUSB0 audit
//   thermlink-test-app --port /dev/ttyUSB0 --profile bench.toml audit
//   thermlink-test-app --port /dev/ttyUSB0 temp
//   thermlink-test-app --port /dev/ttyUSB0 set-temp 37.0
//   thermlink-test-app --port /dev/ttyUSB0 read 01
//   thermlink-test-app --port /dev/ttyUSB0 write 1c 2500
//   thermlink-test-app --mock audit
//
// Set RUST_LOG=debug (or thermlink_tc3625=trace) for wire-level logging.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use thermlink::tc3625::protocol::{encode_command, encode_response};
use thermlink::tc3625::{commands, CommandCode, CommandTable, Profile, Tc3625, Tc3625Builder};
use thermlink_test_harness::MockTransport;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// thermlink test application -- exercises the TC-36-25 backend from the
/// command line.
#[derive(Parser)]
#[command(name = "thermlink-test-app", version, about)]
struct Cli {
    /// Serial port path (e.g. /dev/ttyUSB0, COM3).
    /// Required unless --mock is used. The line rate is fixed at 9600.
    #[arg(long)]
    port: Option<String>,

    /// Response timeout per exchange, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    timeout_ms: u64,

    /// TOML profile file defining the command table for `audit`.
    /// Defaults to the built-in factory profile.
    #[arg(long)]
    profile: Option<String>,

    /// Use a mock transport instead of a real serial port.
    /// The mock answers every exchange with the profile's expected
    /// values, so this verifies CLI parsing and session wiring without
    /// hardware.
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Audit the controller against the profile and correct writable
    /// parameters that have drifted. Exits nonzero if any parameter
    /// ends out of profile.
    Audit,

    /// Read a register by its two-character hex code.
    Read {
        /// Register code (e.g. 01, 50).
        code: String,
    },

    /// Write a register by its two-character hex code.
    Write {
        /// Register code (e.g. 1c, 28).
        code: String,
        /// Value to store.
        value: i32,
    },

    /// Read the primary control thermistor (INPUT1), in degrees.
    Temp,

    /// Set the fixed control setpoint, in degrees.
    SetTemp {
        /// Setpoint in degrees (e.g. 37.0).
        degrees: f64,
    },

    /// Clear a latched alarm.
    ResetAlarm,
}

// ---------------------------------------------------------------------------
// Session construction
// ---------------------------------------------------------------------------

/// Load the command table for `audit`: a TOML profile if given,
/// otherwise the built-in factory defaults.
fn load_table(cli: &Cli) -> Result<CommandTable> {
    match cli.profile.as_deref() {
        Some(path) => Profile::load(path)
            .and_then(Profile::into_table)
            .with_context(|| format!("failed to load profile {path}")),
        None => Ok(commands::factory_profile()),
    }
}

/// Pre-load a mock transport with one exchange per expected request, so
/// every command the CLI can issue gets a plausible reply.
fn scripted_mock(cli: &Cli, table: &CommandTable) -> Result<MockTransport> {
    let mut mock = MockTransport::new();

    match &cli.command {
        Command::Audit => {
            // The mock controller already agrees with every value.
            for def in table {
                if let Some(read) = def.read_code {
                    let request = encode_command(read, 0)?;
                    mock.expect(request.as_bytes(), &encode_response(def.expected));
                }
            }
        }
        Command::Read { code } => {
            let code: CommandCode = code.parse()?;
            let request = encode_command(code, 0)?;
            mock.expect(request.as_bytes(), &encode_response(0));
        }
        Command::Write { code, value } => {
            let code: CommandCode = code.parse()?;
            let request = encode_command(code, i64::from(*value))?;
            mock.expect(request.as_bytes(), &encode_response(*value));
        }
        Command::Temp => {
            let request = encode_command(commands::codes::INPUT1, 0)?;
            mock.expect(request.as_bytes(), &encode_response(2043));
        }
        Command::SetTemp { degrees } => {
            let centi = thermlink::tc3625::controller::degrees_to_centi(*degrees)?;
            let request = encode_command(commands::codes::SET_FIXED_SETPOINT, i64::from(centi))?;
            mock.expect(request.as_bytes(), &encode_response(centi));
        }
        Command::ResetAlarm => {
            let request = encode_command(commands::codes::ALARM_LATCH_RESET, 0)?;
            mock.expect(request.as_bytes(), &encode_response(0));
        }
    }

    Ok(mock)
}

/// Construct a session from CLI arguments: a scripted mock or a real
/// serial port.
async fn create_session(cli: &Cli, table: &CommandTable) -> Result<Tc3625> {
    let builder = Tc3625Builder::new().response_timeout(Duration::from_millis(cli.timeout_ms));

    if cli.mock {
        let mock = scripted_mock(cli, table)?;
        println!("Connected (mock transport)");
        Ok(builder.build_with_transport(Box::new(mock)))
    } else {
        let port = cli
            .port
            .as_deref()
            .context("--port is required when not using --mock")?;
        let tc = builder
            .serial_port(port)
            .build()
            .await
            .with_context(|| format!("failed to open serial port {port}"))?;
        println!("Connected to {port} at 9600 baud");
        Ok(tc)
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_audit(tc: &mut Tc3625, table: &CommandTable) -> Result<()> {
    let report = tc.reconcile(table).await?;

    for outcome in report.outcomes() {
        println!("{outcome}");
    }

    println!();
    println!(
        "{} audited, {} corrected, {} failed.",
        report.outcomes().len(),
        report.corrections(),
        report.failures().count()
    );

    if report.has_failures() {
        bail!("controller configuration does not match the profile");
    }
    Ok(())
}

async fn cmd_read(tc: &mut Tc3625, code: &str) -> Result<()> {
    let code: CommandCode = code.parse()?;
    match tc.read_parameter(code).await? {
        Ok(value) => println!("{code}: {value}"),
        Err(e) => bail!("read {code} failed: {e}"),
    }
    Ok(())
}

async fn cmd_write(tc: &mut Tc3625, code: &str, value: i32) -> Result<()> {
    let code: CommandCode = code.parse()?;
    match tc.write_parameter(code, value).await? {
        Ok(echo) => println!("{code}: wrote {value}, controller stored {echo}"),
        Err(e) => bail!("write {code} failed: {e}"),
    }
    Ok(())
}

async fn cmd_temp(tc: &mut Tc3625) -> Result<()> {
    let degrees = tc.read_temperature().await?;
    println!("INPUT1: {degrees:.2} deg");
    Ok(())
}

async fn cmd_set_temp(tc: &mut Tc3625, degrees: f64) -> Result<()> {
    tc.set_setpoint(degrees).await?;
    println!("Setpoint: {degrees:.2} deg");
    Ok(())
}

async fn cmd_reset_alarm(tc: &mut Tc3625) -> Result<()> {
    tc.reset_alarm_latch().await?;
    println!("Alarm latch cleared.");
    Ok(())
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

async fn run(cli: Cli) -> Result<()> {
    let table = load_table(&cli)?;
    let mut tc = create_session(&cli, &table).await?;

    let result = match &cli.command {
        Command::Audit => cmd_audit(&mut tc, &table).await,
        Command::Read { code } => cmd_read(&mut tc, code).await,
        Command::Write { code, value } => cmd_write(&mut tc, code, *value).await,
        Command::Temp => cmd_temp(&mut tc).await,
        Command::SetTemp { degrees } => cmd_set_temp(&mut tc, *degrees).await,
        Command::ResetAlarm => cmd_reset_alarm(&mut tc).await,
    };

    tc.close().await.ok();
    result
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
