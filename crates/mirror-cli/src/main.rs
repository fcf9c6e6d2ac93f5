//! mirror CLI - command-line front end for mirror_bridge
//!
//! Usage:
//!     mirror [OPTIONS] <COMMAND>
//!
//! Environment Variables:
//!     MIRROR_ADB_PATH: adb executable (default: adb from PATH)
//!     MIRROR_COMMAND_TIMEOUT: timeout in seconds for captured adb commands
//!     RUST_LOG: log filter, overrides -v

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use mirror_bridge::config::{parse_timeout, ADB_PATH_ENV, COMMAND_TIMEOUT_ENV};
use mirror_bridge::{AdbBridge, BridgeConfig, DeviceProperties, MirrorSession};
use serde_json::json;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Mirror - drive Android devices through adb
#[derive(Parser, Debug)]
#[command(name = "mirror")]
#[command(about = "Drive Android devices through adb")]
#[command(after_help = r#"Examples:
    # Check that adb is installed
    mirror check

    # Show the first connected device
    mirror props

    # Forward the mirroring socket
    mirror forward -s emulator-5554 tcp:27183 localabstract:scrcpy

    # Start a command in the background and wait for it
    mirror shell -s emulator-5554 --detach "sleep 5"
"#)]
struct Cli {
    /// adb executable
    #[arg(long, env = ADB_PATH_ENV, default_value = "adb")]
    adb: PathBuf,

    /// Timeout in seconds for adb commands whose output is read
    #[arg(long, env = COMMAND_TIMEOUT_ENV, value_name = "SECS")]
    timeout: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Locate adb and print its version banner
    Check,

    /// List connected devices
    Devices,

    /// Print product name and model of a device
    Props {
        /// Device serial (first connected device if omitted)
        #[arg(short = 's', long = "serial", action = ArgAction::Append)]
        serials: Vec<String>,
    },

    /// Push a local file to the device
    Push {
        #[arg(short = 's', long)]
        serial: String,
        local: PathBuf,
        remote: String,
    },

    /// Forward a local socket to the device
    Forward {
        #[arg(short = 's', long)]
        serial: String,
        local: String,
        remote: String,
    },

    /// Remove a forward
    Unforward {
        #[arg(short = 's', long)]
        serial: String,
        local: String,
    },

    /// Run a shell command on the device
    Shell {
        #[arg(short = 's', long)]
        serial: String,

        /// Start in the background, print the pid, then wait
        #[arg(long)]
        detach: bool,

        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Open a mirroring session on a device
    Session {
        /// Device serial (first connected device if omitted)
        #[arg(short = 's', long = "serial", action = ArgAction::Append)]
        serials: Vec<String>,

        /// Codec label to record on the session
        #[arg(long)]
        codec: Option<String>,

        /// Shell command to keep running for the session
        #[arg(long, value_name = "COMMAND")]
        run: Option<String>,
    },
}

/// Install the log subscriber. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_bridge(args: &Cli) -> Result<AdbBridge> {
    let mut config = BridgeConfig::new().with_adb_path(&args.adb);

    if let Some(raw) = &args.timeout {
        let timeout =
            parse_timeout(raw).ok_or_else(|| anyhow!("Invalid timeout: {:?}", raw))?;
        config = config.with_command_timeout(timeout);
    }

    Ok(AdbBridge::with_config(config))
}

fn print_properties(out: &mut impl Write, props: &DeviceProperties, as_json: bool) -> Result<()> {
    if as_json {
        writeln!(out, "{}", serde_json::to_string_pretty(props)?)?;
    } else {
        writeln!(out, "Device:  {}", props.device_id)?;
        writeln!(out, "Product: {}", or_unknown(&props.product_name))?;
        writeln!(out, "Model:   {}", or_unknown(&props.model))?;
    }
    Ok(())
}

fn or_unknown(value: &str) -> &str {
    if value.is_empty() {
        "(unknown)"
    } else {
        value
    }
}

/// Handle `check`
async fn check(out: &mut impl Write, bridge: &AdbBridge, as_json: bool) -> Result<()> {
    let location = which::which(bridge.adb_path()).ok();
    let configured = bridge.adb_path().display().to_string();
    let banner = bridge.verify().await?;

    if as_json {
        writeln!(
            out,
            "{}",
            json!({
                "adb": configured,
                "resolved": location.as_ref().map(|p| p.display().to_string()),
                "version": banner,
            })
        )?;
    } else {
        match location {
            Some(path) => writeln!(out, "\u{2713} adb found at {}", path.display())?,
            None => writeln!(out, "\u{2713} adb at {}", configured)?,
        }
        writeln!(out, "  {}", banner)?;
    }
    Ok(())
}

/// Handle `devices`
async fn devices(out: &mut impl Write, bridge: &AdbBridge, as_json: bool) -> Result<()> {
    let devices = bridge.list_devices().await?;

    if as_json {
        writeln!(out, "{}", serde_json::to_string(&devices)?)?;
    } else if devices.is_empty() {
        writeln!(out, "No devices connected.")?;
    } else {
        writeln!(out, "Connected devices:")?;
        writeln!(out, "{}", "-".repeat(40))?;
        for device in devices {
            writeln!(out, "  {}", device)?;
        }
    }
    Ok(())
}

/// Handle `shell`
async fn shell(
    out: &mut impl Write,
    bridge: &AdbBridge,
    serial: &str,
    detach: bool,
    command: &[String],
) -> Result<()> {
    let command = command.join(" ");

    if !detach {
        bridge.run_shell(serial, &command).await?;
        return Ok(());
    }

    let process = bridge.spawn_shell(serial, &command).await?;
    match process.id() {
        Some(pid) => writeln!(out, "Started `{}` (pid {})", command, pid)?,
        None => writeln!(out, "Started `{}`", command)?,
    }

    let status = process.wait().await?;
    writeln!(out, "Exited with {}", status)?;
    if !status.success() {
        return Err(anyhow!("`{}` exited with {}", command, status));
    }
    Ok(())
}

/// Handle `session`
async fn session(
    out: &mut impl Write,
    bridge: &AdbBridge,
    serials: &[String],
    codec: Option<&str>,
    run: Option<&str>,
    as_json: bool,
) -> Result<()> {
    let mut session = MirrorSession::open_serials(bridge, serials).await?;

    if let Some(codec) = codec {
        session.set_codec(codec);
    }

    if let Some(command) = run {
        let process = bridge
            .spawn_shell(session.device_id(), command)
            .await
            .with_context(|| format!("Failed to start `{}`", command))?;
        let _ = session.attach_process(process);
    }

    let pid = session.process().and_then(|p| p.id());

    if as_json {
        writeln!(
            out,
            "{}",
            json!({
                "device": session.properties(),
                "codec": session.codec(),
                "pid": pid,
            })
        )?;
    } else {
        print_properties(out, session.properties(), false)?;
        writeln!(out, "Codec:   {}", session.codec().unwrap_or("(none)"))?;
        if let Some(pid) = pid {
            writeln!(out, "Process: {}", pid)?;
        }
    }

    if let Some(status) = session.wait_process().await? {
        writeln!(out, "Session process exited with {}", status)?;
    }
    Ok(())
}

/// Dispatch a parsed command line, writing results to `out`
async fn run(args: &Cli, out: &mut impl Write) -> Result<()> {
    let bridge = build_bridge(args)?;
    debug!("Using {:?}", bridge.config());

    match &args.command {
        Commands::Check => check(out, &bridge, args.json).await?,
        Commands::Devices => devices(out, &bridge, args.json).await?,
        Commands::Props { serials } => {
            let session = MirrorSession::open_serials(&bridge, serials.as_slice()).await?;
            print_properties(out, session.properties(), args.json)?;
        }
        Commands::Push {
            serial,
            local,
            remote,
        } => {
            bridge.push(serial, local, remote).await?;
            writeln!(out, "\u{2713} Pushed {} to {}", local.display(), remote)?;
        }
        Commands::Forward {
            serial,
            local,
            remote,
        } => {
            bridge.forward(serial, local, remote).await?;
            writeln!(out, "\u{2713} Forwarding {} -> {}", local, remote)?;
        }
        Commands::Unforward { serial, local } => {
            bridge.remove_forward(serial, local).await?;
            writeln!(out, "\u{2713} Removed forward {}", local)?;
        }
        Commands::Shell {
            serial,
            detach,
            command,
        } => shell(out, &bridge, serial, *detach, command).await?,
        Commands::Session {
            serials,
            codec,
            run,
        } => {
            session(
                out,
                &bridge,
                serials,
                codec.as_deref(),
                run.as_deref(),
                args.json,
            )
            .await?
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose);

    let mut out = io::stdout();
    run(&args, &mut out).await
}
