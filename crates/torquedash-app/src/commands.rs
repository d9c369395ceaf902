//! Console commands
//!
//! Text commands typed on stdin, standing in for the cluster's buttons and dialogs.
//! Each line is split into words and parsed as a clap command line without a binary name.

use clap::error::ErrorKind;
use clap::{Parser, Subcommand, ValueEnum};
use torquedash_core::profile::FuelType;

/// One line of console input
#[derive(Parser, Debug)]
#[command(name = "torquedash", no_binary_name = true, disable_version_flag = true)]
#[command(about = "Instrument cluster console", long_about = None)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

/// A parsed console command
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Manage driving profiles.
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },
    /// Look up a diagnostic trouble code.
    Dtc {
        /// Trouble code, e.g. P0300.
        code: String,
    },
    /// Turn telemetry logging on or off.
    Log {
        #[arg(value_enum)]
        state: Toggle,
    },
    /// Show the latest frame.
    Status,
    /// Leave the console.
    #[command(alias = "exit")]
    Quit,
}

/// Profile management commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ProfileCommand {
    /// List all profiles, the active one marked.
    List,
    /// Create a profile.
    Create {
        /// Profile name.
        name: String,
        /// Rev ceiling in RPM.
        max_rpm: u32,
        /// Torque multiplier.
        torque_factor: f64,
        /// Fuel type (gasoline, diesel, electric, hybrid).
        #[arg(value_parser = parse_fuel)]
        fuel_type: Option<FuelType>,
    },
    /// Rename a profile.
    Rename {
        /// Current name.
        old: String,
        /// New name.
        new: String,
    },
    /// Delete an inactive profile.
    Delete {
        /// Profile name.
        name: String,
    },
    /// Make a profile active.
    Select {
        /// Profile name.
        name: String,
    },
}

/// On/off argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
}

fn parse_fuel(value: &str) -> Result<FuelType, String> {
    FuelType::from_name(value).ok_or_else(|| format!("unknown fuel type '{}'", value))
}

/// Split a line into whitespace-separated words, honouring double quotes
fn tokenize(line: &str) -> Result<Vec<String>, clap::Error> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if in_quotes {
        return Err(clap::Error::raw(ErrorKind::InvalidValue, "unterminated quote\n"));
    }
    if has_token {
        tokens.push(current);
    }
    Ok(tokens)
}

/// Parse one input line. Blank lines yield `Ok(None)`.
///
/// `help` comes back as an error of kind [`ErrorKind::DisplayHelp`]; print it with
/// [`clap::Error::print`].
pub fn parse(line: &str) -> Result<Option<Command>, clap::Error> {
    let tokens = tokenize(line)?;
    if tokens.is_empty() {
        return Ok(None);
    }
    Line::try_parse_from(tokens).map(|line| Some(line.command))
}
