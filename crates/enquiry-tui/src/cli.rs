//! CLI argument parsing for the enquiry wizard
//!
//! The interactive wizard is the default when no subcommand is given.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "enquiry")]
#[command(about = "Booking enquiry wizard for Lapland holiday packages")]
#[command(long_about = "Booking enquiry wizard for Lapland holiday packages\n\n\
    Run without arguments to open the interactive three-step wizard.\n\
    Use `submit` to send a drafted enquiry from a TOML file.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enquiry endpoint URL (overrides the config file and ENQUIRY_ENDPOINT)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open the interactive wizard
    Tui {
        /// Package id to preselect (starts on the package step)
        #[arg(long)]
        package: Option<String>,
    },

    /// List the packages offered on the package step
    Packages,

    /// Submit an enquiry drafted in a TOML file
    Submit {
        /// Draft file using the wire field names (departureDate, firstName, ...)
        #[arg(long)]
        file: PathBuf,

        /// Package id, overriding the draft's selectedPackage
        #[arg(long)]
        package: Option<String>,
    },
}
