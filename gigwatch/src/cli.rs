//! Command-line arguments for gigwatch

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use gigwatch::models::StatusFilter;

#[derive(Parser, Debug)]
#[command(name = "gigwatch")]
#[command(about = "Track concerts of the bands you follow")]
#[command(version)]
pub struct Args {
    /// Root folder holding gigwatch.db
    #[arg(short, long, global = true)]
    pub root_folder: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage the band library
    #[command(subcommand)]
    Bands(BandsCommand),

    /// Discover bands and add them to the library
    #[command(subcommand)]
    Import(ImportCommand),

    /// Fetch concerts for every band
    Refresh,

    /// List concerts passing the filters
    Concerts {
        /// all, favorites, purchased, next30, next90
        #[arg(short, long, default_value = "all")]
        status: StatusFilter,

        /// Exact country as listed by `countries`; omit for any country
        #[arg(short, long)]
        country: Option<String>,
    },

    /// List countries with concerts
    Countries,

    /// Set a reminder (1, 7, 15 or 30 days before) or "off"
    Remind {
        concert_id: String,
        days: ReminderArg,
    },

    /// Toggle the ticket-purchased flag
    Purchased { concert_id: String },

    /// Keep running and deliver reminders until Ctrl+C
    Watch {
        /// Refresh concerts before waiting
        #[arg(long)]
        refresh: bool,

        /// Seconds between checks for library changes made by other commands
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
        reload_secs: u64,
    },
}

#[derive(Subcommand, Debug)]
pub enum BandsCommand {
    List,
    Add {
        #[arg(required = true)]
        names: Vec<String>,
    },
    Remove { name: String },
    /// Toggle the favorite flag
    Favorite { name: String },
}

#[derive(clap::Args, Debug)]
pub struct SelectionArgs {
    /// Leave these names out of the import
    #[arg(short, long)]
    pub exclude: Vec<String>,

    /// Only show what was found
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Subcommand, Debug)]
pub enum ImportCommand {
    /// Extract band names from free text
    Text {
        text: String,
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Extract band names from a web page
    Url {
        url: String,
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Use subfolder names of a music folder
    Folder {
        path: PathBuf,
        #[command(flatten)]
        selection: SelectionArgs,
    },
}

/// Reminder offset in days, `off`/`none` clears it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderArg(pub Option<u32>);

impl FromStr for ReminderArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" => Ok(Self(None)),
            other => other
                .parse::<u32>()
                .map(|days| Self(Some(days)))
                .map_err(|_| format!("'{}' is not a number of days or 'off'", s)),
        }
    }
}
