//! Command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use delaylight_domain::device_list::ListKind;
use delaylight_domain::schedule::SchedulePeriod;
use delaylight_domain::timing::{DelayField, HoldOverMode, HouseMode};

use crate::config;

#[derive(Parser)]
#[command(name = "delaylight-panel")]
#[command(about = "Inspect and edit the configuration of a DelayLight device", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = config::DEFAULT_PATH)]
    pub config: PathBuf,

    /// Plugin device number (overrides the configuration)
    #[arg(short, long)]
    pub device: Option<u32>,

    /// Ask the host to reload when the configuration was modified
    #[arg(long)]
    pub reload: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the current configuration
    Show,
    /// Replace the trigger devices, e.g. `12 -31` (`-` inverts)
    Triggers {
        #[arg(allow_hyphen_values = true)]
        entries: Vec<String>,
    },
    /// Replace the inhibiting devices, e.g. `40 -41` (`-` inverts)
    Inhibitors {
        #[arg(allow_hyphen_values = true)]
        entries: Vec<String>,
    },
    /// Replace the active periods, e.g. `0800-1700 2200-0600`
    Schedule { periods: Vec<SchedulePeriod> },
    /// Replace the on and/or off list, e.g. `--on 12=50,14 --off S3`
    ///
    /// A list whose flag is absent is kept as stored. A flag given with no
    /// value clears that list.
    Devices {
        #[arg(long, value_delimiter = ',', num_args = 0.., required_unless_present = "off")]
        on: Option<Vec<String>>,
        #[arg(long, value_delimiter = ',', num_args = 0..)]
        off: Option<Vec<String>>,
    },
    /// Set the dimming level of one on/off row (blank clears it)
    Level {
        list: LoadList,
        row: usize,
        #[arg(default_value = "")]
        value: String,
    },
    /// Set a delay in seconds
    Delay { field: DelayArg, seconds: String },
    /// Set the hold-over mode (0, 1 or 2)
    HoldOn { mode: HoldOverMode },
    /// Restrict triggering to house modes 1-4 (none means any)
    HouseModes { modes: Vec<HouseMode> },
    /// Set the trigger quieting period in seconds
    Quieting { seconds: String },
    /// List the devices offered for a list
    Menu { list: ListArg },
    /// Fetch missing scene detail into the scene cache
    RefreshScenes,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ListArg {
    Trigger,
    Inhibit,
    On,
    Off,
}

impl From<ListArg> for ListKind {
    fn from(arg: ListArg) -> Self {
        match arg {
            ListArg::Trigger => Self::Trigger,
            ListArg::Inhibit => Self::Inhibit,
            ListArg::On => Self::On,
            ListArg::Off => Self::Off,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LoadList {
    On,
    Off,
}

impl From<LoadList> for ListKind {
    fn from(arg: LoadList) -> Self {
        match arg {
            LoadList::On => Self::On,
            LoadList::Off => Self::Off,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DelayArg {
    Auto,
    Manual,
    On,
}

impl From<DelayArg> for DelayField {
    fn from(arg: DelayArg) -> Self {
        match arg {
            DelayArg::Auto => Self::Auto,
            DelayArg::Manual => Self::Manual,
            DelayArg::On => Self::On,
        }
    }
}
