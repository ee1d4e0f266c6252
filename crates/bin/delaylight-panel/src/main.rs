//! # delaylight-panel
//!
//! Command-line DelayLight configuration tool.
//!
//! Composition root that wires the JSON file adapter into the configuration
//! panel and runs one edit per invocation.
//!
//! ## Responsibilities
//! - Parse configuration (CLI args, env vars, config file)
//! - Initialize logging
//! - Construct the state store and host snapshot (adapters)
//! - Open a panel session, apply the requested edit, close it
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer. No domain logic belongs here.

mod cli;
mod config;

use anyhow::{Context, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use delaylight_adapter_json_file::{HostSnapshot, JsonFileStateStore};
use delaylight_app::ports::StateStore;
use delaylight_app::services::device_menu::{DeviceMenus, MenuPurpose};
use delaylight_app::services::panel_service::{ConfigPanel, FieldEdit, FieldStatus};
use delaylight_app::services::scene_cache::SceneCache;
use delaylight_domain::device_list::{self, DeviceEntry, ListKind};
use delaylight_domain::id::SceneId;
use delaylight_domain::state::StateKey;
use delaylight_domain::timing::{DelayField, HouseMode, HouseModes};

use crate::cli::{Cli, Command};
use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config, cli.device)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .with_writer(std::io::stderr)
        .init();

    let store = JsonFileStateStore::new(&config.state.path);
    let mut panel = ConfigPanel::open(store, config.device(), config.panel.variant)
        .await
        .with_context(|| format!("reading {}", config.state.path.display()))?;

    run(&mut panel, &config, cli.command).await?;

    let outcome = panel.close(cli.reload).await?;
    if outcome.reload_requested && !cli.reload {
        eprintln!(
            "Configuration modified. Changes take effect after the host reloads (or pass --reload)."
        );
    }
    Ok(())
}

async fn run<S: StateStore>(
    panel: &mut ConfigPanel<S>,
    config: &Config,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::Show => {
            let snapshot = load_snapshot(config).await?;
            show(panel, &DeviceMenus::new(snapshot)).await?;
        }
        Command::Triggers { entries } => {
            let entries = parse_entries(&entries, ListKind::Trigger)?;
            panel.set_triggers(entries).await?;
        }
        Command::Inhibitors { entries } => {
            let entries = parse_entries(&entries, ListKind::Inhibit)?;
            panel.set_inhibitors(entries).await?;
        }
        Command::Schedule { periods } => {
            panel.set_schedule(periods).await?;
        }
        Command::Devices { on, off } => {
            let on = list_or_current(panel, on.as_deref(), ListKind::On)?;
            let off = list_or_current(panel, off.as_deref(), ListKind::Off)?;
            let result = panel.set_device_lists(on, off).await?;
            if !result.scenes_to_fetch.is_empty() {
                let cache = SceneCache::new(load_snapshot(config).await?);
                report_scenes(&panel.refresh_scene_cache(&cache).await?.failed);
            }
        }
        Command::Level { list, row, value } => {
            report_field(&panel.set_level(list.into(), row, &value).await?);
        }
        Command::Delay { field, seconds } => {
            let field = DelayField::from(field);
            report_field(&panel.set_delay(field, &seconds).await?);
        }
        Command::HoldOn { mode } => {
            panel.set_hold_on(mode).await?;
        }
        Command::HouseModes { modes } => {
            panel.set_house_modes(HouseModes::new(modes)).await?;
        }
        Command::Quieting { seconds } => {
            report_field(&panel.set_quieting(&seconds).await?);
        }
        Command::Menu { list } => {
            let snapshot = load_snapshot(config).await?;
            print_menu(panel, &DeviceMenus::new(snapshot), list.into()).await?;
        }
        Command::RefreshScenes => {
            let cache = SceneCache::new(load_snapshot(config).await?);
            let report = panel.refresh_scene_cache(&cache).await?;
            println!(
                "{} fetched, {} pruned",
                report.fetched.len(),
                report.pruned
            );
            report_scenes(&report.failed);
        }
    }
    Ok(())
}

async fn load_snapshot(config: &Config) -> anyhow::Result<HostSnapshot> {
    HostSnapshot::load(&config.host.snapshot)
        .await
        .with_context(|| format!("loading {}", config.host.snapshot.display()))
}

/// Parse command-line list tokens strictly: anything the decoder would
/// drop or repair is an error here.
fn parse_entries(tokens: &[String], kind: ListKind) -> anyhow::Result<Vec<DeviceEntry>> {
    let joined = tokens.join(&device_list::ENTRY_SEPARATOR.to_string());
    let decoded = device_list::decode_with_issues(&joined, kind);
    if let Some(issue) = decoded.issues.first() {
        bail!("invalid {kind} entry: {issue}");
    }
    Ok(decoded.entries)
}

/// Parse `tokens` when the list was given, otherwise keep the stored list.
fn list_or_current<S: StateStore>(
    panel: &ConfigPanel<S>,
    tokens: Option<&[String]>,
    kind: ListKind,
) -> anyhow::Result<Vec<DeviceEntry>> {
    match tokens {
        Some(tokens) => parse_entries(tokens, kind),
        None => Ok(panel.config().list(kind).to_vec()),
    }
}

fn report_field(edit: &FieldEdit) {
    match &edit.status {
        FieldStatus::Accepted => {}
        FieldStatus::Flagged(err) => eprintln!("Rejected: {err}"),
        FieldStatus::Reset => eprintln!("Invalid value; reset to 0"),
    }
}

fn report_scenes(failed: &[SceneId]) {
    for id in failed {
        eprintln!("Scene {id} could not be loaded; it will be retried on the next refresh");
    }
}

async fn show<S: StateStore>(
    panel: &ConfigPanel<S>,
    menus: &DeviceMenus<HostSnapshot>,
) -> anyhow::Result<()> {
    let config = panel.config();
    let managed = config.managed_keys();
    println!("DelayLight device #{} ({})", panel.device(), panel.variant());

    for kind in ListKind::ALL {
        if !managed.contains(&kind.state_key()) {
            continue;
        }
        let menu = menus
            .build_menu(MenuPurpose::for_list(kind), panel.device())
            .await?;
        println!("\n{kind}:");
        let entries = config.list(kind);
        if entries.is_empty() {
            println!("  (none)");
        }
        for entry in entries {
            let label = menus.label_for(&menu, entry).await?;
            let mut line = format!("  {}", label.text());
            if entry.invert {
                line.push_str(" [inverted]");
            }
            if let Some(level) = entry.level {
                line.push_str(&format!(" at {level}%"));
            }
            println!("{line}");
        }
    }

    if managed.contains(&StateKey::ActivePeriods) {
        println!("\nactive periods:");
        if config.active_periods.is_empty() {
            println!("  (always)");
        }
        for period in &config.active_periods {
            println!("  {period}");
        }
    }

    let timing = &config.timing;
    println!("\ntiming:");
    println!("  auto off delay:   {}s", timing.auto_delay);
    println!("  manual off delay: {}s", timing.manual_delay);
    println!("  on delay:         {}s", timing.on_delay);
    if managed.contains(&StateKey::TriggerQuieting) {
        println!("  trigger quieting: {}s", timing.trigger_quieting);
    }
    println!("  hold-over:        {}", timing.hold_on.description());
    let modes: Vec<&str> = timing.house_modes.iter().map(HouseMode::label).collect();
    println!(
        "  house modes:      {}",
        if modes.is_empty() {
            "any".to_string()
        } else {
            modes.join(", ")
        }
    );
    println!("  cached scenes:    {}", config.scene_data.len());
    Ok(())
}

async fn print_menu<S: StateStore>(
    panel: &ConfigPanel<S>,
    menus: &DeviceMenus<HostSnapshot>,
    kind: ListKind,
) -> anyhow::Result<()> {
    let mut menu = menus
        .build_menu(MenuPurpose::for_list(kind), panel.device())
        .await?;
    let exclusive = kind.exclusive_with();
    if let Some(other) = exclusive {
        menu.disable_used(panel.config().list(other));
    }
    for group in &menu.groups {
        println!("{}", group.room.name);
        for option in &group.options {
            match exclusive {
                Some(other) if option.disabled => {
                    println!("  {:>6}  {} (in {other} list)", option.value, option.label);
                }
                _ => println!("  {:>6}  {}", option.value, option.label),
            }
        }
    }
    Ok(())
}
