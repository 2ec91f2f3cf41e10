//! Config command - inspect and edit the JSON configuration file.
//!
//! Every subcommand acts on the file named by `--config`, else on the per-user default.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;
use tracing::debug;

use mutasi_core::MutasiConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Write a configuration file holding the defaults
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print one value, addressed by a dotted key
    Get {
        /// Dotted key, e.g. "layouts.bni.summary_window"
        key: String,
    },

    /// Change one existing value
    Set {
        /// Dotted key
        key: String,
        /// New value, read as JSON and else as a string
        value: String,
    },

    /// Print where the configuration file lives
    Path,
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    match args.command {
        ConfigCommand::Show => {
            if !path.exists() {
                eprintln!("{} {} not found, showing defaults", style("ℹ").blue(), path.display());
            }
            println!("{}", serde_json::to_string_pretty(&read_or_default(&path)?)?);
        }
        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!("{} already exists. Use --force to overwrite.", path.display());
            }
            write_config(&path, &MutasiConfig::default())?;
            println!("{} Wrote defaults to {}", style("✓").green(), path.display());
        }
        ConfigCommand::Get { key } => {
            let json = serde_json::to_value(read_or_default(&path)?)?;
            println!("{}", serde_json::to_string_pretty(lookup(&json, &key)?)?);
        }
        ConfigCommand::Set { key, value } => {
            let value = set_value(&path, &key, &value)?;
            println!("{} {} = {}", style("✓").green(), key, value);
        }
        ConfigCommand::Path => {
            let status = if path.exists() {
                style("exists").green()
            } else {
                style("not created, run 'mutasi config init'").yellow()
            };
            println!("{} ({})", path.display(), status);
        }
    }

    Ok(())
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mutasi")
        .join("config.json")
}

/// Explicit config file, else the default file when it exists, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<MutasiConfig> {
    match config_path {
        Some(path) => Ok(MutasiConfig::from_file(Path::new(path))?),
        None => read_or_default(&default_config_path()),
    }
}

fn read_or_default(path: &Path) -> anyhow::Result<MutasiConfig> {
    if path.exists() {
        debug!("Loading configuration from {}", path.display());
        Ok(MutasiConfig::from_file(path)?)
    } else {
        Ok(MutasiConfig::default())
    }
}

fn write_config(path: &Path, config: &MutasiConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    config.save(path)?;
    Ok(())
}

fn lookup<'a>(json: &'a Value, key: &str) -> anyhow::Result<&'a Value> {
    key.split('.').try_fold(json, |node, part| {
        node.get(part)
            .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))
    })
}

/// Replace the value at `key` and save. Only keys the config already has are accepted.
fn set_value(path: &Path, key: &str, raw: &str) -> anyhow::Result<Value> {
    let value: Value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    let mut json = serde_json::to_value(read_or_default(path)?)?;

    let (parent_key, field) = match key.rsplit_once('.') {
        Some((parent, field)) => (Some(parent), field),
        None => (None, key),
    };
    let mut parent = &mut json;
    if let Some(parent_key) = parent_key {
        for part in parent_key.split('.') {
            parent = parent
                .get_mut(part)
                .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;
        }
    }
    match parent.get_mut(field) {
        Some(slot) if !slot.is_object() => *slot = value.clone(),
        Some(_) => anyhow::bail!("{} is a section, set one of its fields", key),
        None => anyhow::bail!("Configuration key not found: {}", key),
    }

    // Typed round-trip rejects values of the wrong shape before anything is written
    let config: MutasiConfig = serde_json::from_value(json)
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))?;
    write_config(path, &config)?;

    Ok(value)
}
