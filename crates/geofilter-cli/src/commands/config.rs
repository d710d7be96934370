//! Config command implementation

use crate::cli::Cli;
use crate::config_loader::load_config;
use crate::output::OutputWriter;
use anyhow::Result;
use console::style;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
struct ConfigEntry {
    value: String,
    source: String,
}

pub fn execute(cli: &Cli, output: &OutputWriter) -> Result<()> {
    let config = load_config(cli)?;

    let entries: BTreeMap<String, ConfigEntry> = config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| (key, ConfigEntry { value, source: format!("{:?}", source) }))
        .collect();

    if output.is_json() {
        return output.result(entries);
    }

    output.section("Configuration Values");
    for (key, entry) in &entries {
        output.kv(key, format!("{} {}", entry.value, style(format!("({})", entry.source)).dim()));
    }
    Ok(())
}
