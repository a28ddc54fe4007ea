//! Config command implementation

use crate::cli::ConfigArgs;
use crate::config_loader::AppContext;
use crate::output::OutputWriter;
use crate::output_types::{ConfigEntry, ConfigRow};
use anyhow::Result;

pub fn execute(_args: &ConfigArgs, ctx: &AppContext, output: &OutputWriter) -> Result<()> {
    let mut entries: Vec<ConfigEntry> = ctx
        .config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| ConfigEntry {
            key,
            value,
            source: format!("{:?}", source).to_lowercase(),
        })
        .collect();
    entries.sort_by(|a, b| a.key.cmp(&b.key));

    if !output.is_json() {
        output.section("Konfiguration");
        output.table(
            entries
                .iter()
                .map(|e| ConfigRow { key: e.key.clone(), value: e.value.clone(), source: e.source.clone() })
                .collect(),
        );
    }

    output.result(entries)
}
