//! `trustcheck list`: describe the compiled-in checks

use super::Cli;
use crate::checks;
use crate::config::load_project_config;
use anyhow::Result;
use console::style;
use serde::Serialize;

#[derive(Serialize)]
struct CheckInfo {
    name: &'static str,
    risk: String,
    modes: Vec<String>,
    enabled: bool,
    description: &'static str,
}

pub(super) fn run(cli: &Cli) -> Result<()> {
    let config = load_project_config(&cli.path);
    let mut registry = checks::registry_with(config.scoring.branch_aggregation)?;
    config.apply_risks(&mut registry);

    let infos: Vec<CheckInfo> = registry
        .iter()
        .map(|r| CheckInfo {
            name: r.name,
            risk: r.risk.to_string(),
            modes: r.supported_modes.iter().map(|m| m.to_string()).collect(),
            enabled: config.is_check_enabled(r.name),
            description: r.description,
        })
        .collect();

    if cli.format.as_deref() == Some("json") {
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    let width = infos.iter().map(|i| i.name.len()).max().unwrap_or(0);
    for info in &infos {
        let name = format!("{:<width$}", info.name);
        let name = if info.enabled {
            style(name).bold()
        } else {
            style(name).dim()
        };
        println!(
            "{}  {:<8}  {}",
            name,
            info.risk,
            info.description
        );
        println!("{:width$}  {}", "", style(info.modes.join(", ")).dim());
    }
    Ok(())
}
