use crate::output::{print_json, print_table};
use anyhow::Context;
use botforge_core::config::GeneratorConfig;
use botforge_core::group::GroupKind;
use botforge_core::paths;
use botforge_core::project::{CommandEntry, Project};
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum ProjectSubcommand {
    /// Project name, counts, and timestamps
    Info,
    /// List subsystems
    Subsystems,
    /// List commands and command groups, both scopes
    Commands,
}

pub fn run(root: &Path, subcmd: ProjectSubcommand, json: bool) -> anyhow::Result<()> {
    let config = GeneratorConfig::load_or_default(root)?;
    let (project, report) =
        Project::load(&paths::project_path(root, &config)).context("failed to load project")?;
    super::generate::warn_dropped(&report);

    match subcmd {
        ProjectSubcommand::Info => info(&project, json),
        ProjectSubcommand::Subsystems => subsystems(&project, json),
        ProjectSubcommand::Commands => commands(&project, json),
    }
}

fn info(project: &Project, json: bool) -> anyhow::Result<()> {
    let action_count: usize = project.subsystems.iter().map(|s| s.actions.len()).sum();
    let state_count: usize = project.subsystems.iter().map(|s| s.states.len()).sum();
    let command_count = project.atomic_commands().count();
    let group_count = project.named_groups().count();

    if json {
        return print_json(&serde_json::json!({
            "name": project.name,
            "created_at": project.created_at,
            "updated_at": project.updated_at,
            "subsystems": project.subsystems.len(),
            "actions": action_count,
            "states": state_count,
            "commands": command_count,
            "groups": group_count,
            "controllers": project.controllers.len(),
        }));
    }

    println!("Project: {}", project.name);
    if let Some(t) = project.created_at {
        println!("Created: {}", t.to_rfc3339());
    }
    if let Some(t) = project.updated_at {
        println!("Updated: {}", t.to_rfc3339());
    }
    println!();
    println!(
        "Subsystems: {}   Actions: {}   States: {}   Commands: {}   Groups: {}",
        project.subsystems.len(),
        action_count,
        state_count,
        command_count,
        group_count
    );
    Ok(())
}

fn subsystems(project: &Project, json: bool) -> anyhow::Result<()> {
    if json {
        let items: Vec<serde_json::Value> = project
            .subsystems
            .iter()
            .map(|s| {
                serde_json::json!({
                    "name": s.name,
                    "components": s.components.len(),
                    "actions": s.actions.len(),
                    "states": s.states.len(),
                    "commands": s.commands.len(),
                })
            })
            .collect();
        return print_json(&items);
    }

    if project.subsystems.is_empty() {
        println!("No subsystems.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = project
        .subsystems
        .iter()
        .map(|s| {
            vec![
                s.name.clone(),
                s.components.len().to_string(),
                s.actions.len().to_string(),
                s.states.len().to_string(),
                s.commands.len().to_string(),
            ]
        })
        .collect();
    print_table(&["NAME", "COMPONENTS", "ACTIONS", "STATES", "COMMANDS"], rows);
    Ok(())
}

fn commands(project: &Project, json: bool) -> anyhow::Result<()> {
    // (name, kind, owner, method)
    let mut listing: Vec<(String, &'static str, String, String)> = Vec::new();

    for entry in &project.commands {
        match entry {
            CommandEntry::Atomic(cmd) => {
                let owner = project
                    .subsystem(cmd.subsystem)
                    .map(|s| s.name.clone())
                    .unwrap_or_else(|| "-".to_string());
                listing.push((cmd.name.clone(), "atomic", owner, cmd.method_name()));
            }
            CommandEntry::Group(group) => {
                let kind = match group.kind {
                    GroupKind::Sequential => "sequential",
                    GroupKind::Parallel { .. } => "parallel",
                };
                listing.push((
                    group.name.clone().unwrap_or_else(|| "(unnamed)".to_string()),
                    kind,
                    "-".to_string(),
                    group.method_name().unwrap_or_else(|| "-".to_string()),
                ));
            }
        }
    }
    for subsystem in &project.subsystems {
        for cmd in &subsystem.commands {
            listing.push((
                cmd.name.clone(),
                "atomic",
                subsystem.name.clone(),
                cmd.method_name(),
            ));
        }
    }

    if json {
        let items: Vec<serde_json::Value> = listing
            .iter()
            .map(|(name, kind, owner, method)| {
                serde_json::json!({
                    "name": name,
                    "kind": kind,
                    "subsystem": if owner == "-" { serde_json::Value::Null } else { owner.clone().into() },
                    "method": method,
                })
            })
            .collect();
        return print_json(&items);
    }

    if listing.is_empty() {
        println!("No commands.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = listing
        .into_iter()
        .map(|(name, kind, owner, method)| vec![name, kind.to_string(), owner, method])
        .collect();
    print_table(&["NAME", "KIND", "SUBSYSTEM", "METHOD"], rows);
    Ok(())
}
