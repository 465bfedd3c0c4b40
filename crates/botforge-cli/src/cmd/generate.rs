use crate::output::print_json;
use anyhow::Context;
use botforge_core::catalog::{default_catalog, ComponentCatalog};
use botforge_core::codegen::{command, group, Fragment, Generator};
use botforge_core::config::GeneratorConfig;
use botforge_core::project::{LoadReport, Project};
use botforge_core::{io, paths};
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum GenerateSubcommand {
    /// Emit every method of one subsystem
    Subsystem {
        /// Subsystem name
        name: String,
    },

    /// Emit one command or command group by name
    Command {
        /// Command name as it appears in the project
        name: String,
    },

    /// Emit every fragment in the project
    All {
        /// Write fragments into the configured output directory instead of stdout
        #[arg(long)]
        write: bool,
    },
}

pub fn run(root: &Path, subcmd: GenerateSubcommand, json: bool) -> anyhow::Result<()> {
    let config = GeneratorConfig::load_or_default(root)?;
    let (project, report) =
        Project::load(&paths::project_path(root, &config)).context("failed to load project")?;
    warn_dropped(&report);
    let catalog = load_catalog(root, &config)?;
    let generator = Generator::new(&project, &catalog);

    match subcmd {
        GenerateSubcommand::Subsystem { name } => {
            let subsystem = project
                .subsystem_by_name(&name)
                .with_context(|| format!("no subsystem named '{name}'"))?;
            let fragments = generator.emit_subsystem(subsystem);
            if fragments.is_empty() {
                anyhow::bail!("subsystem '{name}' has nothing generatable yet");
            }
            emit(&fragments, json)
        }
        GenerateSubcommand::Command { name } => {
            let fragment = find_command_fragment(&project, &catalog, &name)
                .with_context(|| format!("no command named '{name}'"))?;
            if fragment.text.is_empty() {
                anyhow::bail!("command '{name}' is not yet generatable");
            }
            emit(std::slice::from_ref(&fragment), json)
        }
        GenerateSubcommand::All { write } => {
            let fragments = generator.emit_project();
            if !write {
                return emit(&fragments, json);
            }
            let dir = paths::output_dir(root, &config);
            for fragment in &fragments {
                let mut data = fragment.text.clone();
                data.push('\n');
                let path = paths::fragment_path(&dir, fragment);
                io::atomic_write(&path, data.as_bytes())
                    .with_context(|| format!("failed to write {}", path.display()))?;
            }
            if json {
                print_json(&serde_json::json!({
                    "written": fragments.len(),
                    "output_dir": dir.display().to_string(),
                }))
            } else {
                println!("wrote {} fragment(s) to {}", fragments.len(), dir.display());
                Ok(())
            }
        }
    }
}

pub(crate) fn load_catalog(
    root: &Path,
    config: &GeneratorConfig,
) -> anyhow::Result<ComponentCatalog> {
    match paths::catalog_path(root, config) {
        Some(path) => ComponentCatalog::load(&path)
            .with_context(|| format!("failed to load catalog {}", path.display())),
        None => Ok(default_catalog()),
    }
}

pub(crate) fn warn_dropped(report: &LoadReport) {
    for dropped in &report.dropped {
        tracing::warn!("dropped {}: {}", dropped.location, dropped.reason);
    }
}

/// Looks the name up across both command scopes: subsystem-owned atomics
/// first, then named top-level groups.
fn find_command_fragment(
    project: &Project,
    catalog: &ComponentCatalog,
    name: &str,
) -> Option<Fragment> {
    if let Some(cmd) = project.atomic_commands().find(|c| c.name == name) {
        return Some(Fragment {
            subsystem: project.subsystem(cmd.subsystem).map(|s| s.name.clone()),
            method: cmd.method_name(),
            text: command::assemble(cmd, project, catalog),
        });
    }
    let group = project
        .named_groups()
        .find(|g| g.name.as_deref() == Some(name))?;
    Some(Fragment {
        subsystem: None,
        method: group.method_name().unwrap_or_default(),
        text: group::emit_group(group, project, catalog),
    })
}

fn emit(fragments: &[Fragment], json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(&fragments);
    }
    for (i, fragment) in fragments.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{}", fragment.text);
    }
    Ok(())
}
