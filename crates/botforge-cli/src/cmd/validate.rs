use crate::output::{print_findings, print_json};
use anyhow::Context;
use botforge_core::config::GeneratorConfig;
use botforge_core::paths;
use botforge_core::project::Project;
use botforge_core::validate::{self, Finding, Severity};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = GeneratorConfig::load_or_default(root)?;
    let mut findings = config.validate();

    let (project, report) =
        Project::load(&paths::project_path(root, &config)).context("failed to load project")?;
    for dropped in &report.dropped {
        findings.push(Finding {
            severity: Severity::Warning,
            location: dropped.location.clone(),
            message: format!("entry dropped during load: {}", dropped.reason),
        });
    }

    let catalog = super::generate::load_catalog(root, &config)?;
    findings.extend(validate::validate(&project, &catalog, &config));

    if json {
        print_json(&findings)?;
    } else if findings.is_empty() {
        println!("No problems found.");
    } else {
        print_findings(&findings);
        let errors = findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count();
        let warnings = findings.len() - errors;
        println!();
        println!("{errors} error(s), {warnings} warning(s)");
    }

    if validate::has_errors(&findings) {
        anyhow::bail!("validation failed");
    }
    Ok(())
}
