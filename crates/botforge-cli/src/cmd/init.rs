use anyhow::Context;
use botforge_core::config::GeneratorConfig;
use botforge_core::project::Project;
use botforge_core::{io, paths};
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing botforge workspace in: {}", root.display());
    io::ensure_dir(root).with_context(|| format!("failed to create {}", root.display()))?;

    // 1. Config, written only when absent so re-running init never clobbers
    //    user settings.
    if !paths::config_path(root).exists() {
        GeneratorConfig::default()
            .save(root)
            .context("failed to write config")?;
        println!("  created: {}", paths::CONFIG_FILE);
    } else {
        println!("  exists:  {}", paths::CONFIG_FILE);
    }

    // 2. Empty project model, named after the workspace directory. Loaded
    //    config wins: an existing botforge.yaml may point elsewhere.
    let config = GeneratorConfig::load(root).context("failed to load config")?;
    let project_path = paths::project_path(root, &config);
    if !project_path.exists() {
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "robot".to_string());
        Project::new(name)
            .save(&project_path)
            .context("failed to write project file")?;
        println!("  created: {}", config.project_file);
    } else {
        println!("  exists:  {}", config.project_file);
    }

    // 3. Output directory.
    io::ensure_dir(&paths::output_dir(root, &config))?;

    println!("\nWorkspace ready.");
    println!("Next: botforge project info");
    Ok(())
}
