use crate::codegen::Fragment;
use crate::config::GeneratorConfig;
use std::path::{Path, PathBuf};

/// Config file name marking a directory as a botforge workspace root.
pub const CONFIG_FILE: &str = "botforge.yaml";
pub const DEFAULT_PROJECT_FILE: &str = "robot.botforge.json";

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn project_path(root: &Path, config: &GeneratorConfig) -> PathBuf {
    root.join(&config.project_file)
}

pub fn output_dir(root: &Path, config: &GeneratorConfig) -> PathBuf {
    root.join(&config.output_dir)
}

pub fn catalog_path(root: &Path, config: &GeneratorConfig) -> Option<PathBuf> {
    config.catalog_file.as_ref().map(|file| root.join(file))
}

/// File a fragment is written to, under the output directory. Subsystem
/// fragments are namespaced by owner; project-level fragments are not.
pub fn fragment_path(output_dir: &Path, fragment: &Fragment) -> PathBuf {
    let file = match &fragment.subsystem {
        Some(subsystem) => format!("{}.{}.java", subsystem, fragment.method),
        None => format!("{}.java", fragment.method),
    };
    output_dir.join(file)
}
