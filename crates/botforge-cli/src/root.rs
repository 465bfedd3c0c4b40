use botforge_core::paths;
use std::path::{Path, PathBuf};

/// Resolve the workspace root directory.
///
/// Priority:
/// 1. `--root` flag / `BOTFORGE_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `botforge.yaml`
/// 3. Walk upward from `cwd` looking for the default project file
/// 4. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    for marker in [paths::CONFIG_FILE, paths::DEFAULT_PROJECT_FILE] {
        let mut dir = cwd.clone();
        loop {
            if dir.join(marker).is_file() {
                return dir;
            }
            match dir.parent() {
                Some(p) => dir = p.to_path_buf(),
                None => break,
            }
        }
    }

    cwd
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        let result = resolve_root(Some(dir.path()));
        assert_eq!(result, dir.path());
    }

    #[test]
    fn explicit_root_skips_marker_search() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(paths::CONFIG_FILE), "version: 1\n").unwrap();
        let subdir = dir.path().join("src/deep");
        std::fs::create_dir_all(&subdir).unwrap();

        // Overriding cwd isn't possible in tests without unsafe tricks,
        // so only the explicit path arm is exercised here.
        let result = resolve_root(Some(&subdir));
        assert_eq!(result, subdir);
    }
}
