//! Directory resolution.
//!
//! Grounded on `aw_core/dirs.py`'s `get_data_dir`/`get_config_dir`/
//! `get_cache_dir`/`get_log_dir`, which wrap `platformdirs` with one
//! Linux-specific override: logs go to `<cache_dir>/log` rather than
//! the platform's default state directory, for backwards compatibility
//! with older installs. `directories::ProjectDirs` is this crate's
//! `platformdirs` equivalent.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

const QUALIFIER: &str = "";
const ORGANIZATION: &str = "";
const APPLICATION: &str = "Sundial";

fn project_dirs() -> anyhow::Result<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
        .ok_or_else(|| anyhow::anyhow!("could not determine a home directory for this platform"))
}

pub fn config_dir() -> anyhow::Result<PathBuf> {
    Ok(project_dirs()?.config_dir().to_path_buf())
}

pub fn data_dir() -> anyhow::Result<PathBuf> {
    Ok(project_dirs()?.data_dir().to_path_buf())
}

pub fn cache_dir() -> anyhow::Result<PathBuf> {
    Ok(project_dirs()?.cache_dir().to_path_buf())
}

/// On Linux, logs live under `<cache_dir>/log` rather than
/// `ProjectDirs::state_dir()` (which may not even be `Some` on every
/// Linux distro's XDG setup) — matching `get_log_dir`'s override.
pub fn log_dir() -> anyhow::Result<PathBuf> {
    if cfg!(target_os = "linux") {
        Ok(cache_dir()?.join("log"))
    } else {
        let dirs = project_dirs()?;
        Ok(dirs.state_dir().map(Path::to_path_buf).unwrap_or_else(|| dirs.data_dir().join("log")))
    }
}
