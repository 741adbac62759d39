//! Log discovery and filtered printing.
//!
//! Grounded on `aw_cli/log.py`'s `find_oldest_log`/`print_log`. Despite
//! its name, the original `find_oldest_log` sorts candidate files by
//! mtime and returns the *last* (i.e. newest) one — this port is named
//! for what it actually does.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

pub const LOG_LEVELS: &[&str] = &["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"];

/// The most recently modified `*.log` file directly inside `dir`,
/// excluding (or requiring, if `testing`) a `testing` marker in the
/// filename.
pub fn find_latest_log(dir: &Path, testing: bool) -> Option<PathBuf> {
    if !dir.is_dir() {
        return None;
    }
    let mut candidates: Vec<(PathBuf, std::time::SystemTime)> = fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            name.ends_with(".log") && (name.contains("testing") == testing)
        })
        .filter_map(|entry| entry.metadata().ok().and_then(|m| m.modified().ok()).map(|mtime| (entry.path(), mtime)))
        .collect();
    candidates.sort_by_key(|(_, mtime)| *mtime);
    candidates.pop().map(|(path, _)| path)
}

/// Prints `path`'s lines at or above `level` (if given), dated on or
/// after `since` (if given), to stdout — matching `print_log`'s
/// best-effort date parsing: a line whose leading token isn't a date
/// is skipped only when `since` is set, never treated as an error.
pub fn print_log(path: &Path, since: Option<NaiveDate>, level: Option<&str>) -> anyhow::Result<()> {
    let contents = fs::read_to_string(path)?;
    let lines: Vec<&str> = contents.lines().collect();
    let module_name = path.parent().and_then(|p| p.file_name()).map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
    println!("Logs for module {module_name} ({}, {} lines)", path.display(), lines.len());

    let show_levels: Option<&[&str]> = level.and_then(|lvl| LOG_LEVELS.iter().position(|l| *l == lvl)).map(|idx| &LOG_LEVELS[idx..]);

    let mut printed = 0usize;
    for line in &lines {
        if let Some(since) = since {
            let Some(token) = line.split(' ').next() else { continue };
            let Ok(linedate) = NaiveDate::parse_from_str(token, "%Y-%m-%d") else { continue };
            if linedate < since {
                continue;
            }
        }
        if let Some(levels) = show_levels {
            if !levels.iter().any(|lvl| line.contains(lvl)) {
                continue;
            }
        }
        println!("{line}");
        printed += 1;
    }
    println!("  (Filtered {printed}/{})", lines.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn finds_newest_non_testing_log() {
        let dir = tempdir().unwrap();
        let older = dir.path().join("a.log");
        File::create(&older).unwrap().write_all(b"old").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(10));
        let newer = dir.path().join("b.log");
        File::create(&newer).unwrap().write_all(b"new").unwrap();
        assert_eq!(find_latest_log(dir.path(), false), Some(newer));
    }

    #[test]
    fn testing_flag_selects_testing_logs_only() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("aw-server.log")).unwrap();
        let testing_log = dir.path().join("aw-server.testing.log");
        File::create(&testing_log).unwrap();
        assert_eq!(find_latest_log(dir.path(), true), Some(testing_log));
    }

    #[test]
    fn missing_directory_returns_none() {
        assert_eq!(find_latest_log(Path::new("/no/such/dir"), false), None);
    }
}
