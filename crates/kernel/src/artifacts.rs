//! Per-run artifact directory layout: `artifacts/<runId>/
//! {trace/,thoughts/,screenshots/,report/}`. `l6_timeline::Timeline`
//! owns the trace/thoughts/report families; this module owns the run
//! directory itself and the per-step screenshot files the loop body
//! writes as it goes, optionally persisted to `screenshots/` when the
//! toggle is on.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Create (if needed) and return `<root>/<run_id>/`.
pub fn ensure_run_dir(root: &Path, run_id: &str) -> io::Result<PathBuf> {
    let dir = root.join(run_id);
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Write one step's marked screenshot to `screenshots/step-<index>.png`
/// under the run directory, returning its path relative to `run_dir`.
pub fn save_step_screenshot(run_dir: &Path, step_index: u64, png: &[u8]) -> io::Result<PathBuf> {
    let dir = run_dir.join("screenshots");
    fs::create_dir_all(&dir)?;
    let relative = PathBuf::from("screenshots").join(format!("step-{:04}.png", step_index));
    fs::write(run_dir.join(&relative), png)?;
    Ok(relative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_run_dir_creates_nested_path() {
        let root = tempfile::tempdir().unwrap();
        let dir = ensure_run_dir(root.path(), "2026-07-29-abcd1234-shopper").unwrap();
        assert!(dir.exists());
    }

    #[test]
    fn save_step_screenshot_writes_under_screenshots_dir() {
        let root = tempfile::tempdir().unwrap();
        let run_dir = ensure_run_dir(root.path(), "run").unwrap();
        let relative = save_step_screenshot(&run_dir, 3, &[1, 2, 3]).unwrap();
        assert_eq!(relative, PathBuf::from("screenshots/step-0003.png"));
        assert!(run_dir.join(&relative).exists());
    }
}
