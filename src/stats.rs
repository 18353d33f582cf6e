//! Run statistics and the stats export.
//!
//! The export is the only filesystem write this crate performs, so the target
//! is confined to the project root both when the option is resolved and again
//! right before writing.

use log::{error, info, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::TaggerError;

/// Counters for one build. Owned by the plugin instance, never reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStatistics {
    pub total_files: usize,
    pub processed_files: usize,
    pub total_elements: usize,
    pub errors: usize,
    pub by_element_type: HashMap<String, usize>,
}

impl RunStatistics {
    /// Fold in one file whose walk completed.
    pub fn commit_file(&mut self, tagged: &[String]) {
        self.processed_files += 1;
        self.total_elements += tagged.len();
        for name in tagged {
            *self.by_element_type.entry(name.clone()).or_insert(0) += 1;
        }
    }

    pub fn summary(&self) -> String {
        let mut top: Vec<(&String, &usize)> = self.by_element_type.iter().collect();
        top.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        let top = top
            .iter()
            .take(5)
            .map(|(name, count)| format!("{}={}", name, count))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "tagged {} elements in {}/{} files ({} errors){}",
            self.total_elements,
            self.processed_files,
            self.total_files,
            self.errors,
            if top.is_empty() {
                String::new()
            } else {
                format!("; most tagged: {}", top)
            }
        )
    }
}

/// What the per-file hook sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileTransformInfo {
    pub file_path: String,
    pub element_count: usize,
    /// Distinct names, first-seen order.
    pub elements: Vec<String>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// EXPORT
// ═══════════════════════════════════════════════════════════════════════════════

/// Resolve `raw` against `root`. Any `..` segment, or a result outside
/// `root`, is rejected.
pub fn resolve_export_path(root: &Path, raw: &str) -> Result<PathBuf, TaggerError> {
    let requested = Path::new(raw);
    if requested
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return Err(TaggerError::PathOutsideRoot(requested.to_path_buf()));
    }

    let joined = if requested.is_absolute() {
        requested.to_path_buf()
    } else {
        root.join(requested)
    };
    let resolved: PathBuf = joined
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();

    if !resolved.starts_with(root) || resolved == root {
        return Err(TaggerError::PathOutsideRoot(resolved));
    }

    // The nearest existing ancestor (or the target itself) decides where a
    // write really lands once symlinks are followed.
    let canonical_root = root.canonicalize()?;
    if let Some(existing) = resolved
        .ancestors()
        .find(|a| a.symlink_metadata().is_ok())
    {
        match existing.canonicalize() {
            Ok(canonical) if canonical.starts_with(&canonical_root) => {}
            _ => return Err(TaggerError::PathOutsideRoot(resolved)),
        }
    }

    Ok(resolved)
}

pub fn export_stats(
    stats: &RunStatistics,
    root: &Path,
    target: &Path,
) -> Result<PathBuf, TaggerError> {
    let target = resolve_export_path(root, &target.to_string_lossy())?;
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    // Directories may have appeared since the first check.
    let target = resolve_export_path(root, &target.to_string_lossy())?;
    let json = serde_json::to_string_pretty(stats)?;
    fs::write(&target, json)?;
    Ok(target)
}

/// Fail-soft wrapper used at end of build.
pub fn export_stats_logged(stats: &RunStatistics, root: &Path, target: &Path) {
    match export_stats(stats, root, target) {
        Ok(path) => info!(path = path.display().to_string(); "Exported tagging statistics"),
        Err(TaggerError::PathOutsideRoot(path)) => {
            warn!(
                path = path.display().to_string();
                "Security: stats export path escapes the project root, not writing"
            )
        }
        Err(e) => error!("Failed to export tagging statistics: {}", e),
    }
}
