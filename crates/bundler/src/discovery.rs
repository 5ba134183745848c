use crate::error::{BundleError, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Source of the files a run should read
pub trait FileDiscovery {
    /// Ordered file paths under `root` selected by the include/exclude globs
    fn discover(&self, root: &Path, include: &[String], exclude: &[String]) -> Result<Vec<PathBuf>>;
}

/// Directory walker (.gitignore aware, hidden entries skipped)
#[derive(Debug, Clone)]
pub struct WalkDiscovery {
    max_file_bytes: u64,
}

impl WalkDiscovery {
    pub fn new(max_file_bytes: u64) -> Self {
        Self { max_file_bytes }
    }
}

impl Default for WalkDiscovery {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MAX_FILE_BYTES)
    }
}

impl FileDiscovery for WalkDiscovery {
    fn discover(&self, root: &Path, include: &[String], exclude: &[String]) -> Result<Vec<PathBuf>> {
        let include_set = build_glob_set(include)?;
        let exclude_set = build_glob_set(exclude)?;

        let mut builder = WalkBuilder::new(root);
        builder
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .require_git(false);

        let walk_root = root.to_path_buf();
        let dir_excludes = exclude_set.clone();
        builder.filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            !(is_dir && is_excluded_dir(entry.path(), &walk_root, &dir_excludes))
        });

        let mut files = Vec::new();
        for result in builder.build() {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Failed to read entry: {e}");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let path = entry.path();
            let Ok(relative) = path.strip_prefix(root) else {
                continue;
            };

            if exclude_set.is_match(relative) {
                log::trace!("Excluded {}", relative.display());
                continue;
            }
            if !include_set.is_match(relative) {
                continue;
            }

            if let Ok(meta) = entry.metadata() {
                if meta.len() > self.max_file_bytes {
                    log::debug!(
                        "Skipping large file {} ({} bytes > {})",
                        path.display(),
                        meta.len(),
                        self.max_file_bytes
                    );
                    continue;
                }
            }

            files.push(path.to_path_buf());
        }

        files.sort();
        log::info!("Found {} source files", files.len());
        Ok(files)
    }
}

fn is_excluded_dir(path: &Path, root: &Path, excludes: &GlobSet) -> bool {
    match path.strip_prefix(root) {
        Ok(relative) if !relative.as_os_str().is_empty() => {
            excludes.is_match(relative) || excludes.is_match(relative.join("dummy_file_for_dir_match"))
        }
        _ => false,
    }
}

/// Compile globs; a trailing `/` means "everything below"
pub fn build_glob_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let mut processed = pattern.trim().to_string();
        if processed.ends_with('/') && processed.len() > 1 {
            processed.push_str("**");
        }
        let glob = Glob::new(&processed).map_err(|e| {
            BundleError::Glob(format!("\"{pattern}\" (processed as \"{processed}\"): {e}"))
        })?;
        log::trace!("Adding glob pattern: {pattern} (processed as {processed})");
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| BundleError::Glob(e.to_string()))
}

/// `/`-separated path of `path` relative to `root`
pub fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
