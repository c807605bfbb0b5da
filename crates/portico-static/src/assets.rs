//! Output directory preparation: reset and asset copying.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use walkdir::WalkDir;

use crate::error::BuildError;

/// File name patterns excluded from copying.
///
/// Patterns are shell-style globs matched against a single path component:
/// `*` matches any run of characters, `?` matches exactly one.
#[derive(Debug, Clone)]
pub struct ExcludeSet {
    patterns: Vec<Regex>,
}

impl ExcludeSet {
    /// Compile a set of glob patterns.
    pub fn new<S: AsRef<str>>(globs: &[S]) -> Result<Self, BuildError> {
        let patterns = globs
            .iter()
            .map(|g| glob_to_regex(g.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Whether a file or directory name is excluded.
    pub fn is_match(&self, name: &OsStr) -> bool {
        let name = name.to_string_lossy();
        self.patterns.iter().any(|re| re.is_match(&name))
    }
}

fn glob_to_regex(glob: &str) -> Result<Regex, BuildError> {
    let mut pattern = String::with_capacity(glob.len() + 8);
    pattern.push('^');
    for c in glob.chars() {
        match c {
            '*' => pattern.push_str("[^/]*"),
            '?' => pattern.push_str("[^/]"),
            other => pattern.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    pattern.push('$');

    Regex::new(&pattern).map_err(|e| BuildError::Pattern(format!("{glob}: {e}")))
}

/// Resets the output directory and copies source trees into it.
pub struct OutputPreparer<'a> {
    output_dir: &'a Path,
    exclude: &'a ExcludeSet,
}

impl<'a> OutputPreparer<'a> {
    pub fn new(output_dir: &'a Path, exclude: &'a ExcludeSet) -> Self {
        Self {
            output_dir,
            exclude,
        }
    }

    /// Remove the output directory, if any, and create it empty.
    ///
    /// Refuses to touch a directory that is `project_root` or one of its
    /// ancestors.
    pub fn reset(&self, project_root: &Path) -> Result<(), BuildError> {
        if self.output_dir.exists() {
            let output = self
                .output_dir
                .canonicalize()
                .map_err(|e| BuildError::read(self.output_dir, e))?;
            let root = project_root
                .canonicalize()
                .map_err(|e| BuildError::read(project_root, e))?;
            if root.starts_with(&output) {
                return Err(BuildError::UnsafeOutput(self.output_dir.to_path_buf()));
            }

            fs::remove_dir_all(self.output_dir)
                .map_err(|e| BuildError::write(self.output_dir, e))?;
        }

        fs::create_dir_all(self.output_dir).map_err(|e| BuildError::write(self.output_dir, e))?;
        tracing::info!("Directory '{}' cleaned", self.output_dir.display());

        Ok(())
    }

    /// Recursively copy `source` into `<output>/<dest>`, skipping excluded names.
    ///
    /// Returns the number of files copied, or `None` when `source` does not
    /// exist.
    pub fn copy_tree(&self, source: &Path, dest: &Path) -> Result<Option<usize>, BuildError> {
        if !source.is_dir() {
            tracing::debug!("Skipping missing source {}", source.display());
            return Ok(None);
        }

        let target_root = self.output_dir.join(dest);
        let mut copied = 0;

        let walker = WalkDir::new(source)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !self.exclude.is_match(e.file_name()));

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(source).to_path_buf();
                BuildError::read(path, e.into())
            })?;

            let relative = entry.path().strip_prefix(source).unwrap_or(entry.path());
            let target = target_root.join(relative);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&target).map_err(|e| BuildError::write(&target, e))?;
            } else {
                fs::copy(entry.path(), &target).map_err(|e| BuildError::write(&target, e))?;
                tracing::debug!("Copied {}", target.display());
                copied += 1;
            }
        }

        Ok(Some(copied))
    }
}

/// A source tree copied into the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyRoot {
    /// Source directory
    pub source: PathBuf,
    /// Destination, relative to the output directory
    pub dest: PathBuf,
}
