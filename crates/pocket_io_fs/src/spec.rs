//! Listing specification models and top-level error types.

use std::path::PathBuf;

use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Pattern matching mode for include/exclude lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumListPatternMode {
    /// Shell-like wildcards (`*`, `?`, character classes).
    #[default]
    Glob,
    /// Regular expression pattern.
    Regex,
    /// Substring match.
    Literal,
}

/// What include/exclude patterns are matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumListPatternTarget {
    /// Entry basename, e.g. `main.rs`.
    #[default]
    Name,
    /// Path below the listing root with `/` separators, e.g. `src/bin/main.rs`.
    /// Glob `*` does not cross `/` here; use `**` for any depth.
    RelativePath,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsAndErrors

/// Input options for `list_all_files`.
#[derive(Debug, Clone)]
pub struct SpecListOptions {
    /// Include patterns for files.
    pub patterns_include_files: Option<Vec<String>>,
    /// Exclude patterns for files.
    pub patterns_exclude_files: Option<Vec<String>>,
    /// Include patterns for directories; a rejected directory is not entered.
    pub patterns_include_dirs: Option<Vec<String>>,
    /// Exclude patterns for directories.
    pub patterns_exclude_dirs: Option<Vec<String>>,
    pub rule_pattern: EnumListPatternMode,
    pub rule_pattern_target: EnumListPatternTarget,
    /// Deepest level listed; files directly under the root are depth 1.
    pub depth_limit: Option<usize>,
    /// Descend into symlinked directories. When off they are listed as entries.
    pub if_follow_symlinks: bool,
    /// Maximum worker threads for sibling directory listing.
    pub num_workers_max: Option<usize>,
}

impl Default for SpecListOptions {
    fn default() -> Self {
        Self {
            patterns_include_files: None,
            patterns_exclude_files: None,
            patterns_include_dirs: None,
            patterns_exclude_dirs: None,
            rule_pattern: EnumListPatternMode::Glob,
            rule_pattern_target: EnumListPatternTarget::Name,
            depth_limit: None,
            if_follow_symlinks: false,
            num_workers_max: Some(1),
        }
    }
}

/// "Whole call failed" errors.
#[derive(Debug, Error)]
pub enum ListFilesError {
    /// Invalid depth value.
    #[error("{0}")]
    InvalidDepthLimit(String),
    /// Invalid include/exclude pattern.
    #[error("{0}")]
    InvalidPattern(String),
    /// A directory or one of its entries could not be read.
    #[error("Failed to read directory {}: {message}", path.display())]
    ReadDir {
        /// Directory being listed.
        path: PathBuf,
        /// Underlying IO error text.
        message: String,
    },
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
