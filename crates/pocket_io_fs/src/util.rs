use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use regex::RegexSet;

use crate::spec::{EnumListPatternMode, EnumListPatternTarget, ListFilesError, SpecListOptions};

////////////////////////////////////////////////////////////////////////////////
// #region PatternSets

/// One compiled pattern list, matched as a whole.
#[derive(Debug, Clone)]
enum EnumPatternSet {
    Literal(Vec<String>),
    Glob(GlobSet),
    Regex(RegexSet),
}

impl EnumPatternSet {
    /// `None` for an absent or empty list.
    fn compile(
        patterns: Option<&[String]>,
        rule_pattern: EnumListPatternMode,
        target: EnumListPatternTarget,
    ) -> Result<Option<Self>, ListFilesError> {
        let Some(patterns) = patterns.filter(|v| !v.is_empty()) else {
            return Ok(None);
        };

        let set = match rule_pattern {
            EnumListPatternMode::Literal => Self::Literal(patterns.to_vec()),
            EnumListPatternMode::Glob => {
                // `*` stays inside one path component when matching relative paths.
                let if_literal_separator = target == EnumListPatternTarget::RelativePath;
                let mut builder = GlobSetBuilder::new();
                for pattern in patterns {
                    let glob = GlobBuilder::new(pattern)
                        .literal_separator(if_literal_separator)
                        .build()
                        .map_err(|e| {
                            ListFilesError::InvalidPattern(format!("Invalid glob `{pattern}`: {e}"))
                        })?;
                    builder.add(glob);
                }
                Self::Glob(builder.build().map_err(|e| {
                    ListFilesError::InvalidPattern(format!("Invalid glob set: {e}"))
                })?)
            }
            EnumListPatternMode::Regex => Self::Regex(RegexSet::new(patterns).map_err(|e| {
                ListFilesError::InvalidPattern(format!("Invalid regex: {e}"))
            })?),
        };
        Ok(Some(set))
    }

    fn is_match(&self, value: &str) -> bool {
        match self {
            Self::Literal(v) => v.iter().any(|p| value.contains(p.as_str())),
            Self::Glob(set) => set.is_match(value),
            Self::Regex(set) => set.is_match(value),
        }
    }
}

#[derive(Debug, Clone)]
struct SpecIncludeExclude {
    include: Option<EnumPatternSet>,
    exclude: Option<EnumPatternSet>,
}

impl SpecIncludeExclude {
    /// Kept when the include list (if any) hits and the exclude list (if any) misses.
    fn admits(&self, value: &str) -> bool {
        self.include.as_ref().is_none_or(|set| set.is_match(value))
            && !self.exclude.as_ref().is_some_and(|set| set.is_match(value))
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region EntryFilter

/// Decides which listed entries are kept and which directories are entered.
#[derive(Debug, Clone)]
pub(crate) struct SpecEntryFilter {
    target: EnumListPatternTarget,
    files: SpecIncludeExclude,
    dirs: SpecIncludeExclude,
}

impl SpecEntryFilter {
    pub(crate) fn from_options(options: &SpecListOptions) -> Result<Self, ListFilesError> {
        let mode = options.rule_pattern;
        let target = options.rule_pattern_target;
        let compile = |patterns: &Option<Vec<String>>| {
            EnumPatternSet::compile(patterns.as_deref(), mode, target)
        };

        Ok(Self {
            target,
            files: SpecIncludeExclude {
                include: compile(&options.patterns_include_files)?,
                exclude: compile(&options.patterns_exclude_files)?,
            },
            dirs: SpecIncludeExclude {
                include: compile(&options.patterns_include_dirs)?,
                exclude: compile(&options.patterns_exclude_dirs)?,
            },
        })
    }

    /// `rel_path` is relative to the listing root with `/` separators.
    pub(crate) fn admits_file(&self, name: &str, rel_path: &str) -> bool {
        self.files.admits(self.pick(name, rel_path))
    }

    pub(crate) fn admits_dir(&self, name: &str, rel_path: &str) -> bool {
        self.dirs.admits(self.pick(name, rel_path))
    }

    fn pick<'a>(&self, name: &'a str, rel_path: &'a str) -> &'a str {
        match self.target {
            EnumListPatternTarget::Name => name,
            EnumListPatternTarget::RelativePath => rel_path,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Workers

/// Requested workers capped by available cores; unset means up to 8.
pub(crate) fn derive_num_workers(num_workers_max: Option<usize>) -> usize {
    let n_cpu = std::thread::available_parallelism()
        .map(|v| v.get())
        .unwrap_or(1);
    num_workers_max.unwrap_or(8).clamp(1, n_cpu)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
