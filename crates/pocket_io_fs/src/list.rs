use std::fs;
use std::path::{Path, PathBuf};

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use crate::spec::{ListFilesError, SpecListOptions};
use crate::util::{SpecEntryFilter, derive_num_workers};

////////////////////////////////////////////////////////////////////////////////
// #region ListingContext

struct ListContext {
    filter: SpecEntryFilter,
    depth_limit: Option<usize>,
    if_follow_symlinks: bool,
    if_parallel: bool,
}

struct SpecDirEntry {
    path: PathBuf,
    name: String,
    rel_path: String,
    if_descend: bool,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PublicApi

/// Recursively list every file under `path`.
///
/// Entries are sorted by name within each directory and a directory's
/// contents appear at the position of the directory itself. An empty path
/// yields an empty list. Any directory that cannot be read fails the whole
/// call.
pub fn list_all_files(
    path: impl AsRef<Path>,
    options: SpecListOptions,
) -> Result<Vec<PathBuf>, ListFilesError> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Ok(Vec::new());
    }
    validate_options(&options)?;

    let filter = SpecEntryFilter::from_options(&options)?;
    let n_workers = derive_num_workers(options.num_workers_max);

    let mut ctx = ListContext {
        filter,
        depth_limit: options.depth_limit,
        if_follow_symlinks: options.if_follow_symlinks,
        if_parallel: n_workers > 1,
    };

    let l_ancestors = derive_ancestor_chain(&ctx, path, &[]).unwrap_or_default();

    let l_files = if ctx.if_parallel {
        match ThreadPoolBuilder::new().num_threads(n_workers).build() {
            Ok(pool) => pool.install(|| walk_directory(&ctx, path, "", 0, &l_ancestors))?,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to build listing thread pool, listing serially");
                ctx.if_parallel = false;
                walk_directory(&ctx, path, "", 0, &l_ancestors)?
            }
        }
    } else {
        walk_directory(&ctx, path, "", 0, &l_ancestors)?
    };

    tracing::debug!(
        path = %path.display(),
        n_files = l_files.len(),
        n_workers,
        "Listed files"
    );
    Ok(l_files)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Walk

fn validate_options(options: &SpecListOptions) -> Result<(), ListFilesError> {
    if matches!(options.depth_limit, Some(0)) {
        return Err(ListFilesError::InvalidDepthLimit(
            "depth_limit must be >= 1".to_string(),
        ));
    }
    Ok(())
}

/// Canonical chain of directories being walked, used to stop symlink loops.
fn derive_ancestor_chain(
    ctx: &ListContext,
    dir: &Path,
    ancestors: &[PathBuf],
) -> Option<Vec<PathBuf>> {
    if !ctx.if_follow_symlinks {
        return Some(Vec::new());
    }
    let canonical = fs::canonicalize(dir).ok()?;
    if ancestors.contains(&canonical) {
        return None;
    }
    let mut l_chain = ancestors.to_vec();
    l_chain.push(canonical);
    Some(l_chain)
}

fn read_sorted_entries(
    ctx: &ListContext,
    dir: &Path,
    c_rel_dir: &str,
) -> Result<Vec<SpecDirEntry>, ListFilesError> {
    let map_read_err = |e: std::io::Error| ListFilesError::ReadDir {
        path: dir.to_path_buf(),
        message: e.to_string(),
    };

    let mut l_entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(map_read_err)? {
        let entry = entry.map_err(map_read_err)?;
        let file_type = entry.file_type().map_err(map_read_err)?;
        let path = entry.path();
        let if_descend = if file_type.is_symlink() {
            ctx.if_follow_symlinks && path.is_dir()
        } else {
            file_type.is_dir()
        };
        let name = entry.file_name().to_string_lossy().into_owned();
        let rel_path = if c_rel_dir.is_empty() {
            name.clone()
        } else {
            format!("{c_rel_dir}/{name}")
        };
        l_entries.push(SpecDirEntry {
            name,
            rel_path,
            path,
            if_descend,
        });
    }
    l_entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(l_entries)
}

fn walk_directory(
    ctx: &ListContext,
    dir: &Path,
    c_rel_dir: &str,
    n_depth: usize,
    ancestors: &[PathBuf],
) -> Result<Vec<PathBuf>, ListFilesError> {
    let mut l_entries = read_sorted_entries(ctx, dir, c_rel_dir)?;
    let if_at_depth_limit = ctx.depth_limit.is_some_and(|n| n_depth + 1 >= n);

    l_entries.retain(|entry| {
        if entry.if_descend {
            !if_at_depth_limit && ctx.filter.admits_dir(&entry.name, &entry.rel_path)
        } else {
            ctx.filter.admits_file(&entry.name, &entry.rel_path)
        }
    });

    let expand = |entry: SpecDirEntry| -> Result<Vec<PathBuf>, ListFilesError> {
        if !entry.if_descend {
            return Ok(vec![entry.path]);
        }
        match derive_ancestor_chain(ctx, &entry.path, ancestors) {
            Some(l_chain) => {
                walk_directory(ctx, &entry.path, &entry.rel_path, n_depth + 1, &l_chain)
            }
            None => {
                tracing::warn!(path = %entry.path.display(), "Skipping symlink loop");
                Ok(Vec::new())
            }
        }
    };

    let l_nested: Vec<Vec<PathBuf>> = if ctx.if_parallel {
        l_entries
            .into_par_iter()
            .map(expand)
            .collect::<Result<_, _>>()?
    } else {
        l_entries
            .into_iter()
            .map(expand)
            .collect::<Result<_, _>>()?
    };

    Ok(l_nested.into_iter().flatten().collect())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
