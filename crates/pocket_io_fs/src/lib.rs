//! `pocket_io_fs`:
//! Recursive file listing with pattern filters.
//!
//! - `list` : directory walk and the public entry point
//! - `spec` : enums/options/errors
//! - `util` : entry filters and worker sizing

pub mod list;
pub mod spec;
mod util;

pub use list::list_all_files;
pub use spec::{EnumListPatternMode, EnumListPatternTarget, ListFilesError, SpecListOptions};
