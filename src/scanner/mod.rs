pub mod file_walker;
pub mod git_changes;
pub mod pattern;
pub mod pattern_set;

pub use file_walker::{get_all_files, get_all_files_with, FileWalker};
pub use git_changes::{get_changed_files, get_changed_files_with, GitChangeDetector};
pub use pattern::Pattern;
pub use pattern_set::{ignore_key, relative_key, GitignorePolicy, PatternSet};
