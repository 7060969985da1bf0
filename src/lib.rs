pub mod config;
pub mod error;
pub mod models;
pub mod operations;
pub mod scanner;

// 重新导出常用接口
pub use error::{Error, Result};
pub use scanner::{get_all_files, get_changed_files, Pattern, PatternSet};
