pub mod language;

pub use language::{find_language, Action, Language, LanguageConfig, ToolInvocation};
