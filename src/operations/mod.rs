pub mod command_runner;
pub mod dispatcher;

pub use command_runner::{execute_command, CommandResult, CommandRunner, ShellRunner};
pub use dispatcher::{Dispatcher, FileOutcome, RunMode, RunSummary};
