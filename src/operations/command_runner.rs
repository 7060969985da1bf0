use std::future::Future;
use std::path::Path;

use tokio::process::Command;

/// 外部命令执行结果，输出已去除首尾空白（NUL 分隔的输出保持原样）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    /// 被信号终止时为 -1
    pub exit_code: i32,
}

impl CommandResult {
    /// 命令无法启动时的结果
    pub fn spawn_failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: message.into(),
            exit_code: 1,
        }
    }
}

/// 命令执行接口 - 版本控制查询与工具调度都经由此接口
pub trait CommandRunner: Send + Sync {
    /// 在 `cwd` 下执行 shell 命令字符串
    fn run(&self, command: &str, cwd: &Path) -> impl Future<Output = CommandResult> + Send;
}

/// 通过 `sh -c` 执行命令
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    async fn run(&self, command: &str, cwd: &Path) -> CommandResult {
        execute_command(command, cwd).await
    }
}

/// 执行 shell 命令并收集退出码和输出
pub async fn execute_command(command: &str, cwd: &Path) -> CommandResult {
    tracing::debug!("执行命令: {} (目录: {})", command, cwd.display());

    let output = Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(cwd)
        .output()
        .await;

    match output {
        Ok(output) => CommandResult {
            success: output.status.success(),
            stdout: decode_output(&output.stdout),
            stderr: decode_output(&output.stderr),
            exit_code: output.status.code().unwrap_or(-1),
        },
        Err(err) => {
            tracing::warn!("无法启动命令 {}: {}", command, err);
            CommandResult::spawn_failure(err.to_string())
        }
    }
}

/// 解码命令输出并去除首尾空白；含 NUL 的输出是路径列表，不做裁剪
fn decode_output(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    if text.contains('\0') {
        text.into_owned()
    } else {
        text.trim().to_string()
    }
}

/// 为 shell 命令行转义单个参数
pub fn shell_quote(arg: &str) -> String {
    let is_safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));

    if is_safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}
