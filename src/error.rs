use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// 文件枚举与配置加载过程中的错误
#[derive(Error, Debug)]
pub enum Error {
    /// `.gitignore` 缺失或无法读取
    #[error("无法读取忽略规则文件 {}: {source}", .path.display())]
    Configuration {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 版本控制查询以非零状态退出
    #[error("Git 查询失败 (退出码 {exit_code}): {command}: {stderr}")]
    VcsQuery {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("遍历目录时出错: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("IO 错误: {0}")]
    Io(#[from] io::Error),

    #[error("后台任务失败: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("配置无效: {0}")]
    InvalidConfig(String),

    #[error("配置解析失败: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("配置序列化失败: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
