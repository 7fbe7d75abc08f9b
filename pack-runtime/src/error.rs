//! # Error 模块
//!
//! 运行时核心不会失败：无效意图是静默的空操作（见 `input::IntentOutcome`）。
//! 这里只有加载与校验配置时的错误。

use std::path::PathBuf;

use thiserror::Error;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 读取失败
    #[error("配置文件读取失败 {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 解析失败
    #[error("配置解析失败: {0}")]
    Parse(#[from] serde_json::Error),

    /// 字段取值无效
    #[error("配置项 '{field}' 无效 - {message}")]
    Invalid { field: String, message: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Result 类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
