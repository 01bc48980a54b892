//! 错误定义模块

use thiserror::Error;

/// 诊所系统统一错误类型
///
/// 聚合计算本身不会失败；这里的错误只来自记录加载、配置等外围环节。
#[derive(Error, Debug)]
pub enum ClinicError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("验证错误: {0}")]
    Validation(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("数据源错误: {0}")]
    Source(String),

    #[error("系统内部错误: {0}")]
    Internal(String),
}

/// 诊所系统统一结果类型
pub type Result<T> = std::result::Result<T, ClinicError>;
