// ==========================================
// 校园团契关怀轮换系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型,转换下层错误为调用方友好的错误消息
// 工具: thiserror 派生宏
// ==========================================

use crate::engine::GenerationError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
///
/// 所有错误信息必须包含显式原因（可解释性）
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    /// 首次生成护栏触发
    #[error("重复初始化: {0}")]
    AlreadyBootstrapped(String),

    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 基础设施错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("内部错误: {0}")]
    InternalError(String),
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} (id={})", entity, id))
            }
            RepositoryError::ValidationError(msg)
            | RepositoryError::FieldValueError { message: msg, .. } => {
                ApiError::InvalidInput(msg)
            }
            other => ApiError::DatabaseError(other.to_string()),
        }
    }
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::AlreadyBootstrapped { kind } => {
                ApiError::AlreadyBootstrapped(format!("{} 已完成首次生成", kind))
            }
            GenerationError::Config(msg) => ApiError::InternalError(msg),
            GenerationError::Repository(repo_err) => repo_err.into(),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
