// ==========================================
// 校园团契关怀轮换系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::domain::types::AssignmentKind;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 生成引擎错误类型
///
/// 上游(名册/存储)失败原样向调用方传播,引擎自身不重试;
/// 幂等生成语义保证调用方安全重试。
#[derive(Error, Debug)]
pub enum GenerationError {
    /// 首次生成护栏: 该类型已存在分配记录
    #[error("重复初始化: {kind} 已存在分配记录, 首次生成只允许执行一次")]
    AlreadyBootstrapped { kind: AssignmentKind },

    /// 配置读取失败
    #[error("配置读取失败: {0}")]
    Config(String),

    /// 仓储/存储失败（可重试）
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result 类型别名
pub type GenerationResult<T> = Result<T, GenerationError>;
