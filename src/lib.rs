// ==========================================
// 校园团契关怀轮换系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 成员关怀轮换分配引擎 (名册维护与通知发送由外部承担)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/表结构）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AssignmentKind, CommitteeRole, Gender, GenerationAction};

// 领域实体
pub use domain::{Assignment, AssignmentPeriod, Claim, CommitteeMember, GenerationLog, Member};

// 引擎
pub use engine::{
    CoveragePlan, ExceptionCode, ExceptionRecord, GenerationError, GenerationOrchestrator,
    GenerationSummary, MatchOutcome, MatchedPair, MatchingEngine, RotationScheduler,
};

// 引擎接口
pub use engine::{AssignmentStore, InsertOutcome, RosterProvider};

// API
pub use api::{ApiError, ApiResult, RotationApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "校园团契关怀轮换系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
