// ==========================================
// 校园团契关怀轮换系统 - 引擎层
// ==========================================
// 职责: 实现生成业务规则,不拼 SQL
// 红线: Engine 不拼 SQL, 所有规则必须输出 reason
// ==========================================

pub mod error;
pub mod matching;
pub mod orchestrator;
pub mod providers;
pub mod scheduler;

// 重导出核心引擎
pub use error::{GenerationError, GenerationResult};
pub use matching::{ExceptionCode, ExceptionRecord, MatchOutcome, MatchedPair, MatchingEngine};
pub use orchestrator::{GenerationOrchestrator, GenerationSummary};
pub use providers::{AssignmentStore, InsertOutcome, RosterProvider};
pub use scheduler::{CoveragePlan, RotationScheduler};
