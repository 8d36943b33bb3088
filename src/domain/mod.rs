// ==========================================
// 校园团契关怀轮换系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、业务规则接口
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod assignment;
pub mod generation_log;
pub mod member;
pub mod types;

// 重导出核心类型
pub use assignment::{Assignment, AssignmentPeriod, Claim};
pub use generation_log::GenerationLog;
pub use member::{CommitteeMember, Member};
pub use types::{AssignmentKind, CommitteeRole, Gender, GenerationAction};
