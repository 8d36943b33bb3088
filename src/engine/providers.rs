// ==========================================
// 校园团契关怀轮换系统 - 引擎层数据供给接口
// ==========================================
// 职责: 定义名册供给与分配存储两个窄接口,实现依赖倒置
// 说明: Engine 层定义 trait,仓储层实现适配器
// 红线: 引擎自身不持有任何跨调用可变状态,全部状态每次读取
// ==========================================

use crate::domain::assignment::AssignmentPeriod;
use crate::domain::member::{CommitteeMember, Member};
use crate::domain::types::AssignmentKind;
use crate::domain::Claim;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ==========================================
// RosterProvider - 名册供给接口
// ==========================================

/// 名册供给接口
///
/// 供给当前在册成员、可分配同工与有效认领。
/// 实现者: `RosterRepository`（SQLite）; 测试可注入内存实现。
#[async_trait]
pub trait RosterProvider: Send + Sync {
    /// 查询全部在册成员（按 member_id 升序）
    async fn list_active_members(&self) -> RepositoryResult<Vec<Member>>;

    /// 查询指定分配类型的可分配在任同工（按 committee_member_id 升序）
    async fn list_active_committee_members(
        &self,
        kind: AssignmentKind,
    ) -> RepositoryResult<Vec<CommitteeMember>>;

    /// 查询全部有效认领关系
    async fn list_active_claims(&self) -> RepositoryResult<Vec<Claim>>;
}

// ==========================================
// AssignmentStore - 分配存储接口
// ==========================================

/// 批量写入结果
///
/// conflicts 表示命中 (member, period, kind) 唯一约束而被忽略的行数;
/// 并发生成时落败方以此把重复写入折算为"已覆盖",不视为错误。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertOutcome {
    /// 实际写入行数
    pub inserted: usize,
    /// 唯一约束冲突行数
    pub conflicts: usize,
}

/// 分配存储接口
///
/// (member_id, period, kind) 唯一约束由存储方保证,是幂等生成的最终裁决。
/// 实现者: `AssignmentRepository`（SQLite）。
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// 查询目标周期已存在的分配对 (member_id, committee_member_id)
    async fn existing_assignments(
        &self,
        period: AssignmentPeriod,
        kind: AssignmentKind,
    ) -> RepositoryResult<Vec<(String, String)>>;

    /// 查询目标周期的上一周期分配对（轮换回避用）
    async fn prior_period_assignments(
        &self,
        period: AssignmentPeriod,
        kind: AssignmentKind,
    ) -> RepositoryResult<Vec<(String, String)>>;

    /// 批量写入分配对
    ///
    /// 要求逐行 insert-if-not-exists 语义: 冲突行计入 conflicts,
    /// 其余行正常写入,整批在一个事务内完成。
    async fn insert_assignments(
        &self,
        kind: AssignmentKind,
        period: AssignmentPeriod,
        pairs: &[(String, String)],
    ) -> RepositoryResult<InsertOutcome>;

    /// 指定类型是否已存在任何周期的分配记录（首次生成护栏）
    async fn any_assignment_exists(&self, kind: AssignmentKind) -> RepositoryResult<bool>;
}
