// ==========================================
// 校园团契关怀轮换系统 - 生成运行审计日志
// ==========================================
// 职责: 记录每次生成运行的结果概要,供追溯
// ==========================================

use crate::domain::assignment::AssignmentPeriod;
use crate::domain::types::{AssignmentKind, GenerationAction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 生成运行日志
///
/// 每次成功的生成运行落一条,失败的运行不落(整次调用视为未发生)。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationLog {
    /// 日志ID
    pub log_id: String,
    /// 动作类型（首次生成/轮换生成）
    pub action: GenerationAction,
    /// 分配类型
    pub kind: AssignmentKind,
    /// 目标周期
    pub period: AssignmentPeriod,
    /// 新建记录数
    pub created_count: usize,
    /// 跳过记录数（已覆盖 + 写入冲突）
    pub skipped_count: usize,
    /// 例外数（无法配对/认领不一致）
    pub exception_count: usize,
    /// 操作人
    pub operator: String,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl GenerationLog {
    /// 构造一条新日志（自动生成ID与时间戳）
    pub fn new(
        action: GenerationAction,
        kind: AssignmentKind,
        period: AssignmentPeriod,
        created_count: usize,
        skipped_count: usize,
        exception_count: usize,
        operator: &str,
    ) -> Self {
        Self {
            log_id: Uuid::new_v4().to_string(),
            action,
            kind,
            period,
            created_count,
            skipped_count,
            exception_count,
            operator: operator.to_string(),
            created_at: Utc::now(),
        }
    }
}
