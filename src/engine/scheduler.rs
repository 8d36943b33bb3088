// ==========================================
// 校园团契关怀轮换系统 - 轮换调度器
// ==========================================
// 职责: 确定目标周期 + 计算覆盖缺口
// 输入: 分配类型 + 当前日期/指定周期 + 在册成员
// 输出: 覆盖计划（待补缺成员 + 周期内已有负载 + 上期配对）
// 红线: 不持久化任何内部状态,每次调用全量重读存储
// ==========================================

use crate::domain::assignment::AssignmentPeriod;
use crate::domain::member::Member;
use crate::domain::types::AssignmentKind;
use crate::engine::providers::AssignmentStore;
use crate::repository::error::RepositoryResult;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, instrument};

// ==========================================
// CoveragePlan - 覆盖计划
// ==========================================

/// 覆盖计划
///
/// 只有 uncovered_members 会被提交给配对引擎:
/// 已覆盖成员不重复生成,这是幂等与补缺(部分失败后重跑)的基础。
#[derive(Debug, Clone)]
pub struct CoveragePlan {
    /// 目标周期
    pub period: AssignmentPeriod,
    /// 本期尚无分配记录的在册成员
    pub uncovered_members: Vec<Member>,
    /// 本期已覆盖的在册成员数
    pub covered_count: usize,
    /// 周期内已有负载 committee_member_id -> 已承接人数
    pub initial_load: HashMap<String, usize>,
    /// 上期配对 member_id -> committee_member_id（轮换回避用）
    pub prior_pairs: HashMap<String, String>,
}

impl CoveragePlan {
    /// 本期是否已全量覆盖（无事可做）
    pub fn is_fully_covered(&self) -> bool {
        self.uncovered_members.is_empty()
    }
}

// ==========================================
// RotationScheduler - 轮换调度器
// ==========================================
pub struct RotationScheduler {
    store: Arc<dyn AssignmentStore>,
}

impl RotationScheduler {
    /// 创建新的调度器实例
    ///
    /// # 参数
    /// - store: 分配存储接口
    pub fn new(store: Arc<dyn AssignmentStore>) -> Self {
        Self { store }
    }

    /// 确定目标周期
    ///
    /// # 参数
    /// - period_override: 显式指定周期（优先）
    /// - today: 当前日期
    ///
    /// # 返回
    /// 指定周期,缺省为当前日期所在自然月
    pub fn resolve_target_period(
        period_override: Option<AssignmentPeriod>,
        today: NaiveDate,
    ) -> AssignmentPeriod {
        period_override.unwrap_or_else(|| AssignmentPeriod::from_date(today))
    }

    /// 计算目标周期的覆盖计划
    ///
    /// 从存储全量重读本期已有分配与上期配对:
    /// - 已覆盖成员从输入中剔除,只提交缺口
    /// - 本期已有负载作为均衡起点（补缺不打破已有均衡）
    ///
    /// # 参数
    /// - kind: 分配类型
    /// - period: 目标周期
    /// - eligible_members: 在册成员（名册快照）
    ///
    /// # 返回
    /// CoveragePlan
    #[instrument(skip(self, eligible_members), fields(
        kind = %kind,
        period = %period,
        eligible_count = eligible_members.len()
    ))]
    pub async fn plan_coverage(
        &self,
        kind: AssignmentKind,
        period: AssignmentPeriod,
        eligible_members: &[Member],
    ) -> RepositoryResult<CoveragePlan> {
        // 本期已有分配: 覆盖集合 + 同工负载
        let existing = self.store.existing_assignments(period, kind).await?;

        let covered_member_ids: HashSet<&str> =
            existing.iter().map(|(m, _)| m.as_str()).collect();

        let mut initial_load: HashMap<String, usize> = HashMap::new();
        for (_, committee_member_id) in &existing {
            *initial_load.entry(committee_member_id.clone()).or_default() += 1;
        }

        // 上期配对（轮换回避用; 首个周期自然为空）
        let prior_pairs: HashMap<String, String> = self
            .store
            .prior_period_assignments(period, kind)
            .await?
            .into_iter()
            .collect();

        let mut covered_count = 0usize;
        let mut uncovered_members = Vec::new();
        for member in eligible_members {
            if covered_member_ids.contains(member.member_id.as_str()) {
                covered_count += 1;
            } else {
                uncovered_members.push(member.clone());
            }
        }

        debug!(
            covered_count,
            uncovered_count = uncovered_members.len(),
            prior_count = prior_pairs.len(),
            "覆盖计划计算完成"
        );

        Ok(CoveragePlan {
            period,
            uncovered_members,
            covered_count,
            initial_load,
            prior_pairs,
        })
    }
}
