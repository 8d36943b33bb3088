// ==========================================
// 校园团契关怀轮换系统 - 生成编排器
// ==========================================
// 用途: 协调 名册供给 -> 轮换调度 -> 配对引擎 -> 分配存储
// 红线: 首次生成护栏查存储而非进程状态(编排器无状态,可多进程调用)
// 红线: 写入冲突折算为"已覆盖",绝不视为错误
// ==========================================

use crate::config::RotationConfigReader;
use crate::domain::assignment::AssignmentPeriod;
use crate::domain::types::AssignmentKind;
use crate::domain::Claim;
use crate::engine::matching::{ExceptionRecord, MatchingEngine};
use crate::engine::providers::{AssignmentStore, RosterProvider};
use crate::engine::scheduler::RotationScheduler;
use crate::engine::{GenerationError, GenerationResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

// ==========================================
// GenerationSummary - 生成结果概要
// ==========================================

/// 生成结果概要
///
/// skipped_count = 本期已覆盖成员数 + 写入时唯一约束冲突数。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSummary {
    /// 分配类型
    pub kind: AssignmentKind,
    /// 目标周期
    pub period: AssignmentPeriod,
    /// 新建记录数
    pub created_count: usize,
    /// 跳过记录数
    pub skipped_count: usize,
    /// 例外列表（无法配对/认领不一致）
    pub exceptions: Vec<ExceptionRecord>,
}

// ==========================================
// GenerationOrchestrator - 生成编排器
// ==========================================

pub struct GenerationOrchestrator<C>
where
    C: RotationConfigReader,
{
    roster: Arc<dyn RosterProvider>,
    store: Arc<dyn AssignmentStore>,
    scheduler: RotationScheduler,
    matcher: MatchingEngine,
    config: Arc<C>,
}

impl<C> GenerationOrchestrator<C>
where
    C: RotationConfigReader,
{
    /// 创建新的编排器实例
    ///
    /// # 参数
    /// - roster: 名册供给接口
    /// - store: 分配存储接口
    /// - config: 配置读取器
    pub fn new(roster: Arc<dyn RosterProvider>, store: Arc<dyn AssignmentStore>, config: Arc<C>) -> Self {
        Self {
            scheduler: RotationScheduler::new(store.clone()),
            matcher: MatchingEngine::new(),
            roster,
            store,
            config,
        }
    }

    /// 首次生成（每种分配类型仅允许执行一次）
    ///
    /// 护栏: 存储中已存在该类型任何周期的分配记录即拒绝,
    /// 不执行任何写入。护栏查询存储本身,与调度器的
    /// 单周期幂等是两层独立保护。
    ///
    /// # 参数
    /// - kind: 分配类型
    /// - today: 当前日期（目标周期 = 当前自然月）
    #[instrument(skip(self), fields(kind = %kind))]
    pub async fn run_initial_generation(
        &self,
        kind: AssignmentKind,
        today: NaiveDate,
    ) -> GenerationResult<GenerationSummary> {
        if self.store.any_assignment_exists(kind).await? {
            return Err(GenerationError::AlreadyBootstrapped { kind });
        }

        let period = RotationScheduler::resolve_target_period(None, today);
        info!(kind = %kind, period = %period, "首次生成开始");
        self.generate(kind, period).await
    }

    /// 轮换生成（周期性调用,可安全重复执行）
    ///
    /// # 参数
    /// - kind: 分配类型
    /// - period_override: 显式指定周期（缺省为当前自然月）
    /// - today: 当前日期
    #[instrument(skip(self), fields(kind = %kind))]
    pub async fn run_rotation_generation(
        &self,
        kind: AssignmentKind,
        period_override: Option<AssignmentPeriod>,
        today: NaiveDate,
    ) -> GenerationResult<GenerationSummary> {
        let period = RotationScheduler::resolve_target_period(period_override, today);
        info!(kind = %kind, period = %period, "轮换生成开始");
        self.generate(kind, period).await
    }

    /// 执行一次周期生成
    ///
    /// 流程: 名册快照 -> 覆盖计划 -> 配对 -> 批量写入 -> 概要
    async fn generate(
        &self,
        kind: AssignmentKind,
        period: AssignmentPeriod,
    ) -> GenerationResult<GenerationSummary> {
        // ==========================================
        // 步骤1: 名册快照
        // ==========================================
        debug!("步骤1: 读取名册快照");

        let members = self.roster.list_active_members().await?;
        let committee = self.roster.list_active_committee_members(kind).await?;
        let claims = self.roster.list_active_claims().await?;

        info!(
            members_count = members.len(),
            committee_count = committee.len(),
            claims_count = claims.len(),
            "名册快照读取完成"
        );

        // ==========================================
        // 步骤2: 覆盖计划
        // ==========================================
        debug!("步骤2: 计算覆盖计划");

        let plan = self.scheduler.plan_coverage(kind, period, &members).await?;

        if plan.is_fully_covered() {
            info!(
                period = %period,
                skipped_count = plan.covered_count,
                "本期已全量覆盖, 无需生成"
            );
            return Ok(GenerationSummary {
                kind,
                period,
                created_count: 0,
                skipped_count: plan.covered_count,
                exceptions: Vec::new(),
            });
        }

        info!(
            covered_count = plan.covered_count,
            uncovered_count = plan.uncovered_members.len(),
            "覆盖计划计算完成"
        );

        // ==========================================
        // 步骤3: 配对
        // ==========================================
        debug!("步骤3: 执行配对");

        let claims_map: HashMap<String, String> = claims
            .iter()
            .map(|c: &Claim| (c.member_id.clone(), c.committee_member_id.clone()))
            .collect();

        let avoid_repeat = self
            .config
            .get_avoid_repeat_enabled()
            .await
            .map_err(|e| GenerationError::Config(e.to_string()))?;

        let outcome = self.matcher.match_members(
            &plan.uncovered_members,
            &committee,
            &claims_map,
            &plan.prior_pairs,
            &plan.initial_load,
            avoid_repeat,
        );

        info!(
            pairs_count = outcome.pairs.len(),
            exceptions_count = outcome.exceptions.len(),
            "配对完成"
        );

        // ==========================================
        // 步骤4: 批量写入
        // ==========================================
        debug!("步骤4: 批量写入分配记录");

        let pairs: Vec<(String, String)> = outcome
            .pairs
            .iter()
            .map(|p| (p.member_id.clone(), p.committee_member_id.clone()))
            .collect();

        let write = if pairs.is_empty() {
            crate::engine::providers::InsertOutcome { inserted: 0, conflicts: 0 }
        } else {
            self.store.insert_assignments(kind, period, &pairs).await?
        };

        // 冲突 = 并发生成的另一方已写入同一成员, 视作已覆盖
        let summary = GenerationSummary {
            kind,
            period,
            created_count: write.inserted,
            skipped_count: plan.covered_count + write.conflicts,
            exceptions: outcome.exceptions,
        };

        info!(
            created_count = summary.created_count,
            skipped_count = summary.skipped_count,
            exceptions_count = summary.exceptions.len(),
            "生成完成"
        );

        Ok(summary)
    }
}
