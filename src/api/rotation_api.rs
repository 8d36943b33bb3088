// ==========================================
// 校园团契关怀轮换系统 - 轮换分配 API
// ==========================================
// 职责: 面向触发层(UI/外部调度)的业务接口
// 架构: API 层 -> Engine 层 -> Repository 层
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::assignment::{Assignment, AssignmentPeriod};
use crate::domain::generation_log::GenerationLog;
use crate::domain::types::{AssignmentKind, GenerationAction};
use crate::engine::{GenerationOrchestrator, GenerationSummary};
use crate::repository::{AssignmentRepository, GenerationLogRepository, RosterRepository};
use chrono::Local;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

// ==========================================
// RotationApi - 轮换分配 API
// ==========================================

/// 轮换分配API
///
/// 职责:
/// 1. 首次生成 / 轮换生成 的触发入口
/// 2. 分配记录查询（报表）
/// 3. 生成运行日志查询与落库
pub struct RotationApi {
    orchestrator: Arc<GenerationOrchestrator<ConfigManager>>,
    assignment_repo: Arc<AssignmentRepository>,
    generation_log_repo: Arc<GenerationLogRepository>,
}

impl RotationApi {
    /// 打开数据库并装配完整调用栈
    ///
    /// 幂等初始化表结构; 生成引擎与各仓储共享同一连接。
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn open(db_path: &str) -> ApiResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        crate::db::init_schema(&conn).map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    /// 从已有连接装配调用栈
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ApiResult<Self> {
        let roster_repo = Arc::new(RosterRepository::from_connection(conn.clone()));
        let assignment_repo = Arc::new(AssignmentRepository::from_connection(conn.clone()));
        let generation_log_repo = Arc::new(GenerationLogRepository::from_connection(conn.clone()));
        let config = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| ApiError::InternalError(e.to_string()))?,
        );

        let orchestrator = Arc::new(GenerationOrchestrator::new(
            roster_repo,
            assignment_repo.clone(),
            config,
        ));

        Ok(Self {
            orchestrator,
            assignment_repo,
            generation_log_repo,
        })
    }

    // ==========================================
    // 生成触发
    // ==========================================

    /// 首次生成
    ///
    /// # 参数
    /// - kind: 分配类型字符串 (PRAYER / COMMUNICATION)
    /// - operator: 操作人
    ///
    /// # 返回
    /// - Ok(GenerationSummary): 生成概要
    /// - Err(ApiError::AlreadyBootstrapped): 该类型已完成首次生成,未执行任何写入
    pub async fn run_initial_generation(
        &self,
        kind: &str,
        operator: &str,
    ) -> ApiResult<GenerationSummary> {
        let kind: AssignmentKind = kind.parse().map_err(ApiError::InvalidInput)?;
        let today = Local::now().date_naive();

        let summary = self.orchestrator.run_initial_generation(kind, today).await?;
        self.append_log(GenerationAction::InitialGeneration, &summary, operator);
        Ok(summary)
    }

    /// 轮换生成
    ///
    /// # 参数
    /// - kind: 分配类型字符串 (PRAYER / COMMUNICATION)
    /// - period_override: 指定周期 "YYYY-MM"（缺省为当前自然月）
    /// - operator: 操作人
    ///
    /// # 返回
    /// - Ok(GenerationSummary): 生成概要（重复调用安全,已覆盖则 created=0）
    pub async fn run_rotation_generation(
        &self,
        kind: &str,
        period_override: Option<&str>,
        operator: &str,
    ) -> ApiResult<GenerationSummary> {
        let kind: AssignmentKind = kind.parse().map_err(ApiError::InvalidInput)?;
        let period_override = match period_override {
            Some(p) => Some(p.parse::<AssignmentPeriod>().map_err(ApiError::InvalidInput)?),
            None => None,
        };
        let today = Local::now().date_naive();

        let summary = self
            .orchestrator
            .run_rotation_generation(kind, period_override, today)
            .await?;
        self.append_log(GenerationAction::RotationGeneration, &summary, operator);
        Ok(summary)
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 查询周期内的分配记录（报表）
    ///
    /// # 参数
    /// - kind: 分配类型字符串
    /// - period: 周期 "YYYY-MM"
    pub fn list_assignments(&self, kind: &str, period: &str) -> ApiResult<Vec<Assignment>> {
        let kind: AssignmentKind = kind.parse().map_err(ApiError::InvalidInput)?;
        let period: AssignmentPeriod = period.parse().map_err(ApiError::InvalidInput)?;
        Ok(self.assignment_repo.find_by_period(period, kind)?)
    }

    /// 查询最近的生成运行日志
    pub fn list_generation_logs(&self, limit: usize) -> ApiResult<Vec<GenerationLog>> {
        Ok(self.generation_log_repo.list_recent(limit)?)
    }

    // ==========================================
    // 内部
    // ==========================================

    /// 追加生成运行日志
    ///
    /// 日志是审计辅助,落库失败只告警,不影响已完成的生成结果。
    fn append_log(&self, action: GenerationAction, summary: &GenerationSummary, operator: &str) {
        let log = GenerationLog::new(
            action,
            summary.kind,
            summary.period,
            summary.created_count,
            summary.skipped_count,
            summary.exceptions.len(),
            operator,
        );
        if let Err(e) = self.generation_log_repo.insert(&log) {
            warn!(error = %e, "生成运行日志落库失败");
        } else {
            info!(
                action = %action,
                kind = %summary.kind,
                period = %summary.period,
                created_count = summary.created_count,
                "生成运行日志已记录"
            );
        }
    }
}
