// ==========================================
// 校园团契关怀轮换系统 - 生成运行日志仓储
// ==========================================
// 职责: generation_log 表的数据访问
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::assignment::AssignmentPeriod;
use crate::domain::generation_log::GenerationLog;
use crate::domain::types::{AssignmentKind, GenerationAction};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex};

/// 生成运行日志仓储
pub struct GenerationLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl GenerationLogRepository {
    /// 创建新的日志仓储实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 追加一条生成运行日志
    pub fn insert(&self, log: &GenerationLog) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO generation_log (
                log_id, action, kind, period,
                created_count, skipped_count, exception_count,
                operator, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                log.log_id,
                log.action.as_str(),
                log.kind.as_str(),
                log.period.to_string(),
                log.created_count as i64,
                log.skipped_count as i64,
                log.exception_count as i64,
                log.operator,
                log.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;
        Ok(())
    }

    /// 查询最近的生成运行日志
    ///
    /// # 参数
    /// - limit: 返回条数上限
    pub fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<GenerationLog>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT log_id, action, kind, period,
                   created_count, skipped_count, exception_count,
                   operator, created_at
            FROM generation_log
            ORDER BY created_at DESC, log_id DESC
            LIMIT ?1
            "#,
        )?;

        let logs = stmt
            .query_map(params![limit as i64], |row| {
                let action_raw: String = row.get(1)?;
                let kind_raw: String = row.get(2)?;
                let period_raw: String = row.get(3)?;
                Ok(GenerationLog {
                    log_id: row.get(0)?,
                    action: action_raw.parse::<GenerationAction>().map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(1, Type::Text, e.into())
                    })?,
                    kind: kind_raw.parse::<AssignmentKind>().map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(2, Type::Text, e.into())
                    })?,
                    period: period_raw.parse::<AssignmentPeriod>().map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(3, Type::Text, e.into())
                    })?,
                    created_count: row.get::<_, i64>(4)? as usize,
                    skipped_count: row.get::<_, i64>(5)? as usize,
                    exception_count: row.get::<_, i64>(6)? as usize,
                    operator: row.get(7)?,
                    created_at: parse_timestamp(&row.get::<_, String>(8)?),
                })
            })?
            .collect::<SqliteResult<Vec<GenerationLog>>>()?;

        Ok(logs)
    }
}

/// 解析时间戳列（兼容 datetime('now') 与 RFC3339）
fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc)))
        .unwrap_or(DateTime::UNIX_EPOCH)
}
