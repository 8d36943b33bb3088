// ==========================================
// 校园团契关怀轮换系统 - 分配记录数据仓储
// ==========================================
// 职责: assignment 表的数据访问,实现 AssignmentStore 接口
// 红线: Repository 不含业务逻辑
// 红线: (member_id, period, kind) 唯一约束是并发生成的最终裁决
// ==========================================

use crate::domain::assignment::{Assignment, AssignmentPeriod};
use crate::domain::types::AssignmentKind;
use crate::engine::providers::{AssignmentStore, InsertOutcome};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ==========================================
// AssignmentRepository - 分配记录仓储
// ==========================================

/// 分配记录仓储
///
/// 写入仅走 `insert_batch`（逐行 INSERT OR IGNORE + 事务）,
/// 没有 UPDATE 路径: 分配记录一经创建不可变。
pub struct AssignmentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AssignmentRepository {
    /// 创建新的分配记录仓储实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
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

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询周期内的分配对
    ///
    /// # 返回
    /// 按 member_id 升序的 (member_id, committee_member_id) 列表
    pub fn find_pairs_by_period(
        &self,
        period: AssignmentPeriod,
        kind: AssignmentKind,
    ) -> RepositoryResult<Vec<(String, String)>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT member_id, committee_member_id
            FROM assignment
            WHERE period = ?1 AND kind = ?2
            ORDER BY member_id
            "#,
        )?;

        let pairs = stmt
            .query_map(params![period.to_string(), kind.as_str()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<SqliteResult<Vec<(String, String)>>>()?;

        Ok(pairs)
    }

    /// 查询周期内的完整分配记录（报表用）
    pub fn find_by_period(
        &self,
        period: AssignmentPeriod,
        kind: AssignmentKind,
    ) -> RepositoryResult<Vec<Assignment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT assignment_id, member_id, committee_member_id, period, kind, created_at
            FROM assignment
            WHERE period = ?1 AND kind = ?2
            ORDER BY member_id
            "#,
        )?;

        let records = stmt
            .query_map(params![period.to_string(), kind.as_str()], |row| {
                let period_raw: String = row.get(3)?;
                let kind_raw: String = row.get(4)?;
                Ok(Assignment {
                    assignment_id: row.get(0)?,
                    member_id: row.get(1)?,
                    committee_member_id: row.get(2)?,
                    period: period_raw.parse::<AssignmentPeriod>().map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(3, Type::Text, e.into())
                    })?,
                    kind: kind_raw.parse::<AssignmentKind>().map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(4, Type::Text, e.into())
                    })?,
                    created_at: parse_timestamp(&row.get::<_, String>(5)?),
                })
            })?
            .collect::<SqliteResult<Vec<Assignment>>>()?;

        Ok(records)
    }

    /// 批量写入分配对（单事务,逐行 INSERT OR IGNORE）
    ///
    /// # 参数
    /// - kind: 分配类型
    /// - period: 目标周期
    /// - pairs: (member_id, committee_member_id) 列表
    ///
    /// # 返回
    /// InsertOutcome: 写入行数与唯一约束冲突行数
    pub fn insert_batch(
        &self,
        kind: AssignmentKind,
        period: AssignmentPeriod,
        pairs: &[(String, String)],
    ) -> RepositoryResult<InsertOutcome> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let mut inserted = 0usize;
        let mut conflicts = 0usize;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT OR IGNORE INTO assignment (
                    assignment_id, member_id, committee_member_id, period, kind, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )?;

            let now = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
            for (member_id, committee_member_id) in pairs {
                let changed = stmt.execute(params![
                    Uuid::new_v4().to_string(),
                    member_id,
                    committee_member_id,
                    period.to_string(),
                    kind.as_str(),
                    now,
                ])?;
                if changed == 0 {
                    conflicts += 1;
                } else {
                    inserted += 1;
                }
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(InsertOutcome { inserted, conflicts })
    }

    /// 指定类型是否存在任何分配记录
    pub fn exists_any(&self, kind: AssignmentKind) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(1) FROM assignment WHERE kind = ?1",
            params![kind.as_str()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

/// 解析时间戳列（兼容 datetime('now') 与 RFC3339）
fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc)))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

// ==========================================
// AssignmentStore 接口适配
// ==========================================

#[async_trait]
impl AssignmentStore for AssignmentRepository {
    async fn existing_assignments(
        &self,
        period: AssignmentPeriod,
        kind: AssignmentKind,
    ) -> RepositoryResult<Vec<(String, String)>> {
        self.find_pairs_by_period(period, kind)
    }

    async fn prior_period_assignments(
        &self,
        period: AssignmentPeriod,
        kind: AssignmentKind,
    ) -> RepositoryResult<Vec<(String, String)>> {
        self.find_pairs_by_period(period.prev(), kind)
    }

    async fn insert_assignments(
        &self,
        kind: AssignmentKind,
        period: AssignmentPeriod,
        pairs: &[(String, String)],
    ) -> RepositoryResult<InsertOutcome> {
        self.insert_batch(kind, period, pairs)
    }

    async fn any_assignment_exists(&self, kind: AssignmentKind) -> RepositoryResult<bool> {
        self.exists_any(kind)
    }
}
