// ==========================================
// 校园团契关怀轮换系统 - 名册数据仓储
// ==========================================
// 职责: member / committee_member / claim 三表的数据访问
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::member::{CommitteeMember, Member};
use crate::domain::types::{AssignmentKind, CommitteeRole, Gender};
use crate::domain::Claim;
use crate::engine::providers::RosterProvider;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// 行解析辅助
// ==========================================

/// 解析封闭枚举列（性别/角色）
///
/// 未知取值是数据错误,必须显式失败,不得回落到默认变体。
fn parse_enum_column<T: FromStr<Err = String>>(idx: usize, raw: String) -> SqliteResult<T> {
    raw.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

/// 解析日期列（YYYY-MM-DD）
fn parse_date_column(idx: usize, raw: String) -> SqliteResult<NaiveDate> {
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// 解析时间戳列
///
/// 兼容 datetime('now') 的 "YYYY-MM-DD HH:MM:SS" 与 RFC3339 两种写法;
/// 时间戳仅是元数据,解析失败回落到纪元起点而非让整行失败。
fn parse_timestamp_column(raw: &str) -> DateTime<Utc> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc)))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

fn member_from_row(row: &Row<'_>) -> SqliteResult<Member> {
    Ok(Member {
        member_id: row.get(0)?,
        name: row.get(1)?,
        gender: parse_enum_column::<Gender>(2, row.get::<_, String>(2)?)?,
        active: row.get::<_, i64>(3)? != 0,
        joined_on: parse_date_column(4, row.get::<_, String>(4)?)?,
        created_at: parse_timestamp_column(&row.get::<_, String>(5)?),
        updated_at: parse_timestamp_column(&row.get::<_, String>(6)?),
    })
}

fn committee_member_from_row(row: &Row<'_>) -> SqliteResult<CommitteeMember> {
    Ok(CommitteeMember {
        committee_member_id: row.get(0)?,
        name: row.get(1)?,
        gender: parse_enum_column::<Gender>(2, row.get::<_, String>(2)?)?,
        role: parse_enum_column::<CommitteeRole>(3, row.get::<_, String>(3)?)?,
        active: row.get::<_, i64>(4)? != 0,
        created_at: parse_timestamp_column(&row.get::<_, String>(5)?),
        updated_at: parse_timestamp_column(&row.get::<_, String>(6)?),
    })
}

// ==========================================
// RosterRepository - 名册仓储
// ==========================================

/// 名册仓储
///
/// 名册由外部 CRUD 层维护,生成引擎经由 `RosterProvider` trait 只读消费。
/// 写入方法服务于外部维护层与测试数据准备。
pub struct RosterRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RosterRepository {
    /// 创建新的名册仓储实例
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

    // ==========================================
    // 查询
    // ==========================================

    /// 查询全部在册成员
    ///
    /// # 返回
    /// 按 member_id 升序的在册成员列表（稳定顺序,保证生成确定性）
    pub fn list_active_members(&self) -> RepositoryResult<Vec<Member>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT member_id, name, gender, active, joined_on, created_at, updated_at
            FROM member
            WHERE active = 1
            ORDER BY member_id
            "#,
        )?;

        let members = stmt
            .query_map([], member_from_row)?
            .collect::<SqliteResult<Vec<Member>>>()?;

        Ok(members)
    }

    /// 查询指定分配类型的可分配在任同工
    ///
    /// SQL 只过滤在任标记; 角色入池规则属于领域规则,
    /// 由 `CommitteeRole::is_assignable` 判定。
    ///
    /// # 参数
    /// - kind: 分配类型
    ///
    /// # 返回
    /// 按 committee_member_id 升序的可分配同工列表
    pub fn list_active_committee_members(
        &self,
        kind: AssignmentKind,
    ) -> RepositoryResult<Vec<CommitteeMember>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT committee_member_id, name, gender, role, active, created_at, updated_at
            FROM committee_member
            WHERE active = 1
            ORDER BY committee_member_id
            "#,
        )?;

        let members = stmt
            .query_map([], committee_member_from_row)?
            .collect::<SqliteResult<Vec<CommitteeMember>>>()?;

        Ok(members
            .into_iter()
            .filter(|cm| cm.role.is_assignable(kind))
            .collect())
    }

    /// 查询全部有效认领关系
    ///
    /// # 返回
    /// 按被认领成员ID升序的认领列表
    pub fn list_active_claims(&self) -> RepositoryResult<Vec<Claim>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT member_id, committee_member_id, created_at
            FROM claim
            ORDER BY member_id
            "#,
        )?;

        let claims = stmt
            .query_map([], |row| {
                Ok(Claim {
                    member_id: row.get(0)?,
                    committee_member_id: row.get(1)?,
                    created_at: parse_timestamp_column(&row.get::<_, String>(2)?),
                })
            })?
            .collect::<SqliteResult<Vec<Claim>>>()?;

        Ok(claims)
    }

    // ==========================================
    // 写入（外部维护层 / 测试数据准备）
    // ==========================================

    /// 插入或更新单个成员
    pub fn upsert_member(&self, member: &Member) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO member (
                member_id, name, gender, active, joined_on, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                member.member_id,
                member.name,
                member.gender.to_string(),
                member.active as i64,
                member.joined_on.format("%Y-%m-%d").to_string(),
                member.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                member.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;
        Ok(())
    }

    /// 插入或更新单个同工
    pub fn upsert_committee_member(&self, cm: &CommitteeMember) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO committee_member (
                committee_member_id, name, gender, role, active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                cm.committee_member_id,
                cm.name,
                cm.gender.to_string(),
                cm.role.to_string(),
                cm.active as i64,
                cm.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                cm.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;
        Ok(())
    }

    /// 登记认领关系（同一成员重复认领时覆盖旧认领）
    pub fn upsert_claim(&self, claim: &Claim) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO claim (member_id, committee_member_id, created_at)
            VALUES (?1, ?2, ?3)
            "#,
            params![
                claim.member_id,
                claim.committee_member_id,
                claim.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;
        Ok(())
    }

    /// 撤销认领关系
    pub fn remove_claim(&self, member_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute("DELETE FROM claim WHERE member_id = ?1", params![member_id])?;
        Ok(())
    }
}

// ==========================================
// RosterProvider 接口适配
// ==========================================

#[async_trait]
impl RosterProvider for RosterRepository {
    async fn list_active_members(&self) -> RepositoryResult<Vec<Member>> {
        RosterRepository::list_active_members(self)
    }

    async fn list_active_committee_members(
        &self,
        kind: AssignmentKind,
    ) -> RepositoryResult<Vec<CommitteeMember>> {
        RosterRepository::list_active_committee_members(self, kind)
    }

    async fn list_active_claims(&self) -> RepositoryResult<Vec<Claim>> {
        RosterRepository::list_active_claims(self)
    }
}
