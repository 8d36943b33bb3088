// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、名册数据生成等功能
// ==========================================

use chrono::{NaiveDate, Utc};
use fellowship_rotation::db;
use fellowship_rotation::domain::member::{CommitteeMember, Member};
use fellowship_rotation::domain::types::{CommitteeRole, Gender};
use fellowship_rotation::domain::Claim;
use fellowship_rotation::repository::RosterRepository;
use rusqlite::Connection;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时文件路径非UTF-8")?
        .to_string();

    let conn = db::open_sqlite_connection(&db_path)?;
    db::init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开共享连接（与仓储 from_connection 配套）
pub fn shared_connection(db_path: &str) -> Result<Arc<Mutex<Connection>>, Box<dyn Error>> {
    let conn = db::open_sqlite_connection(db_path)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// 构造测试成员
pub fn member(id: &str, gender: Gender) -> Member {
    Member {
        member_id: id.to_string(),
        name: format!("成员{}", id),
        gender,
        active: true,
        joined_on: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// 构造测试同工（默认同工角色）
pub fn committee_member(id: &str, gender: Gender) -> CommitteeMember {
    committee_member_with_role(id, gender, CommitteeRole::Coworker)
}

/// 构造指定角色的测试同工
pub fn committee_member_with_role(id: &str, gender: Gender, role: CommitteeRole) -> CommitteeMember {
    CommitteeMember {
        committee_member_id: id.to_string(),
        name: format!("同工{}", id),
        gender,
        role,
        active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// 构造认领关系
pub fn claim(member_id: &str, committee_member_id: &str) -> Claim {
    Claim {
        member_id: member_id.to_string(),
        committee_member_id: committee_member_id.to_string(),
        created_at: Utc::now(),
    }
}

/// 批量写入名册
pub fn seed_roster(
    repo: &RosterRepository,
    members: &[Member],
    committee: &[CommitteeMember],
) -> Result<(), Box<dyn Error>> {
    for m in members {
        repo.upsert_member(m)?;
    }
    for cm in committee {
        repo.upsert_committee_member(cm)?;
    }
    Ok(())
}
