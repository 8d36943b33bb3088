// ==========================================
// 校园团契关怀轮换系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为,避免"部分模块外键开启/部分不开启"
// - 统一 busy_timeout,减少并发写入时的偶发 busy 错误
// - 集中建表语句,库与测试共用同一份 schema
// ==========================================

use rusqlite::{Connection, OptionalExtension};
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
///
/// 仅用于提示/告警（不做自动迁移）,避免静默在旧库上运行导致隐性错误。
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明:
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 初始化全部表结构（幂等）
///
/// 名册表（member / committee_member / claim）由外部 CRUD 层写入,
/// 引擎只读; assignment 表由生成引擎独占写入。
/// (member_id, period, kind) 唯一约束是并发生成的最终裁决:
/// 写入冲突按"已覆盖"处理,不视为错误。
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS member (
            member_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            gender TEXT NOT NULL CHECK (gender IN ('MALE', 'FEMALE')),
            active INTEGER NOT NULL DEFAULT 1,
            joined_on TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS committee_member (
            committee_member_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            gender TEXT NOT NULL CHECK (gender IN ('MALE', 'FEMALE')),
            role TEXT NOT NULL CHECK (role IN ('LEADER', 'COWORKER', 'INTERN', 'ADVISOR')),
            active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS claim (
            member_id TEXT PRIMARY KEY
                REFERENCES member(member_id) ON DELETE CASCADE,
            committee_member_id TEXT NOT NULL
                REFERENCES committee_member(committee_member_id) ON DELETE CASCADE,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS assignment (
            assignment_id TEXT PRIMARY KEY,
            member_id TEXT NOT NULL
                REFERENCES member(member_id),
            committee_member_id TEXT NOT NULL
                REFERENCES committee_member(committee_member_id),
            period TEXT NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('PRAYER', 'COMMUNICATION')),
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE (member_id, period, kind)
        );

        CREATE INDEX IF NOT EXISTS idx_assignment_period_kind
            ON assignment(period, kind);

        CREATE TABLE IF NOT EXISTS generation_log (
            log_id TEXT PRIMARY KEY,
            action TEXT NOT NULL,
            kind TEXT NOT NULL,
            period TEXT NOT NULL,
            created_count INTEGER NOT NULL,
            skipped_count INTEGER NOT NULL,
            exception_count INTEGER NOT NULL,
            operator TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        INSERT OR IGNORE INTO schema_version (version) VALUES (1);
        "#,
    )?;
    Ok(())
}

/// 获取默认数据库路径
///
/// 优先使用系统数据目录,不可用时回落到当前目录。
pub fn default_db_path() -> String {
    match dirs::data_dir() {
        Some(dir) => dir
            .join("fellowship-rotation")
            .join("fellowship.db")
            .to_string_lossy()
            .to_string(),
        None => "fellowship.db".to_string(),
    }
}
