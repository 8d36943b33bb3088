// ==========================================
// 仓储层集成测试
// ==========================================
// 覆盖: 唯一约束与冲突计数 / 名册过滤 / 认领维护 / 配置读取
// ==========================================

mod test_helpers;

use fellowship_rotation::config::{config_keys, ConfigManager, RotationConfigReader};
use fellowship_rotation::domain::assignment::AssignmentPeriod;
use fellowship_rotation::domain::types::{AssignmentKind, CommitteeRole, Gender};
use fellowship_rotation::repository::{
    AssignmentRepository, GenerationLogRepository, RosterRepository,
};
use fellowship_rotation::domain::{GenerationAction, GenerationLog};
use test_helpers::{
    claim, committee_member_with_role, create_test_db, member, seed_roster, shared_connection,
};

fn period(s: &str) -> AssignmentPeriod {
    s.parse().unwrap()
}

#[test]
fn test_insert_batch_counts_conflicts_within_batch() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = shared_connection(&db_path).unwrap();
    let roster_repo = RosterRepository::from_connection(conn.clone());
    let repo = AssignmentRepository::from_connection(conn);

    seed_roster(
        &roster_repo,
        &[member("F001", Gender::Female)],
        &[committee_member_with_role("W001", Gender::Female, CommitteeRole::Coworker)],
    )
    .unwrap();

    let outcome = repo
        .insert_batch(
            AssignmentKind::Prayer,
            period("2026-08"),
            &[
                ("F001".to_string(), "W001".to_string()),
                ("F001".to_string(), "W001".to_string()),
            ],
        )
        .unwrap();

    assert_eq!(outcome.inserted, 1);
    assert_eq!(outcome.conflicts, 1);
}

#[test]
fn test_unique_constraint_across_batches() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = shared_connection(&db_path).unwrap();
    let roster_repo = RosterRepository::from_connection(conn.clone());
    let repo = AssignmentRepository::from_connection(conn);

    seed_roster(
        &roster_repo,
        &[member("F001", Gender::Female)],
        &[
            committee_member_with_role("W001", Gender::Female, CommitteeRole::Coworker),
            committee_member_with_role("W002", Gender::Female, CommitteeRole::Coworker),
        ],
    )
    .unwrap();

    repo.insert_batch(
        AssignmentKind::Prayer,
        period("2026-08"),
        &[("F001".to_string(), "W001".to_string())],
    )
    .unwrap();

    // 并发落败方视角: 同一成员同周期同类型, 即使同工不同也只算冲突
    let outcome = repo
        .insert_batch(
            AssignmentKind::Prayer,
            period("2026-08"),
            &[("F001".to_string(), "W002".to_string())],
        )
        .unwrap();
    assert_eq!(outcome.inserted, 0);
    assert_eq!(outcome.conflicts, 1);

    // 最终仍只有首个写入者的一条记录
    let pairs = repo
        .find_pairs_by_period(period("2026-08"), AssignmentKind::Prayer)
        .unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].1, "W001");
}

#[test]
fn test_exists_any_is_kind_scoped() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = shared_connection(&db_path).unwrap();
    let roster_repo = RosterRepository::from_connection(conn.clone());
    let repo = AssignmentRepository::from_connection(conn);

    seed_roster(
        &roster_repo,
        &[member("F001", Gender::Female)],
        &[committee_member_with_role("W001", Gender::Female, CommitteeRole::Coworker)],
    )
    .unwrap();

    assert!(!repo.exists_any(AssignmentKind::Prayer).unwrap());

    repo.insert_batch(
        AssignmentKind::Prayer,
        period("2026-08"),
        &[("F001".to_string(), "W001".to_string())],
    )
    .unwrap();

    assert!(repo.exists_any(AssignmentKind::Prayer).unwrap());
    assert!(!repo.exists_any(AssignmentKind::Communication).unwrap());
}

#[test]
fn test_find_by_period_returns_full_records() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = shared_connection(&db_path).unwrap();
    let roster_repo = RosterRepository::from_connection(conn.clone());
    let repo = AssignmentRepository::from_connection(conn);

    seed_roster(
        &roster_repo,
        &[member("F001", Gender::Female)],
        &[committee_member_with_role("W001", Gender::Female, CommitteeRole::Coworker)],
    )
    .unwrap();

    repo.insert_batch(
        AssignmentKind::Communication,
        period("2026-08"),
        &[("F001".to_string(), "W001".to_string())],
    )
    .unwrap();

    let records = repo
        .find_by_period(period("2026-08"), AssignmentKind::Communication)
        .unwrap();
    assert_eq!(records.len(), 1);
    let r = &records[0];
    assert!(!r.assignment_id.is_empty());
    assert_eq!(r.member_id, "F001");
    assert_eq!(r.committee_member_id, "W001");
    assert_eq!(r.period.to_string(), "2026-08");
    assert_eq!(r.kind, AssignmentKind::Communication);
}

#[test]
fn test_roster_excludes_inactive_members() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = shared_connection(&db_path).unwrap();
    let repo = RosterRepository::from_connection(conn);

    let mut inactive = member("F002", Gender::Female);
    inactive.active = false;
    repo.upsert_member(&member("F001", Gender::Female)).unwrap();
    repo.upsert_member(&inactive).unwrap();

    let members = repo.list_active_members().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].member_id, "F001");
}

#[test]
fn test_committee_pool_respects_role_rules() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = shared_connection(&db_path).unwrap();
    let repo = RosterRepository::from_connection(conn);

    repo.upsert_committee_member(&committee_member_with_role(
        "W001",
        Gender::Female,
        CommitteeRole::Leader,
    ))
    .unwrap();
    repo.upsert_committee_member(&committee_member_with_role(
        "W002",
        Gender::Female,
        CommitteeRole::Intern,
    ))
    .unwrap();
    repo.upsert_committee_member(&committee_member_with_role(
        "W003",
        Gender::Female,
        CommitteeRole::Advisor,
    ))
    .unwrap();

    // 代祷池: 组长+实习同工, 辅导排除
    let prayer_pool = repo
        .list_active_committee_members(AssignmentKind::Prayer)
        .unwrap();
    let ids: Vec<&str> = prayer_pool
        .iter()
        .map(|c| c.committee_member_id.as_str())
        .collect();
    assert_eq!(ids, vec!["W001", "W002"]);

    // 联络池: 仅组长
    let comm_pool = repo
        .list_active_committee_members(AssignmentKind::Communication)
        .unwrap();
    let ids: Vec<&str> = comm_pool
        .iter()
        .map(|c| c.committee_member_id.as_str())
        .collect();
    assert_eq!(ids, vec!["W001"]);
}

#[test]
fn test_claim_upsert_overrides_and_remove() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = shared_connection(&db_path).unwrap();
    let repo = RosterRepository::from_connection(conn);

    repo.upsert_member(&member("F001", Gender::Female)).unwrap();
    repo.upsert_committee_member(&committee_member_with_role(
        "W001",
        Gender::Female,
        CommitteeRole::Coworker,
    ))
    .unwrap();
    repo.upsert_committee_member(&committee_member_with_role(
        "W002",
        Gender::Female,
        CommitteeRole::Coworker,
    ))
    .unwrap();

    repo.upsert_claim(&claim("F001", "W001")).unwrap();
    // 改认领: 同一成员的认领被覆盖而非叠加
    repo.upsert_claim(&claim("F001", "W002")).unwrap();

    let claims = repo.list_active_claims().unwrap();
    assert_eq!(claims.len(), 1);
    assert_eq!(claims[0].committee_member_id, "W002");

    repo.remove_claim("F001").unwrap();
    assert!(repo.list_active_claims().unwrap().is_empty());
}

#[test]
fn test_generation_log_roundtrip() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = shared_connection(&db_path).unwrap();
    let repo = GenerationLogRepository::from_connection(conn);

    let log = GenerationLog::new(
        GenerationAction::RotationGeneration,
        AssignmentKind::Prayer,
        period("2026-08"),
        12,
        3,
        1,
        "tester",
    );
    repo.insert(&log).unwrap();

    let logs = repo.list_recent(10).unwrap();
    assert_eq!(logs.len(), 1);
    let got = &logs[0];
    assert_eq!(got.log_id, log.log_id);
    assert_eq!(got.action, GenerationAction::RotationGeneration);
    assert_eq!(got.kind, AssignmentKind::Prayer);
    assert_eq!(got.period.to_string(), "2026-08");
    assert_eq!(got.created_count, 12);
    assert_eq!(got.skipped_count, 3);
    assert_eq!(got.exception_count, 1);
    assert_eq!(got.operator, "tester");
}

#[tokio::test]
async fn test_config_avoid_repeat_default_and_override() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = shared_connection(&db_path).unwrap();
    let config = ConfigManager::from_connection(conn).unwrap();

    // 缺省开启
    assert!(config.get_avoid_repeat_enabled().await.unwrap());

    config
        .set_config_value(config_keys::ROTATION_AVOID_REPEAT, "false")
        .unwrap();
    assert!(!config.get_avoid_repeat_enabled().await.unwrap());
}
