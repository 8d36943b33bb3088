// ==========================================
// RotationApi 业务接口测试
// ==========================================
// 覆盖: 入参校验 / 端到端生成 / 审计日志 / 报表查询
// ==========================================

mod test_helpers;

use fellowship_rotation::api::{ApiError, RotationApi};
use fellowship_rotation::domain::types::{CommitteeRole, Gender, GenerationAction};
use fellowship_rotation::repository::RosterRepository;
use test_helpers::{committee_member_with_role, create_test_db, member, seed_roster};

/// 通过独立连接向同一数据库文件写入名册
fn seed_default_roster(db_path: &str) {
    let roster_repo = RosterRepository::new(db_path).unwrap();
    seed_roster(
        &roster_repo,
        &[
            member("F001", Gender::Female),
            member("F002", Gender::Female),
            member("M001", Gender::Male),
        ],
        &[
            committee_member_with_role("W001", Gender::Female, CommitteeRole::Leader),
            // 实习同工: 进代祷池,不进联络池
            committee_member_with_role("W002", Gender::Male, CommitteeRole::Intern),
        ],
    )
    .unwrap();
}

#[tokio::test]
async fn test_invalid_kind_is_rejected() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let api = RotationApi::open(&db_path).unwrap();

    let err = api.run_rotation_generation("visitation", None, "tester").await;
    assert!(matches!(err, Err(ApiError::InvalidInput(_))));
}

#[tokio::test]
async fn test_invalid_period_is_rejected() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let api = RotationApi::open(&db_path).unwrap();

    let err = api
        .run_rotation_generation("prayer", Some("2026/08"), "tester")
        .await;
    assert!(matches!(err, Err(ApiError::InvalidInput(_))));
}

#[tokio::test]
async fn test_end_to_end_generation_with_audit_log() {
    let (_tmp, db_path) = create_test_db().unwrap();
    seed_default_roster(&db_path);
    let api = RotationApi::open(&db_path).unwrap();

    let summary = api.run_initial_generation("prayer", "tester").await.unwrap();
    assert_eq!(summary.created_count, 3);
    assert!(summary.exceptions.is_empty());

    // 审计日志已落库
    let logs = api.list_generation_logs(10).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].action, GenerationAction::InitialGeneration);
    assert_eq!(logs[0].created_count, 3);
    assert_eq!(logs[0].operator, "tester");

    // 报表查询
    let period = summary.period.to_string();
    let records = api.list_assignments("prayer", &period).unwrap();
    assert_eq!(records.len(), 3);
}

#[tokio::test]
async fn test_second_initial_generation_reports_bootstrap_conflict() {
    let (_tmp, db_path) = create_test_db().unwrap();
    seed_default_roster(&db_path);
    let api = RotationApi::open(&db_path).unwrap();

    api.run_initial_generation("prayer", "tester").await.unwrap();
    let err = api.run_initial_generation("prayer", "tester").await;
    assert!(matches!(err, Err(ApiError::AlreadyBootstrapped(_))));

    // 失败的运行不落审计日志
    let logs = api.list_generation_logs(10).unwrap();
    assert_eq!(logs.len(), 1);
}

#[tokio::test]
async fn test_rotation_with_explicit_period_override() {
    let (_tmp, db_path) = create_test_db().unwrap();
    seed_default_roster(&db_path);
    let api = RotationApi::open(&db_path).unwrap();

    let summary = api
        .run_rotation_generation("communication", Some("2026-09"), "tester")
        .await
        .unwrap();
    assert_eq!(summary.period.to_string(), "2026-09");
    // 联络池只有 W001(女组长): 男成员空缺上报例外
    assert_eq!(summary.created_count, 2);
    assert_eq!(summary.exceptions.len(), 1);

    let records = api.list_assignments("communication", "2026-09").unwrap();
    assert_eq!(records.len(), 2);
}
