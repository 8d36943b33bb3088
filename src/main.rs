// ==========================================
// 校园团契关怀轮换系统 - 手动触发入口
// ==========================================
// 用途: 人工/外部调度器触发一次生成并输出概要
// 用法:
//   fellowship-rotation initial <prayer|communication>
//   fellowship-rotation rotate  <prayer|communication> [YYYY-MM]
// 环境变量:
//   FELLOWSHIP_DB: 数据库路径（缺省为系统数据目录）
// ==========================================

use fellowship_rotation::api::RotationApi;
use fellowship_rotation::{db, logging};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", fellowship_rotation::APP_NAME);
    tracing::info!("系统版本: {}", fellowship_rotation::VERSION);
    tracing::info!("==================================================");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (mode, kind, period) = match args.as_slice() {
        [mode, kind] => (mode.as_str(), kind.as_str(), None),
        [mode, kind, period] => (mode.as_str(), kind.as_str(), Some(period.as_str())),
        _ => {
            eprintln!("用法: fellowship-rotation <initial|rotate> <prayer|communication> [YYYY-MM]");
            return ExitCode::from(2);
        }
    };

    // 数据库路径: 环境变量优先,缺省为系统数据目录
    let db_path = std::env::var("FELLOWSHIP_DB").unwrap_or_else(|_| db::default_db_path());
    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            tracing::error!(error = %e, "数据目录创建失败: {}", parent.display());
            return ExitCode::FAILURE;
        }
    }
    tracing::info!("使用数据库: {}", db_path);

    let api = match RotationApi::open(&db_path) {
        Ok(api) => api,
        Err(e) => {
            tracing::error!(error = %e, "初始化失败");
            return ExitCode::FAILURE;
        }
    };

    let operator = std::env::var("USER").unwrap_or_else(|_| "manual".to_string());

    let result = match mode {
        "initial" => api.run_initial_generation(kind, &operator).await,
        "rotate" => api.run_rotation_generation(kind, period, &operator).await,
        other => {
            eprintln!("未知模式: {} (应为 initial 或 rotate)", other);
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(summary) => {
            match serde_json::to_string_pretty(&summary) {
                Ok(json) => println!("{}", json),
                Err(e) => tracing::warn!(error = %e, "概要序列化失败"),
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "生成失败");
            ExitCode::FAILURE
        }
    }
}
