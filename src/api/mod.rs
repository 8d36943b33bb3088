// ==========================================
// 校园团契关怀轮换系统 - API 层
// ==========================================
// 职责: 业务接口封装,供触发层(UI/外部调度)调用
// ==========================================

pub mod error;
pub mod rotation_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use rotation_api::RotationApi;
