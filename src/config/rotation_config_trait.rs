// ==========================================
// 校园团契关怀轮换系统 - 轮换配置读取 Trait
// ==========================================
// 职责: 定义生成引擎所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

// ==========================================
// RotationConfigReader Trait
// ==========================================
// 用途: 生成引擎所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait RotationConfigReader: Send + Sync {
    /// 轮换时是否回避上期同一承接同工
    ///
    /// 软偏好: 只在均衡候选中存在选择余地时生效,
    /// 关闭后纯按负载均衡配对。
    ///
    /// # 默认值
    /// - true
    async fn get_avoid_repeat_enabled(&self) -> Result<bool, Box<dyn Error>>;
}
