// ==========================================
// 校园团契关怀轮换系统 - 领域类型定义
// ==========================================
// 红线: 性别与角色均为封闭枚举,穷尽匹配
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 性别 (Gender)
// ==========================================
// 红线: 配对绝不跨性别,无兜底分支
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,   // 弟兄
    Female, // 姊妹
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "MALE"),
            Gender::Female => write!(f, "FEMALE"),
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MALE" => Ok(Gender::Male),
            "FEMALE" => Ok(Gender::Female),
            other => Err(format!("未知性别: {}", other)),
        }
    }
}

// ==========================================
// 分配类型 (Assignment Kind)
// ==========================================
// 两条独立的关怀线: 代祷 / 联络
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentKind {
    Prayer,        // 代祷关怀
    Communication, // 联络跟进
}

impl AssignmentKind {
    /// 转换为字符串标识（数据库存储格式）
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentKind::Prayer => "PRAYER",
            AssignmentKind::Communication => "COMMUNICATION",
        }
    }
}

impl fmt::Display for AssignmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AssignmentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PRAYER" => Ok(AssignmentKind::Prayer),
            "COMMUNICATION" => Ok(AssignmentKind::Communication),
            other => Err(format!("未知分配类型: {}", other)),
        }
    }
}

// ==========================================
// 同工角色 (Committee Role)
// ==========================================
// 角色决定可分配池归属,按分配类型穷尽匹配
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommitteeRole {
    Leader,   // 组长
    Coworker, // 同工
    Intern,   // 实习同工
    Advisor,  // 辅导
}

impl CommitteeRole {
    /// 判定角色是否进入指定分配类型的可分配池
    ///
    /// 规则:
    /// - 代祷池: 组长 / 同工 / 实习同工
    /// - 联络池: 组长 / 同工 (实习同工暂不承担对外联络)
    /// - 辅导不进入任何池 (仅督导,不直接承接成员)
    pub fn is_assignable(&self, kind: AssignmentKind) -> bool {
        match (self, kind) {
            (CommitteeRole::Leader, _) => true,
            (CommitteeRole::Coworker, _) => true,
            (CommitteeRole::Intern, AssignmentKind::Prayer) => true,
            (CommitteeRole::Intern, AssignmentKind::Communication) => false,
            (CommitteeRole::Advisor, _) => false,
        }
    }
}

impl fmt::Display for CommitteeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommitteeRole::Leader => write!(f, "LEADER"),
            CommitteeRole::Coworker => write!(f, "COWORKER"),
            CommitteeRole::Intern => write!(f, "INTERN"),
            CommitteeRole::Advisor => write!(f, "ADVISOR"),
        }
    }
}

impl FromStr for CommitteeRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LEADER" => Ok(CommitteeRole::Leader),
            "COWORKER" => Ok(CommitteeRole::Coworker),
            "INTERN" => Ok(CommitteeRole::Intern),
            "ADVISOR" => Ok(CommitteeRole::Advisor),
            other => Err(format!("未知同工角色: {}", other)),
        }
    }
}

// ==========================================
// 生成动作类型 (Generation Action)
// ==========================================
// 用途: 生成运行审计日志
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GenerationAction {
    InitialGeneration,  // 首次生成
    RotationGeneration, // 轮换生成
}

impl GenerationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationAction::InitialGeneration => "INITIAL_GENERATION",
            GenerationAction::RotationGeneration => "ROTATION_GENERATION",
        }
    }
}

impl fmt::Display for GenerationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GenerationAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INITIAL_GENERATION" => Ok(GenerationAction::InitialGeneration),
            "ROTATION_GENERATION" => Ok(GenerationAction::RotationGeneration),
            other => Err(format!("未知生成动作类型: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_roundtrip() {
        assert_eq!("MALE".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!("female".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!(Gender::Male.to_string(), "MALE");
        assert!("UNKNOWN".parse::<Gender>().is_err());
    }

    #[test]
    fn test_kind_roundtrip() {
        assert_eq!("PRAYER".parse::<AssignmentKind>().unwrap(), AssignmentKind::Prayer);
        assert_eq!(
            "communication".parse::<AssignmentKind>().unwrap(),
            AssignmentKind::Communication
        );
        assert_eq!(AssignmentKind::Prayer.as_str(), "PRAYER");
    }

    #[test]
    fn test_role_pool_membership() {
        // 代祷池: 组长/同工/实习同工
        assert!(CommitteeRole::Leader.is_assignable(AssignmentKind::Prayer));
        assert!(CommitteeRole::Coworker.is_assignable(AssignmentKind::Prayer));
        assert!(CommitteeRole::Intern.is_assignable(AssignmentKind::Prayer));
        assert!(!CommitteeRole::Advisor.is_assignable(AssignmentKind::Prayer));

        // 联络池: 组长/同工
        assert!(CommitteeRole::Leader.is_assignable(AssignmentKind::Communication));
        assert!(CommitteeRole::Coworker.is_assignable(AssignmentKind::Communication));
        assert!(!CommitteeRole::Intern.is_assignable(AssignmentKind::Communication));
        assert!(!CommitteeRole::Advisor.is_assignable(AssignmentKind::Communication));
    }
}
