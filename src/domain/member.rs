// ==========================================
// 校园团契关怀轮换系统 - 成员与同工实体
// ==========================================
// 职责: 定义成员、同工两类名册实体
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

use crate::domain::types::{AssignmentKind, CommitteeRole, Gender};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Member - 团契成员
// ==========================================

/// 团契成员（被关怀对象）
///
/// 由外部 CRUD 层维护,引擎只读。
/// 仅 active = true 的成员参与分配。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    /// 成员ID
    pub member_id: String,
    /// 姓名
    pub name: String,
    /// 性别
    pub gender: Gender,
    /// 是否在册
    pub active: bool,
    /// 加入日期
    pub joined_on: NaiveDate,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 更新时间
    pub updated_at: DateTime<Utc>,
}

impl Member {
    /// 是否参与分配
    pub fn is_eligible(&self) -> bool {
        self.active
    }
}

// ==========================================
// CommitteeMember - 核心同工
// ==========================================

/// 核心同工（关怀承接方）
///
/// 角色决定其进入哪些可分配池,见 `CommitteeRole::is_assignable`。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitteeMember {
    /// 同工ID
    pub committee_member_id: String,
    /// 姓名
    pub name: String,
    /// 性别
    pub gender: Gender,
    /// 角色
    pub role: CommitteeRole,
    /// 是否在任
    pub active: bool,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 更新时间
    pub updated_at: DateTime<Utc>,
}

impl CommitteeMember {
    /// 是否可作为指定分配类型的承接方
    ///
    /// 条件: 在任 且 角色属于该类型的可分配池
    pub fn is_eligible(&self, kind: AssignmentKind) -> bool {
        self.active && self.role.is_assignable(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{AssignmentKind, CommitteeRole, Gender};

    fn cm(role: CommitteeRole, active: bool) -> CommitteeMember {
        CommitteeMember {
            committee_member_id: "W001".to_string(),
            name: "测试同工".to_string(),
            gender: Gender::Female,
            role,
            active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_inactive_committee_member_never_eligible() {
        let m = cm(CommitteeRole::Leader, false);
        assert!(!m.is_eligible(AssignmentKind::Prayer));
        assert!(!m.is_eligible(AssignmentKind::Communication));
    }

    #[test]
    fn test_intern_eligible_for_prayer_only() {
        let m = cm(CommitteeRole::Intern, true);
        assert!(m.is_eligible(AssignmentKind::Prayer));
        assert!(!m.is_eligible(AssignmentKind::Communication));
    }
}
