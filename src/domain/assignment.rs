// ==========================================
// 校园团契关怀轮换系统 - 分配周期与分配记录
// ==========================================
// 职责: 周期键、分配记录、认领关系的定义
// 红线: 分配记录一经创建不可原地修改,历史全部保留
// ==========================================

use crate::domain::types::AssignmentKind;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// AssignmentPeriod - 分配周期
// ==========================================

/// 分配周期（自然月键,格式 "YYYY-MM"）
///
/// 后继函数唯一确定: 下一周期 = 下一个自然月。
/// 对存储层不透明,仅作为字符串键使用。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssignmentPeriod {
    year: i32,
    month: u32, // 1..=12
}

impl AssignmentPeriod {
    /// 构造周期
    ///
    /// # 参数
    /// - year: 年份
    /// - month: 月份 (1..=12)
    ///
    /// # 返回
    /// - Some(AssignmentPeriod): 月份合法
    /// - None: 月份越界
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// 取日期所在的自然月周期
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// 后继周期（跨年自动进位）
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    /// 前驱周期（用于轮换时读取上期配对）
    pub fn prev(&self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for AssignmentPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for AssignmentPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (y, m) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("周期格式错误 (应为 YYYY-MM): {}", s))?;
        let year: i32 = y
            .parse()
            .map_err(|_| format!("周期年份解析失败: {}", s))?;
        let month: u32 = m
            .parse()
            .map_err(|_| format!("周期月份解析失败: {}", s))?;
        AssignmentPeriod::new(year, month).ok_or_else(|| format!("周期月份越界: {}", s))
    }
}

// 序列化为 "YYYY-MM" 字符串,与数据库列保持同一表示
impl Serialize for AssignmentPeriod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AssignmentPeriod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PeriodVisitor;

        impl<'de> Visitor<'de> for PeriodVisitor {
            type Value = AssignmentPeriod;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("周期字符串 YYYY-MM")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_str(PeriodVisitor)
    }
}

// ==========================================
// Assignment - 分配记录
// ==========================================

/// 分配记录
///
/// 每 (成员, 周期, 类型) 至多一条,由生成引擎独占创建。
/// 重新分配体现为新周期的新记录,不修改旧记录。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    /// 记录ID
    pub assignment_id: String,
    /// 成员ID
    pub member_id: String,
    /// 承接同工ID
    pub committee_member_id: String,
    /// 分配周期
    pub period: AssignmentPeriod,
    /// 分配类型
    pub kind: AssignmentKind,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

// ==========================================
// Claim - 认领关系
// ==========================================

/// 认领关系
///
/// 同工对指定成员的固定认领: 只要双方在册且性别相容,
/// 轮换时该成员持续分配给认领同工。每个成员至多被一位同工认领。
/// 由同工操作维护(外部),引擎只读。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    /// 被认领成员ID
    pub member_id: String,
    /// 认领同工ID
    pub committee_member_id: String,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_display_and_parse() {
        let p: AssignmentPeriod = "2026-08".parse().unwrap();
        assert_eq!(p.year(), 2026);
        assert_eq!(p.month(), 8);
        assert_eq!(p.to_string(), "2026-08");

        assert!("2026-13".parse::<AssignmentPeriod>().is_err());
        assert!("202608".parse::<AssignmentPeriod>().is_err());
        assert!("abcd-ef".parse::<AssignmentPeriod>().is_err());
    }

    #[test]
    fn test_period_successor_crosses_year() {
        let dec: AssignmentPeriod = "2025-12".parse().unwrap();
        assert_eq!(dec.next().to_string(), "2026-01");
        assert_eq!(dec.next().prev(), dec);

        let jan: AssignmentPeriod = "2026-01".parse().unwrap();
        assert_eq!(jan.prev().to_string(), "2025-12");
    }

    #[test]
    fn test_period_from_date() {
        let d = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        assert_eq!(AssignmentPeriod::from_date(d).to_string(), "2026-08");
    }

    #[test]
    fn test_period_serde_as_string() {
        let p: AssignmentPeriod = "2026-02".parse().unwrap();
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "\"2026-02\"");
        let back: AssignmentPeriod = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
