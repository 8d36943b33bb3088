// ==========================================
// 校园团契关怀轮换系统 - 配对引擎
// ==========================================
// 职责: 纯函数式计算 成员 -> 承接同工 的配对
// 输入: 待分配成员 + 可分配同工 + 认领表 + 上期配对 + 周期内已有负载
// 输出: 配对列表 + 例外列表
// 红线: 配对绝不跨性别; 无同性别同工时宁可空缺并上报例外
// 红线: 所有配对与例外必须输出 reason
// 红线: 相同输入必须产生相同输出（确定性,安全重试的前提）
// ==========================================

use crate::domain::member::{CommitteeMember, Member};
use crate::domain::types::Gender;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, instrument};

// ==========================================
// 例外类型
// ==========================================

/// 配对例外代码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExceptionCode {
    /// 无同性别可分配同工,成员本期空缺
    NoCompatibleCommitteeMember,
    /// 认领双方性别不一致（数据错误,认领不生效）
    ClaimGenderMismatch,
    /// 认领同工不在可分配池（离任或角色不可分配,认领作废）
    ClaimTargetIneligible,
}

impl ExceptionCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExceptionCode::NoCompatibleCommitteeMember => "NO_COMPATIBLE_COMMITTEE_MEMBER",
            ExceptionCode::ClaimGenderMismatch => "CLAIM_GENDER_MISMATCH",
            ExceptionCode::ClaimTargetIneligible => "CLAIM_TARGET_INELIGIBLE",
        }
    }
}

impl fmt::Display for ExceptionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 配对例外记录
///
/// 非致命: 单个成员的例外不中断其余成员的配对。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExceptionRecord {
    /// 相关成员ID
    pub member_id: String,
    /// 例外代码
    pub code: ExceptionCode,
    /// 例外说明
    pub reason: String,
}

// ==========================================
// 配对结果
// ==========================================

/// 单条配对
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedPair {
    /// 成员ID
    pub member_id: String,
    /// 承接同工ID
    pub committee_member_id: String,
    /// 配对依据说明
    pub reason: String,
}

/// 配对引擎输出
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    /// 配对列表（按成员处理顺序）
    pub pairs: Vec<MatchedPair>,
    /// 例外列表
    pub exceptions: Vec<ExceptionRecord>,
}

// ==========================================
// 同性别池槽位
// ==========================================

/// 池内槽位: 同工ID + 当前负载
///
/// 槽位按 committee_member_id 升序保存,等负载并列时取ID最小者,
/// 保证相同输入产生相同输出。
#[derive(Debug, Clone)]
struct PoolSlot {
    committee_member_id: String,
    load: usize,
}

// ==========================================
// MatchingEngine - 配对引擎
// ==========================================
pub struct MatchingEngine {
    // 无状态引擎,不需要注入依赖
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchingEngine {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 计算成员到承接同工的配对
    ///
    /// 规则:
    /// 1) 认领优先: 性别相容且认领同工在池内时,无视负载直接固定配对
    /// 2) 认领不一致（性别错配/同工不在池）上报例外后回落均衡分配
    /// 3) 均衡分配: 同性别池内取当前负载最小者,等负载按同工ID升序取首位
    /// 4) 轮换回避（软偏好）: 等负载候选中存在非上期同工时优先选它
    /// 5) 无同性别池: 成员空缺并上报例外,绝不跨性别硬配
    ///
    /// # 参数
    /// - `members`: 待分配成员（本期尚无分配记录者）
    /// - `committee`: 可分配同工池
    /// - `claims`: 认领表 member_id -> committee_member_id
    /// - `prior`: 上期配对 member_id -> committee_member_id
    /// - `initial_load`: 周期内已有负载 committee_member_id -> 已承接人数
    ///   （补缺生成时使均衡基于真实剩余容量）
    /// - `avoid_repeat`: 是否启用轮换回避
    ///
    /// # 返回
    /// MatchOutcome: 配对列表与例外列表
    #[instrument(skip_all, fields(
        members_count = members.len(),
        committee_count = committee.len(),
        claims_count = claims.len()
    ))]
    pub fn match_members(
        &self,
        members: &[Member],
        committee: &[CommitteeMember],
        claims: &HashMap<String, String>,
        prior: &HashMap<String, String>,
        initial_load: &HashMap<String, usize>,
        avoid_repeat: bool,
    ) -> MatchOutcome {
        let mut outcome = MatchOutcome::default();

        // 同工索引与同性别池（池内按ID升序,初始负载来自周期内已有分配）
        let committee_index: HashMap<&str, &CommitteeMember> = committee
            .iter()
            .map(|cm| (cm.committee_member_id.as_str(), cm))
            .collect();

        let mut pools: HashMap<Gender, Vec<PoolSlot>> = HashMap::new();
        let mut sorted_committee: Vec<&CommitteeMember> = committee.iter().collect();
        sorted_committee.sort_by(|a, b| a.committee_member_id.cmp(&b.committee_member_id));
        for cm in sorted_committee {
            pools.entry(cm.gender).or_default().push(PoolSlot {
                committee_member_id: cm.committee_member_id.clone(),
                load: initial_load
                    .get(&cm.committee_member_id)
                    .copied()
                    .unwrap_or(0),
            });
        }

        // 成员按ID升序处理,保证确定性
        let mut sorted_members: Vec<&Member> = members.iter().collect();
        sorted_members.sort_by(|a, b| a.member_id.cmp(&b.member_id));

        // ==========================================
        // 第一阶段: 认领固定
        // ==========================================
        // 认领先于均衡消耗容量,剩余成员基于真实剩余容量均衡
        let mut balanced_queue: Vec<&Member> = Vec::new();

        for member in sorted_members {
            let claimed = match claims.get(&member.member_id) {
                Some(c) => c,
                None => {
                    balanced_queue.push(member);
                    continue;
                }
            };

            match committee_index.get(claimed.as_str()) {
                Some(claimant) if claimant.gender == member.gender => {
                    Self::bump_load(&mut pools, claimant.gender, claimed);
                    debug!(
                        member_id = %member.member_id,
                        committee_member_id = %claimed,
                        "认领固定配对"
                    );
                    outcome.pairs.push(MatchedPair {
                        member_id: member.member_id.clone(),
                        committee_member_id: claimed.clone(),
                        reason: format!("认领固定: 同工 {} 认领该成员", claimed),
                    });
                }
                Some(claimant) => {
                    // 性别错配是数据错误: 上报例外,认领不生效,回落均衡分配
                    outcome.exceptions.push(ExceptionRecord {
                        member_id: member.member_id.clone(),
                        code: ExceptionCode::ClaimGenderMismatch,
                        reason: format!(
                            "认领性别不一致: 成员为{}, 认领同工 {} 为{}, 回落均衡分配",
                            member.gender, claimed, claimant.gender
                        ),
                    });
                    balanced_queue.push(member);
                }
                None => {
                    // 认领同工离任或角色不可分配: 认领作废,回落均衡分配
                    outcome.exceptions.push(ExceptionRecord {
                        member_id: member.member_id.clone(),
                        code: ExceptionCode::ClaimTargetIneligible,
                        reason: format!(
                            "认领同工 {} 不在可分配池, 认领作废, 回落均衡分配",
                            claimed
                        ),
                    });
                    balanced_queue.push(member);
                }
            }
        }

        // ==========================================
        // 第二阶段: 均衡分配
        // ==========================================
        for member in balanced_queue {
            let pool = match pools.get_mut(&member.gender) {
                Some(pool) if !pool.is_empty() => pool,
                _ => {
                    outcome.exceptions.push(ExceptionRecord {
                        member_id: member.member_id.clone(),
                        code: ExceptionCode::NoCompatibleCommitteeMember,
                        reason: format!("无{}可分配同工, 成员本期空缺", member.gender),
                    });
                    continue;
                }
            };

            let prior_target = prior.get(&member.member_id).map(String::as_str);
            let (slot_idx, avoided_prior) = Self::select_slot(pool, prior_target, avoid_repeat);
            let slot = &mut pool[slot_idx];

            let reason = if avoided_prior {
                format!(
                    "均衡分配+轮换回避: 上期为 {}, 等负载候选中改配 {}",
                    prior_target.unwrap_or_default(),
                    slot.committee_member_id
                )
            } else {
                format!("均衡分配: 配对时 {} 负载={}", slot.committee_member_id, slot.load)
            };

            outcome.pairs.push(MatchedPair {
                member_id: member.member_id.clone(),
                committee_member_id: slot.committee_member_id.clone(),
                reason,
            });
            slot.load += 1;
        }

        outcome
    }

    /// 选择池内槽位下标
    ///
    /// 取负载最小者; 等负载并列时按ID升序取首位;
    /// 开启轮换回避且并列候选中存在非上期同工时跳过上期同工。
    ///
    /// # 返回
    /// (槽位下标, 是否实际发生了轮换回避)
    ///
    /// 调用方保证池非空。
    fn select_slot(
        pool: &[PoolSlot],
        prior_target: Option<&str>,
        avoid_repeat: bool,
    ) -> (usize, bool) {
        let min_load = pool.iter().map(|s| s.load).min().unwrap_or(0);

        let mut first_min: Option<usize> = None;
        let mut skipped_prior = false;
        for (idx, slot) in pool.iter().enumerate() {
            if slot.load != min_load {
                continue;
            }
            if first_min.is_none() {
                first_min = Some(idx);
            }
            // 软偏好: 仅在等负载候选中回避上期同工,绝不破坏均衡
            if avoid_repeat && prior_target == Some(slot.committee_member_id.as_str()) {
                skipped_prior = true;
                continue;
            }
            return (idx, skipped_prior);
        }

        // 候选只剩上期同工: 均衡优先,仍然配给它
        (first_min.unwrap_or(0), false)
    }

    /// 认领配对后增加对应槽位的负载
    fn bump_load(pools: &mut HashMap<Gender, Vec<PoolSlot>>, gender: Gender, id: &str) {
        if let Some(pool) = pools.get_mut(&gender) {
            if let Some(slot) = pool.iter_mut().find(|s| s.committee_member_id == id) {
                slot.load += 1;
            }
        }
    }
}
