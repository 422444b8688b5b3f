//! 自适应码率控制器.

use log::{debug, trace};

use ldac_codec::bt::{AlterPriority, Eqmid};
use ldac_core::{LdacError, LdacResult};

use crate::QualityControl;
use crate::config::{AbrConfig, OBSERVING_TIME_MS, check_thresholds};
use crate::history::DepthHistory;

/// 惩罚倍数上限
const PENALTY_MAX: i32 = 4;
/// 升级前的观察次数基数, 实际为 `12 - 2 * rank`
const COUNT_TO_JUDGE_INC_QUALITY: i32 = 12;
/// 初始化后保持原质量模式的观察次数
const COUNT_FOR_INIT: i32 = 6;
/// 稳定状态次数少于该值时降级视为不稳定
const STEADY_STATE_TO_JUDGE_STEADY: u32 = 3;
/// 回到 HQ 时稳定状态次数超过该值则清除惩罚
const STEADY_STATE_TO_RESET_PENALTY_FOR_HQ: u32 = 60;
/// 窗口平均深度 (x10) 超过该值时降级
const AVERAGE10_LIMIT: u32 = 15;

/// 由数值标识得到码率排名
fn rank_of(eqmid: i32) -> Option<usize> {
    u32::try_from(eqmid)
        .ok()
        .and_then(|id| Eqmid::from_id(id).ok())
        .map(Eqmid::rank)
}

fn is_hq_or_sq(eqmid: i32) -> bool {
    eqmid == Eqmid::Hq.id() as i32 || eqmid == Eqmid::Sq.id() as i32
}

/// 自适应码率控制器
#[derive(Debug)]
pub struct AbrController {
    history: DepthHistory,
    num_to_evaluate: usize,
    cnt_to_inc_quality: i32,
    steady_state: u32,
    penalty: i32,
    steady_rank: usize,
    th_critical: u32,
    th_dangerous_trend: u32,
    th_safety_hqsq: u32,
}

impl AbrController {
    /// 按调用间隔创建控制器, 阈值取默认值
    pub fn new(interval_ms: u32) -> LdacResult<Self> {
        if interval_ms == 0 || interval_ms > OBSERVING_TIME_MS {
            return Err(LdacError::InvalidArgument(format!(
                "ABR 间隔 {} ms 超出 1..={}",
                interval_ms, OBSERVING_TIME_MS
            )));
        }
        let num_to_evaluate = (OBSERVING_TIME_MS / interval_ms) as usize;
        let defaults = AbrConfig::default();
        debug!(
            "初始化 ABR: 间隔 {} ms, 窗口 {} 次",
            interval_ms, num_to_evaluate
        );
        Ok(Self {
            history: DepthHistory::new(num_to_evaluate + 1)?,
            num_to_evaluate,
            cnt_to_inc_quality: COUNT_FOR_INIT,
            steady_state: 0,
            penalty: 1,
            steady_rank: Eqmid::Hq.rank(),
            th_critical: defaults.th_critical,
            th_dangerous_trend: defaults.th_dangerous_trend,
            th_safety_hqsq: defaults.th_safety_hqsq,
        })
    }

    /// 由配置创建控制器
    pub fn from_config(config: &AbrConfig) -> LdacResult<Self> {
        config.validate()?;
        let mut controller = Self::new(config.interval_ms)?;
        controller.set_thresholds(
            config.th_critical,
            config.th_dangerous_trend,
            config.th_safety_hqsq,
        )?;
        Ok(controller)
    }

    /// 设置阈值, 顺序不满足 `critical >= dangerous_trend >= safety` 时不做修改
    pub fn set_thresholds(
        &mut self,
        critical: u32,
        dangerous_trend: u32,
        safety_hqsq: u32,
    ) -> LdacResult<()> {
        check_thresholds(critical, dangerous_trend, safety_hqsq)?;
        self.th_critical = critical;
        self.th_dangerous_trend = dangerous_trend;
        self.th_safety_hqsq = safety_hqsq;
        Ok(())
    }

    /// 评估窗口长度 (调用次数)
    pub fn window(&self) -> usize {
        self.num_to_evaluate
    }

    /// 距离下一次升级的剩余窗口数
    pub fn countdown(&self) -> i32 {
        self.cnt_to_inc_quality
    }

    /// 当前惩罚倍数
    pub fn penalty(&self) -> i32 {
        self.penalty
    }

    /// 连续稳定窗口数
    pub fn steady_state(&self) -> u32 {
        self.steady_state
    }

    /// 记录的稳定排名
    pub fn steady_rank(&self) -> usize {
        self.steady_rank
    }

    /// 报告一次发送队列深度, 返回处理后的质量模式标识
    ///
    /// `enable` 为 false 时只更新统计, 不切换质量模式.
    /// 会话返回未知质量模式时直接返回该值, 不修改任何状态.
    pub fn process<Q: QualityControl + ?Sized>(
        &mut self,
        session: &mut Q,
        depth: u32,
        enable: bool,
    ) -> i32 {
        let eqmid = session.eqmid();
        let Some(rank) = rank_of(eqmid) else {
            trace!("未知质量模式 {}, 跳过", eqmid);
            return eqmid;
        };

        let prev = self.history.push(depth);
        let steps = self.judge(depth, prev, eqmid, rank);
        trace!(
            "ABR: 深度 {} (前 {}), 排名 {}, 倒计数 {}, 惩罚 {}, 稳定 {}",
            depth, prev, rank, self.cnt_to_inc_quality, self.penalty, self.steady_state
        );
        if !enable || steps == 0 {
            return eqmid;
        }

        let new_rank = if steps < 0 {
            self.decrease(session, steps.unsigned_abs(), rank)
        } else {
            self.increase(session, rank)
        };
        self.steady_state = 0;
        self.history.set_count(0);
        self.cnt_to_inc_quality = (COUNT_TO_JUDGE_INC_QUALITY - 2 * new_rank as i32)
            .max(1)
            .saturating_mul(self.penalty);
        session.eqmid()
    }

    /// 判定应调整的级数, 负数为降级
    fn judge(&mut self, curr: u32, prev: u32, eqmid: i32, rank: usize) -> i32 {
        if curr >= self.th_critical {
            return if is_hq_or_sq(eqmid) { -2 } else { -1 };
        }
        if curr > self.th_dangerous_trend && curr > prev {
            return -1;
        }
        if curr > self.th_safety_hqsq && is_hq_or_sq(eqmid) {
            return -1;
        }
        if self.history.count() < self.num_to_evaluate {
            return 0;
        }

        self.history.set_count(self.num_to_evaluate);
        let sum = self.history.sum();
        let average10 = sum.saturating_mul(10) / self.num_to_evaluate as u32;
        if average10 > AVERAGE10_LIMIT {
            return -1;
        }
        self.steady_state = self.steady_state.saturating_add(1);
        if sum == 0 {
            self.cnt_to_inc_quality -= 1;
            if self.cnt_to_inc_quality <= 0 {
                return 1;
            }
            self.history.set_count(0);
        } else {
            self.cnt_to_inc_quality = COUNT_TO_JUDGE_INC_QUALITY - 2 * rank as i32;
            if rank >= self.steady_rank {
                self.cnt_to_inc_quality = self.cnt_to_inc_quality.saturating_mul(self.penalty);
            }
        }
        0
    }

    fn decrease<Q: QualityControl + ?Sized>(&mut self, session: &mut Q, steps: u32, rank: usize) -> usize {
        for _ in 0..steps {
            if let Err(err) = session.alter_eqmid_priority(AlterPriority::IncConnection) {
                debug!("ABR 降级停止: {} (错误码 0x{:08X})", err, session.error_code());
                break;
            }
        }
        let new_rank = rank_of(session.eqmid()).unwrap_or(rank);
        if self.steady_state < STEADY_STATE_TO_JUDGE_STEADY {
            self.steady_rank = new_rank.saturating_sub(1);
            self.penalty = (self.penalty * 2).min(PENALTY_MAX);
        }
        debug!(
            "ABR 降级: 排名 {} -> {}, 惩罚 {}",
            rank, new_rank, self.penalty
        );
        new_rank
    }

    fn increase<Q: QualityControl + ?Sized>(&mut self, session: &mut Q, rank: usize) -> usize {
        if let Err(err) = session.alter_eqmid_priority(AlterPriority::IncQuality) {
            debug!("ABR 升级失败: {}", err);
        }
        let new_rank = rank_of(session.eqmid()).unwrap_or(rank);
        if new_rank < self.steady_rank {
            self.penalty = 1;
        }
        if new_rank == Eqmid::Hq.rank() && self.steady_state > STEADY_STATE_TO_RESET_PENALTY_FOR_HQ {
            self.penalty = 1;
        }
        debug!(
            "ABR 升级: 排名 {} -> {}, 惩罚 {}",
            rank, new_rank, self.penalty
        );
        new_rank
    }
}
