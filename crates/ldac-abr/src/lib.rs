//! # ldac-abr
//!
//! LDAC 蓝牙会话的自适应码率 (ABR) 控制器.
//!
//! 调用方按固定间隔报告发送队列深度, 控制器据此通过 [`QualityControl`]
//! 降低或提高编码会话的质量模式:
//! - 队列积压 (超过临界值, 持续上升, 或高码率下超过安全值) 时立即降低
//! - 观察窗口内队列持续为空时倒计数, 计数归零后提高一级
//! - 刚升级不久又被迫降级时加倍惩罚, 延长下一次升级前的观察时间

pub mod config;
pub mod controller;
mod history;

pub use config::AbrConfig;
pub use controller::AbrController;

use ldac_codec::bt::{AlterPriority, BtEncoder};
use ldac_codec::dsp::SignalPath;
use ldac_core::LdacResult;

/// 控制器操作编码会话所需的接口
pub trait QualityControl {
    /// 按方向调整一级质量模式
    fn alter_eqmid_priority(&mut self, priority: AlterPriority) -> LdacResult<()>;

    /// 当前 (目标) 质量模式的数值标识, 未知模式可能为任意值
    fn eqmid(&self) -> i32;

    /// 最近一次调用的打包错误码
    fn error_code(&self) -> u32;
}

impl<P: SignalPath> QualityControl for BtEncoder<P> {
    fn alter_eqmid_priority(&mut self, priority: AlterPriority) -> LdacResult<()> {
        BtEncoder::alter_eqmid_priority(self, priority)
    }

    fn eqmid(&self) -> i32 {
        BtEncoder::eqmid(self).id() as i32
    }

    fn error_code(&self) -> u32 {
        BtEncoder::error_code(self)
    }
}
