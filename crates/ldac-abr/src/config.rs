//! ABR 配置.

use serde::{Deserialize, Serialize};

use ldac_core::{LdacError, LdacResult};

/// 观察窗口时长 (毫秒)
pub const OBSERVING_TIME_MS: u32 = 500;

/// 控制器配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbrConfig {
    /// 调用间隔 (毫秒), 1..=500
    pub interval_ms: u32,
    /// 临界深度
    pub th_critical: u32,
    /// 上升趋势深度
    pub th_dangerous_trend: u32,
    /// HQ/SQ 安全深度
    pub th_safety_hqsq: u32,
    /// 是否允许切换质量模式
    pub enabled: bool,
}

impl Default for AbrConfig {
    fn default() -> Self {
        Self {
            interval_ms: 100,
            th_critical: 6,
            th_dangerous_trend: 4,
            th_safety_hqsq: 2,
            enabled: true,
        }
    }
}

impl AbrConfig {
    /// 校验间隔与阈值
    pub fn validate(&self) -> LdacResult<()> {
        if self.interval_ms == 0 || self.interval_ms > OBSERVING_TIME_MS {
            return Err(LdacError::InvalidArgument(format!(
                "ABR 间隔 {} ms 超出 1..={}",
                self.interval_ms, OBSERVING_TIME_MS
            )));
        }
        check_thresholds(self.th_critical, self.th_dangerous_trend, self.th_safety_hqsq)
    }
}

/// 阈值须满足 `critical >= dangerous_trend >= safety`
pub(crate) fn check_thresholds(critical: u32, dangerous_trend: u32, safety: u32) -> LdacResult<()> {
    if critical < dangerous_trend || dangerous_trend < safety {
        return Err(LdacError::InvalidArgument(format!(
            "ABR 阈值顺序错误: {}/{}/{}",
            critical, dangerous_trend, safety
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(AbrConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects() {
        let zero = AbrConfig {
            interval_ms: 0,
            ..AbrConfig::default()
        };
        assert!(zero.validate().is_err());
        let long = AbrConfig {
            interval_ms: 501,
            ..AbrConfig::default()
        };
        assert!(long.validate().is_err());
        let order = AbrConfig {
            th_safety_hqsq: 5,
            ..AbrConfig::default()
        };
        assert!(order.validate().is_err());
    }

    #[test]
    fn test_serde_partial() {
        let parsed: Result<AbrConfig, _> =
            serde_json::from_str(r#"{"interval_ms": 50, "enabled": false}"#);
        let config = parsed.expect("解析 ABR 配置失败");
        assert_eq!(config.interval_ms, 50);
        assert!(!config.enabled);
        assert_eq!(config.th_critical, 6);
    }
}
