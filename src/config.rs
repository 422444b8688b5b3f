//! 应用级配置: 日志, 编码会话, ABR.
//!
//! 以 JSON 存储, 每个字段都有默认值, 配置文件只需写出要修改的部分.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::abr::{AbrConfig, AbrController};
use crate::codec::bt::{BtEncoder, BtEncoderConfig};
use crate::codec::dsp::SignalPath;
use crate::logging::LoggingConfig;

/// 应用配置
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LdacConfig {
    /// 日志
    pub logging: LoggingConfig,
    /// 编码会话
    pub encoder: BtEncoderConfig,
    /// 自适应码率
    pub abr: AbrConfig,
}

impl LdacConfig {
    /// 从 JSON 文件加载并校验
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败, path={}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("解析配置文件失败, path={}", path.display()))?;
        config.abr.validate().context("ABR 配置无效")?;
        Ok(config)
    }

    /// 保存为格式化 JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text).with_context(|| format!("写入配置文件失败, path={}", path.display()))
    }

    /// 按配置创建编码会话
    pub fn build_encoder<P: SignalPath>(&self) -> Result<BtEncoder<P>> {
        BtEncoder::new(self.encoder).context("创建编码会话失败")
    }

    /// 按配置创建 ABR 控制器
    pub fn build_abr(&self) -> Result<AbrController> {
        AbrController::from_config(&self.abr).context("创建 ABR 控制器失败")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::FixedPath;
    use crate::codec::bt::Eqmid;
    use crate::core::{ChannelMode, SampleFormat};
    use tempfile::TempDir;

    fn temp_dir() -> TempDir {
        TempDir::new().expect("创建临时目录失败")
    }

    #[test]
    fn test_save_then_load() {
        let dir = temp_dir();
        let path = dir.path().join("ldac.json");
        let mut config = LdacConfig::default();
        config.encoder.eqmid = Eqmid::Mq;
        config.encoder.channel_mode = ChannelMode::MONO;
        config.encoder.sample_format = SampleFormat::S24;
        config.abr.interval_ms = 20;
        config.save(&path).expect("保存配置失败");
        let loaded = LdacConfig::load(&path).expect("加载配置失败");
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = temp_dir();
        let path = dir.path().join("partial.json");
        let written = fs::write(&path, r#"{"encoder": {"eqmid": "Q1"}, "abr": {"enabled": false}}"#);
        assert!(written.is_ok());
        let config = LdacConfig::load(&path).expect("加载配置失败");
        assert_eq!(config.encoder.eqmid, Eqmid::Q1);
        assert_eq!(config.encoder.mtu, 679);
        assert!(!config.abr.enabled);
        assert_eq!(config.logging, LoggingConfig::default());

        let encoder = config.build_encoder::<FixedPath>();
        assert_eq!(encoder.map(|e| e.bitrate()).ok(), Some(396));
        assert!(config.build_abr().is_ok());
    }

    #[test]
    fn test_invalid_abr_rejected() {
        let dir = temp_dir();
        let path = dir.path().join("bad.json");
        let written = fs::write(&path, r#"{"abr": {"interval_ms": 0}}"#);
        assert!(written.is_ok());
        assert!(LdacConfig::load(&path).is_err());
        assert!(LdacConfig::load(dir.path().join("missing.json")).is_err());
    }
}
