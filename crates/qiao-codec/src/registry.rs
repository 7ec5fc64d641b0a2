//! 编解码器注册表.
//!
//! 对标 FFmpeg 的编解码器注册机制. 所有编码器都建立在厂商工具箱之上,
//! 因此注册表持有注入的工具箱句柄, 创建实例时传给工厂函数.

use std::collections::HashMap;
use std::sync::Arc;

use qiao_core::{QiaoError, QiaoResult};

use crate::codec_id::CodecId;
use crate::encoder::Encoder;
use crate::toolbox::AudioToolbox;

/// 编码器工厂函数类型
pub type EncoderFactory = fn(Arc<dyn AudioToolbox>) -> QiaoResult<Box<dyn Encoder>>;

/// 编码器注册条目
struct EncoderEntry {
    /// 编码器名称
    name: String,
    /// 工厂函数
    factory: EncoderFactory,
}

/// 编解码器注册表
pub struct CodecRegistry {
    /// 厂商工具箱句柄
    toolbox: Arc<dyn AudioToolbox>,
    /// 编码器工厂映射
    encoders: HashMap<CodecId, Vec<EncoderEntry>>,
}

impl CodecRegistry {
    /// 创建空的注册表
    pub fn new(toolbox: Arc<dyn AudioToolbox>) -> Self {
        Self {
            toolbox,
            encoders: HashMap::new(),
        }
    }

    /// 注册一个编码器
    pub fn register_encoder(
        &mut self,
        codec_id: CodecId,
        name: impl Into<String>,
        factory: EncoderFactory,
    ) {
        self.encoders
            .entry(codec_id)
            .or_default()
            .push(EncoderEntry {
                name: name.into(),
                factory,
            });
    }

    /// 创建指定编解码器 ID 的编码器实例
    pub fn create_encoder(&self, codec_id: CodecId) -> QiaoResult<Box<dyn Encoder>> {
        let entry = self
            .encoders
            .get(&codec_id)
            .and_then(|entries| entries.first())
            .ok_or_else(|| QiaoError::CodecNotFound(format!("未找到 {} 的编码器", codec_id)))?;
        (entry.factory)(Arc::clone(&self.toolbox))
    }

    /// 按名称创建编码器实例
    pub fn create_encoder_by_name(&self, name: &str) -> QiaoResult<Box<dyn Encoder>> {
        let entry = self
            .encoders
            .values()
            .flatten()
            .find(|entry| entry.name == name)
            .ok_or_else(|| QiaoError::CodecNotFound(format!("未找到编码器 {}", name)))?;
        (entry.factory)(Arc::clone(&self.toolbox))
    }

    /// 获取所有已注册的编码器名称
    pub fn list_encoders(&self) -> Vec<(CodecId, &str)> {
        let mut result = Vec::new();
        for (id, entries) in &self.encoders {
            for entry in entries {
                result.push((*id, entry.name.as_str()));
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolbox::mock::MockToolbox;

    fn registry() -> CodecRegistry {
        let mut registry = CodecRegistry::new(Arc::new(MockToolbox::new()));
        crate::register_all(&mut registry);
        registry
    }

    #[test]
    fn test_注册所有编码器() {
        let registry = registry();
        let mut names: Vec<_> = registry.list_encoders().into_iter().map(|(_, n)| n).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["appleca_aac", "appleca_alac"]);
    }

    #[test]
    fn test_按codec_id创建编码器() {
        let registry = registry();
        for id in [CodecId::Aac, CodecId::Alac] {
            let enc = registry.create_encoder(id).unwrap();
            assert_eq!(enc.codec_id(), id);
        }
        let enc = registry.create_encoder_by_name("appleca_alac").unwrap();
        assert_eq!(enc.name(), "appleca_alac");
    }

    #[test]
    fn test_未注册的编码器返回错误() {
        let registry = CodecRegistry::new(Arc::new(MockToolbox::new()));
        assert!(matches!(
            registry.create_encoder(CodecId::Aac),
            Err(QiaoError::CodecNotFound(_))
        ));
        assert!(registry.create_encoder_by_name("appleca_aac").is_err());
    }
}
