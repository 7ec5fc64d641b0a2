//! 编码器实现模块.
//!
//! 两个编码器共用同一套会话 ([`session`]): 创建转换器、设置声道、逐帧拉取编码.
//! 各自提供声道布局表 ([`channel_map`]) 与带外配置的生成方式.

pub mod aac;
pub mod alac;
pub mod channel_map;
pub mod session;

use crate::codec_id::CodecId;
use crate::registry::CodecRegistry;

/// 注册所有内置编码器
pub fn register_all_encoders(registry: &mut CodecRegistry) {
    registry.register_encoder(CodecId::Aac, "appleca_aac", aac::AacEncoder::create);
    registry.register_encoder(CodecId::Alac, "appleca_alac", alac::AlacEncoder::create);
}
