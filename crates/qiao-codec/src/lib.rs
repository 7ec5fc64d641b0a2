//! # qiao-codec
//!
//! Qiao 编码桥编码器库, 在厂商音频转换器之上提供逐帧编码的 AAC 与 ALAC 编码器.
//!
//! 厂商工具箱 (转换器工厂 + 格式数据库) 以 [`toolbox::AudioToolbox`] trait 注入,
//! 本 crate 只负责会话管理、声道布局协商与带外配置 (ASC / ALAC cookie) 的生成.
//!
//! ## 支持的编码器
//!
//! - **appleca_aac**: AAC-LC / HE-AAC, 多声道布局自动写入 PCE
//! - **appleca_alac**: Apple Lossless
//!
//! ## 使用示例
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use qiao_codec::toolbox::AudioToolbox;
//! use qiao_codec::{CodecId, CodecRegistry, Encoder};
//!
//! fn aac_encoder(toolbox: Arc<dyn AudioToolbox>) -> qiao_core::QiaoResult<Box<dyn Encoder>> {
//!     let mut reg = CodecRegistry::new(toolbox);
//!     qiao_codec::register_all(&mut reg);
//!     reg.create_encoder(CodecId::Aac)
//! }
//! ```

pub mod codec_id;
pub mod codec_parameters;
pub mod encoder;
pub mod encoders;
pub mod frame;
pub mod packet;
pub mod parsers;
pub mod registry;
pub mod toolbox;

// 重导出常用类型
pub use codec_id::CodecId;
pub use codec_parameters::{AudioCodecParams, CodecFlags, CodecParameters, CodecParamsType};
pub use encoder::Encoder;
pub use frame::AudioFrame;
pub use packet::Packet;
pub use registry::CodecRegistry;

/// 注册所有内置编码器
pub fn register_all(registry: &mut CodecRegistry) {
    encoders::register_all_encoders(registry);
}
