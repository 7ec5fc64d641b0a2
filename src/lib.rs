//! # Qiao (桥)
//!
//! 厂商音频转换器之上的 AAC / ALAC 编码桥.
//!
//! Qiao 把不透明的厂商转换器包装成逐帧编码的编码器:
//! - **编码会话**: 由 PCM 参数构建流描述, 以拉取方式每次编码一帧
//! - **声道布局**: 选择厂商输出布局与声道映射
//! - **带外配置**: 从 magic cookie 取出 ASC, 必要时写入合成的 PCE; 生成 ALAC cookie
//! - **日志**: 基于 tracing 的控制台 + 按日文件输出
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use qiao::codec::CodecId;
//! use qiao::codec::toolbox::AudioToolbox;
//!
//! fn list(toolbox: Arc<dyn AudioToolbox>) {
//!     let registry = qiao::default_codec_registry(toolbox);
//!     for (id, name) in registry.list_encoders() {
//!         println!("{id}: {name}");
//!     }
//!     let _aac = registry.create_encoder(CodecId::Aac);
//! }
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `qiao-core` | 比特流读写、声道布局、采样格式、错误类型 |
//! | `qiao-codec` | 厂商工具箱抽象、编码会话、AAC / ALAC 编码器 |

use std::sync::Arc;

/// 核心类型与工具
pub use qiao_core as core;

/// 编码器框架
pub use qiao_codec as codec;

pub mod logging;

/// 获取 Qiao 版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// 创建已注册所有内置编码器的注册表
pub fn default_codec_registry(
    toolbox: Arc<dyn qiao_codec::toolbox::AudioToolbox>,
) -> qiao_codec::CodecRegistry {
    let mut registry = qiao_codec::CodecRegistry::new(toolbox);
    qiao_codec::register_all(&mut registry);
    registry
}
