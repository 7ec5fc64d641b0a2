//! # qiao-core
//!
//! Qiao 编码桥核心库, 提供比特流读写、声道布局、采样格式与统一错误类型.

pub mod bitreader;
pub mod bitwriter;
pub mod channel_layout;
pub mod error;
pub mod sample_format;

// 重导出常用类型
pub use channel_layout::{ChannelLayout, ChannelMask};
pub use error::{QiaoError, QiaoResult};
pub use sample_format::SampleFormat;
