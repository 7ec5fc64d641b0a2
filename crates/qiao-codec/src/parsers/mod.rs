//! 配置结构解析器.
//!
//! - `esds`: 从厂商 magic cookie (MPEG-4 ES 描述符) 中取出 AudioSpecificConfig
//! - `mpeg4audio`: AudioSpecificConfig 与 PCE 的位级解析

pub mod esds;
pub mod mpeg4audio;
