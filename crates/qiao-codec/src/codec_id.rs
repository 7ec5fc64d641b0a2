//! 编解码器标识符.
//!
//! 对标 FFmpeg 的 `AVCodecID`. 只收录厂商转换器能够编码的格式.

use std::fmt;

/// 编解码器标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CodecId {
    /// 未知编解码器
    None,
    /// AAC (Advanced Audio Coding)
    Aac,
    /// Apple Lossless (ALAC)
    Alac,
}

impl CodecId {
    /// 获取编解码器的人类可读名称
    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Aac => "aac",
            Self::Alac => "alac",
        }
    }
}

impl fmt::Display for CodecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
