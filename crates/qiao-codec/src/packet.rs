//! 压缩数据包 (Packet).
//!
//! 对标 FFmpeg 的 `AVPacket`, 表示编码器产出的一帧压缩数据.

use bytes::Bytes;

use crate::frame::NOPTS_VALUE;

/// 压缩数据包
#[derive(Debug, Clone)]
pub struct Packet {
    /// 压缩数据
    pub data: Bytes,
    /// 显示时间戳 (PTS)
    pub pts: i64,
    /// 数据包时长 (采样数)
    pub duration: i64,
    /// 是否为关键帧 (音频包均为关键帧)
    pub is_keyframe: bool,
}

impl Packet {
    /// 从数据创建数据包
    pub fn from_data(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            pts: NOPTS_VALUE,
            duration: 0,
            is_keyframe: true,
        }
    }

    /// 数据大小 (字节)
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 是否为空包
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
