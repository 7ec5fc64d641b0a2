//! 原始音频帧 (Frame).
//!
//! 对标 FFmpeg 的 `AVFrame`. 编码桥只处理交错 PCM, 因此帧数据是单个连续缓冲区.

use qiao_core::{ChannelLayout, SampleFormat};

/// 无效时间戳
pub const NOPTS_VALUE: i64 = i64::MIN;

/// 音频帧
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// 交错排列的采样数据 (所有声道交替)
    pub data: Vec<u8>,
    /// 本帧包含的采样数 (每声道)
    pub nb_samples: u32,
    /// 采样率 (Hz)
    pub sample_rate: u32,
    /// 采样格式
    pub sample_format: SampleFormat,
    /// 声道布局
    pub channel_layout: ChannelLayout,
    /// 显示时间戳 (PTS), 以 1/sample_rate 为单位
    pub pts: i64,
}

impl AudioFrame {
    /// 创建空的音频帧
    pub fn new(
        nb_samples: u32,
        sample_rate: u32,
        sample_format: SampleFormat,
        channel_layout: ChannelLayout,
    ) -> Self {
        Self {
            data: Vec::new(),
            nb_samples,
            sample_rate,
            sample_format,
            channel_layout,
            pts: NOPTS_VALUE,
        }
    }

    /// 按格式与声道数计算的有效数据字节数
    pub fn byte_len(&self) -> usize {
        self.nb_samples as usize
            * self.channel_layout.channels as usize
            * self.sample_format.bytes_per_sample() as usize
    }
}
