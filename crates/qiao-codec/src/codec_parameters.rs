//! 编解码器参数.
//!
//! 对标 FFmpeg 的 `AVCodecContext` 中编码相关的字段.

use bitflags::bitflags;
use qiao_core::{ChannelLayout, SampleFormat};

use crate::codec_id::CodecId;

bitflags! {
    /// 编码器行为标志
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CodecFlags: u32 {
        /// 把解码器配置放入带外 extra data (而非码流内)
        const GLOBAL_HEADER = 1 << 22;
    }
}

/// 编解码器参数
#[derive(Debug, Clone)]
pub struct CodecParameters {
    /// 编解码器标识
    pub codec_id: CodecId,
    /// 额外数据 (AudioSpecificConfig / ALACSpecificConfig 等)
    pub extra_data: Vec<u8>,
    /// 码率 (bits/s), 0 表示由编码器决定
    pub bit_rate: u64,
    /// 编码器行为标志
    pub flags: CodecFlags,
    /// 媒体类型特定参数
    pub params: CodecParamsType,
}

/// 媒体类型特定参数
#[derive(Debug, Clone)]
pub enum CodecParamsType {
    /// 音频参数
    Audio(AudioCodecParams),
    /// 无特定参数
    None,
}

/// 音频编解码器参数
#[derive(Debug, Clone)]
pub struct AudioCodecParams {
    /// 采样率 (Hz)
    pub sample_rate: u32,
    /// 声道布局
    pub channel_layout: ChannelLayout,
    /// 采样格式
    pub sample_format: SampleFormat,
    /// 每帧采样数 (0 表示可变)
    pub frame_size: u32,
    /// 原始采样的有效位深 (0 表示与采样格式一致)
    pub bits_per_raw_sample: u32,
}

impl CodecParameters {
    /// 构造音频编码参数
    pub fn audio(codec_id: CodecId, audio: AudioCodecParams) -> Self {
        Self {
            codec_id,
            extra_data: Vec::new(),
            bit_rate: 0,
            flags: CodecFlags::empty(),
            params: CodecParamsType::Audio(audio),
        }
    }

    /// 获取音频参数 (如果是音频流)
    pub fn audio_params(&self) -> Option<&AudioCodecParams> {
        match &self.params {
            CodecParamsType::Audio(a) => Some(a),
            CodecParamsType::None => None,
        }
    }
}
