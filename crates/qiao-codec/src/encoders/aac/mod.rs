//! 基于厂商转换器的 AAC 编码器.
//!
//! 支持 AAC-LC 与 HE-AAC, 码率控制模式: CBR / ABR / 受限 VBR / 真 VBR.
//!
//! 厂商编码器对 2/2、侧方 5.x、6.x、7.x 等布局输出的 ASC 只有 channel_configuration,
//! 无法表达真实声道元素排列. 需要全局头时, 这些布局的 ASC 会用合成的 PCE 重写,
//! 见 [`pce`] 模块.

pub mod pce;

use std::sync::Arc;

use log::{debug, error};
use qiao_core::{ChannelLayout, QiaoError, QiaoResult};
use serde::{Deserialize, Serialize};

use crate::codec_id::CodecId;
use crate::codec_parameters::{AudioCodecParams, CodecFlags, CodecParameters, CodecParamsType};
use crate::encoder::Encoder;
use crate::encoders::channel_map::aac_channel_map_info;
use crate::encoders::session::EncodeSession;
use crate::frame::AudioFrame;
use crate::packet::Packet;
use crate::parsers::esds::extract_audio_specific_config;
use crate::toolbox::types::CODEC_QUALITY_MAX;
use crate::toolbox::{AudioToolbox, FormatId, PropertyId};

use self::pce::{PceLayout, rewrite_asc_with_pce};

/// 厂商 AAC 编码器支持的采样率
pub const SUPPORTED_SAMPLE_RATES: [u32; 11] = [
    96000, 88200, 48000, 44100, 32000, 24000, 22050, 16000, 12000, 11025, 8000,
];

/// 需要用 PCE 重写 ASC 的布局
static PCE_LAYOUTS: [(ChannelLayout, PceLayout<'static>); 8] = [
    (ChannelLayout::LAYOUT_2_2, PceLayout::LAYOUT_2_2),
    (ChannelLayout::SURROUND_5_0, PceLayout::SURROUND_5_0),
    (ChannelLayout::SURROUND_5_1, PceLayout::SURROUND_5_1),
    (ChannelLayout::SURROUND_6_0, PceLayout::SURROUND_6_0),
    (ChannelLayout::SURROUND_6_1, PceLayout::SURROUND_6_1),
    (ChannelLayout::SURROUND_7_0, PceLayout::SURROUND_7_0),
    (ChannelLayout::SURROUND_7_1, PceLayout::SURROUND_7_1),
    (ChannelLayout::SURROUND_7_1_WIDE, PceLayout::SURROUND_7_1_WIDE),
];

/// 查询布局对应的 PCE 元素排列, 厂商 ASC 可直接使用时返回 None
pub fn pce_layout_for(layout: ChannelLayout) -> Option<PceLayout<'static>> {
    PCE_LAYOUTS
        .iter()
        .find(|(candidate, _)| candidate.mask == layout.mask)
        .map(|(_, pce)| *pce)
}

/// AAC 规格
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AacProfile {
    /// AAC-LC
    #[default]
    Lc,
    /// HE-AAC (SBR)
    He,
}

impl AacProfile {
    /// 对应的输出格式标识
    pub fn format_id(self) -> FormatId {
        match self {
            Self::Lc => FormatId::MPEG4_AAC,
            Self::He => FormatId::MPEG4_AAC_HE,
        }
    }
}

/// 码率控制模式, 数值与厂商属性一致
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BitRateControlMode {
    /// 恒定码率
    #[serde(rename = "cbr")]
    Constant = 0,
    /// 平均码率
    #[serde(rename = "abr")]
    LongTermAverage = 1,
    /// 受限可变码率
    #[serde(rename = "cvbr")]
    VariableConstrained = 2,
    /// 真可变码率, 由 VBR 质量控制
    #[default]
    #[serde(rename = "tvbr")]
    Variable = 3,
}

/// AAC 编码器选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AacEncoderOptions {
    /// 规格
    pub profile: AacProfile,
    /// 码率控制模式
    pub mode: BitRateControlMode,
    /// 编码质量 (0-4)
    pub codec_quality: u32,
    /// 真 VBR 质量 (0-127)
    pub vbr_quality: u32,
}

impl Default for AacEncoderOptions {
    fn default() -> Self {
        Self {
            profile: AacProfile::Lc,
            mode: BitRateControlMode::Variable,
            codec_quality: 4,
            vbr_quality: 96,
        }
    }
}

impl AacEncoderOptions {
    /// 检查取值范围
    pub fn validate(&self) -> QiaoResult<()> {
        if self.codec_quality > 4 {
            return Err(QiaoError::InvalidArgument(format!(
                "编码质量 {} 超出范围 0-4",
                self.codec_quality
            )));
        }
        if self.vbr_quality > 127 {
            return Err(QiaoError::InvalidArgument(format!(
                "VBR 质量 {} 超出范围 0-127",
                self.vbr_quality
            )));
        }
        Ok(())
    }
}

/// AAC 编码器
pub struct AacEncoder {
    /// 编码会话
    session: EncodeSession,
    /// 编码选项
    options: AacEncoderOptions,
    /// 带外 ASC
    extra_data: Vec<u8>,
}

impl AacEncoder {
    /// 使用指定选项创建编码器
    pub fn with_options(toolbox: Arc<dyn AudioToolbox>, options: AacEncoderOptions) -> Self {
        Self {
            session: EncodeSession::new(toolbox),
            options,
            extra_data: Vec::new(),
        }
    }

    /// 创建默认选项的 AAC 编码器实例 (注册表工厂)
    pub fn create(toolbox: Arc<dyn AudioToolbox>) -> QiaoResult<Box<dyn Encoder>> {
        Ok(Box::new(Self::with_options(
            toolbox,
            AacEncoderOptions::default(),
        )))
    }

    /// 编码选项
    pub fn options(&self) -> &AacEncoderOptions {
        &self.options
    }

    /// 编码会话
    pub fn session(&self) -> &EncodeSession {
        &self.session
    }

    fn configure(&mut self, params: &mut CodecParameters, audio: &AudioCodecParams) -> QiaoResult<()> {
        let options = self.options.clone();
        let session = &mut self.session;

        session.open(audio, options.profile.format_id())?;
        session.setup_output_channels(aac_channel_map_info)?;
        session.set_u32(PropertyId::BIT_RATE_CONTROL_MODE, options.mode as u32)?;
        session.set_u32(
            PropertyId::CODEC_QUALITY,
            (options.codec_quality << 5).min(CODEC_QUALITY_MAX),
        )?;

        if options.mode == BitRateControlMode::Variable {
            session.set_u32(PropertyId::SOUND_QUALITY_FOR_VBR, options.vbr_quality)?;
        } else if params.bit_rate == 0 {
            let rate = session.get_u32(PropertyId::CURRENT_TARGET_BIT_RATE)?;
            debug!("未指定码率, 使用转换器目标码率 {}", rate);
            params.bit_rate = u64::from(rate);
        } else {
            let rate = u32::try_from(params.bit_rate).map_err(|_| {
                QiaoError::InvalidArgument(format!("码率 {} 超出范围", params.bit_rate))
            })?;
            session.check_bitrate(rate)?;
            session.set_u32(PropertyId::ENCODE_BIT_RATE, rate)?;
        }

        // 关闭编码延迟 (HE-AAC 默认有 1 包延迟)
        session.set_u32(PropertyId::MINIMUM_DELAY_MODE, 1)?;
        session.postinit()?;
        if let CodecParamsType::Audio(a) = &mut params.params {
            a.frame_size = session.frame_size();
        }

        if params.flags.contains(CodecFlags::GLOBAL_HEADER) {
            let cookie = session.magic_cookie()?;
            let asc = extract_audio_specific_config(&cookie)?;
            debug!("厂商 ASC: {:02X?}", asc);

            let asc = match pce_layout_for(audio.channel_layout) {
                Some(layout) => {
                    debug!("为声道布局 {} 写入 PCE", audio.channel_layout);
                    rewrite_asc_with_pce(&asc, &layout)?
                }
                None => asc,
            };
            params.extra_data = asc.clone();
            self.extra_data = asc;
        }
        Ok(())
    }
}

impl Encoder for AacEncoder {
    fn codec_id(&self) -> CodecId {
        CodecId::Aac
    }

    fn name(&self) -> &str {
        "appleca_aac"
    }

    fn open(&mut self, params: &mut CodecParameters) -> QiaoResult<()> {
        let audio = params
            .audio_params()
            .cloned()
            .ok_or_else(|| QiaoError::InvalidArgument("AAC 编码器需要音频参数".into()))?;
        self.options.validate()?;
        if !SUPPORTED_SAMPLE_RATES.contains(&audio.sample_rate) {
            return Err(QiaoError::InvalidArgument(format!(
                "AAC 不支持的采样率: {}",
                audio.sample_rate
            )));
        }

        let result = self.configure(params, &audio);
        match &result {
            Ok(()) => debug!(
                "AAC 编码器已打开: {:?}, {:?}, {} Hz, {}, 帧长 {}",
                self.options.profile,
                self.options.mode,
                audio.sample_rate,
                audio.channel_layout,
                self.session.frame_size(),
            ),
            Err(e) => {
                error!("AAC 编码器初始化失败: {}", e);
                self.session.close();
            }
        }
        result
    }

    fn send_frame(&mut self, frame: Option<&AudioFrame>) -> QiaoResult<()> {
        self.session.send_frame(frame)
    }

    fn receive_packet(&mut self) -> QiaoResult<Packet> {
        self.session.receive_packet()
    }

    fn extra_data(&self) -> &[u8] {
        &self.extra_data
    }

    fn frame_size(&self) -> u32 {
        self.session.frame_size()
    }

    fn flush(&mut self) {
        self.session.flush();
    }
}

#[cfg(test)]
mod tests;
