//! 基于厂商转换器的 ALAC 编码器.
//!
//! 编码参数固定为最高质量, 位深提示取自转换器协商后的输入描述.
//! 需要全局头时, 从 magic cookie 中取出 ALACSpecificConfig (以及可选的 `chan` 原子),
//! 拼成容器使用的 `alac` 原子作为 extra data.

use std::sync::Arc;

use log::{debug, error};
use qiao_core::{QiaoError, QiaoResult};

use crate::codec_id::CodecId;
use crate::codec_parameters::{AudioCodecParams, CodecFlags, CodecParameters, CodecParamsType};
use crate::encoder::Encoder;
use crate::encoders::channel_map::alac_channel_map_info;
use crate::encoders::session::EncodeSession;
use crate::frame::AudioFrame;
use crate::packet::Packet;
use crate::toolbox::types::CODEC_QUALITY_MAX;
use crate::toolbox::{AudioToolbox, FormatId, PropertyId};

/// 厂商 ALAC 编码器支持的采样率
pub const SUPPORTED_SAMPLE_RATES: [u32; 11] = [
    96000, 88200, 48000, 44100, 32000, 24000, 22050, 16000, 12000, 11025, 8000,
];

/// ALACSpecificConfig 与 `chan` 原子的长度
const ALAC_CONFIG_BYTES: usize = 24;
/// `alac` 原子头 (size + type + version/flags)
const ALAC_ATOM_HEADER_BYTES: usize = 12;
/// 原子头中记录的大小, 不含 `chan` 原子
const ALAC_ATOM_SIZE: u32 = 36;

/// 由 ALAC magic cookie 构建 extra data
///
/// cookie 可能以 24 字节的 `frma`/`alac` 包装开头, 之后是 24 字节的
/// ALACSpecificConfig, 再之后可能跟一个 24 字节的 `chan` 原子.
/// 输出为 `[size=36][alac][0000] + config [+ chan]`.
pub fn alac_extra_data(cookie: &[u8]) -> QiaoResult<Vec<u8>> {
    let mut rest = cookie;
    if rest.len() >= ALAC_CONFIG_BYTES && &rest[4..12] == b"frmaalac" {
        rest = &rest[ALAC_CONFIG_BYTES..];
    }

    let Some((config, rest)) = rest.split_at_checked(ALAC_CONFIG_BYTES) else {
        return Err(QiaoError::MalformedConfig(format!(
            "ALAC magic cookie 只有 {} 字节, 缺少 ALACSpecificConfig",
            cookie.len()
        )));
    };

    let mut extra = Vec::with_capacity(ALAC_ATOM_HEADER_BYTES + 2 * ALAC_CONFIG_BYTES);
    extra.extend_from_slice(&ALAC_ATOM_SIZE.to_be_bytes());
    extra.extend_from_slice(b"alac");
    extra.extend_from_slice(&[0; 4]);
    extra.extend_from_slice(config);

    if let Some(chan) = rest
        .get(..ALAC_CONFIG_BYTES)
        .filter(|atom| &atom[4..8] == b"chan")
    {
        extra.extend_from_slice(chan);
    }
    Ok(extra)
}

/// ALAC 编码器
pub struct AlacEncoder {
    /// 编码会话
    session: EncodeSession,
    /// 带外 `alac` 原子
    extra_data: Vec<u8>,
}

impl AlacEncoder {
    /// 创建编码器
    pub fn new(toolbox: Arc<dyn AudioToolbox>) -> Self {
        Self {
            session: EncodeSession::new(toolbox),
            extra_data: Vec::new(),
        }
    }

    /// 创建 ALAC 编码器实例 (注册表工厂)
    pub fn create(toolbox: Arc<dyn AudioToolbox>) -> QiaoResult<Box<dyn Encoder>> {
        Ok(Box::new(Self::new(toolbox)))
    }

    fn configure(&mut self, params: &mut CodecParameters, audio: &AudioCodecParams) -> QiaoResult<()> {
        let session = &mut self.session;
        session.open(audio, FormatId::APPLE_LOSSLESS)?;
        session.setup_output_channels(alac_channel_map_info)?;
        session.set_u32(PropertyId::CODEC_QUALITY, CODEC_QUALITY_MAX)?;

        let input = session.get_stream_description(PropertyId::CURRENT_INPUT_STREAM_DESCRIPTION)?;
        session.set_u32(PropertyId::BIT_DEPTH_HINT, input.bits_per_channel)?;
        session.postinit()?;
        if let CodecParamsType::Audio(a) = &mut params.params {
            a.frame_size = session.frame_size();
        }

        if params.flags.contains(CodecFlags::GLOBAL_HEADER) {
            let cookie = session.magic_cookie()?;
            let extra = alac_extra_data(&cookie)?;
            debug!("ALAC extra data: {} 字节", extra.len());
            params.extra_data = extra.clone();
            self.extra_data = extra;
        }
        Ok(())
    }
}

impl Encoder for AlacEncoder {
    fn codec_id(&self) -> CodecId {
        CodecId::Alac
    }

    fn name(&self) -> &str {
        "appleca_alac"
    }

    fn open(&mut self, params: &mut CodecParameters) -> QiaoResult<()> {
        let audio = params
            .audio_params()
            .cloned()
            .ok_or_else(|| QiaoError::InvalidArgument("ALAC 编码器需要音频参数".into()))?;
        if !SUPPORTED_SAMPLE_RATES.contains(&audio.sample_rate) {
            return Err(QiaoError::InvalidArgument(format!(
                "ALAC 不支持的采样率: {}",
                audio.sample_rate
            )));
        }

        let result = self.configure(params, &audio);
        if let Err(e) = &result {
            error!("ALAC 编码器初始化失败: {}", e);
            self.session.close();
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
