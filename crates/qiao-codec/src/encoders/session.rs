//! 基于厂商转换器的编码会话.
//!
//! 会话持有转换器实例, 负责:
//! - 由 PCM 参数构建输入/输出流描述并创建转换器
//! - 设置输出声道布局与声道映射
//! - 协商完成后查询帧长、最大包字节数、是否需要包描述
//! - 以拉取方式逐帧编码
//!
//! 状态机: `Idle → Converting → Draining → Done`.
//! 每次 `encode` 恰好调用一次 `fill_complex_buffer`, 输入回调第一次交出整帧,
//! 同一次调用中的后续回调报告输入结束, 这样短的末帧无需补齐即可编码.
//!
//! 会话同时承担编码器 `send_frame` / `receive_packet` 的包缓冲. 结束信号
//! 送达转换器之后会话不能重新开始, `Done` 状态只应答结束信号.

use std::sync::Arc;

use log::{debug, error, trace};
use qiao_core::{ChannelMask, QiaoError, QiaoResult, SampleFormat};

use crate::codec_parameters::AudioCodecParams;
use crate::encoders::channel_map::ChannelMapInfoFn;
use crate::frame::{AudioFrame, NOPTS_VALUE};
use crate::packet::Packet;
use crate::toolbox::{
    AudioConverter, AudioToolbox, FormatFlags, FormatId, InputChunk, InputDataProc, PropertyId,
    PropertyValue, StreamBasicDescription, VendorChannelLayout,
};

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// 尚未创建转换器
    Idle,
    /// 正常编码
    Converting,
    /// 已收到结束信号, 正在排出转换器缓存的包
    Draining,
    /// 转换器已排空或会话已关闭
    Done,
}

/// 由 PCM 参数构建转换器输入流描述
///
/// 只接受交错的 S16 / S32 / F32. S32 且声明了小于 32 的有效位深时,
/// 按高位对齐描述, 否则按紧凑排列描述.
pub fn input_description(audio: &AudioCodecParams) -> QiaoResult<StreamBasicDescription> {
    let format = audio.sample_format;
    let mut flags = FormatFlags::NATIVE_ENDIAN;
    match format {
        SampleFormat::S16 | SampleFormat::S32 => flags |= FormatFlags::SIGNED_INTEGER,
        SampleFormat::F32 => flags |= FormatFlags::FLOAT,
        other => {
            return Err(QiaoError::Unsupported(format!("不支持的采样格式: {}", other)));
        }
    }
    if audio.sample_rate == 0 {
        return Err(QiaoError::InvalidArgument("采样率不能为 0".into()));
    }
    let channels = audio.channel_layout.channels;
    if channels == 0 {
        return Err(QiaoError::InvalidArgument("声道数不能为 0".into()));
    }

    let bytes = format.bytes_per_sample();
    let raw_bits = audio.bits_per_raw_sample;
    if raw_bits > 8 * bytes {
        return Err(QiaoError::InvalidArgument(format!(
            "有效位深 {} 超过采样容器 {} 位",
            raw_bits,
            8 * bytes,
        )));
    }
    let bits_per_channel = if format != SampleFormat::S32 || raw_bits == 0 || raw_bits == 32 {
        flags |= FormatFlags::PACKED;
        8 * bytes
    } else {
        debug!("S32 高位对齐输入, 有效位深 {}", raw_bits);
        flags |= FormatFlags::ALIGNED_HIGH;
        raw_bits
    };

    Ok(StreamBasicDescription {
        sample_rate: f64::from(audio.sample_rate),
        format_id: FormatId::LINEAR_PCM,
        format_flags: flags,
        bytes_per_packet: channels * bytes,
        frames_per_packet: 1,
        bytes_per_frame: channels * bytes,
        channels_per_frame: channels,
        bits_per_channel,
    })
}

/// 构建转换器输出流描述, 除格式/采样率/声道数以外的字段由格式数据库补全
pub fn output_description(
    toolbox: &dyn AudioToolbox,
    format_id: FormatId,
    audio: &AudioCodecParams,
) -> QiaoResult<StreamBasicDescription> {
    let partial = StreamBasicDescription {
        sample_rate: f64::from(audio.sample_rate),
        format_id,
        channels_per_frame: audio.channel_layout.channels,
        ..StreamBasicDescription::default()
    };
    toolbox
        .format_info(&partial)
        .map_err(|status| status.into_error("format_info"))
}

fn dump_description(header: &str, desc: &StreamBasicDescription) {
    debug!(
        "{}: rate={}, format={}, flags=0x{:X}, bytes/packet={}, frames/packet={}, bytes/frame={}, channels={}, bits={}",
        header,
        desc.sample_rate,
        desc.format_id,
        desc.format_flags.bits(),
        desc.bytes_per_packet,
        desc.frames_per_packet,
        desc.bytes_per_frame,
        desc.channels_per_frame,
        desc.bits_per_channel,
    );
}

/// 输入回调的帧状态
enum PullState<'a> {
    /// 帧尚未交出
    Pending(&'a [u8]),
    /// 帧已交出, 后续回调报告输入结束
    Consumed,
    /// 结束信号, 每次回调都报告输入结束
    EndOfStream,
}

/// 单次 `encode` 的输入回调
struct FramePull<'a> {
    state: PullState<'a>,
    frames: u32,
}

impl<'a> FramePull<'a> {
    fn frame(data: &'a [u8], frames: u32) -> Self {
        Self {
            state: PullState::Pending(data),
            frames,
        }
    }

    fn end_of_stream() -> Self {
        Self {
            state: PullState::EndOfStream,
            frames: 0,
        }
    }
}

impl InputDataProc for FramePull<'_> {
    fn supply(&mut self) -> InputChunk<'_> {
        match self.state {
            PullState::Pending(data) => {
                self.state = PullState::Consumed;
                InputChunk {
                    data,
                    packets: self.frames,
                }
            }
            PullState::Consumed => {
                trace!("本帧已交出, 报告输入结束");
                InputChunk::END_OF_INPUT
            }
            PullState::EndOfStream => InputChunk::END_OF_INPUT,
        }
    }
}

/// 编码会话
pub struct EncodeSession {
    /// 厂商工具箱句柄
    toolbox: Arc<dyn AudioToolbox>,
    /// 转换器实例, 关闭后为 None
    converter: Option<Box<dyn AudioConverter>>,
    /// 输入声道位掩码
    channel_mask: ChannelMask,
    /// 声道数
    channels: u32,
    /// 输入采样格式
    sample_format: SampleFormat,
    /// 输入采样率
    sample_rate: u32,
    /// 每个输入采样的字节数
    in_bytes_per_sample: u32,
    /// 每个输入包 (一个采样帧, 所有声道) 的字节数
    in_bytes_per_packet: u32,
    /// 输出缓冲区大小 (单包最大字节数)
    output_buffer_bytes: usize,
    /// 是否按包描述截取输出
    use_packet_desc: bool,
    /// 每包采样帧数
    frame_size: u32,
    /// 会话状态
    state: SessionState,
    /// 待取出的压缩包
    pending: Option<Packet>,
    /// 是否已收到结束信号
    end_signalled: bool,
}

impl EncodeSession {
    /// 创建空闲会话
    pub fn new(toolbox: Arc<dyn AudioToolbox>) -> Self {
        Self {
            toolbox,
            converter: None,
            channel_mask: ChannelMask::empty(),
            channels: 0,
            sample_format: SampleFormat::None,
            sample_rate: 0,
            in_bytes_per_sample: 0,
            in_bytes_per_packet: 0,
            output_buffer_bytes: 0,
            use_packet_desc: false,
            frame_size: 0,
            state: SessionState::Idle,
            pending: None,
            end_signalled: false,
        }
    }

    /// 构建流描述并创建转换器 (Idle → Converting)
    pub fn open(&mut self, audio: &AudioCodecParams, format_id: FormatId) -> QiaoResult<()> {
        if self.state != SessionState::Idle {
            return Err(QiaoError::Codec("编码会话已打开".into()));
        }

        let input = input_description(audio)?;
        let output = output_description(self.toolbox.as_ref(), format_id, audio)?;
        dump_description("输入流描述", &input);
        dump_description("输出流描述 (格式数据库)", &output);

        let mut converter = self
            .toolbox
            .new_converter(&input, &output)
            .map_err(|status| status.into_error("new_converter"))?;

        let mask = audio.channel_layout.mask;
        converter
            .set_property(
                PropertyId::INPUT_CHANNEL_LAYOUT,
                PropertyValue::ChannelLayout(VendorChannelLayout::from_bitmap(mask)),
            )
            .map_err(|status| status.into_error("set_property(input_channel_layout)"))?;

        self.converter = Some(converter);
        self.channel_mask = mask;
        self.channels = audio.channel_layout.channels;
        self.sample_format = audio.sample_format;
        self.sample_rate = audio.sample_rate;
        self.in_bytes_per_sample = audio.sample_format.bytes_per_sample();
        self.in_bytes_per_packet = input.bytes_per_packet;
        self.state = SessionState::Converting;
        debug!(
            "编码会话已创建: {} 声道, 每输入包 {} 字节",
            self.channels, self.in_bytes_per_packet
        );
        Ok(())
    }

    fn converter(&mut self) -> QiaoResult<&mut dyn AudioConverter> {
        match self.converter.as_deref_mut() {
            Some(converter) => Ok(converter),
            None => Err(QiaoError::Codec("编码会话未打开".into())),
        }
    }

    /// 写入转换器属性
    pub fn set_property(&mut self, id: PropertyId, value: PropertyValue) -> QiaoResult<()> {
        trace!("设置属性 {}: {:?}", id, value);
        self.converter()?
            .set_property(id, value)
            .map_err(|status| status.into_error("set_property"))
    }

    /// 写入 32 位整数属性
    pub fn set_u32(&mut self, id: PropertyId, value: u32) -> QiaoResult<()> {
        self.set_property(id, PropertyValue::U32(value))
    }

    /// 读取 32 位整数属性
    pub fn get_u32(&mut self, id: PropertyId) -> QiaoResult<u32> {
        self.converter()?
            .get_u32(id)
            .map_err(|status| status.into_error("get_u32"))
    }

    /// 读取流描述属性
    pub fn get_stream_description(&mut self, id: PropertyId) -> QiaoResult<StreamBasicDescription> {
        self.converter()?
            .get_stream_description(id)
            .map_err(|status| status.into_error("get_stream_description"))
    }

    /// 读取压缩 magic cookie
    pub fn magic_cookie(&mut self) -> QiaoResult<Vec<u8>> {
        self.converter()?
            .magic_cookie()
            .map_err(|status| status.into_error("magic_cookie"))
    }

    /// 设置输出声道布局与声道映射
    ///
    /// 解析函数没有给出显式映射时, 用规范位掩码向格式数据库查询.
    pub fn setup_output_channels(&mut self, resolve: ChannelMapInfoFn) -> QiaoResult<()> {
        let resolved = resolve(self.channel_mask)?;
        self.set_property(
            PropertyId::OUTPUT_CHANNEL_LAYOUT,
            PropertyValue::ChannelLayout(VendorChannelLayout::from_tag(resolved.tag)),
        )?;

        let channels = self.channels as usize;
        let map = match resolved.explicit_map {
            Some(map) => map.iter().take(channels).copied().collect::<Vec<_>>(),
            None => self
                .toolbox
                .channel_map(
                    &VendorChannelLayout::from_bitmap(resolved.canonical_mask),
                    &VendorChannelLayout::from_tag(resolved.tag),
                    self.channels,
                )
                .map_err(|status| status.into_error("channel_map"))?,
        };
        if map.len() != channels {
            return Err(QiaoError::ContractViolation(format!(
                "声道映射有 {} 项, 应为 {}",
                map.len(),
                channels,
            )));
        }

        debug!("设置声道映射: {:?}", map);
        self.set_property(PropertyId::CHANNEL_MAP, PropertyValue::ChannelMap(map))
    }

    /// 检查码率是否在转换器当前可用的码率列表中
    pub fn check_bitrate(&mut self, bitrate: u32) -> QiaoResult<()> {
        let rates = self
            .converter()?
            .applicable_bit_rates()
            .map_err(|status| status.into_error("applicable_bit_rates"))?;
        debug!("检查码率: {}", bitrate);

        if rates.is_empty() {
            return Err(QiaoError::InvalidArgument(
                "当前设置下没有可用码率, 请尝试更换码率控制模式".into(),
            ));
        }
        let valid: Vec<u32> = rates.iter().map(|range| range.minimum as u32).collect();
        if valid.contains(&bitrate) {
            return Ok(());
        }

        let list = valid
            .iter()
            .map(|rate| format!("{}k", rate / 1000))
            .collect::<Vec<_>>()
            .join(",");
        Err(QiaoError::InvalidArgument(format!(
            "不支持的码率 {}, 可用码率: {}",
            bitrate, list,
        )))
    }

    /// 协商完成后查询帧长、单包最大字节数、是否需要包描述
    pub fn postinit(&mut self) -> QiaoResult<()> {
        self.frame_size = self.get_u32(PropertyId::PACKET_FRAME_SIZE)?;
        debug!("每包采样帧数: {}", self.frame_size);

        let max_bytes = self.get_u32(PropertyId::MAXIMUM_PACKET_BYTE_SIZE)?;
        if max_bytes == 0 || self.frame_size == 0 {
            return Err(QiaoError::ContractViolation(format!(
                "转换器报告的帧长 {} / 最大包字节数 {} 无效",
                self.frame_size, max_bytes,
            )));
        }
        self.output_buffer_bytes = max_bytes as usize;
        debug!("输出缓冲区: {} 字节", self.output_buffer_bytes);

        let output = self.get_stream_description(PropertyId::CURRENT_OUTPUT_STREAM_DESCRIPTION)?;
        dump_description("输出流描述 (协商后)", &output);
        self.use_packet_desc = self
            .toolbox
            .is_externally_framed(&output)
            .map_err(|status| status.into_error("is_externally_framed"))?;
        debug!("使用包描述: {}", self.use_packet_desc);
        Ok(())
    }

    /// 编码一帧交错 PCM, `None` 表示结束信号
    ///
    /// # 返回
    /// - `Ok(Some(data))`: 一个压缩包
    /// - `Ok(None)`: 转换器已排空
    pub fn encode(&mut self, frame: Option<&[u8]>) -> QiaoResult<Option<Vec<u8>>> {
        let mut pull = match frame {
            Some(data) => {
                self.check_accepts_frame()?;
                FramePull::frame(data, self.frames_in(data)?)
            }
            None => match self.state {
                SessionState::Idle => return Err(QiaoError::Codec("编码会话未打开".into())),
                SessionState::Done => return Ok(None),
                SessionState::Converting => {
                    debug!("收到结束信号, 开始排空转换器");
                    self.state = SessionState::Draining;
                    FramePull::end_of_stream()
                }
                SessionState::Draining => FramePull::end_of_stream(),
            },
        };

        let mut output = Vec::new();
        output
            .try_reserve_exact(self.output_buffer_bytes)
            .map_err(|e| {
                QiaoError::OutOfMemory(format!("输出缓冲区 {} 字节: {}", self.output_buffer_bytes, e))
            })?;
        output.resize(self.output_buffer_bytes, 0);
        let filled = self
            .converter()?
            .fill_complex_buffer(&mut pull, &mut output)
            .map_err(|status| status.into_error("fill_complex_buffer"))?;

        match (self.state, filled.packets) {
            (_, 1) => {}
            (SessionState::Draining, 0) => {
                debug!("转换器已排空");
                self.state = SessionState::Done;
                return Ok(None);
            }
            (_, packets) => {
                error!("fill_complex_buffer 产出 {} 个包, 应为 1", packets);
                return Err(QiaoError::ContractViolation(format!(
                    "单次调用产出 {} 个包, 应为 1",
                    packets,
                )));
            }
        }

        if filled.bytes > output.len() {
            return Err(QiaoError::ContractViolation(format!(
                "转换器报告写出 {} 字节, 超过缓冲区 {} 字节",
                filled.bytes,
                output.len(),
            )));
        }
        if self.use_packet_desc {
            let desc = filled.packet_desc.ok_or_else(|| {
                QiaoError::ContractViolation("外部成帧格式缺少包描述".into())
            })?;
            let start = usize::try_from(desc.start_offset).unwrap_or(usize::MAX);
            let end = start.saturating_add(desc.data_byte_size as usize);
            if end > output.len() {
                return Err(QiaoError::ContractViolation(format!(
                    "包描述 [{}, +{}) 超出缓冲区 {} 字节",
                    desc.start_offset,
                    desc.data_byte_size,
                    output.len(),
                )));
            }
            output.copy_within(start..end, 0);
            output.truncate(end - start);
        } else {
            output.truncate(filled.bytes);
        }

        trace!("产出压缩包: {} 字节", output.len());
        Ok(Some(output))
    }

    /// 编码一个音频帧, 产出的包沿用帧的时间戳
    pub fn encode_frame(&mut self, frame: &AudioFrame) -> QiaoResult<Option<Packet>> {
        self.check_accepts_frame()?;
        if frame.sample_format != self.sample_format
            || frame.channel_layout.channels != self.channels
            || frame.sample_rate != self.sample_rate
        {
            return Err(QiaoError::InvalidArgument(format!(
                "帧参数 ({}, {} 声道, {} Hz) 与编码器 ({}, {} 声道, {} Hz) 不一致",
                frame.sample_format,
                frame.channel_layout.channels,
                frame.sample_rate,
                self.sample_format,
                self.channels,
                self.sample_rate,
            )));
        }
        let len = frame.byte_len();
        let data = frame.data.get(..len).ok_or_else(|| {
            QiaoError::InvalidArgument(format!(
                "帧数据 {} 字节, 少于 {} 个采样帧所需的 {} 字节",
                frame.data.len(),
                frame.nb_samples,
                len,
            ))
        })?;
        Ok(self.encode(Some(data))?.map(|bytes| self.packet(bytes, frame.pts)))
    }

    /// 结束信号之后排出一个缓存的包, 排空后返回 None
    pub fn drain(&mut self) -> QiaoResult<Option<Packet>> {
        Ok(self.encode(None)?.map(|bytes| self.packet(bytes, NOPTS_VALUE)))
    }

    /// 送入一帧, `None` 表示结束信号
    ///
    /// 上一个包尚未取出时返回 `NeedMoreData`.
    pub fn send_frame(&mut self, frame: Option<&AudioFrame>) -> QiaoResult<()> {
        if self.pending.is_some() {
            return Err(QiaoError::NeedMoreData);
        }
        match frame {
            Some(_) if self.end_signalled => {
                Err(QiaoError::InvalidArgument("结束信号之后不能再送入帧".into()))
            }
            Some(frame) => {
                self.pending = self.encode_frame(frame)?;
                Ok(())
            }
            None => {
                self.end_signalled = true;
                Ok(())
            }
        }
    }

    /// 取出一个压缩包
    ///
    /// 收到结束信号后逐个排出转换器缓存的包, 排空后返回 `Eof`.
    pub fn receive_packet(&mut self) -> QiaoResult<Packet> {
        if let Some(pkt) = self.pending.take() {
            return Ok(pkt);
        }
        if self.end_signalled {
            return self.drain()?.ok_or(QiaoError::Eof);
        }
        Err(QiaoError::NeedMoreData)
    }

    /// 丢弃待取出的包
    ///
    /// 结束信号尚未送达转换器时撤销它; 转换器开始排空之后保持结束状态.
    pub fn flush(&mut self) {
        self.pending = None;
        if self.state == SessionState::Converting {
            self.end_signalled = false;
        } else if self.end_signalled {
            debug!("转换器已收到结束信号, 不能重新开始编码");
        }
    }

    /// 检查当前状态能否接收新帧
    fn check_accepts_frame(&self) -> QiaoResult<()> {
        match self.state {
            SessionState::Converting => Ok(()),
            SessionState::Idle => Err(QiaoError::Codec("编码会话未打开".into())),
            SessionState::Draining => {
                Err(QiaoError::InvalidArgument("结束信号之后不能再送入数据".into()))
            }
            SessionState::Done if self.converter.is_none() => {
                Err(QiaoError::Codec("编码会话已关闭".into()))
            }
            SessionState::Done => Err(QiaoError::InvalidArgument(
                "转换器已排空, 不能再送入数据".into(),
            )),
        }
    }

    fn packet(&self, bytes: Vec<u8>, pts: i64) -> Packet {
        let mut pkt = Packet::from_data(bytes);
        pkt.pts = pts;
        pkt.duration = i64::from(self.frame_size);
        pkt
    }

    /// 校验帧数据长度并换算为采样帧数
    fn frames_in(&self, data: &[u8]) -> QiaoResult<u32> {
        let bytes_per_packet = self.in_bytes_per_packet as usize;
        if data.is_empty() || data.len() % bytes_per_packet != 0 {
            return Err(QiaoError::InvalidArgument(format!(
                "帧数据 {} 字节不是 {} 字节采样帧的整数倍",
                data.len(),
                bytes_per_packet,
            )));
        }
        let frames = data.len() / bytes_per_packet;
        if frames > self.frame_size as usize {
            return Err(QiaoError::InvalidArgument(format!(
                "帧包含 {} 个采样帧, 超过每包 {} 帧",
                frames, self.frame_size,
            )));
        }
        Ok(frames as u32)
    }

    /// 释放转换器, 之后送入的帧返回 `Codec` 错误
    pub fn close(&mut self) {
        if self.converter.take().is_some() {
            debug!("转换器已释放");
        }
        self.pending = None;
        self.state = SessionState::Done;
    }

    /// 当前状态
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// 每包采样帧数 (postinit 之后有效)
    pub fn frame_size(&self) -> u32 {
        self.frame_size
    }

    /// 单包最大字节数 (postinit 之后有效)
    pub fn output_buffer_bytes(&self) -> usize {
        self.output_buffer_bytes
    }

    /// 是否按包描述截取输出
    pub fn use_packet_desc(&self) -> bool {
        self.use_packet_desc
    }

    /// 每个输入采样的字节数
    pub fn in_bytes_per_sample(&self) -> u32 {
        self.in_bytes_per_sample
    }

    /// 每个输入包的字节数
    pub fn in_bytes_per_packet(&self) -> u32 {
        self.in_bytes_per_packet
    }
}

#[cfg(test)]
mod tests {
    use qiao_core::ChannelLayout;

    use super::*;

    fn audio(sample_format: SampleFormat, bits_per_raw_sample: u32) -> AudioCodecParams {
        AudioCodecParams {
            sample_rate: 48000,
            channel_layout: ChannelLayout::STEREO,
            sample_format,
            frame_size: 0,
            bits_per_raw_sample,
        }
    }

    #[test]
    fn test_input_description_s16() {
        let desc = input_description(&audio(SampleFormat::S16, 0)).unwrap();
        assert_eq!(desc.format_id, FormatId::LINEAR_PCM);
        assert_eq!(
            desc.format_flags,
            FormatFlags::NATIVE_ENDIAN | FormatFlags::SIGNED_INTEGER | FormatFlags::PACKED
        );
        assert_eq!(desc.bits_per_channel, 16);
        assert_eq!(desc.bytes_per_packet, 4);
        assert_eq!(desc.bytes_per_frame, 4);
        assert_eq!(desc.frames_per_packet, 1);
        assert_eq!(desc.channels_per_frame, 2);
    }

    #[test]
    fn test_input_description_s32_aligned_high() {
        let desc = input_description(&audio(SampleFormat::S32, 24)).unwrap();
        assert!(desc.format_flags.contains(FormatFlags::ALIGNED_HIGH));
        assert!(!desc.format_flags.contains(FormatFlags::PACKED));
        assert_eq!(desc.bits_per_channel, 24);
        assert_eq!(desc.bytes_per_packet, 8);

        let full = input_description(&audio(SampleFormat::S32, 32)).unwrap();
        assert!(full.format_flags.contains(FormatFlags::PACKED));
        assert_eq!(full.bits_per_channel, 32);
    }

    #[test]
    fn test_input_description_float() {
        // 浮点输入忽略有效位深
        let desc = input_description(&audio(SampleFormat::F32, 24)).unwrap();
        assert!(desc.format_flags.contains(FormatFlags::FLOAT | FormatFlags::PACKED));
        assert!(!desc.format_flags.contains(FormatFlags::SIGNED_INTEGER));
        assert_eq!(desc.bits_per_channel, 32);
    }

    #[test]
    fn test_input_description_rejects_other_formats() {
        for format in [SampleFormat::U8, SampleFormat::S16p, SampleFormat::F32p] {
            assert!(matches!(
                input_description(&audio(format, 0)),
                Err(QiaoError::Unsupported(_))
            ));
        }
        let mut bad = audio(SampleFormat::S16, 0);
        bad.sample_rate = 0;
        assert!(matches!(
            input_description(&bad),
            Err(QiaoError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_frame_pull_second_supply_is_end() {
        let data = [0u8; 16];
        let mut pull = FramePull::frame(&data, 4);
        let first = pull.supply();
        assert_eq!(first.packets, 4);
        assert_eq!(first.data.len(), 16);
        let second = pull.supply();
        assert!(second.is_end());
        assert!(second.data.is_empty());
        assert!(pull.supply().is_end());

        let mut eos = FramePull::end_of_stream();
        assert!(eos.supply().is_end());
    }
}
