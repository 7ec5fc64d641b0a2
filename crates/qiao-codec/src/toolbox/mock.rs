//! 脚本化的内存工具箱.
//!
//! 行为近似真实 AAC/ALAC 转换器: 每次 `fill_complex_buffer` 拉取输入直到凑够
//! 一帧或输入结束, 然后产出一个包. 也可以按脚本注入异常行为 (多包、零包、
//! 越界包描述、错误码). 所有调用记录在共享状态中, 供测试在会话结束后检查.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{
    AudioConverter, AudioToolbox, FillOutput, FormatId, InputDataProc, OsStatus,
    PacketDescription, PropertyId, PropertyValue, StreamBasicDescription, ValueRange,
    VendorChannelLayout, VendorResult,
};

/// 单次 `fill_complex_buffer` 的脚本动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillStep {
    /// 按正常编码器行为拉取输入并产出包
    Encode,
    /// 不拉取输入, 直接报告若干个包
    Packets(u32),
    /// 产出一个起始偏移越界的包描述
    BadDescriptor,
    /// 返回错误码
    Fail(OsStatus),
}

/// 模拟工具箱配置
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// 每包采样帧数
    pub packet_frame_size: u32,
    /// 单包最大字节数
    pub max_packet_bytes: u32,
    /// 产出包的有效负载字节数
    pub packet_bytes: usize,
    /// 输出格式是否外部成帧 (产出包描述)
    pub externally_framed: bool,
    /// 外部成帧时包在输出缓冲区中的起始偏移
    pub desc_offset: u64,
    /// 压缩 magic cookie
    pub magic_cookie: Vec<u8>,
    /// 可用编码码率
    pub applicable_bit_rates: Vec<u32>,
    /// 未设置码率时报告的目标码率
    pub target_bit_rate: u32,
    /// 输入结束后还能排出的包数
    pub drain_packets: u32,
    /// 读写该属性时返回指定错误码
    pub failing_property: Option<(PropertyId, OsStatus)>,
    /// 创建转换器时返回指定错误码
    pub fail_new_converter: Option<OsStatus>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            packet_frame_size: 1024,
            max_packet_bytes: 1536,
            packet_bytes: 16,
            externally_framed: false,
            desc_offset: 0,
            magic_cookie: esds_cookie(&[0x11, 0x90]),
            applicable_bit_rates: vec![64_000, 96_000, 128_000, 192_000, 256_000],
            target_bit_rate: 128_000,
            drain_packets: 1,
            failing_property: None,
            fail_new_converter: None,
        }
    }
}

/// 模拟工具箱的调用记录
#[derive(Debug, Default)]
pub struct MockState {
    /// 按顺序写入的属性
    pub properties: Vec<(PropertyId, PropertyValue)>,
    /// 每次 fill 调用中各次输入回调交出的包数
    pub supplies: Vec<Vec<u32>>,
    /// 转换器收到的全部 PCM 数据
    pub consumed: Vec<u8>,
    /// fill 调用次数
    pub fill_calls: usize,
    /// 已创建的转换器数
    pub created: usize,
    /// 已释放的转换器数
    pub disposed: usize,
    /// 创建转换器时的输入描述
    pub input_desc: Option<StreamBasicDescription>,
    /// 创建转换器时的输出描述
    pub output_desc: Option<StreamBasicDescription>,
    /// 声道映射查询 (输入布局, 输出布局, 声道数)
    pub channel_map_queries: Vec<(VendorChannelLayout, VendorChannelLayout, u32)>,
    script: VecDeque<FillStep>,
    drained: u32,
    sequence: u8,
}

impl MockState {
    /// 最后一次写入的指定属性值
    pub fn last_property(&self, id: PropertyId) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .rev()
            .find(|(pid, _)| *pid == id)
            .map(|(_, value)| value)
    }
}

fn lock(state: &Mutex<MockState>) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// 把 ASC 包进最小的 ES 描述符, 构造 AAC magic cookie
pub fn esds_cookie(asc: &[u8]) -> Vec<u8> {
    let dsi_len = asc.len();
    let dcd_len = 13 + 2 + dsi_len;
    let es_len = 3 + 2 + dcd_len + 3;

    let mut cookie = Vec::with_capacity(2 + es_len);
    cookie.extend_from_slice(&[0x03, es_len as u8, 0x00, 0x00, 0x00]);
    cookie.extend_from_slice(&[0x04, dcd_len as u8, 0x40, 0x15, 0x00, 0x00, 0x00]);
    cookie.extend_from_slice(&[0x00, 0x01, 0xF4, 0x00, 0x00, 0x01, 0xF4, 0x00]);
    cookie.extend_from_slice(&[0x05, dsi_len as u8]);
    cookie.extend_from_slice(asc);
    cookie.extend_from_slice(&[0x06, 0x01, 0x02]);
    cookie
}

/// 模拟工具箱
pub struct MockToolbox {
    config: MockConfig,
    state: Arc<Mutex<MockState>>,
}

impl MockToolbox {
    /// 使用默认配置创建
    pub fn new() -> Self {
        Self::with_config(MockConfig::default())
    }

    /// 使用指定配置创建
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// 追加 fill 脚本, 脚本耗尽后按 `FillStep::Encode` 处理
    pub fn script(&self, steps: impl IntoIterator<Item = FillStep>) {
        lock(&self.state).script.extend(steps);
    }

    /// 调用记录
    pub fn state(&self) -> MutexGuard<'_, MockState> {
        lock(&self.state)
    }
}

impl Default for MockToolbox {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioToolbox for MockToolbox {
    fn new_converter(
        &self,
        input: &StreamBasicDescription,
        output: &StreamBasicDescription,
    ) -> VendorResult<Box<dyn AudioConverter>> {
        if let Some(status) = self.config.fail_new_converter {
            return Err(status);
        }
        let mut state = lock(&self.state);
        state.created += 1;
        state.input_desc = Some(*input);
        state.output_desc = Some(*output);
        Ok(Box::new(MockConverter {
            config: self.config.clone(),
            state: Arc::clone(&self.state),
            input: *input,
            output: *output,
        }))
    }

    fn format_info(&self, partial: &StreamBasicDescription) -> VendorResult<StreamBasicDescription> {
        let known = [
            FormatId::MPEG4_AAC,
            FormatId::MPEG4_AAC_HE,
            FormatId::APPLE_LOSSLESS,
        ];
        if !known.contains(&partial.format_id) {
            return Err(OsStatus::FORMAT_NOT_SUPPORTED);
        }
        Ok(StreamBasicDescription {
            frames_per_packet: self.config.packet_frame_size,
            ..*partial
        })
    }

    fn is_externally_framed(&self, _desc: &StreamBasicDescription) -> VendorResult<bool> {
        Ok(self.config.externally_framed)
    }

    fn channel_map(
        &self,
        input: &VendorChannelLayout,
        output: &VendorChannelLayout,
        channels: u32,
    ) -> VendorResult<Vec<i32>> {
        lock(&self.state)
            .channel_map_queries
            .push((*input, *output, channels));
        Ok((0..channels as i32).collect())
    }
}

/// 模拟转换器
struct MockConverter {
    config: MockConfig,
    state: Arc<Mutex<MockState>>,
    input: StreamBasicDescription,
    output: StreamBasicDescription,
}

impl MockConverter {
    fn check(&self, id: PropertyId) -> VendorResult<()> {
        match self.config.failing_property {
            Some((failing, status)) if failing == id => Err(status),
            _ => Ok(()),
        }
    }

    /// 在输出缓冲区写出一个包, 负载为递增的序号字节
    fn emit(&self, state: &mut MockState, output: &mut [u8], packets: u32) -> VendorResult<FillOutput> {
        let offset = if self.config.externally_framed {
            self.config.desc_offset as usize
        } else {
            0
        };
        let end = offset + self.config.packet_bytes;
        if end > output.len() {
            return Err(OsStatus(i32::from_be_bytes(*b"otsz")));
        }
        output[offset..end].fill(state.sequence);
        state.sequence = state.sequence.wrapping_add(1);

        let packet_desc = self.config.externally_framed.then_some(PacketDescription {
            start_offset: offset as u64,
            data_byte_size: self.config.packet_bytes as u32,
        });
        Ok(FillOutput {
            packets,
            bytes: end,
            packet_desc,
        })
    }
}

impl AudioConverter for MockConverter {
    fn set_property(&mut self, id: PropertyId, value: PropertyValue) -> VendorResult<()> {
        self.check(id)?;
        lock(&self.state).properties.push((id, value));
        Ok(())
    }

    fn get_u32(&mut self, id: PropertyId) -> VendorResult<u32> {
        self.check(id)?;
        match id {
            PropertyId::PACKET_FRAME_SIZE => Ok(self.config.packet_frame_size),
            PropertyId::MAXIMUM_PACKET_BYTE_SIZE => Ok(self.config.max_packet_bytes),
            PropertyId::CURRENT_TARGET_BIT_RATE => {
                let state = lock(&self.state);
                match state.last_property(PropertyId::ENCODE_BIT_RATE) {
                    Some(PropertyValue::U32(rate)) => Ok(*rate),
                    _ => Ok(self.config.target_bit_rate),
                }
            }
            _ => Err(OsStatus::PROPERTY_NOT_SUPPORTED),
        }
    }

    fn get_stream_description(&mut self, id: PropertyId) -> VendorResult<StreamBasicDescription> {
        self.check(id)?;
        match id {
            PropertyId::CURRENT_INPUT_STREAM_DESCRIPTION => Ok(self.input),
            PropertyId::CURRENT_OUTPUT_STREAM_DESCRIPTION => Ok(self.output),
            _ => Err(OsStatus::PROPERTY_NOT_SUPPORTED),
        }
    }

    fn magic_cookie(&mut self) -> VendorResult<Vec<u8>> {
        self.check(PropertyId::COMPRESSION_MAGIC_COOKIE)?;
        Ok(self.config.magic_cookie.clone())
    }

    fn applicable_bit_rates(&mut self) -> VendorResult<Vec<ValueRange>> {
        self.check(PropertyId::APPLICABLE_ENCODE_BIT_RATES)?;
        Ok(self
            .config
            .applicable_bit_rates
            .iter()
            .map(|&rate| ValueRange {
                minimum: f64::from(rate),
                maximum: f64::from(rate),
            })
            .collect())
    }

    fn fill_complex_buffer(
        &mut self,
        input: &mut dyn InputDataProc,
        output: &mut [u8],
    ) -> VendorResult<FillOutput> {
        let mut state = lock(&self.state);
        state.fill_calls += 1;
        let step = state.script.pop_front().unwrap_or(FillStep::Encode);

        match step {
            FillStep::Encode => {
                let mut supplies = Vec::new();
                let mut frames = 0u32;
                // 凑够一帧或输入结束为止, 上限防止输入端反复交出数据
                while frames < self.config.packet_frame_size && supplies.len() < 8 {
                    let chunk = input.supply();
                    supplies.push(chunk.packets);
                    if chunk.is_end() {
                        break;
                    }
                    frames += chunk.packets;
                    state.consumed.extend_from_slice(chunk.data);
                }
                state.supplies.push(supplies);

                if frames == 0 {
                    if state.drained >= self.config.drain_packets {
                        return Ok(FillOutput {
                            packets: 0,
                            bytes: 0,
                            packet_desc: None,
                        });
                    }
                    state.drained += 1;
                }
                self.emit(&mut state, output, 1)
            }
            FillStep::Packets(count) => self.emit(&mut state, output, count),
            FillStep::BadDescriptor => {
                let mut out = self.emit(&mut state, output, 1)?;
                out.packet_desc = Some(PacketDescription {
                    start_offset: output.len() as u64,
                    data_byte_size: self.config.packet_bytes as u32,
                });
                Ok(out)
            }
            FillStep::Fail(status) => Err(status),
        }
    }
}

impl Drop for MockConverter {
    fn drop(&mut self) {
        lock(&self.state).disposed += 1;
    }
}
