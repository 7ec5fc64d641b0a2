//! 厂商音频工具箱抽象.
//!
//! 厂商库提供两类能力: 格式数据库 (补全流描述、查询声道映射等) 与
//! 有状态的音频转换器. 二者都以 trait 表达, 由调用方注入具体实现;
//! 本 crate 不负责加载厂商动态库.
//!
//! 转换器以拉取方式工作: `fill_complex_buffer` 在一次调用中可能多次回调
//! `InputDataProc::supply` 索取输入, 直到凑够一个包或输入端报告结束.

use std::fmt;

use log::error;
use qiao_core::QiaoError;

pub mod types;

#[cfg(any(test, feature = "mock-toolbox"))]
pub mod mock;

pub use types::{
    ChannelLayoutTag, FormatFlags, FormatId, PacketDescription, PropertyId, PropertyValue,
    StreamBasicDescription, ValueRange, VendorChannelLayout,
};

/// 厂商状态码, 0 表示成功
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OsStatus(pub i32);

impl OsStatus {
    /// 转换器不支持该格式 ('fmt?')
    pub const FORMAT_NOT_SUPPORTED: Self = Self(i32::from_be_bytes(*b"fmt?"));
    /// 不支持的属性 ('prop')
    pub const PROPERTY_NOT_SUPPORTED: Self = Self(i32::from_be_bytes(*b"prop"));
    /// 未指明的错误 ('what')
    pub const UNSPECIFIED: Self = Self(i32::from_be_bytes(*b"what"));

    /// 包装为统一错误, 并记录失败的调用
    pub fn into_error(self, call: &'static str) -> QiaoError {
        error!("厂商调用 {} 失败: {}", call, self);
        QiaoError::External {
            call,
            code: self.to_string(),
        }
    }
}

impl fmt::Display for OsStatus {
    /// 四个字节都可打印时显示为四字符码, 否则显示十六进制
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match types::fourcc_text(self.0 as u32) {
            Some(text) => write!(f, "{text}"),
            None => write!(f, "0x{:08X}", self.0 as u32),
        }
    }
}

/// 厂商调用结果
pub type VendorResult<T> = Result<T, OsStatus>;

/// 一次输入回调交出的数据
#[derive(Debug, Clone, Copy)]
pub struct InputChunk<'a> {
    /// 交错 PCM 数据, 输入结束时为空
    pub data: &'a [u8],
    /// 数据包含的输入包 (采样帧) 数, 输入结束时为 0
    pub packets: u32,
}

impl InputChunk<'static> {
    /// 输入结束标记
    pub const END_OF_INPUT: Self = Self {
        data: &[],
        packets: 0,
    };
}

impl InputChunk<'_> {
    /// 是否为输入结束
    pub fn is_end(&self) -> bool {
        self.packets == 0
    }
}

/// 转换器索取输入时的回调
pub trait InputDataProc {
    /// 交出下一段输入
    ///
    /// 返回的切片在下一次调用前保持有效, 转换器需在此期间复制数据.
    fn supply(&mut self) -> InputChunk<'_>;
}

/// 一次 `fill_complex_buffer` 的产出
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillOutput {
    /// 产出的包数
    pub packets: u32,
    /// 写入输出缓冲区的字节数
    pub bytes: usize,
    /// 首个包的描述 (外部成帧格式才有)
    pub packet_desc: Option<PacketDescription>,
}

/// 厂商音频转换器
///
/// 丢弃即释放厂商资源.
pub trait AudioConverter: Send {
    /// 写入属性
    fn set_property(&mut self, id: PropertyId, value: PropertyValue) -> VendorResult<()>;

    /// 读取 32 位整数属性
    fn get_u32(&mut self, id: PropertyId) -> VendorResult<u32>;

    /// 读取流描述属性
    fn get_stream_description(&mut self, id: PropertyId) -> VendorResult<StreamBasicDescription>;

    /// 读取压缩 magic cookie
    fn magic_cookie(&mut self) -> VendorResult<Vec<u8>>;

    /// 当前设置下可用的编码码率
    fn applicable_bit_rates(&mut self) -> VendorResult<Vec<ValueRange>>;

    /// 拉取输入并向 `output` 写出压缩数据
    fn fill_complex_buffer(
        &mut self,
        input: &mut dyn InputDataProc,
        output: &mut [u8],
    ) -> VendorResult<FillOutput>;
}

/// 厂商工具箱句柄 (转换器工厂 + 格式数据库)
pub trait AudioToolbox: Send + Sync {
    /// 创建转换器
    fn new_converter(
        &self,
        input: &StreamBasicDescription,
        output: &StreamBasicDescription,
    ) -> VendorResult<Box<dyn AudioConverter>>;

    /// 补全只给出格式/采样率/声道数的流描述
    fn format_info(&self, partial: &StreamBasicDescription) -> VendorResult<StreamBasicDescription>;

    /// 该格式的包是否需要外部包描述来定位
    fn is_externally_framed(&self, desc: &StreamBasicDescription) -> VendorResult<bool>;

    /// 查询从 `input` 布局到 `output` 布局的声道映射
    fn channel_map(
        &self,
        input: &VendorChannelLayout,
        output: &VendorChannelLayout,
        channels: u32,
    ) -> VendorResult<Vec<i32>>;
}
