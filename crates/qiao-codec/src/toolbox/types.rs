//! 厂商工具箱的数据类型与常量.
//!
//! 四字符码 (fourcc) 与数值均与厂商头文件保持一致, 便于直接传递给真实实现.

use std::fmt;

use bitflags::bitflags;
use qiao_core::ChannelMask;

/// 把 4 个 ASCII 字节按大端拼成四字符码
pub const fn fourcc(code: &[u8; 4]) -> u32 {
    u32::from_be_bytes(*code)
}

/// 把四字符码写成可读文本, 含不可打印字节时返回 None
pub(crate) fn fourcc_text(code: u32) -> Option<String> {
    let bytes = code.to_be_bytes();
    if bytes.iter().all(|b| (0x20..=0x7E).contains(b)) {
        Some(bytes.iter().map(|&b| char::from(b)).collect())
    } else {
        None
    }
}

/// 流格式标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FormatId(pub u32);

impl FormatId {
    /// 线性 PCM
    pub const LINEAR_PCM: Self = Self(fourcc(b"lpcm"));
    /// MPEG-4 AAC (LC)
    pub const MPEG4_AAC: Self = Self(fourcc(b"aac "));
    /// MPEG-4 HE-AAC
    pub const MPEG4_AAC_HE: Self = Self(fourcc(b"aach"));
    /// Apple Lossless
    pub const APPLE_LOSSLESS: Self = Self(fourcc(b"alac"));
}

impl fmt::Display for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match fourcc_text(self.0) {
            Some(text) => write!(f, "'{text}'"),
            None => write!(f, "0x{:08X}", self.0),
        }
    }
}

bitflags! {
    /// 线性 PCM 格式标志
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FormatFlags: u32 {
        /// 浮点采样
        const FLOAT           = 1 << 0;
        /// 大端字节序
        const BIG_ENDIAN      = 1 << 1;
        /// 有符号整数采样
        const SIGNED_INTEGER  = 1 << 2;
        /// 采样占满所有位
        const PACKED          = 1 << 3;
        /// 未占满时有效位靠高位对齐
        const ALIGNED_HIGH    = 1 << 4;
        /// 平面 (非交错) 排列
        const NON_INTERLEAVED = 1 << 5;
    }
}

impl FormatFlags {
    /// 本机字节序标志
    #[cfg(target_endian = "big")]
    pub const NATIVE_ENDIAN: Self = Self::BIG_ENDIAN;
    /// 本机字节序标志
    #[cfg(target_endian = "little")]
    pub const NATIVE_ENDIAN: Self = Self::empty();
}

/// 流基本描述
///
/// 输入端由会话完整构建; 输出端只给出格式/采样率/声道数,
/// 其余字段由格式数据库补全.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StreamBasicDescription {
    /// 采样率 (Hz)
    pub sample_rate: f64,
    /// 格式标识
    pub format_id: FormatId,
    /// 格式标志
    pub format_flags: FormatFlags,
    /// 每个包的字节数 (可变时为 0)
    pub bytes_per_packet: u32,
    /// 每个包的帧数
    pub frames_per_packet: u32,
    /// 每帧字节数
    pub bytes_per_frame: u32,
    /// 每帧声道数
    pub channels_per_frame: u32,
    /// 每声道位数
    pub bits_per_channel: u32,
}

/// 声道布局标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelLayoutTag(pub u32);

impl ChannelLayoutTag {
    /// 由随附的声道位图描述布局
    pub const USE_CHANNEL_BITMAP: Self = Self(1 << 16);
    pub const MONO: Self = Self((100 << 16) | 1);
    pub const STEREO: Self = Self((101 << 16) | 2);
    pub const QUADRAPHONIC: Self = Self((108 << 16) | 4);
    pub const MPEG_3_0_B: Self = Self((114 << 16) | 3);
    pub const MPEG_4_0_B: Self = Self((116 << 16) | 4);
    pub const MPEG_5_0_D: Self = Self((120 << 16) | 5);
    pub const MPEG_5_1_D: Self = Self((124 << 16) | 6);
    pub const MPEG_7_1_B: Self = Self((127 << 16) | 8);
    pub const AAC_3_0: Self = Self::MPEG_3_0_B;
    pub const AAC_QUADRAPHONIC: Self = Self::QUADRAPHONIC;
    pub const AAC_4_0: Self = Self::MPEG_4_0_B;
    pub const AAC_5_0: Self = Self::MPEG_5_0_D;
    pub const AAC_5_1: Self = Self::MPEG_5_1_D;
    pub const AAC_6_0: Self = Self((141 << 16) | 6);
    pub const AAC_6_1: Self = Self((142 << 16) | 7);
    pub const AAC_7_0: Self = Self((143 << 16) | 7);
    pub const AAC_7_1: Self = Self::MPEG_7_1_B;
    pub const AAC_OCTAGONAL: Self = Self((144 << 16) | 8);

    /// 标签隐含的声道数 (低 16 位)
    pub const fn channels(&self) -> u32 {
        self.0 & 0xFFFF
    }
}

/// 厂商声道布局 (标签 + 位图)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VendorChannelLayout {
    /// 布局标签
    pub tag: ChannelLayoutTag,
    /// 声道位图, 仅当标签为 `USE_CHANNEL_BITMAP` 时有意义
    pub bitmap: ChannelMask,
}

impl VendorChannelLayout {
    /// 用位图描述的布局
    pub fn from_bitmap(bitmap: ChannelMask) -> Self {
        Self {
            tag: ChannelLayoutTag::USE_CHANNEL_BITMAP,
            bitmap,
        }
    }

    /// 用标签描述的布局
    pub fn from_tag(tag: ChannelLayoutTag) -> Self {
        Self {
            tag,
            bitmap: ChannelMask::empty(),
        }
    }
}

/// 转换器属性标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyId(pub u32);

impl PropertyId {
    pub const CODEC_QUALITY: Self = Self(fourcc(b"cdqu"));
    pub const CHANNEL_MAP: Self = Self(fourcc(b"chmp"));
    pub const COMPRESSION_MAGIC_COOKIE: Self = Self(fourcc(b"cmgc"));
    /// 编码码率 (与 `CURRENT_TARGET_BIT_RATE` 同码)
    pub const ENCODE_BIT_RATE: Self = Self(fourcc(b"brat"));
    pub const INPUT_CHANNEL_LAYOUT: Self = Self(fourcc(b"icl "));
    pub const OUTPUT_CHANNEL_LAYOUT: Self = Self(fourcc(b"ocl "));
    pub const APPLICABLE_ENCODE_BIT_RATES: Self = Self(fourcc(b"aebr"));
    pub const CURRENT_OUTPUT_STREAM_DESCRIPTION: Self = Self(fourcc(b"acod"));
    pub const CURRENT_INPUT_STREAM_DESCRIPTION: Self = Self(fourcc(b"acid"));
    pub const BIT_DEPTH_HINT: Self = Self(fourcc(b"acbd"));
    pub const PACKET_FRAME_SIZE: Self = Self(fourcc(b"pakf"));
    pub const MAXIMUM_PACKET_BYTE_SIZE: Self = Self(fourcc(b"pakb"));
    pub const CURRENT_TARGET_BIT_RATE: Self = Self(fourcc(b"brat"));
    pub const BIT_RATE_CONTROL_MODE: Self = Self(fourcc(b"acbf"));
    pub const SOUND_QUALITY_FOR_VBR: Self = Self(fourcc(b"vbrq"));
    pub const MINIMUM_DELAY_MODE: Self = Self(fourcc(b"mdel"));
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match fourcc_text(self.0) {
            Some(text) => write!(f, "'{text}'"),
            None => write!(f, "0x{:08X}", self.0),
        }
    }
}

/// 可写入转换器的属性值
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// 32 位无符号整数
    U32(u32),
    /// 声道布局
    ChannelLayout(VendorChannelLayout),
    /// 声道映射, 每个输出声道一个有符号 32 位源索引
    ChannelMap(Vec<i32>),
}

/// 编码质量上限
pub const CODEC_QUALITY_MAX: u32 = 0x7F;

/// 可用码率区间
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    /// 下限
    pub minimum: f64,
    /// 上限
    pub maximum: f64,
}

/// 输出包描述, 给出包在输出缓冲区中的实际位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketDescription {
    /// 包起始偏移
    pub start_offset: u64,
    /// 包数据字节数
    pub data_byte_size: u32,
}
