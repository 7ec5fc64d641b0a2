//! 音频声道布局定义.
//!
//! 位掩码的位序与 FFmpeg `AV_CH_*` 以及厂商声道位图 (channel bitmap) 一致,
//! 因此掩码可以原样作为厂商输入布局的位图传递.

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// 声道位掩码, 每个位代表一个扬声器位置
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ChannelMask: u64 {
        /// 前方左声道
        const FRONT_LEFT            = 1 << 0;
        /// 前方右声道
        const FRONT_RIGHT           = 1 << 1;
        /// 前方中央声道
        const FRONT_CENTER          = 1 << 2;
        /// 低频效果 (LFE / 重低音)
        const LOW_FREQUENCY         = 1 << 3;
        /// 后方左声道
        const BACK_LEFT             = 1 << 4;
        /// 后方右声道
        const BACK_RIGHT            = 1 << 5;
        /// 前方中左声道
        const FRONT_LEFT_OF_CENTER  = 1 << 6;
        /// 前方中右声道
        const FRONT_RIGHT_OF_CENTER = 1 << 7;
        /// 后方中央声道
        const BACK_CENTER           = 1 << 8;
        /// 侧方左声道
        const SIDE_LEFT             = 1 << 9;
        /// 侧方右声道
        const SIDE_RIGHT            = 1 << 10;
        /// 顶部中央
        const TOP_CENTER            = 1 << 11;
        /// 顶部前左
        const TOP_FRONT_LEFT        = 1 << 12;
        /// 顶部前中
        const TOP_FRONT_CENTER      = 1 << 13;
        /// 顶部前右
        const TOP_FRONT_RIGHT       = 1 << 14;
        /// 顶部后左
        const TOP_BACK_LEFT         = 1 << 15;
        /// 顶部后中
        const TOP_BACK_CENTER       = 1 << 16;
        /// 顶部后右
        const TOP_BACK_RIGHT        = 1 << 17;
    }
}

const fn mask(bits: u64) -> ChannelMask {
    ChannelMask::from_bits_truncate(bits)
}

// 组合用的位值, 与 FFmpeg AV_CH_LAYOUT_* 定义一致
const FL: u64 = ChannelMask::FRONT_LEFT.bits();
const FR: u64 = ChannelMask::FRONT_RIGHT.bits();
const FC: u64 = ChannelMask::FRONT_CENTER.bits();
const LFE: u64 = ChannelMask::LOW_FREQUENCY.bits();
const BL: u64 = ChannelMask::BACK_LEFT.bits();
const BR: u64 = ChannelMask::BACK_RIGHT.bits();
const FLC: u64 = ChannelMask::FRONT_LEFT_OF_CENTER.bits();
const FRC: u64 = ChannelMask::FRONT_RIGHT_OF_CENTER.bits();
const BC: u64 = ChannelMask::BACK_CENTER.bits();
const SL: u64 = ChannelMask::SIDE_LEFT.bits();
const SR: u64 = ChannelMask::SIDE_RIGHT.bits();

/// 声道布局
///
/// 描述音频流中声道的数量和排列方式.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelLayout {
    /// 声道数量
    pub channels: u32,
    /// 声道位掩码
    pub mask: ChannelMask,
}

impl ChannelLayout {
    /// 单声道
    pub const MONO: Self = Self::new(mask(FC));
    /// 立体声
    pub const STEREO: Self = Self::new(mask(FL | FR));
    /// 3.0 (L R C)
    pub const SURROUND: Self = Self::new(mask(FL | FR | FC));
    /// 4.0 (L R C Cs)
    pub const SURROUND_4_0: Self = Self::new(mask(FL | FR | FC | BC));
    /// 2/2 (L R Ls Rs, 侧方)
    pub const LAYOUT_2_2: Self = Self::new(mask(FL | FR | SL | SR));
    /// 四声道 (L R Ls Rs, 后方)
    pub const QUAD: Self = Self::new(mask(FL | FR | BL | BR));
    /// 5.0 (侧方环绕)
    pub const SURROUND_5_0: Self = Self::new(mask(FL | FR | FC | SL | SR));
    /// 5.1 (侧方环绕)
    pub const SURROUND_5_1: Self = Self::new(mask(FL | FR | FC | LFE | SL | SR));
    /// 5.0 (后方环绕)
    pub const SURROUND_5_0_BACK: Self = Self::new(mask(FL | FR | FC | BL | BR));
    /// 5.1 (后方环绕)
    pub const SURROUND_5_1_BACK: Self = Self::new(mask(FL | FR | FC | LFE | BL | BR));
    /// 6.0
    pub const SURROUND_6_0: Self = Self::new(mask(FL | FR | FC | SL | SR | BC));
    /// 六边形 (5.0 后方 + 后中)
    pub const HEXAGONAL: Self = Self::new(mask(FL | FR | FC | BL | BR | BC));
    /// 6.1
    pub const SURROUND_6_1: Self = Self::new(mask(FL | FR | FC | LFE | SL | SR | BC));
    /// 6.1 (后方)
    pub const SURROUND_6_1_BACK: Self = Self::new(mask(FL | FR | FC | LFE | BL | BR | BC));
    /// 7.0
    pub const SURROUND_7_0: Self = Self::new(mask(FL | FR | FC | SL | SR | BL | BR));
    /// 7.1
    pub const SURROUND_7_1: Self = Self::new(mask(FL | FR | FC | LFE | SL | SR | BL | BR));
    /// 7.1 (宽, 侧方环绕 + 前方中左/中右)
    pub const SURROUND_7_1_WIDE: Self =
        Self::new(mask(FL | FR | FC | LFE | SL | SR | FLC | FRC));
    /// 7.1 (宽, 后方环绕 + 前方中左/中右)
    pub const SURROUND_7_1_WIDE_BACK: Self =
        Self::new(mask(FL | FR | FC | LFE | BL | BR | FLC | FRC));
    /// 八边形
    pub const OCTAGONAL: Self = Self::new(mask(FL | FR | FC | SL | SR | BL | BC | BR));

    /// 从位掩码创建布局, 声道数等于置位数
    pub const fn new(mask: ChannelMask) -> Self {
        Self {
            channels: mask.bits().count_ones(),
            mask,
        }
    }

    /// 根据声道数创建默认布局
    pub fn from_channels(channels: u32) -> Self {
        match channels {
            1 => Self::MONO,
            2 => Self::STEREO,
            3 => Self::SURROUND,
            4 => Self::SURROUND_4_0,
            5 => Self::SURROUND_5_0_BACK,
            6 => Self::SURROUND_5_1_BACK,
            7 => Self::SURROUND_6_1_BACK,
            8 => Self::SURROUND_7_1_WIDE_BACK,
            n => Self {
                channels: n,
                mask: ChannelMask::empty(),
            },
        }
    }

    /// 布局的通用名称, 未知布局返回 None
    pub fn name(&self) -> Option<&'static str> {
        NAMED_LAYOUTS
            .iter()
            .find(|(layout, _)| layout == self)
            .map(|(_, name)| *name)
    }
}

/// 常用布局及其名称 (FFmpeg 命名)
const NAMED_LAYOUTS: [(ChannelLayout, &str); 19] = [
    (ChannelLayout::MONO, "mono"),
    (ChannelLayout::STEREO, "stereo"),
    (ChannelLayout::SURROUND, "3.0"),
    (ChannelLayout::SURROUND_4_0, "4.0"),
    (ChannelLayout::LAYOUT_2_2, "2.2"),
    (ChannelLayout::QUAD, "quad"),
    (ChannelLayout::SURROUND_5_0, "5.0(side)"),
    (ChannelLayout::SURROUND_5_1, "5.1(side)"),
    (ChannelLayout::SURROUND_5_0_BACK, "5.0"),
    (ChannelLayout::SURROUND_5_1_BACK, "5.1"),
    (ChannelLayout::SURROUND_6_0, "6.0"),
    (ChannelLayout::HEXAGONAL, "hexagonal"),
    (ChannelLayout::SURROUND_6_1, "6.1"),
    (ChannelLayout::SURROUND_6_1_BACK, "6.1(back)"),
    (ChannelLayout::SURROUND_7_0, "7.0"),
    (ChannelLayout::SURROUND_7_1, "7.1"),
    (ChannelLayout::SURROUND_7_1_WIDE, "7.1(wide-side)"),
    (ChannelLayout::SURROUND_7_1_WIDE_BACK, "7.1(wide)"),
    (ChannelLayout::OCTAGONAL, "octagonal"),
];

impl fmt::Display for ChannelLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "{}ch(0x{:X})", self.channels, self.mask.bits()),
        }
    }
}
