//! 声道布局到厂商布局的映射.
//!
//! 每个编码器一张静态表: 输入位掩码 → 厂商布局标签、规范位掩码、可选的显式声道映射.
//! 规范位掩码用于向格式数据库查询声道映射, 例如 2/2 与 QUAD 在厂商看来是同一布局.
//! 显式映射给出每个输出声道取自哪个输入声道, 未用位置填 -1.

use qiao_core::{ChannelLayout, ChannelMask, QiaoError, QiaoResult};

use crate::toolbox::ChannelLayoutTag;

/// 声道映射, 最多 8 个输出声道
pub type ChannelMap = [i32; 8];

/// 解析后的输出布局
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedLayout {
    /// 厂商布局标签
    pub tag: ChannelLayoutTag,
    /// 查询声道映射时使用的输入位掩码
    pub canonical_mask: ChannelMask,
    /// 显式声道映射, 为 None 时向格式数据库查询
    pub explicit_map: Option<&'static ChannelMap>,
}

/// 布局解析函数类型
pub type ChannelMapInfoFn = fn(ChannelMask) -> QiaoResult<ResolvedLayout>;

struct LayoutEntry {
    input: ChannelLayout,
    tag: ChannelLayoutTag,
    canonical: ChannelLayout,
    map: Option<&'static ChannelMap>,
}

const fn entry(input: ChannelLayout, tag: ChannelLayoutTag) -> LayoutEntry {
    LayoutEntry {
        input,
        tag,
        canonical: input,
        map: None,
    }
}

const fn remapped(
    input: ChannelLayout,
    tag: ChannelLayoutTag,
    canonical: ChannelLayout,
) -> LayoutEntry {
    LayoutEntry {
        input,
        tag,
        canonical,
        map: None,
    }
}

const fn mapped(input: ChannelLayout, tag: ChannelLayoutTag, map: &'static ChannelMap) -> LayoutEntry {
    LayoutEntry {
        input,
        tag,
        canonical: input,
        map: Some(map),
    }
}

const MAP_6_0: ChannelMap = [2, 0, 1, 4, 5, 3, -1, -1];
const MAP_6_1: ChannelMap = [2, 0, 1, 5, 6, 4, 3, -1];
const MAP_7_0: ChannelMap = [2, 0, 1, 5, 6, 3, 4, -1];
const MAP_7_1: ChannelMap = [2, 0, 1, 6, 7, 4, 5, 3];
const MAP_7_1_WIDE: ChannelMap = [2, 4, 5, 0, 1, 6, 7, 3];

type L = ChannelLayout;
type T = ChannelLayoutTag;

static AAC_LAYOUTS: [LayoutEntry; 19] = [
    entry(L::MONO, T::MONO),
    entry(L::STEREO, T::STEREO),
    entry(L::SURROUND, T::AAC_3_0),
    entry(L::SURROUND_4_0, T::AAC_4_0),
    remapped(L::LAYOUT_2_2, T::AAC_QUADRAPHONIC, L::QUAD),
    entry(L::QUAD, T::AAC_QUADRAPHONIC),
    remapped(L::SURROUND_5_0, T::AAC_5_0, L::SURROUND_5_0_BACK),
    entry(L::SURROUND_5_0_BACK, T::AAC_5_0),
    remapped(L::SURROUND_5_1, T::AAC_5_1, L::SURROUND_5_1_BACK),
    entry(L::SURROUND_5_1_BACK, T::AAC_5_1),
    mapped(L::SURROUND_6_0, T::AAC_6_0, &MAP_6_0),
    entry(L::HEXAGONAL, T::AAC_6_0),
    mapped(L::SURROUND_6_1, T::AAC_6_1, &MAP_6_1),
    entry(L::SURROUND_6_1_BACK, T::AAC_6_1),
    mapped(L::SURROUND_7_0, T::AAC_7_0, &MAP_7_0),
    mapped(L::SURROUND_7_1, T::AAC_7_1, &MAP_7_1),
    mapped(L::SURROUND_7_1_WIDE, T::AAC_7_1, &MAP_7_1_WIDE),
    entry(L::SURROUND_7_1_WIDE_BACK, T::AAC_7_1),
    entry(L::OCTAGONAL, T::AAC_OCTAGONAL),
];

static ALAC_LAYOUTS: [LayoutEntry; 8] = [
    entry(L::MONO, T::MONO),
    entry(L::STEREO, T::STEREO),
    entry(L::SURROUND, T::MPEG_3_0_B),
    entry(L::SURROUND_4_0, T::MPEG_4_0_B),
    entry(L::SURROUND_5_0_BACK, T::MPEG_5_0_D),
    entry(L::SURROUND_5_1_BACK, T::MPEG_5_1_D),
    entry(L::SURROUND_6_1_BACK, T::AAC_6_1),
    entry(L::SURROUND_7_1_WIDE_BACK, T::MPEG_7_1_B),
];

fn resolve(table: &[LayoutEntry], mask: ChannelMask) -> QiaoResult<ResolvedLayout> {
    table
        .iter()
        .find(|e| e.input.mask == mask)
        .map(|e| ResolvedLayout {
            tag: e.tag,
            canonical_mask: e.canonical.mask,
            explicit_map: e.map,
        })
        .ok_or(QiaoError::UnsupportedLayout(mask))
}

/// AAC 编码器的布局解析
pub fn aac_channel_map_info(mask: ChannelMask) -> QiaoResult<ResolvedLayout> {
    resolve(&AAC_LAYOUTS, mask)
}

/// ALAC 编码器的布局解析
pub fn alac_channel_map_info(mask: ChannelMask) -> QiaoResult<ResolvedLayout> {
    resolve(&ALAC_LAYOUTS, mask)
}

/// AAC 编码器支持的输入布局
pub fn aac_supported_layouts() -> impl Iterator<Item = ChannelLayout> {
    AAC_LAYOUTS.iter().map(|e| e.input)
}

/// ALAC 编码器支持的输入布局
pub fn alac_supported_layouts() -> impl Iterator<Item = ChannelLayout> {
    ALAC_LAYOUTS.iter().map(|e| e.input)
}
