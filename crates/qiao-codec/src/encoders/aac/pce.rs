//! 用合成的 PCE 重写 AudioSpecificConfig.
//!
//! 厂商编码器对部分多声道布局只输出 channel_configuration, 其声道顺序与
//! 实际编码的声道元素不符. 这里把 channel_configuration 改为 0,
//! 并在 GASC 中写入描述真实元素排列的 program_config_element.
//!
//! 重写流程:
//! 1. 解析 ASC, 取得对象类型、采样率索引与 GASC 起点
//! 2. 写出对象类型、采样率索引 (及显式采样率)、channel_configuration = 0
//! 3. 逐位复制 GASC 头部标志, 跳过原有 PCE
//! 4. 写入合成的 PCE, 然后原样复制剩余位

use log::debug;
use qiao_core::bitreader::BitReader;
use qiao_core::bitwriter::{BitWriter, copy_bit, copy_bits};
use qiao_core::{QiaoError, QiaoResult};

use crate::parsers::mpeg4audio::{
    AOT_AAC_SCALABLE, AOT_ER_AAC_SCALABLE, AOT_ESCAPE, AOT_NULL, Mpeg4AudioConfig,
    SAMPLING_INDEX_EXPLICIT, skip_pce,
};

/// 前/侧/后方向上的最大元素数 (4 位计数)
const MAX_DIRECTIONAL_ELEMENTS: usize = 15;
/// LFE 元素最大数 (2 位计数)
const MAX_LFE_ELEMENTS: u32 = 3;
/// 同类元素实例标签上限 (4 位)
const MAX_ELEMENT_TAG: usize = 15;

/// 声道元素类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// 单声道元素 (SCE)
    Single,
    /// 声道对元素 (CPE)
    Pair,
}

/// 合成 PCE 的元素排列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PceLayout<'a> {
    /// 前方元素, 按发射顺序
    pub front: &'a [ElementKind],
    /// 侧方元素
    pub side: &'a [ElementKind],
    /// 后方元素
    pub back: &'a [ElementKind],
    /// LFE 元素数
    pub lfe: u32,
}

use ElementKind::{Pair, Single};

impl PceLayout<'static> {
    /// 2/2: 前方一对, 侧方一对
    pub const LAYOUT_2_2: Self = Self::new(&[Pair], &[Pair], &[], 0);
    /// 5.0 (侧方环绕)
    pub const SURROUND_5_0: Self = Self::new(&[Single, Pair], &[Pair], &[], 0);
    /// 5.1 (侧方环绕)
    pub const SURROUND_5_1: Self = Self::new(&[Single, Pair], &[Pair], &[], 1);
    /// 6.0
    pub const SURROUND_6_0: Self = Self::new(&[Single, Pair], &[Pair], &[Single], 0);
    /// 6.1
    pub const SURROUND_6_1: Self = Self::new(&[Single, Pair], &[Pair], &[Single], 1);
    /// 7.0
    pub const SURROUND_7_0: Self = Self::new(&[Single, Pair], &[Pair], &[Pair], 0);
    /// 7.1
    pub const SURROUND_7_1: Self = Self::new(&[Single, Pair], &[Pair], &[Pair], 1);
    /// 7.1 (wide): 前方中置 + 两对
    pub const SURROUND_7_1_WIDE: Self = Self::new(&[Single, Pair, Pair], &[Pair], &[], 1);
}

impl<'a> PceLayout<'a> {
    /// 构造元素排列
    pub const fn new(
        front: &'a [ElementKind],
        side: &'a [ElementKind],
        back: &'a [ElementKind],
        lfe: u32,
    ) -> Self {
        Self {
            front,
            side,
            back,
            lfe,
        }
    }

    /// 全部前/侧/后元素, 按发射顺序
    fn elements(&self) -> impl Iterator<Item = ElementKind> + '_ {
        self.front
            .iter()
            .chain(self.side)
            .chain(self.back)
            .copied()
    }

    /// 排列所描述的声道总数
    pub fn channels(&self) -> u32 {
        let elements: u32 = self
            .elements()
            .map(|kind| match kind {
                ElementKind::Single => 1,
                ElementKind::Pair => 2,
            })
            .sum();
        elements + self.lfe
    }

    /// 检查各计数能否装进 PCE 的字段宽度
    pub fn validate(&self) -> QiaoResult<()> {
        for (name, elems) in [("front", self.front), ("side", self.side), ("back", self.back)] {
            if elems.len() > MAX_DIRECTIONAL_ELEMENTS {
                return Err(QiaoError::InvalidArgument(format!(
                    "PCE {} 元素数 {} 超过 {}",
                    name,
                    elems.len(),
                    MAX_DIRECTIONAL_ELEMENTS,
                )));
            }
        }
        if self.lfe > MAX_LFE_ELEMENTS {
            return Err(QiaoError::InvalidArgument(format!(
                "PCE LFE 元素数 {} 超过 {}",
                self.lfe, MAX_LFE_ELEMENTS,
            )));
        }
        for kind in [ElementKind::Single, ElementKind::Pair] {
            let count = self.elements().filter(|&k| k == kind).count();
            if count > MAX_ELEMENT_TAG + 1 {
                return Err(QiaoError::InvalidArgument(format!(
                    "PCE {:?} 元素数 {} 超出 4 位实例标签范围",
                    kind, count,
                )));
            }
        }
        Ok(())
    }
}

/// 依次为声道元素分配实例标签, SCE 与 CPE 各自从 0 计数
struct ElementTagger {
    single: u32,
    pair: u32,
}

impl ElementTagger {
    fn new() -> Self {
        Self { single: 0, pair: 0 }
    }

    /// 5 位标签: 第 4 位为是否成对, 低 4 位为实例号
    fn next(&mut self, kind: ElementKind) -> u32 {
        match kind {
            ElementKind::Single => {
                self.single += 1;
                self.single - 1
            }
            ElementKind::Pair => {
                self.pair += 1;
                0x10 | (self.pair - 1)
            }
        }
    }
}

/// 写出合成的 PCE (含字节对齐与空注释)
fn write_pce(bw: &mut BitWriter, cfg: &Mpeg4AudioConfig, layout: &PceLayout<'_>) {
    bw.write_bits(0, 4); // element_instance_tag
    bw.write_bits(cfg.object_type.wrapping_sub(1) & 0x03, 2);
    bw.write_bits(cfg.sampling_index, 4);
    bw.write_bits(layout.front.len() as u32, 4);
    bw.write_bits(layout.side.len() as u32, 4);
    bw.write_bits(layout.back.len() as u32, 4);
    bw.write_bits(layout.lfe, 2);
    bw.write_bits(0, 3); // assoc data
    bw.write_bits(0, 4); // cc
    bw.write_bits(0, 3); // mono/stereo/matrix mixdown

    let mut tagger = ElementTagger::new();
    for kind in layout.elements() {
        bw.write_bits(tagger.next(kind), 5);
    }
    for lfe_tag in 0..layout.lfe {
        bw.write_bits(lfe_tag, 4);
    }

    bw.align_to_byte();
    bw.write_bits(0, 8); // comment_field_bytes
}

/// 用 `layout` 描述的 PCE 重写 ASC
///
/// 成功时返回新的 ASC; 失败时不产生任何部分输出.
///
/// # 错误
/// - `InvalidArgument`: 元素计数超出 PCE 字段宽度
/// - `UnsupportedExtension`: 源 ASC 带有扩展对象类型或扩展采样率
/// - `InvalidData` / `Eof`: 源 ASC 被截断
pub fn rewrite_asc_with_pce(asc: &[u8], layout: &PceLayout<'_>) -> QiaoResult<Vec<u8>> {
    layout.validate()?;

    let cfg = Mpeg4AudioConfig::parse(asc)?;
    if cfg.ext_object_type != AOT_NULL || cfg.ext_sample_rate != 0 {
        return Err(QiaoError::UnsupportedExtension(format!(
            "扩展对象类型 {}, 扩展采样率 {}",
            cfg.ext_object_type, cfg.ext_sample_rate,
        )));
    }

    let mut br = BitReader::new(asc);
    br.skip_bits(cfg.specific_config_offset)?;
    let mut bw = BitWriter::with_capacity(asc.len() + 64);

    if cfg.object_type > AOT_ESCAPE {
        bw.write_bits(AOT_ESCAPE, 5);
        bw.write_bits(cfg.object_type - 32, 6);
    } else {
        bw.write_bits(cfg.object_type, 5);
    }
    bw.write_bits(cfg.sampling_index, 4);
    if cfg.sampling_index == SAMPLING_INDEX_EXPLICIT {
        bw.write_bits(cfg.sample_rate, 24);
    }
    bw.write_bits(0, 4); // channel_configuration: PCE 随后

    copy_bit(&mut bw, &mut br)?; // frame_length_flag
    if copy_bit(&mut bw, &mut br)? == 1 {
        copy_bits(&mut bw, &mut br, 14)?; // core_coder_delay
    }
    copy_bit(&mut bw, &mut br)?; // extension_flag
    if cfg.object_type == AOT_AAC_SCALABLE || cfg.object_type == AOT_ER_AAC_SCALABLE {
        copy_bits(&mut bw, &mut br, 3)?; // layer_nr
    }
    if cfg.chan_config == 0 {
        let skipped = skip_pce(&mut br)?;
        debug!("跳过原有 PCE: {} 位", skipped);
    }

    write_pce(&mut bw, &cfg, layout);

    let left = br.bits_left();
    copy_bits(&mut bw, &mut br, left)?;
    bw.align_to_byte();

    let out = bw.finish();
    debug!(
        "ASC 重写完成: {} → {} 字节, {} 声道 PCE, 新 ASC: {:02X?}",
        asc.len(),
        out.len(),
        layout.channels(),
        out,
    );
    Ok(out)
}
