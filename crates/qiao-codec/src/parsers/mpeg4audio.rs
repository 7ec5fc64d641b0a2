//! MPEG-4 AudioSpecificConfig 解析 (ISO/IEC 14496-3 1.6.2.1).
//!
//! ASC 布局:
//! - audioObjectType: 5 位, 值 31 为转义, 后跟 6 位 (实际值 = 32 + 6 位值)
//! - samplingFrequencyIndex: 4 位, 值 15 表示后跟 24 位显式采样率
//! - channelConfiguration: 4 位, 0 表示 GASC 中携带 PCE
//! - 显式 SBR/PS 信令 (对象类型 5 / 29): 扩展采样率 + 核心对象类型
//! - GASC (GASpecificConfig) 起始位置记录在 `specific_config_offset`
//! - 向后兼容的同步扩展: 11 位 0x2B7 + 扩展对象类型 [+ 0x548 PS 同步字]

use log::trace;
use qiao_core::bitreader::BitReader;
use qiao_core::{QiaoError, QiaoResult};

/// 无扩展对象
pub const AOT_NULL: u32 = 0;
/// AAC Main
pub const AOT_AAC_MAIN: u32 = 1;
/// AAC LC
pub const AOT_AAC_LC: u32 = 2;
/// SBR (HE-AAC)
pub const AOT_SBR: u32 = 5;
/// AAC Scalable
pub const AOT_AAC_SCALABLE: u32 = 6;
/// ER AAC Scalable
pub const AOT_ER_AAC_SCALABLE: u32 = 20;
/// ER BSAC
pub const AOT_ER_BSAC: u32 = 22;
/// PS (HE-AAC v2)
pub const AOT_PS: u32 = 29;
/// 对象类型转义值
pub const AOT_ESCAPE: u32 = 31;

/// 显式采样率的采样率索引
pub const SAMPLING_INDEX_EXPLICIT: u32 = 0x0F;

/// 采样率索引对应的采样率 (Hz), 保留索引为 0
pub const SAMPLE_RATES: [u32; 16] = [
    96000, 88200, 64000, 48000, 44100, 32000, 24000, 22050, 16000, 12000, 11025, 8000, 7350, 0, 0,
    0,
];

/// channelConfiguration 对应的声道数
const CONFIG_CHANNELS: [u32; 8] = [0, 1, 2, 3, 4, 5, 6, 8];

/// SBR 同步扩展字
const SYNC_EXTENSION_TYPE: u32 = 0x2B7;
/// PS 同步扩展字
const PS_SYNC_EXTENSION_TYPE: u32 = 0x548;

/// 解析后的 AudioSpecificConfig
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mpeg4AudioConfig {
    /// 核心对象类型
    pub object_type: u32,
    /// 采样率索引
    pub sampling_index: u32,
    /// 采样率 (Hz)
    pub sample_rate: u32,
    /// channelConfiguration
    pub chan_config: u32,
    /// 由 channelConfiguration 推出的声道数 (PCE 布局时为 0)
    pub channels: u32,
    /// SBR 状态: 1 = 存在, 0 = 明确不存在, -1 = 未知
    pub sbr: i8,
    /// PS 状态: 1 = 存在, 0 = 明确不存在, -1 = 未知
    pub ps: i8,
    /// 扩展对象类型 (`AOT_NULL` 表示无扩展)
    pub ext_object_type: u32,
    /// 扩展采样率索引
    pub ext_sampling_index: u32,
    /// 扩展采样率 (Hz), 0 表示无
    pub ext_sample_rate: u32,
    /// ER BSAC 的扩展 channelConfiguration
    pub ext_chan_config: u32,
    /// GASC 起始位置 (相对 ASC 起点的位偏移)
    pub specific_config_offset: usize,
}

impl Mpeg4AudioConfig {
    /// 解析 ASC, 并扫描同步扩展
    pub fn parse(data: &[u8]) -> QiaoResult<Self> {
        let mut br = BitReader::new(data);
        let cfg = Self::read(&mut br).map_err(|e| match e {
            QiaoError::Eof => QiaoError::InvalidData("AudioSpecificConfig 被截断".into()),
            other => other,
        })?;
        trace!(
            "ASC: aot={}, sf_index={}, rate={}, chan_config={}, ext_aot={}, ext_rate={}, gasc@{}",
            cfg.object_type,
            cfg.sampling_index,
            cfg.sample_rate,
            cfg.chan_config,
            cfg.ext_object_type,
            cfg.ext_sample_rate,
            cfg.specific_config_offset,
        );
        Ok(cfg)
    }

    fn read(br: &mut BitReader<'_>) -> QiaoResult<Self> {
        let mut cfg = Self {
            sbr: -1,
            ps: -1,
            ..Self::default()
        };

        cfg.object_type = read_object_type(br)?;
        (cfg.sampling_index, cfg.sample_rate) = read_sample_rate(br)?;
        cfg.chan_config = br.read_bits(4)?;
        cfg.channels = CONFIG_CHANNELS
            .get(cfg.chan_config as usize)
            .copied()
            .unwrap_or(0);

        // 对象类型 29 时排除 MP3onMP4 草案的位型
        let explicit_sbr = cfg.object_type == AOT_SBR
            || (cfg.object_type == AOT_PS
                && !(br.peek_bits(3)? & 0x03 != 0 && br.peek_bits(9)? & 0x3F == 0));
        if explicit_sbr {
            if cfg.object_type == AOT_PS {
                cfg.ps = 1;
            }
            cfg.ext_object_type = AOT_SBR;
            cfg.sbr = 1;
            (cfg.ext_sampling_index, cfg.ext_sample_rate) = read_sample_rate(br)?;
            cfg.object_type = read_object_type(br)?;
            if cfg.object_type == AOT_ER_BSAC {
                cfg.ext_chan_config = br.read_bits(4)?;
            }
        }

        cfg.specific_config_offset = br.bits_read();

        if cfg.ext_object_type != AOT_SBR {
            cfg.scan_sync_extension(br)?;
        }
        Ok(cfg)
    }

    /// 在剩余位中逐位搜索同步扩展
    fn scan_sync_extension(&mut self, br: &mut BitReader<'_>) -> QiaoResult<()> {
        while br.bits_left() > 15 {
            if br.peek_bits(11)? != SYNC_EXTENSION_TYPE {
                br.skip_bits(1)?;
                continue;
            }
            br.skip_bits(11)?;
            self.ext_object_type = read_object_type(br)?;
            if self.ext_object_type == AOT_SBR {
                self.sbr = br.read_bit()? as i8;
                if self.sbr == 1 {
                    (self.ext_sampling_index, self.ext_sample_rate) = read_sample_rate(br)?;
                    if self.ext_sample_rate == self.sample_rate {
                        self.sbr = -1;
                    }
                }
            }
            if br.bits_left() > 11 && br.read_bits(11)? == PS_SYNC_EXTENSION_TYPE {
                self.ps = br.read_bit()? as i8;
            }
            break;
        }
        Ok(())
    }
}

fn read_object_type(br: &mut BitReader<'_>) -> QiaoResult<u32> {
    let aot = br.read_bits(5)?;
    if aot == AOT_ESCAPE {
        return Ok(32 + br.read_bits(6)?);
    }
    Ok(aot)
}

/// 返回 (采样率索引, 采样率)
fn read_sample_rate(br: &mut BitReader<'_>) -> QiaoResult<(u32, u32)> {
    let index = br.read_bits(4)?;
    if index == SAMPLING_INDEX_EXPLICIT {
        return Ok((index, br.read_bits(24)?));
    }
    Ok((index, SAMPLE_RATES[index as usize]))
}

/// 跳过一个 program_config_element, 返回消耗的位数
///
/// 结束时读取器位于注释字段之后. 字节对齐以缓冲区起点为基准.
pub fn skip_pce(br: &mut BitReader<'_>) -> QiaoResult<usize> {
    let start = br.bits_read();

    // element_instance_tag(4) + object_type(2) + sampling_frequency_index(4)
    br.skip_bits(10)?;
    let mut five_bit_elems = br.read_bits(4)?; // front
    five_bit_elems += br.read_bits(4)?; // side
    five_bit_elems += br.read_bits(4)?; // back
    let mut four_bit_elems = br.read_bits(2)?; // lfe
    four_bit_elems += br.read_bits(3)?; // assoc data
    five_bit_elems += br.read_bits(4)?; // cc

    if br.read_flag()? {
        br.skip_bits(4)?; // mono mixdown
    }
    if br.read_flag()? {
        br.skip_bits(4)?; // stereo mixdown
    }
    if br.read_flag()? {
        br.skip_bits(3)?; // matrix mixdown
    }

    br.skip_bits((five_bit_elems * 5 + four_bit_elems * 4) as usize)?;
    br.align_to_byte();
    let comment_len = br.read_bits(8)? as usize;
    br.skip_bits(comment_len * 8)?;

    Ok(br.bits_read() - start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aac_lc_stereo() {
        let cfg = Mpeg4AudioConfig::parse(&[0x12, 0x10]).unwrap();
        assert_eq!(cfg.object_type, AOT_AAC_LC);
        assert_eq!(cfg.sampling_index, 4);
        assert_eq!(cfg.sample_rate, 44100);
        assert_eq!(cfg.chan_config, 2);
        assert_eq!(cfg.channels, 2);
        assert_eq!(cfg.ext_object_type, AOT_NULL);
        assert_eq!(cfg.ext_sample_rate, 0);
        assert_eq!(cfg.specific_config_offset, 13);
        assert_eq!((cfg.sbr, cfg.ps), (-1, -1));
    }

    #[test]
    fn test_parse_6ch_48k() {
        let cfg = Mpeg4AudioConfig::parse(&[0x11, 0xB0]).unwrap();
        assert_eq!(cfg.sampling_index, 3);
        assert_eq!(cfg.sample_rate, 48000);
        assert_eq!(cfg.chan_config, 6);
        assert_eq!(cfg.channels, 6);
    }

    #[test]
    fn test_parse_escaped_object_type() {
        let cfg = Mpeg4AudioConfig::parse(&[0xF9, 0x46, 0x40]).unwrap();
        assert_eq!(cfg.object_type, 42);
        assert_eq!(cfg.sampling_index, 3);
        assert_eq!(cfg.chan_config, 2);
        assert_eq!(cfg.specific_config_offset, 19);
    }

    #[test]
    fn test_parse_explicit_sample_rate() {
        let cfg = Mpeg4AudioConfig::parse(&[0x17, 0x80, 0x5D, 0xC0, 0x08]).unwrap();
        assert_eq!(cfg.sampling_index, SAMPLING_INDEX_EXPLICIT);
        assert_eq!(cfg.sample_rate, 48000);
        assert_eq!(cfg.chan_config, 1);
        assert_eq!(cfg.specific_config_offset, 37);
    }

    #[test]
    fn test_parse_explicit_sbr() {
        // AOT 5, 24 kHz 核心, 立体声, 扩展 48 kHz, 核心 AAC-LC
        let cfg = Mpeg4AudioConfig::parse(&[0x2B, 0x11, 0x88, 0x00]).unwrap();
        assert_eq!(cfg.object_type, AOT_AAC_LC);
        assert_eq!(cfg.sample_rate, 24000);
        assert_eq!(cfg.ext_object_type, AOT_SBR);
        assert_eq!(cfg.ext_sampling_index, 3);
        assert_eq!(cfg.ext_sample_rate, 48000);
        assert_eq!(cfg.sbr, 1);
        assert_eq!(cfg.specific_config_offset, 22);
    }

    #[test]
    fn test_parse_sync_extension() {
        // AAC-LC 44.1 kHz 立体声 + 0x2B7 同步扩展 (SBR, 88.2 kHz)
        let cfg = Mpeg4AudioConfig::parse(&[0x12, 0x10, 0x56, 0xE5, 0x88]).unwrap();
        assert_eq!(cfg.object_type, AOT_AAC_LC);
        assert_eq!(cfg.ext_object_type, AOT_SBR);
        assert_eq!(cfg.sbr, 1);
        assert_eq!(cfg.ext_sampling_index, 1);
        assert_eq!(cfg.ext_sample_rate, 88200);
        assert_eq!(cfg.specific_config_offset, 13);
    }

    #[test]
    fn test_parse_truncated() {
        assert!(matches!(
            Mpeg4AudioConfig::parse(&[0x12]),
            Err(QiaoError::InvalidData(_))
        ));
        assert!(Mpeg4AudioConfig::parse(&[]).is_err());
    }

    #[test]
    fn test_skip_pce_with_mixdown_and_comment() {
        // tag=0 profile=1 sf=3, front=1 side=0 back=0 lfe=0 assoc=0 cc=0,
        // mono mixdown 存在 (+4), 立体声/矩阵混音不存在, 1 个前置 CPE (5 位),
        // 对齐后注释长度 2 + "ok"
        let data = [0x04, 0xC4, 0x00, 0x01, 0x52, 0x00, 0x02, b'o', b'k', 0xAA];
        let mut br = BitReader::new(&data);
        let skipped = skip_pce(&mut br).unwrap();
        assert_eq!(skipped, 72);
        assert_eq!(br.read_bits(8).unwrap(), 0xAA);
    }

    #[test]
    fn test_skip_pce_truncated_comment() {
        let data = [0x04, 0xC4, 0x00, 0x00, 0x20, 0x05, b'x'];
        let mut br = BitReader::new(&data);
        assert!(matches!(skip_pce(&mut br), Err(QiaoError::Eof)));
    }
}
