//! ASC / PCE 重写集成测试.
//!
//! magic cookie → ES 描述符解析 → AudioSpecificConfig → PCE 重写,
//! 以及位搬运的属性测试.

use proptest::prelude::*;
use qiao::codec::encoders::aac::pce::{PceLayout, rewrite_asc_with_pce};
use qiao::codec::parsers::esds::extract_audio_specific_config;
use qiao::codec::parsers::mpeg4audio::{AOT_AAC_LC, skip_pce};
use qiao::codec::toolbox::mock::esds_cookie;
use qiao::core::QiaoError;
use qiao::core::bitreader::BitReader;
use qiao::core::bitwriter::{BitWriter, copy_bits};

const LAYOUTS: [PceLayout<'static>; 8] = [
    PceLayout::LAYOUT_2_2,
    PceLayout::SURROUND_5_0,
    PceLayout::SURROUND_5_1,
    PceLayout::SURROUND_6_0,
    PceLayout::SURROUND_6_1,
    PceLayout::SURROUND_7_0,
    PceLayout::SURROUND_7_1,
    PceLayout::SURROUND_7_1_WIDE,
];

/// 构造 2 字节的 AAC-LC ASC
fn lc_asc(sampling_index: u32, chan_config: u32, frame_length_flag: u32) -> Vec<u8> {
    let mut bw = BitWriter::new();
    bw.write_bits(AOT_AAC_LC, 5);
    bw.write_bits(sampling_index, 4);
    bw.write_bits(chan_config, 4);
    bw.write_bits(frame_length_flag, 1);
    bw.write_bits(0, 2); // depends_on_core_coder + extension_flag
    bw.finish()
}

#[test]
fn test_cookie_to_rewritten_asc() {
    let cookie = esds_cookie(&[0x11, 0xB0]);
    let asc = extract_audio_specific_config(&cookie).unwrap();
    assert_eq!(asc, vec![0x11, 0xB0]);

    let out = rewrite_asc_with_pce(&asc, &PceLayout::SURROUND_5_1).unwrap();
    assert_eq!(
        out,
        [0x11, 0x80, 0x04, 0xC8, 0x41, 0x00, 0x01, 0x08, 0x80, 0x00]
    );

    let out = rewrite_asc_with_pce(&[0x12, 0x10], &PceLayout::LAYOUT_2_2).unwrap();
    assert_eq!(out, [0x12, 0x00, 0x05, 0x04, 0x40, 0x00, 0x21, 0x10, 0x00]);
}

#[test]
fn test_rewrite_is_idempotent_for_same_layout() {
    let once = rewrite_asc_with_pce(&[0x11, 0x90], &PceLayout::SURROUND_7_1).unwrap();
    let twice = rewrite_asc_with_pce(&once, &PceLayout::SURROUND_7_1).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_malformed_cookies() {
    let cookie = esds_cookie(&[0x11, 0x90]);

    // DecoderSpecificInfo 的 tag 被改写
    let mut wrong_tag = cookie.clone();
    wrong_tag[20] = 0x06;
    assert!(matches!(
        extract_audio_specific_config(&wrong_tag),
        Err(QiaoError::MalformedConfig(_))
    ));

    // DecoderConfigDescriptor 的 tag 被改写
    let mut wrong_outer = cookie.clone();
    wrong_outer[5] = 0x05;
    assert!(matches!(
        extract_audio_specific_config(&wrong_outer),
        Err(QiaoError::MalformedConfig(_))
    ));

    // 截断
    assert!(matches!(
        extract_audio_specific_config(&cookie[..10]),
        Err(QiaoError::MalformedConfig(_))
    ));
    assert!(matches!(
        extract_audio_specific_config(&[]),
        Err(QiaoError::MalformedConfig(_))
    ));
}

proptest! {
    /// 任意分块搬运后内容逐位不变
    #[test]
    fn copy_bits_preserves_content(
        data in prop::collection::vec(any::<u8>(), 1..1250),
        chunks in prop::collection::vec(1usize..100, 1..40),
    ) {
        let mut br = BitReader::new(&data);
        let mut bw = BitWriter::new();
        for chunk in chunks {
            let n = chunk.min(br.bits_left());
            copy_bits(&mut bw, &mut br, n).unwrap();
        }
        let rest = br.bits_left();
        copy_bits(&mut bw, &mut br, rest).unwrap();
        prop_assert_eq!(bw.finish(), data);
    }

    /// 目标未对齐时搬运结果同样逐位不变
    #[test]
    fn copy_bits_to_unaligned_writer(
        prefix in 0u32..8,
        data in prop::collection::vec(any::<u8>(), 1..200),
    ) {
        let mut br = BitReader::new(&data);
        let mut bw = BitWriter::new();
        bw.write_bits(0, prefix);
        copy_bits(&mut bw, &mut br, data.len() * 8).unwrap();
        let out = bw.finish();

        let mut check = BitReader::new(&out);
        check.skip_bits(prefix as usize).unwrap();
        for &byte in &data {
            prop_assert_eq!(check.read_bits(8).unwrap(), u32::from(byte));
        }
    }

    /// 重写后头部字段保留, channel_configuration 为 0, PCE 恰好占满剩余位
    #[test]
    fn rewritten_asc_is_well_formed(
        sampling_index in 0u32..13,
        chan_config in 1u32..8,
        frame_length_flag in 0u32..2,
        layout in prop::sample::select(LAYOUTS.to_vec()),
    ) {
        let asc = lc_asc(sampling_index, chan_config, frame_length_flag);
        let out = rewrite_asc_with_pce(&asc, &layout).unwrap();

        let mut br = BitReader::new(&out);
        prop_assert_eq!(br.read_bits(5).unwrap(), AOT_AAC_LC);
        prop_assert_eq!(br.read_bits(4).unwrap(), sampling_index);
        prop_assert_eq!(br.read_bits(4).unwrap(), 0);
        prop_assert_eq!(br.read_bits(1).unwrap(), frame_length_flag);
        prop_assert_eq!(br.read_bits(2).unwrap(), 0);

        let pce_start = br.bits_read();
        skip_pce(&mut br).unwrap();
        prop_assert_eq!(br.bits_left(), 0);

        // 元素计数字段
        let mut counts = BitReader::new(&out);
        counts.skip_bits(pce_start + 10).unwrap();
        prop_assert_eq!(counts.read_bits(4).unwrap() as usize, layout.front.len());
        prop_assert_eq!(counts.read_bits(4).unwrap() as usize, layout.side.len());
        prop_assert_eq!(counts.read_bits(4).unwrap() as usize, layout.back.len());
        prop_assert_eq!(counts.read_bits(2).unwrap(), layout.lfe);
    }
}
