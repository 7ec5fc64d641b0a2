use super::pce::{ElementKind, PceLayout, rewrite_asc_with_pce};
use super::*;

// ============================================================
// PCE 重写
// ============================================================

#[test]
fn test_rewrite_lc_48k_chan6_with_5_1() {
    let out = rewrite_asc_with_pce(&[0x11, 0xB0], &PceLayout::SURROUND_5_1).unwrap();
    assert_eq!(
        out,
        [0x11, 0x80, 0x04, 0xC8, 0x41, 0x00, 0x01, 0x08, 0x80, 0x00]
    );
}

#[test]
fn test_rewrite_replaces_embedded_pce_and_keeps_tail() {
    // 源 ASC 已带 PCE (front=2, side=1, 无 LFE), 之后是尾部字节 FF 00
    let src = [0x11, 0x80, 0x04, 0xC4, 0x00, 0x00, 0x20, 0x00, 0xFF, 0x00];
    let out = rewrite_asc_with_pce(&src, &PceLayout::SURROUND_5_1).unwrap();
    assert_eq!(
        out,
        [0x11, 0x80, 0x04, 0xC8, 0x41, 0x00, 0x01, 0x08, 0x80, 0x00, 0xFF, 0x00]
    );
}

#[test]
fn test_rewrite_2_2() {
    let out = rewrite_asc_with_pce(&[0x12, 0x10], &PceLayout::LAYOUT_2_2).unwrap();
    assert_eq!(out, [0x12, 0x00, 0x05, 0x04, 0x40, 0x00, 0x21, 0x10, 0x00]);
}

#[test]
fn test_rewrite_element_tags_per_kind() {
    // 7.1(wide): 前方 SCE0 CPE0 CPE1, 侧方 CPE2, LFE0
    let wide = rewrite_asc_with_pce(&[0x11, 0x90], &PceLayout::SURROUND_7_1_WIDE).unwrap();
    assert_eq!(
        wide,
        [0x11, 0x80, 0x04, 0xCC, 0x41, 0x00, 0x01, 0x08, 0xC8, 0x00, 0x00]
    );

    // 7.1: 前方 SCE0 CPE0, 侧方 CPE1, 后方 CPE2, LFE0
    let back = rewrite_asc_with_pce(&[0x11, 0x90], &PceLayout::SURROUND_7_1).unwrap();
    assert_eq!(
        back,
        [0x11, 0x80, 0x04, 0xC8, 0x45, 0x00, 0x01, 0x08, 0xC8, 0x00, 0x00]
    );

    // 6.0: 后方单声道元素的实例号接在前方 SCE0 之后
    let six = rewrite_asc_with_pce(&[0x11, 0x90], &PceLayout::SURROUND_6_0).unwrap();
    assert_eq!(
        six,
        [0x11, 0x80, 0x04, 0xC8, 0x44, 0x00, 0x01, 0x08, 0x84, 0x00]
    );
}

#[test]
fn test_rewrite_rejects_extensions() {
    // 显式 SBR
    assert!(matches!(
        rewrite_asc_with_pce(&[0x2B, 0x11, 0x88, 0x00], &PceLayout::SURROUND_5_1),
        Err(QiaoError::UnsupportedExtension(_))
    ));
    // 向后兼容的同步扩展
    assert!(matches!(
        rewrite_asc_with_pce(&[0x12, 0x10, 0x56, 0xE5, 0x88], &PceLayout::SURROUND_5_1),
        Err(QiaoError::UnsupportedExtension(_))
    ));
}

#[test]
fn test_rewrite_truncated_asc() {
    assert!(rewrite_asc_with_pce(&[0x11], &PceLayout::SURROUND_5_1).is_err());
    assert!(rewrite_asc_with_pce(&[], &PceLayout::SURROUND_5_1).is_err());
}

#[test]
fn test_pce_layout_validation() {
    use ElementKind::{Pair, Single};

    let too_many = [Single; 16];
    let layout = PceLayout::new(&too_many, &[], &[], 0);
    assert!(matches!(
        layout.validate(),
        Err(QiaoError::InvalidArgument(_))
    ));

    let layout = PceLayout::new(&[Pair], &[], &[], 4);
    assert!(matches!(
        layout.validate(),
        Err(QiaoError::InvalidArgument(_))
    ));

    // 每个方向都合法, 但 CPE 实例号会超出 4 位
    let pairs = [Pair; 15];
    let layout = PceLayout::new(&pairs, &[Pair, Pair], &[], 0);
    assert!(matches!(
        rewrite_asc_with_pce(&[0x11, 0x90], &layout),
        Err(QiaoError::InvalidArgument(_))
    ));

    assert!(PceLayout::SURROUND_7_1_WIDE.validate().is_ok());
}

#[test]
fn test_pce_layout_channels_match_layouts() {
    for (layout, pce) in PCE_LAYOUTS.iter() {
        assert_eq!(pce.channels(), layout.channels, "{layout}");
        assert_eq!(pce_layout_for(*layout), Some(*pce));
    }
    assert_eq!(pce_layout_for(ChannelLayout::STEREO), None);
    assert_eq!(pce_layout_for(ChannelLayout::SURROUND_5_1_BACK), None);
}

// ============================================================
// 选项
// ============================================================

#[test]
fn test_options_defaults_and_validation() {
    let opts = AacEncoderOptions::default();
    assert_eq!(opts.profile, AacProfile::Lc);
    assert_eq!(opts.mode, BitRateControlMode::Variable);
    assert_eq!(opts.codec_quality, 4);
    assert_eq!(opts.vbr_quality, 96);
    assert!(opts.validate().is_ok());

    let bad = AacEncoderOptions {
        codec_quality: 5,
        ..AacEncoderOptions::default()
    };
    assert!(bad.validate().is_err());
    let bad = AacEncoderOptions {
        vbr_quality: 128,
        ..AacEncoderOptions::default()
    };
    assert!(bad.validate().is_err());
}

#[test]
fn test_profile_format_ids() {
    assert_eq!(AacProfile::Lc.format_id(), FormatId::MPEG4_AAC);
    assert_eq!(AacProfile::He.format_id(), FormatId::MPEG4_AAC_HE);
    assert_eq!(BitRateControlMode::LongTermAverage as u32, 1);
}

// ============================================================
// 编码器初始化 (模拟工具箱)
// ============================================================

mod with_mock {
    use std::sync::Arc;

    use qiao_core::SampleFormat;

    use super::*;
    use crate::toolbox::mock::{MockConfig, MockToolbox, esds_cookie};
    use crate::toolbox::{ChannelLayoutTag, PropertyValue};

    fn params(layout: ChannelLayout, flags: CodecFlags) -> CodecParameters {
        let mut params = CodecParameters::audio(
            CodecId::Aac,
            AudioCodecParams {
                sample_rate: 48000,
                channel_layout: layout,
                sample_format: SampleFormat::S16,
                frame_size: 0,
                bits_per_raw_sample: 0,
            },
        );
        params.flags = flags;
        params
    }

    fn encoder(toolbox: &Arc<MockToolbox>, options: AacEncoderOptions) -> AacEncoder {
        AacEncoder::with_options(toolbox.clone(), options)
    }

    #[test]
    fn test_open_sets_properties_in_order() {
        let toolbox = Arc::new(MockToolbox::new());
        let mut enc = encoder(&toolbox, AacEncoderOptions::default());
        let mut params = params(ChannelLayout::STEREO, CodecFlags::GLOBAL_HEADER);
        enc.open(&mut params).unwrap();

        let state = toolbox.state();
        let ids: Vec<PropertyId> = state.properties.iter().map(|(id, _)| *id).collect();
        assert_eq!(
            ids,
            vec![
                PropertyId::INPUT_CHANNEL_LAYOUT,
                PropertyId::OUTPUT_CHANNEL_LAYOUT,
                PropertyId::CHANNEL_MAP,
                PropertyId::BIT_RATE_CONTROL_MODE,
                PropertyId::CODEC_QUALITY,
                PropertyId::SOUND_QUALITY_FOR_VBR,
                PropertyId::MINIMUM_DELAY_MODE,
            ]
        );
        assert_eq!(
            state.last_property(PropertyId::CODEC_QUALITY),
            Some(&PropertyValue::U32(0x7F))
        );
        assert_eq!(
            state.last_property(PropertyId::SOUND_QUALITY_FOR_VBR),
            Some(&PropertyValue::U32(96))
        );
        assert_eq!(
            state.output_desc.map(|d| d.format_id),
            Some(FormatId::MPEG4_AAC)
        );
        drop(state);

        // 立体声直接使用厂商 ASC
        assert_eq!(enc.extra_data(), &[0x11, 0x90]);
        assert_eq!(params.extra_data, vec![0x11, 0x90]);
        assert_eq!(enc.frame_size(), 1024);
        assert_eq!(params.audio_params().map(|a| a.frame_size), Some(1024));
    }

    #[test]
    fn test_open_without_global_header_has_no_extra_data() {
        let toolbox = Arc::new(MockToolbox::new());
        let mut enc = encoder(&toolbox, AacEncoderOptions::default());
        let mut params = params(ChannelLayout::STEREO, CodecFlags::empty());
        enc.open(&mut params).unwrap();
        assert!(enc.extra_data().is_empty());
    }

    #[test]
    fn test_open_5_1_rewrites_asc() {
        let toolbox = Arc::new(MockToolbox::with_config(MockConfig {
            magic_cookie: esds_cookie(&[0x11, 0xB0]),
            ..MockConfig::default()
        }));
        let mut enc = encoder(&toolbox, AacEncoderOptions::default());
        let mut params = params(ChannelLayout::SURROUND_5_1, CodecFlags::GLOBAL_HEADER);
        enc.open(&mut params).unwrap();
        assert_eq!(
            enc.extra_data(),
            &[0x11, 0x80, 0x04, 0xC8, 0x41, 0x00, 0x01, 0x08, 0x80, 0x00]
        );

        // 侧方 5.1 以后方 5.1 的位掩码查询声道映射
        let state = toolbox.state();
        assert_eq!(state.channel_map_queries.len(), 1);
        let (input, output, channels) = state.channel_map_queries[0];
        assert_eq!(input.bitmap, ChannelLayout::SURROUND_5_1_BACK.mask);
        assert_eq!(output.tag, ChannelLayoutTag::AAC_5_1);
        assert_eq!(channels, 6);
    }

    #[test]
    fn test_open_7_1_uses_explicit_map() {
        let toolbox = Arc::new(MockToolbox::new());
        let mut enc = encoder(&toolbox, AacEncoderOptions::default());
        let mut params = params(ChannelLayout::SURROUND_7_1, CodecFlags::empty());
        enc.open(&mut params).unwrap();

        let state = toolbox.state();
        assert!(state.channel_map_queries.is_empty());
        assert_eq!(
            state.last_property(PropertyId::CHANNEL_MAP),
            Some(&PropertyValue::ChannelMap(vec![2, 0, 1, 6, 7, 4, 5, 3]))
        );
    }

    #[test]
    fn test_open_extension_leaves_extra_data_untouched() {
        let toolbox = Arc::new(MockToolbox::with_config(MockConfig {
            magic_cookie: esds_cookie(&[0x2B, 0x11, 0x88, 0x00]),
            ..MockConfig::default()
        }));
        let mut enc = encoder(
            &toolbox,
            AacEncoderOptions {
                profile: AacProfile::He,
                ..AacEncoderOptions::default()
            },
        );
        let mut params = params(ChannelLayout::SURROUND_5_1, CodecFlags::GLOBAL_HEADER);
        params.extra_data = vec![0xAA];

        let err = enc.open(&mut params).unwrap_err();
        assert!(matches!(err, QiaoError::UnsupportedExtension(_)));
        assert!(enc.extra_data().is_empty());
        assert_eq!(params.extra_data, vec![0xAA]);

        let state = toolbox.state();
        assert_eq!(state.created, 1);
        assert_eq!(state.disposed, 1);
    }

    #[test]
    fn test_constant_bitrate_negotiation() {
        let options = AacEncoderOptions {
            mode: BitRateControlMode::Constant,
            ..AacEncoderOptions::default()
        };

        // 未指定码率: 读回转换器目标码率
        let toolbox = Arc::new(MockToolbox::new());
        let mut enc = encoder(&toolbox, options.clone());
        let mut p = params(ChannelLayout::STEREO, CodecFlags::empty());
        enc.open(&mut p).unwrap();
        assert_eq!(p.bit_rate, 128_000);

        // 可用码率
        let toolbox = Arc::new(MockToolbox::new());
        let mut enc = encoder(&toolbox, options.clone());
        let mut p = params(ChannelLayout::STEREO, CodecFlags::empty());
        p.bit_rate = 192_000;
        enc.open(&mut p).unwrap();
        assert_eq!(
            toolbox.state().last_property(PropertyId::ENCODE_BIT_RATE),
            Some(&PropertyValue::U32(192_000))
        );

        // 不可用码率: 错误信息列出可用码率, 转换器被释放
        let toolbox = Arc::new(MockToolbox::new());
        let mut enc = encoder(&toolbox, options);
        let mut p = params(ChannelLayout::STEREO, CodecFlags::empty());
        p.bit_rate = 100_000;
        match enc.open(&mut p) {
            Err(QiaoError::InvalidArgument(msg)) => {
                assert!(msg.contains("64k,96k,128k,192k,256k"), "{msg}");
            }
            other => panic!("意外结果: {:?}", other.map(|_| ())),
        }
        assert_eq!(toolbox.state().disposed, 1);
    }

    #[test]
    fn test_empty_bitrate_list() {
        let toolbox = Arc::new(MockToolbox::with_config(MockConfig {
            applicable_bit_rates: Vec::new(),
            ..MockConfig::default()
        }));
        let mut enc = encoder(
            &toolbox,
            AacEncoderOptions {
                mode: BitRateControlMode::LongTermAverage,
                ..AacEncoderOptions::default()
            },
        );
        let mut p = params(ChannelLayout::STEREO, CodecFlags::empty());
        p.bit_rate = 128_000;
        assert!(matches!(
            enc.open(&mut p),
            Err(QiaoError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_open_rejects_bad_inputs() {
        let toolbox = Arc::new(MockToolbox::new());

        let mut enc = encoder(&toolbox, AacEncoderOptions::default());
        let mut p = params(ChannelLayout::STEREO, CodecFlags::empty());
        if let CodecParamsType::Audio(a) = &mut p.params {
            a.sample_rate = 47000;
        }
        assert!(matches!(
            enc.open(&mut p),
            Err(QiaoError::InvalidArgument(_))
        ));
        assert_eq!(toolbox.state().created, 0);

        let mut enc = encoder(&toolbox, AacEncoderOptions::default());
        let odd = ChannelLayout::new(ChannelLayout::STEREO.mask | qiao_core::ChannelMask::BACK_CENTER);
        let mut p = params(odd, CodecFlags::empty());
        assert!(matches!(
            enc.open(&mut p),
            Err(QiaoError::UnsupportedLayout(_))
        ));
        let state = toolbox.state();
        assert_eq!(state.created, 1);
        assert_eq!(state.disposed, 1);
    }

    #[test]
    fn test_vendor_error_is_wrapped() {
        let toolbox = Arc::new(MockToolbox::with_config(MockConfig {
            failing_property: Some((
                PropertyId::MINIMUM_DELAY_MODE,
                crate::toolbox::OsStatus::PROPERTY_NOT_SUPPORTED,
            )),
            ..MockConfig::default()
        }));
        let mut enc = encoder(&toolbox, AacEncoderOptions::default());
        let mut p = params(ChannelLayout::STEREO, CodecFlags::empty());
        match enc.open(&mut p) {
            Err(QiaoError::External { call, code }) => {
                assert_eq!(call, "set_property");
                assert_eq!(code, "prop");
            }
            other => panic!("意外结果: {:?}", other.map(|_| ())),
        }
        assert_eq!(toolbox.state().disposed, 1);
    }
}
