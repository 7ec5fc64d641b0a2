//! MPEG-4 ES 描述符解析.
//!
//! AAC 转换器的 magic cookie 是一串嵌套描述符:
//! ES_Descriptor(0x03) → DecoderConfigDescriptor(0x04) → DecoderSpecificInfo(0x05),
//! 最内层的负载就是 AudioSpecificConfig.
//!
//! 描述符头为 1 字节 tag 加 1~4 字节长度, 长度每字节低 7 位有效, 最高位为续标志.

use log::trace;
use qiao_core::{QiaoError, QiaoResult};

/// ES_Descriptor
pub const ES_DESCR_TAG: u8 = 0x03;
/// DecoderConfigDescriptor
pub const DEC_CONFIG_DESCR_TAG: u8 = 0x04;
/// DecoderSpecificInfo
pub const DEC_SPECIFIC_DESCR_TAG: u8 = 0x05;

/// DecoderConfigDescriptor 固定字段: objectType(1) + streamType(1) + bufferSizeDB(3)
/// + maxBitrate(4) + avgBitrate(4)
const DEC_CONFIG_FIXED_BYTES: usize = 13;

/// 按字节前进的描述符游标
struct DescrCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> DescrCursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn read_u8(&mut self) -> QiaoResult<u8> {
        let b = *self
            .data
            .get(self.pos)
            .ok_or_else(|| truncated(self.pos))?;
        self.pos += 1;
        Ok(b)
    }

    fn skip(&mut self, n: usize) -> QiaoResult<()> {
        if self.data.len() - self.pos < n {
            return Err(truncated(self.pos));
        }
        self.pos += n;
        Ok(())
    }

    fn take(&mut self, n: usize) -> QiaoResult<&'a [u8]> {
        if self.data.len() - self.pos < n {
            return Err(truncated(self.pos));
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// 读取描述符头, 返回 (tag, 负载长度)
    fn read_descr(&mut self) -> QiaoResult<(u8, usize)> {
        let tag = self.read_u8()?;
        let mut len = 0usize;
        for _ in 0..4 {
            let b = self.read_u8()?;
            len = (len << 7) | usize::from(b & 0x7F);
            if b & 0x80 == 0 {
                break;
            }
        }
        Ok((tag, len))
    }
}

fn truncated(pos: usize) -> QiaoError {
    QiaoError::MalformedConfig(format!("描述符在偏移 {} 处被截断", pos))
}

/// 从 magic cookie 中取出 AudioSpecificConfig
///
/// 外层描述符为 ES_Descriptor 时, 在 2 字节 ES_ID 之后还要跳过 1 字节优先级.
/// 外层之后必须依次是 0x04 与 0x05 描述符, 否则返回 `MalformedConfig`.
pub fn extract_audio_specific_config(cookie: &[u8]) -> QiaoResult<Vec<u8>> {
    let mut cur = DescrCursor::new(cookie);

    let (tag, _) = cur.read_descr()?;
    cur.skip(2)?;
    if tag == ES_DESCR_TAG {
        cur.skip(1)?;
    }

    let (tag, _) = cur.read_descr()?;
    if tag != DEC_CONFIG_DESCR_TAG {
        return Err(QiaoError::MalformedConfig(format!(
            "期望 DecoderConfigDescriptor (0x04), 实际 tag=0x{:02X}",
            tag,
        )));
    }
    cur.skip(DEC_CONFIG_FIXED_BYTES)?;

    let (tag, len) = cur.read_descr()?;
    if tag != DEC_SPECIFIC_DESCR_TAG {
        return Err(QiaoError::MalformedConfig(format!(
            "期望 DecoderSpecificInfo (0x05), 实际 tag=0x{:02X}",
            tag,
        )));
    }
    let asc = cur.take(len)?;
    trace!("magic cookie 中的 ASC: {:02X?}", asc);
    Ok(asc.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 厂商实际输出的形式: 长度字段使用 4 字节续位编码
    const COOKIE_LONG_LENGTHS: [u8; 39] = [
        0x03, 0x80, 0x80, 0x80, 0x22, 0x00, 0x00, 0x00, // ES_Descriptor
        0x04, 0x80, 0x80, 0x80, 0x14, 0x40, 0x15, 0x00, 0x18, 0x00, // DecoderConfig
        0x00, 0x01, 0xF4, 0x00, 0x00, 0x01, 0xF4, 0x00, //
        0x05, 0x80, 0x80, 0x80, 0x02, 0x11, 0x90, // DecoderSpecificInfo
        0x06, 0x80, 0x80, 0x80, 0x01, 0x02, // SLConfig
    ];

    #[test]
    fn test_extract_with_multibyte_lengths() {
        let asc = extract_audio_specific_config(&COOKIE_LONG_LENGTHS).unwrap();
        assert_eq!(asc, vec![0x11, 0x90]);
    }

    #[test]
    fn test_extract_without_es_descriptor_priority() {
        // 外层不是 0x03 时不跳过优先级字节
        let cookie = [
            0x0E, 0x14, 0x00, 0x01, // 外层: tag + 长度 + 2 字节 ID
            0x04, 0x11, 0x40, 0x15, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, //
            0x05, 0x02, 0x12, 0x10,
        ];
        let asc = extract_audio_specific_config(&cookie).unwrap();
        assert_eq!(asc, vec![0x12, 0x10]);
    }

    #[test]
    fn test_missing_decoder_specific_tag() {
        let mut cookie = COOKIE_LONG_LENGTHS;
        cookie[26] = 0x06;
        assert!(matches!(
            extract_audio_specific_config(&cookie),
            Err(QiaoError::MalformedConfig(_))
        ));
    }

    #[test]
    fn test_wrong_decoder_config_tag() {
        let mut cookie = COOKIE_LONG_LENGTHS;
        cookie[8] = 0x05;
        assert!(matches!(
            extract_audio_specific_config(&cookie),
            Err(QiaoError::MalformedConfig(_))
        ));
    }

    #[test]
    fn test_truncated_cookie() {
        for len in [0, 3, 10, 27, 32] {
            assert!(
                matches!(
                    extract_audio_specific_config(&COOKIE_LONG_LENGTHS[..len]),
                    Err(QiaoError::MalformedConfig(_))
                ),
                "长度 {} 应当报告截断",
                len,
            );
        }
    }
}
