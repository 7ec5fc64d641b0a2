//! 编码器 trait 定义.
//!
//! 所有编码器实现必须实现 `Encoder` trait.

use qiao_core::QiaoResult;

use crate::codec_id::CodecId;
use crate::codec_parameters::CodecParameters;
use crate::frame::AudioFrame;
use crate::packet::Packet;

/// 编码器 trait
///
/// 编码流程:
/// 1. 调用 `open()` 配置编码器, 之后可通过 `extra_data()` 取得带外配置
/// 2. 调用 `send_frame()` 送入一帧 PCM 数据
/// 3. 调用 `receive_packet()` 取出压缩数据包
/// 4. 送入 None 表示编码结束, 反复取包直到返回 `Eof`
pub trait Encoder: Send {
    /// 获取编码器标识
    fn codec_id(&self) -> CodecId;

    /// 获取编码器名称
    fn name(&self) -> &str;

    /// 使用参数配置编码器
    ///
    /// 协商后的参数 (如实际码率) 会写回 `params`.
    fn open(&mut self, params: &mut CodecParameters) -> QiaoResult<()>;

    /// 送入一帧原始数据进行编码
    ///
    /// # 参数
    /// - `frame`: 原始帧数据. `None` 表示进入排空阶段.
    ///
    /// # 返回
    /// - `Ok(())`: 帧已接受
    /// - `Err(QiaoError::NeedMoreData)`: 上一个数据包尚未取出
    fn send_frame(&mut self, frame: Option<&AudioFrame>) -> QiaoResult<()>;

    /// 从编码器取出一个压缩数据包
    ///
    /// # 返回
    /// - `Ok(packet)`: 成功取出一个数据包
    /// - `Err(QiaoError::NeedMoreData)`: 需要送入更多帧
    /// - `Err(QiaoError::Eof)`: 所有数据包已取出
    fn receive_packet(&mut self) -> QiaoResult<Packet>;

    /// 带外解码器配置 (open 之后有效, 未生成时为空)
    fn extra_data(&self) -> &[u8];

    /// 每帧采样数 (open 之后有效)
    fn frame_size(&self) -> u32;

    /// 丢弃尚未取出的数据包
    ///
    /// 编码器开始排空之后不能重新开始, 之后送入的帧返回错误.
    fn flush(&mut self);
}
