//! 统一错误类型定义.
//!
//! 所有 Qiao crate 共用的错误类型, 支持跨模块传播.
//! 厂商转换器返回的错误码统一包装为 `External`, 保留失败调用名与状态码便于诊断.

use thiserror::Error;

use crate::channel_layout::ChannelMask;

/// Qiao 统一错误类型
#[derive(Debug, Error)]
pub enum QiaoError {
    /// 无效参数
    #[error("无效参数: {0}")]
    InvalidArgument(String),

    /// 不支持的操作
    #[error("不支持的操作: {0}")]
    Unsupported(String),

    /// 编解码器错误
    #[error("编解码器错误: {0}")]
    Codec(String),

    /// 声道位掩码没有对应的厂商布局, 不做任何回退
    #[error("不支持的声道布局: 0x{:X}", .0.bits())]
    UnsupportedLayout(ChannelMask),

    /// ASC 中出现扩展对象类型或扩展采样率, 明确不支持
    #[error("不支持的 ASC 扩展: {0}")]
    UnsupportedExtension(String),

    /// magic cookie 描述符结构不符合预期
    #[error("配置数据格式错误: {0}")]
    MalformedConfig(String),

    /// 外部转换器违反单次调用单包约定 (转换器或格式协商存在缺陷)
    #[error("转换器约定被违反: {0}")]
    ContractViolation(String),

    /// 厂商转换器或格式数据库调用失败
    #[error("外部调用失败: {call} 返回 '{code}'")]
    External {
        /// 失败的调用名
        call: &'static str,
        /// 渲染后的状态码 (四字符码或十六进制)
        code: String,
    },

    /// 数据不足, 需要更多输入
    #[error("数据不足, 需要更多输入")]
    NeedMoreData,

    /// 已到达流末尾
    #[error("已到达流末尾")]
    Eof,

    /// 内存分配失败
    #[error("内存分配失败: {0}")]
    OutOfMemory(String),

    /// 未找到指定的编解码器
    #[error("未找到编解码器: {0}")]
    CodecNotFound(String),

    /// 无效数据 (损坏的码流等)
    #[error("无效数据: {0}")]
    InvalidData(String),
}

/// Qiao 统一 Result 类型
pub type QiaoResult<T> = Result<T, QiaoError>;
