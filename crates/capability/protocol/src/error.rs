//! 协议错误类型定义

/// 帧解码错误
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// 帧结构错误（缺分隔符、令牌缺 `=` 等）
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// 表外字段码
    #[error("unknown field code: {0}")]
    UnknownField(String),

    /// 十六进制读数解析失败
    #[error("malformed hex value for {code}: {value}")]
    MalformedHex { code: String, value: String },
}

/// 协议通信错误
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// 连接错误
    #[error("connection error: {0}")]
    Connection(String),

    /// IO 错误
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 配置解析错误
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// 超时错误
    #[error("timeout: {0}")]
    Timeout(String),

    /// 响应累积超过单帧大小上限
    #[error("frame exceeds size limit: {0} bytes")]
    FrameTooLarge(usize),

    /// 帧解码错误
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// 回调处理错误
    #[error("handler error: {0}")]
    Handler(String),
}
