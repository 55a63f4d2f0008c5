//! SolarMax 逆变器轮询会话
//!
//! 主动连接逆变器，按固定间隔发送轮询请求，解码响应帧后交给回调处理。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! let config = InverterClientConfig {
//!     host: "192.168.2.1".to_string(),
//!     port: 12345,
//!     ..
//! };
//! let source = InverterSource::new(config);
//! source.run(handler).await?;
//! ```

use crate::error::{DecodeError, ProtocolError};
use crate::frame::{self, POLL_REQUEST};
use async_trait::async_trait;
use domain::RawSample;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::interval;
use tracing::{debug, info};

/// 逆变器客户端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InverterClientConfig {
    /// 逆变器主机地址
    pub host: String,
    /// 逆变器端口（默认 12345）
    #[serde(default = "default_inverter_port")]
    pub port: u16,
    /// 轮询间隔（毫秒）
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// 连接超时（毫秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
    /// 读取超时（毫秒，0 表示阻塞等待响应）
    #[serde(default)]
    pub read_timeout_ms: u64,
    /// 单帧大小上限（字节）
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

fn default_inverter_port() -> u16 {
    12345
}

fn default_poll_interval() -> u64 {
    10_000
}

fn default_connect_timeout() -> u64 {
    5000
}

fn default_max_frame_bytes() -> usize {
    4096
}

/// 解码后帧的处理回调
///
/// 回调返回错误视为致命：会话终止并关闭连接，不做周期内重试。
#[async_trait]
pub trait FrameHandler: Send + Sync {
    async fn handle(&self, samples: Vec<RawSample>) -> Result<(), ProtocolError>;
}

/// 逆变器轮询采集源
pub struct InverterSource {
    config: InverterClientConfig,
}

impl InverterSource {
    /// 创建新的逆变器源
    pub fn new(config: InverterClientConfig) -> Self {
        Self { config }
    }

    /// 从 JSON 配置字符串解析
    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        let config: InverterClientConfig =
            serde_json::from_str(json).map_err(|e| ProtocolError::ConfigParse(e.to_string()))?;
        Ok(Self::new(config))
    }

    /// 运行采集会话：连接一次，循环轮询。
    ///
    /// 连接失败、IO 错误、解码错误与回调错误都会终止会话并返回；
    /// 返回时底层连接随流一起关闭。重连策略由调用方决定。
    pub async fn run(&self, handler: Arc<dyn FrameHandler>) -> Result<(), ProtocolError> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        info!("connecting to inverter at {}", addr);

        let stream = match tokio::time::timeout(
            Duration::from_millis(self.config.connect_timeout_ms),
            TcpStream::connect(&addr),
        )
        .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                return Err(ProtocolError::Connection(format!("{}: {}", addr, e)));
            }
            Err(_) => {
                return Err(ProtocolError::Timeout(format!("connect to {}", addr)));
            }
        };

        info!("connected to inverter at {}", addr);
        self.poll_loop(stream, &handler).await
    }

    /// 轮询循环
    async fn poll_loop(
        &self,
        stream: TcpStream,
        handler: &Arc<dyn FrameHandler>,
    ) -> Result<(), ProtocolError> {
        let (mut reader, mut writer) = stream.into_split();
        let mut poll_interval = interval(Duration::from_millis(self.config.poll_interval_ms));

        loop {
            poll_interval.tick().await;

            writer.write_all(POLL_REQUEST.as_bytes()).await?;
            writer.flush().await?;
            debug!(request = %POLL_REQUEST, "sent poll request");

            let response = self.read_frame(&mut reader).await?;
            debug!(response = %response, "received response frame");

            let samples = frame::decode(&response)?;
            handler.handle(samples).await?;
        }
    }

    /// 读取一帧响应：累积读取直到出现帧结束符 `}`。
    async fn read_frame<R>(&self, reader: &mut R) -> Result<String, ProtocolError>
    where
        R: AsyncRead + Unpin,
    {
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 512];

        loop {
            let count = if self.config.read_timeout_ms > 0 {
                match tokio::time::timeout(
                    Duration::from_millis(self.config.read_timeout_ms),
                    reader.read(&mut chunk),
                )
                .await
                {
                    Ok(result) => result?,
                    Err(_) => {
                        return Err(ProtocolError::Timeout(
                            "waiting for response frame".to_string(),
                        ));
                    }
                }
            } else {
                reader.read(&mut chunk).await?
            };

            if count == 0 {
                return Err(ProtocolError::Connection(
                    "connection closed by inverter".to_string(),
                ));
            }

            buffer.extend_from_slice(&chunk[..count]);
            if chunk[..count].contains(&b'}') {
                break;
            }
            if buffer.len() > self.config.max_frame_bytes {
                return Err(ProtocolError::FrameTooLarge(buffer.len()));
            }
        }

        String::from_utf8(buffer).map_err(|e| {
            ProtocolError::Decode(DecodeError::MalformedFrame(format!(
                "frame is not valid utf-8: {}",
                e
            )))
        })
    }
}
