//! # 协议通信能力模块
//!
//! 提供 SolarMax 逆变器数据采集能力：
//! - **帧编解码**：payload 中 `CODE=HEX` 令牌流的解析与构造
//! - **轮询会话**：主动连接逆变器，按固定间隔请求全量字段
//!
//! ## 架构设计
//!
//! ```text
//! InverterClientConfig (host/port + 轮询参数)
//!       │
//!       ▼
//! InverterSource ── POLL_REQUEST ──▶ 逆变器 (TCP)
//!       │
//!       ▼ frame::decode
//! FrameHandler (由应用注入)
//!       │
//!       ▼
//! normalize → publish
//! ```
//!
//! ## 帧格式
//!
//! ```text
//! {FB;01;9A|64:IDC=04E2;UL1=0906;SYS=4E28,0;...|0F66}
//! ```

mod error;
mod frame;
mod inverter;

pub use error::{DecodeError, ProtocolError};
pub use frame::{POLL_REQUEST, decode, encode_frame};
pub use inverter::{FrameHandler, InverterClientConfig, InverterSource};
