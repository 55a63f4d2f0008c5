//! 遥测文档渲染与 MQTT 上行发布。

use async_trait::async_trait;
use domain::{PointSample, SampleValue};
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{info, warn};

/// 发布链路错误。
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("mqtt client disconnected")]
    Disconnected,
    #[error("publish error: {0}")]
    Publish(String),
}

/// 遥测文档发布器抽象。
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, topic: &str, payload: String) -> Result<(), PublishError>;
}

/// 空发布器（干跑模式：只记录日志，不出网）。
#[derive(Debug, Default)]
pub struct NoopPublisher;

#[async_trait]
impl Publisher for NoopPublisher {
    async fn publish(&self, topic: &str, payload: String) -> Result<(), PublishError> {
        info!(
            target: "smx.publish",
            topic = %topic,
            payload_size = payload.len(),
            "publish_skipped_noop"
        );
        Ok(())
    }
}

/// MQTT 发布器配置。
#[derive(Debug, Clone)]
pub struct MqttPublisherConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// 未指定时生成随机后缀的客户端 ID，避免同 broker 上的会话互踢。
    pub client_id: Option<String>,
    pub qos: u8,
}

/// MQTT 发布器实现。
#[derive(Clone)]
pub struct MqttPublisher {
    client: AsyncClient,
    qos: QoS,
    connected: Arc<AtomicBool>,
}

impl MqttPublisher {
    /// 建立客户端并启动事件循环任务。
    ///
    /// 事件循环驱动网络连接并维护连接状态标记；代理不可达时后续
    /// 发布调用立即失败，而不是静默排队。
    pub fn connect(
        config: MqttPublisherConfig,
    ) -> Result<(Self, tokio::task::JoinHandle<()>), PublishError> {
        let client_id = config
            .client_id
            .unwrap_or_else(|| format!("smx-agent-{}", uuid::Uuid::new_v4()));
        let mut options = MqttOptions::new(client_id, config.host, config.port);
        options.set_keep_alive(Duration::from_secs(30));
        if let (Some(username), Some(password)) = (config.username, config.password) {
            options.set_credentials(username, password);
        }
        let (client, mut eventloop) = AsyncClient::new(options, 10);

        // 初始按已连接处理：首个 ConnAck 前的发布先入队，由事件循环接续投递。
        let connected = Arc::new(AtomicBool::new(true));
        let state = connected.clone();
        let handle = tokio::spawn(async move {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        state.store(true, Ordering::Relaxed);
                        info!(target: "smx.publish", "mqtt broker connected");
                    }
                    Ok(_) => {}
                    Err(err) => {
                        state.store(false, Ordering::Relaxed);
                        warn!(target: "smx.publish", "mqtt eventloop error: {}", err);
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        });

        Ok((
            Self {
                client,
                qos: qos_from_u8(config.qos),
                connected,
            },
            handle,
        ))
    }
}

#[async_trait]
impl Publisher for MqttPublisher {
    async fn publish(&self, topic: &str, payload: String) -> Result<(), PublishError> {
        if !self.connected.load(Ordering::Relaxed) {
            return Err(PublishError::Disconnected);
        }
        info!(
            target: "smx.publish",
            topic = %topic,
            payload_size = payload.len(),
            "telemetry_publish"
        );
        self.client
            .publish(topic, self.qos, false, payload.into_bytes())
            .await
            .map_err(|err| PublishError::Publish(err.to_string()))?;
        Ok(())
    }
}

/// 将规范化样本渲染为遥测文档。
///
/// 布局逐字节兼容既有订阅方的解析器：`{ "d": { "name" : value,... } }`，
/// 键值间为 `" : "`，条目间单个逗号，无尾随逗号。重复字段默认原样重复
/// 输出；merge_duplicates 开启时仅保留首次出现，文档可被严格 JSON
/// 解析器接受。
pub fn render_envelope(samples: &[PointSample], merge_duplicates: bool) -> String {
    let mut out = String::from("{ \"d\": { ");
    let mut seen: Vec<&'static str> = Vec::new();
    let mut first = true;

    for sample in samples {
        if merge_duplicates {
            if seen.contains(&sample.name) {
                continue;
            }
            seen.push(sample.name);
        }
        if !first {
            out.push(',');
        }
        out.push('"');
        out.push_str(sample.name);
        out.push_str("\" : ");
        push_value(&mut out, sample.value);
        first = false;
    }

    out.push_str("} }");
    out
}

fn push_value(out: &mut String, value: SampleValue) {
    match value {
        SampleValue::I64(v) => out.push_str(&v.to_string()),
        // 整数值的浮点字段仍带一位小数（如 50.0），与字段类型保持一致。
        SampleValue::F64(v) if v.fract() == 0.0 => out.push_str(&format!("{:.1}", v)),
        SampleValue::F64(v) => out.push_str(&v.to_string()),
    }
}

fn qos_from_u8(value: u8) -> QoS {
    match value {
        0 => QoS::AtMostOnce,
        1 => QoS::AtLeastOnce,
        2 => QoS::ExactlyOnce,
        _ => QoS::AtLeastOnce,
    }
}
