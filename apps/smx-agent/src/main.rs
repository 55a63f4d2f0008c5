//! SolarMax 采集代理：轮询逆变器读数，规整后发布 MQTT 遥测。

mod bridge;

use bridge::Bridge;
use smx_config::AppConfig;
use smx_protocol::{InverterClientConfig, InverterSource, ProtocolError};
use smx_publish::{MqttPublisher, MqttPublisherConfig, NoopPublisher, Publisher};
use smx_telemetry::{init_tracing, log_metrics_summary, record_decode_failure, record_reconnect};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = AppConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();

    // 发布端：根据配置启用 MQTT 发布或空操作端
    let publisher: Arc<dyn Publisher> = if config.publish_enabled {
        let mqtt_config = MqttPublisherConfig {
            host: config.mqtt_host.clone(),
            port: config.mqtt_port,
            username: config.mqtt_username.clone(),
            password: config.mqtt_password.clone(),
            client_id: config.mqtt_client_id.clone(),
            qos: config.mqtt_qos,
        };
        info!(
            "publish sink: mqtt {}:{} topic={}",
            mqtt_config.host, mqtt_config.port, config.mqtt_topic
        );
        let (publisher, _eventloop) = MqttPublisher::connect(mqtt_config)?;
        Arc::new(publisher)
    } else {
        info!("publish sink: noop (SMX_PUBLISH=off)");
        Arc::new(NoopPublisher)
    };

    let handler = Arc::new(Bridge::new(
        publisher,
        config.mqtt_topic.clone(),
        config.merge_duplicate_fields,
    ));

    let source = InverterSource::new(InverterClientConfig {
        host: config.inverter_host.clone(),
        port: config.inverter_port,
        poll_interval_ms: config.poll_interval_ms,
        connect_timeout_ms: config.connect_timeout_ms,
        read_timeout_ms: config.read_timeout_ms,
        max_frame_bytes: config.max_frame_bytes,
    });
    info!(
        "inverter source: {}:{} interval={}ms",
        config.inverter_host, config.inverter_port, config.poll_interval_ms
    );

    if config.auto_reconnect {
        // 驻留模式：会话结束后按固定间隔重连
        loop {
            if let Err(err) = source.run(handler.clone()).await {
                if matches!(err, ProtocolError::Decode(_)) {
                    record_decode_failure();
                }
                record_reconnect();
                warn!(
                    "inverter session ended: {}, reconnect in {}ms",
                    err, config.reconnect_interval_ms
                );
            }
            log_metrics_summary();
            tokio::time::sleep(Duration::from_millis(config.reconnect_interval_ms)).await;
        }
    }

    let result = source.run(handler).await;
    log_metrics_summary();
    if let Err(err) = result {
        if matches!(err, ProtocolError::Decode(_)) {
            record_decode_failure();
        }
        error!("inverter session failed: {}", err);
        return Err(err.into());
    }
    Ok(())
}
