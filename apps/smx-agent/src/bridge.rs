//! 采集到发布的桥接模块
//!
//! 该模块把轮询会话解码出的原始样本接入后续链路：先按字段刻度规则
//! 规整为工程值，再渲染成遥测文档发布到 MQTT 主题，并在各环节记录
//! 运行指标。

use domain::RawSample;
use smx_normalize::normalize_record;
use smx_protocol::{FrameHandler, ProtocolError};
use smx_publish::{Publisher, render_envelope};
use smx_telemetry::{
    record_cycle_completed, record_cycle_latency_ms, record_frame_decoded, record_publish_failure,
    record_publish_success,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// 桥接处理器
///
/// 实现了 `FrameHandler` 接口，负责处理轮询会话交来的每帧原始样本。
/// 它连接了规整化（normalize）和发布（publish）两个环节。
pub struct Bridge {
    /// 发布端，负责把渲染后的遥测文档投递出去
    publisher: Arc<dyn Publisher>,
    /// 发布主题
    topic: String,
    /// 是否合并重复字段（仅保留首次出现的值）
    merge_duplicate_fields: bool,
}

impl Bridge {
    pub fn new(
        publisher: Arc<dyn Publisher>,
        topic: String,
        merge_duplicate_fields: bool,
    ) -> Self {
        Self {
            publisher,
            topic,
            merge_duplicate_fields,
        }
    }
}

#[async_trait::async_trait]
impl FrameHandler for Bridge {
    /// 处理一帧解码后的原始样本
    async fn handle(&self, samples: Vec<RawSample>) -> Result<(), ProtocolError> {
        record_frame_decoded();
        let started_at = Instant::now();

        // 1. 规整化：按字段刻度规则换算为工程值
        let points = normalize_record(&samples);

        // 2. 渲染：拼装字节级稳定的遥测文档
        let payload = render_envelope(&points, self.merge_duplicate_fields);
        info!(
            target: "smx.bridge",
            topic = %self.topic,
            samples = samples.len(),
            payload = %payload,
            "telemetry_cycle"
        );

        // 3. 发布：失败视为致命，由上层决定是否重连
        match self.publisher.publish(&self.topic, payload).await {
            Ok(()) => {
                record_publish_success();
                record_cycle_completed();
                record_cycle_latency_ms(started_at.elapsed().as_millis() as u64);
                Ok(())
            }
            Err(err) => {
                record_publish_failure();
                warn!(
                    target: "smx.bridge",
                    topic = %self.topic,
                    error = %err,
                    "telemetry_publish_failed"
                );
                Err(ProtocolError::Handler(err.to_string()))
            }
        }
    }
}
