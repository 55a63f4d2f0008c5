use smx_telemetry::{
    init_tracing, metrics, record_cycle_completed, record_cycle_latency_ms, record_decode_failure,
    record_frame_decoded, record_publish_failure, record_publish_success, record_reconnect,
};

#[test]
fn counters_accumulate() {
    init_tracing();
    // 二次初始化不应 panic（try_init 幂等）。
    init_tracing();

    let before = metrics().snapshot();

    record_frame_decoded();
    record_cycle_completed();
    record_publish_success();
    record_publish_failure();
    record_decode_failure();
    record_reconnect();
    record_cycle_latency_ms(42);
    record_cycle_latency_ms(8);

    let after = metrics().snapshot();
    assert_eq!(after.frames_decoded - before.frames_decoded, 1);
    assert_eq!(after.cycles_completed - before.cycles_completed, 1);
    assert_eq!(after.publish_success - before.publish_success, 1);
    assert_eq!(after.publish_failure - before.publish_failure, 1);
    assert_eq!(after.decode_failures - before.decode_failures, 1);
    assert_eq!(after.reconnects - before.reconnects, 1);
    assert_eq!(after.cycle_latency_ms_total - before.cycle_latency_ms_total, 50);
    assert_eq!(after.cycle_latency_ms_count - before.cycle_latency_ms_count, 2);
}
