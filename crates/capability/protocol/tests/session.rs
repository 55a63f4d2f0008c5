use async_trait::async_trait;
use domain::{FieldCode, RawSample};
use smx_protocol::{
    FrameHandler, InverterClientConfig, InverterSource, POLL_REQUEST, ProtocolError, encode_frame,
};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const SAMPLE_RESPONSE: &str = "{FB;01;9A|64:IDC=04E2;UL1=0906;TKK=002A;IL1=0064;SYS=4E28,0;TNF=1388;UDC=0DAC;PAC=0064;PRL=0032;KT0=0001;SYS=4E28,0|0F66}";

struct RecordingHandler {
    records: Mutex<Vec<Vec<RawSample>>>,
}

impl RecordingHandler {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl FrameHandler for RecordingHandler {
    async fn handle(&self, samples: Vec<RawSample>) -> Result<(), ProtocolError> {
        self.records.lock().expect("records lock").push(samples);
        Ok(())
    }
}

struct FailingHandler;

#[async_trait]
impl FrameHandler for FailingHandler {
    async fn handle(&self, _samples: Vec<RawSample>) -> Result<(), ProtocolError> {
        Err(ProtocolError::Handler(
            "downstream publish failed".to_string(),
        ))
    }
}

fn config_for(addr: SocketAddr) -> InverterClientConfig {
    InverterClientConfig {
        host: addr.ip().to_string(),
        port: addr.port(),
        poll_interval_ms: 10,
        connect_timeout_ms: 1_000,
        read_timeout_ms: 500,
        max_frame_bytes: 4096,
    }
}

#[tokio::test]
async fn session_polls_and_hands_decoded_frames_to_the_handler() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept");
        let mut request = vec![0u8; POLL_REQUEST.len()];
        stream.read_exact(&mut request).await.expect("request");
        stream
            .write_all(SAMPLE_RESPONSE.as_bytes())
            .await
            .expect("response");
        stream.shutdown().await.expect("shutdown");
        request
    });

    let handler = RecordingHandler::new();
    let source = InverterSource::new(config_for(addr));

    // 对端应答一帧后关闭：会话以错误结束，已交付的帧不受影响。
    let result = source.run(handler.clone()).await;
    assert!(result.is_err());

    let request = server.await.expect("server task");
    assert_eq!(request, POLL_REQUEST.as_bytes());

    let records = handler.records.lock().expect("records lock");
    assert_eq!(records.len(), 1);
    let samples = &records[0];
    assert_eq!(samples.len(), 11);
    assert_eq!(
        samples[0],
        RawSample {
            code: FieldCode::Idc,
            raw: 0x04E2
        }
    );
    assert_eq!(
        samples[4],
        RawSample {
            code: FieldCode::Sys,
            raw: 0x4E28
        }
    );
    assert_eq!(
        samples[10],
        RawSample {
            code: FieldCode::Sys,
            raw: 0x4E28
        }
    );
}

#[tokio::test]
async fn fragmented_response_is_reassembled_before_decoding() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept");
        let mut request = vec![0u8; POLL_REQUEST.len()];
        stream.read_exact(&mut request).await.expect("request");

        let frame = encode_frame(&[
            RawSample {
                code: FieldCode::Pac,
                raw: 0x0064,
            },
            RawSample {
                code: FieldCode::Sys,
                raw: 0x4E28,
            },
        ]);
        let (head, tail) = frame.split_at(frame.len() / 2);
        stream.write_all(head.as_bytes()).await.expect("head");
        stream.flush().await.expect("flush");
        tokio::time::sleep(Duration::from_millis(20)).await;
        stream.write_all(tail.as_bytes()).await.expect("tail");
        stream.shutdown().await.expect("shutdown");
    });

    let handler = RecordingHandler::new();
    let source = InverterSource::new(config_for(addr));
    let result = source.run(handler.clone()).await;
    assert!(result.is_err());
    server.await.expect("server task");

    let records = handler.records.lock().expect("records lock");
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0],
        vec![
            RawSample {
                code: FieldCode::Pac,
                raw: 0x0064
            },
            RawSample {
                code: FieldCode::Sys,
                raw: 0x4E28
            },
        ]
    );
}

#[tokio::test]
async fn malformed_frame_terminates_the_session_before_any_handling() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept");
        let mut request = vec![0u8; POLL_REQUEST.len()];
        stream.read_exact(&mut request).await.expect("request");
        stream
            .write_all(b"{FB;01;9A|64 no delimiters here}")
            .await
            .expect("response");

        // 保持连接打开，确认会话因解码错误而非对端关闭结束。
        let mut probe = [0u8; 1];
        let _ = stream.read(&mut probe).await;
    });

    let handler = RecordingHandler::new();
    let source = InverterSource::new(config_for(addr));
    let err = source.run(handler.clone()).await.unwrap_err();

    assert!(matches!(err, ProtocolError::Decode(_)));
    assert!(handler.records.lock().expect("records lock").is_empty());
    server.await.expect("server task");
}

#[tokio::test]
async fn handler_failure_is_fatal_for_the_session() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept");
        let mut request = vec![0u8; POLL_REQUEST.len()];
        stream.read_exact(&mut request).await.expect("request");
        stream
            .write_all(SAMPLE_RESPONSE.as_bytes())
            .await
            .expect("response");

        let mut probe = [0u8; 1];
        let _ = stream.read(&mut probe).await;
    });

    let source = InverterSource::new(config_for(addr));
    let err = source.run(Arc::new(FailingHandler)).await.unwrap_err();

    assert!(matches!(err, ProtocolError::Handler(_)));
    server.await.expect("server task");
}

#[tokio::test]
async fn connect_failure_is_reported_without_retry() {
    // 端口绑定后立即释放，对该地址的连接应当被拒绝。
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let handler = RecordingHandler::new();
    let source = InverterSource::new(config_for(addr));
    let err = source.run(handler.clone()).await.unwrap_err();

    assert!(matches!(
        err,
        ProtocolError::Connection(_) | ProtocolError::Timeout(_)
    ));
    assert!(handler.records.lock().expect("records lock").is_empty());
}
