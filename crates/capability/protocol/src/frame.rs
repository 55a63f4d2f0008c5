//! SolarMax 帧编解码
//!
//! 帧格式：
//!
//! ```text
//! {FB;01;9A|64:IDC=04E2;UL1=0906;SYS=4E28,0;...|0F66}
//! ```
//!
//! payload 位于首个 `:` 与其后首个 `|` 之间，由分号分隔的 `CODE=HEX` 令牌组成。
//! 头部与校验段原样透传，不参与解析。

use crate::error::DecodeError;
use domain::{FieldCode, RawSample, ScaleRule};

/// 固定轮询请求帧：一次请求全部字段，SYS 按设备惯例请求两次。
pub const POLL_REQUEST: &str = "{FB;01;3E|64:IDC;UL1;TKK;IL1;SYS;TNF;UDC;PAC;PRL;KT0;SYS|0F66}";

/// 解码一帧响应为原始样本序列，保持帧内顺序（含重复字段）。
///
/// 空 payload（两个分隔符相邻）解码为空序列，不视为错误。
pub fn decode(frame: &str) -> Result<Vec<RawSample>, DecodeError> {
    let colon = frame
        .find(':')
        .ok_or_else(|| DecodeError::MalformedFrame("missing ':' payload delimiter".to_string()))?;
    let rest = &frame[colon + 1..];
    let pipe = rest
        .find('|')
        .ok_or_else(|| DecodeError::MalformedFrame("missing '|' checksum delimiter".to_string()))?;
    let payload = &rest[..pipe];

    if payload.is_empty() {
        return Ok(Vec::new());
    }

    let mut samples = Vec::new();
    for token in payload.split(';') {
        let (code_str, value_str) = token.split_once('=').ok_or_else(|| {
            DecodeError::MalformedFrame(format!("token without '=': {:?}", token))
        })?;
        let code = FieldCode::parse(code_str)
            .ok_or_else(|| DecodeError::UnknownField(code_str.to_string()))?;

        // SYS 读数携带 `,0` 状态后缀，十六进制解析前截去。
        let hex = match code.rule() {
            ScaleRule::TruncateAtComma => match value_str.split_once(',') {
                Some((head, _suffix)) => head,
                None => value_str,
            },
            _ => value_str,
        };

        let raw = u32::from_str_radix(hex, 16).map_err(|_| DecodeError::MalformedHex {
            code: code_str.to_string(),
            value: value_str.to_string(),
        })?;
        samples.push(RawSample { code, raw });
    }

    Ok(samples)
}

/// 构造一帧响应（测试与模拟器用）：头部与校验段为固定占位。
pub fn encode_frame(samples: &[RawSample]) -> String {
    let mut payload = String::new();
    for (index, sample) in samples.iter().enumerate() {
        if index > 0 {
            payload.push(';');
        }
        payload.push_str(sample.code.wire_code());
        payload.push('=');
        payload.push_str(&format!("{:04X}", sample.raw));
        if sample.code.rule() == ScaleRule::TruncateAtComma {
            payload.push_str(",0");
        }
    }
    format!("{{FB;01;9A|64:{}|0F66}}", payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RESPONSE: &str = "{FB;01;9A|64:IDC=04E2;UL1=0906;TKK=002A;IL1=0064;SYS=4E28,0;TNF=1388;UDC=0DAC;PAC=0064;PRL=0032;KT0=0001;SYS=4E28,0|0F66}";

    #[test]
    fn decodes_full_response_in_frame_order() {
        let samples = decode(SAMPLE_RESPONSE).expect("decode");
        assert_eq!(samples.len(), 11);
        assert_eq!(
            samples[0],
            RawSample {
                code: FieldCode::Idc,
                raw: 0x04E2
            }
        );
        assert_eq!(
            samples[1],
            RawSample {
                code: FieldCode::Ul1,
                raw: 0x0906
            }
        );
        assert_eq!(
            samples[10],
            RawSample {
                code: FieldCode::Sys,
                raw: 0x4E28
            }
        );

        let sys_count = samples
            .iter()
            .filter(|sample| sample.code == FieldCode::Sys)
            .count();
        assert_eq!(sys_count, 2);
    }

    #[test]
    fn sys_reading_truncates_at_comma() {
        let samples = decode("{FB;01;9A|64:SYS=4E28,0|0F66}").expect("decode");
        assert_eq!(
            samples,
            vec![RawSample {
                code: FieldCode::Sys,
                raw: 20008
            }]
        );
    }

    #[test]
    fn sys_reading_without_comma_parses_whole_value() {
        let samples = decode("{FB;01;9A|64:SYS=4E28|0F66}").expect("decode");
        assert_eq!(samples[0].raw, 0x4E28);
    }

    #[test]
    fn empty_payload_decodes_to_empty_record() {
        let samples = decode("{FB;01;9A|64:|0F66}").expect("decode");
        assert!(samples.is_empty());
    }

    #[test]
    fn missing_colon_is_malformed() {
        let err = decode("{FB;01;9A|64 IDC=04E2|0F66}").unwrap_err();
        assert!(matches!(err, DecodeError::MalformedFrame(_)));
    }

    #[test]
    fn missing_pipe_after_payload_is_malformed() {
        let err = decode("{FB;01;9A|64:IDC=04E2}").unwrap_err();
        assert!(matches!(err, DecodeError::MalformedFrame(_)));
    }

    #[test]
    fn token_without_equals_is_malformed() {
        let err = decode("{FB;01;9A|64:IDC|0F66}").unwrap_err();
        assert!(matches!(err, DecodeError::MalformedFrame(_)));
    }

    #[test]
    fn unknown_field_code_fails_decoding() {
        let err = decode("{FB;01;9A|64:XXX=0001|0F66}").unwrap_err();
        assert_eq!(err, DecodeError::UnknownField("XXX".to_string()));
    }

    #[test]
    fn known_code_with_bad_hex_fails_decoding() {
        let err = decode("{FB;01;9A|64:IDC=ZZZZ|0F66}").unwrap_err();
        assert_eq!(
            err,
            DecodeError::MalformedHex {
                code: "IDC".to_string(),
                value: "ZZZZ".to_string()
            }
        );
    }

    #[test]
    fn lowercase_hex_is_accepted() {
        let samples = decode("{FB;01;9A|64:PAC=00ff|0F66}").expect("decode");
        assert_eq!(samples[0].raw, 255);
    }

    #[test]
    fn encode_round_trips_through_decode() {
        let samples = vec![
            RawSample {
                code: FieldCode::Pac,
                raw: 100,
            },
            RawSample {
                code: FieldCode::Sys,
                raw: 0x4E28,
            },
        ];
        let frame = encode_frame(&samples);
        assert!(frame.contains("SYS=4E28,0"));
        assert_eq!(decode(&frame).expect("decode"), samples);
    }

    #[test]
    fn poll_request_covers_every_field_with_sys_twice() {
        for code in FieldCode::ALL {
            assert!(POLL_REQUEST.contains(code.wire_code()));
        }
        assert_eq!(POLL_REQUEST.matches("SYS").count(), 2);
    }
}
