//! 原始读数规范化：按字段表缩放为工程值。

use domain::{FieldCode, PointSample, RawSample, SampleValue, ScaleRule};

/// 按字段缩放规则将原始读数转换为工程值。
///
/// 整数规则保持 I64，除法规则输出 F64，类型随字段固定。
pub fn scale(code: FieldCode, raw: u32) -> SampleValue {
    match code.rule() {
        ScaleRule::Halve => SampleValue::F64(raw as f64 / 2.0),
        ScaleRule::DivideBy10 => SampleValue::F64(raw as f64 / 10.0),
        ScaleRule::DivideBy100 => SampleValue::F64(raw as f64 / 100.0),
        ScaleRule::Identity | ScaleRule::TruncateAtComma => SampleValue::I64(raw as i64),
    }
}

/// 将解码后的原始样本整体规范化，保持输入顺序（含重复字段）。
pub fn normalize_record(samples: &[RawSample]) -> Vec<PointSample> {
    samples
        .iter()
        .map(|sample| PointSample {
            name: sample.code.canonical_name(),
            value: scale(sample.code, sample.raw),
        })
        .collect()
}
