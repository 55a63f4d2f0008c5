use crate::fields::FieldCode;

/// 解码后的原始样本：一个字段码与其未缩放的整数读数。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    pub code: FieldCode,
    pub raw: u32,
}

/// 样本值的数据类型。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleValue {
    I64(i64),
    F64(f64),
}

/// 缩放后的具名样本，按解码顺序进入遥测文档。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointSample {
    pub name: &'static str,
    pub value: SampleValue,
}
