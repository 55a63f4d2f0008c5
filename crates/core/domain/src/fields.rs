//! 字段表：SolarMax 字段码、规范名与缩放规则。

/// SolarMax 轮询字段码（闭集）。
///
/// 帧中出现表外字段码视为解码错误，不做静默跳过。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldCode {
    /// 直流电流 (IDC)
    Idc,
    /// 一相电压 (UL1)
    Ul1,
    /// 机内温度 (TKK)
    Tkk,
    /// 一相电流 (IL1)
    Il1,
    /// 系统状态 (SYS)
    Sys,
    /// 电网频率 (TNF)
    Tnf,
    /// 直流电压 (UDC)
    Udc,
    /// 输出功率 (PAC)
    Pac,
    /// 相对输出 (PRL)
    Prl,
    /// 累计发电量 (KT0)
    Kt0,
}

/// 原始读数到工程值的缩放规则。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleRule {
    /// 原样输出（整数）。
    Identity,
    /// 除以 2（浮点）。
    Halve,
    /// 除以 10（浮点）。
    DivideBy10,
    /// 除以 100（浮点）。
    DivideBy100,
    /// 解析十六进制前先截去首个逗号及其后缀，数值本身原样输出（整数）。
    TruncateAtComma,
}

/// 字段描述子：字段码、遥测文档中的规范名与缩放规则。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub code: FieldCode,
    pub canonical_name: &'static str,
    pub rule: ScaleRule,
}

/// 全量字段表。条目顺序必须与 `FieldCode` 声明顺序一致（按判别值索引）。
pub static DESCRIPTORS: [FieldDescriptor; 10] = [
    FieldDescriptor {
        code: FieldCode::Idc,
        canonical_name: "dc_current",
        rule: ScaleRule::DivideBy100,
    },
    FieldDescriptor {
        code: FieldCode::Ul1,
        canonical_name: "voltage_phase1",
        rule: ScaleRule::DivideBy10,
    },
    FieldDescriptor {
        code: FieldCode::Tkk,
        canonical_name: "inverter_temp",
        rule: ScaleRule::Identity,
    },
    FieldDescriptor {
        code: FieldCode::Il1,
        canonical_name: "current_phase1",
        rule: ScaleRule::Identity,
    },
    FieldDescriptor {
        code: FieldCode::Sys,
        canonical_name: "sys",
        rule: ScaleRule::TruncateAtComma,
    },
    FieldDescriptor {
        code: FieldCode::Tnf,
        canonical_name: "frequency",
        rule: ScaleRule::DivideBy100,
    },
    FieldDescriptor {
        code: FieldCode::Udc,
        canonical_name: "dc_voltage",
        rule: ScaleRule::DivideBy10,
    },
    FieldDescriptor {
        code: FieldCode::Pac,
        canonical_name: "power_output",
        rule: ScaleRule::Halve,
    },
    FieldDescriptor {
        code: FieldCode::Prl,
        canonical_name: "relative_output",
        rule: ScaleRule::Identity,
    },
    FieldDescriptor {
        code: FieldCode::Kt0,
        canonical_name: "total_yield",
        rule: ScaleRule::Identity,
    },
];

impl FieldCode {
    /// 全部字段码，按声明顺序。
    pub const ALL: [FieldCode; 10] = [
        FieldCode::Idc,
        FieldCode::Ul1,
        FieldCode::Tkk,
        FieldCode::Il1,
        FieldCode::Sys,
        FieldCode::Tnf,
        FieldCode::Udc,
        FieldCode::Pac,
        FieldCode::Prl,
        FieldCode::Kt0,
    ];

    /// 线上帧中的字段码字面量。
    pub const fn wire_code(self) -> &'static str {
        match self {
            FieldCode::Idc => "IDC",
            FieldCode::Ul1 => "UL1",
            FieldCode::Tkk => "TKK",
            FieldCode::Il1 => "IL1",
            FieldCode::Sys => "SYS",
            FieldCode::Tnf => "TNF",
            FieldCode::Udc => "UDC",
            FieldCode::Pac => "PAC",
            FieldCode::Prl => "PRL",
            FieldCode::Kt0 => "KT0",
        }
    }

    /// 按帧中字面量解析字段码。大小写敏感，表外返回 None。
    pub fn parse(code: &str) -> Option<FieldCode> {
        match code {
            "IDC" => Some(FieldCode::Idc),
            "UL1" => Some(FieldCode::Ul1),
            "TKK" => Some(FieldCode::Tkk),
            "IL1" => Some(FieldCode::Il1),
            "SYS" => Some(FieldCode::Sys),
            "TNF" => Some(FieldCode::Tnf),
            "UDC" => Some(FieldCode::Udc),
            "PAC" => Some(FieldCode::Pac),
            "PRL" => Some(FieldCode::Prl),
            "KT0" => Some(FieldCode::Kt0),
            _ => None,
        }
    }

    /// 该字段的描述子。
    pub fn descriptor(self) -> FieldDescriptor {
        DESCRIPTORS[self as usize]
    }

    /// 遥测文档中的规范字段名。
    pub fn canonical_name(self) -> &'static str {
        self.descriptor().canonical_name
    }

    /// 该字段的缩放规则。
    pub fn rule(self) -> ScaleRule {
        self.descriptor().rule
    }

    /// 按规范名反查字段码。
    pub fn from_canonical_name(name: &str) -> Option<FieldCode> {
        DESCRIPTORS
            .iter()
            .find(|descriptor| descriptor.canonical_name == name)
            .map(|descriptor| descriptor.code)
    }
}
