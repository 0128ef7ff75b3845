//! Declarative per-operation option schemas.
use crate::codes::{BorderType, ColorConversionCode, WarpFlags};

/// Closed enumeration a `Code` parameter must belong to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CodeSet {
    ColorConversion,
    Border,
    WarpFlags,
}

impl CodeSet {
    pub fn contains(self, code: i64) -> bool {
        match self {
            CodeSet::ColorConversion => ColorConversionCode::from_code(code).is_some(),
            CodeSet::Border => BorderType::from_code(code).is_some(),
            CodeSet::WarpFlags => WarpFlags::from_code(code).is_some(),
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            CodeSet::ColorConversion => "color conversion code",
            CodeSet::Border => "border type",
            CodeSet::WarpFlags => "interpolation flags",
        }
    }
}

/// Accepted value kind of an option field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    /// Any finite number.
    Number,
    /// Integral number.
    Int,
    Bool,
    Mat,
    /// `{ x, y }` or `[x, y]` with integral coordinates.
    Point,
    /// `{ width, height }` or `[width, height]`, non-negative integers.
    Size,
    Code(CodeSet),
}

impl ParamKind {
    pub fn describe(self) -> &'static str {
        match self {
            ParamKind::Number => "number",
            ParamKind::Int => "integer",
            ParamKind::Bool => "boolean",
            ParamKind::Mat => "Mat",
            ParamKind::Point => "Point2",
            ParamKind::Size => "Size",
            ParamKind::Code(set) => set.describe(),
        }
    }
}

/// Value filled in for an absent optional field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DefaultValue {
    Number(f64),
    Int(i64),
    Bool(bool),
    Point(i32, i32),
    Code(i32),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub default: Option<DefaultValue>,
}

impl ParamSpec {
    pub const fn required(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            default: None,
        }
    }

    pub const fn optional(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            default: None,
        }
    }

    pub const fn or(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }
}

/// Option-object schema of one operation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OptionSchema {
    pub operation: &'static str,
    pub params: &'static [ParamSpec],
}

impl OptionSchema {
    pub const fn new(operation: &'static str, params: &'static [ParamSpec]) -> Self {
        Self { operation, params }
    }

    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Operations without required fields may be called with no argument.
    pub fn allows_no_args(&self) -> bool {
        self.params.iter().all(|p| !p.required)
    }
}
