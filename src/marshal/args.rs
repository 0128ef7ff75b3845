use super::schema::DefaultValue;
use crate::error::BindingError;
use crate::mat::Mat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: usize,
    pub height: usize,
}

impl Size {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }
}

/// Strongly-typed native call argument.
#[derive(Clone, Debug, PartialEq)]
pub enum ArgValue {
    Number(f64),
    Int(i64),
    Bool(bool),
    Mat(Mat),
    Point(Point),
    Size(Size),
    Code(i32),
}

impl From<DefaultValue> for ArgValue {
    fn from(d: DefaultValue) -> Self {
        match d {
            DefaultValue::Number(v) => ArgValue::Number(v),
            DefaultValue::Int(v) => ArgValue::Int(v),
            DefaultValue::Bool(v) => ArgValue::Bool(v),
            DefaultValue::Point(x, y) => ArgValue::Point(Point::new(x, y)),
            DefaultValue::Code(v) => ArgValue::Code(v),
        }
    }
}

/// Validated arguments with defaults applied. Mat operands are private copies
/// taken at validation time.
#[derive(Clone, Debug, PartialEq)]
pub struct MarshalledArgs {
    operation: &'static str,
    values: BTreeMap<&'static str, ArgValue>,
}

impl MarshalledArgs {
    pub(crate) fn new(operation: &'static str, values: BTreeMap<&'static str, ArgValue>) -> Self {
        Self { operation, values }
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn missing(&self, name: &str, expected: &str) -> BindingError {
        BindingError::invalid_type(name, expected)
    }

    pub fn mat(&self, name: &str) -> Result<&Mat, BindingError> {
        match self.get(name) {
            Some(ArgValue::Mat(m)) => Ok(m),
            _ => Err(self.missing(name, "Mat")),
        }
    }

    pub fn int(&self, name: &str) -> Result<i64, BindingError> {
        match self.get(name) {
            Some(ArgValue::Int(v)) => Ok(*v),
            _ => Err(self.missing(name, "integer")),
        }
    }

    pub fn number(&self, name: &str) -> Result<f64, BindingError> {
        match self.get(name) {
            Some(ArgValue::Number(v)) => Ok(*v),
            Some(ArgValue::Int(v)) => Ok(*v as f64),
            _ => Err(self.missing(name, "number")),
        }
    }

    pub fn opt_number(&self, name: &str) -> Option<f64> {
        self.number(name).ok()
    }

    pub fn point(&self, name: &str) -> Result<Point, BindingError> {
        match self.get(name) {
            Some(ArgValue::Point(p)) => Ok(*p),
            _ => Err(self.missing(name, "Point2")),
        }
    }

    pub fn opt_size(&self, name: &str) -> Option<Size> {
        match self.get(name) {
            Some(ArgValue::Size(s)) => Some(*s),
            _ => None,
        }
    }

    pub fn code(&self, name: &str) -> Result<i32, BindingError> {
        match self.get(name) {
            Some(ArgValue::Code(c)) => Ok(*c),
            _ => Err(self.missing(name, "code")),
        }
    }
}
