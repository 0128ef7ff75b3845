//! Option-object validation and marshalling.
//!
//! Every operation accepts a single option object. [`validate`] interprets an
//! operation's [`OptionSchema`] against the caller's arguments: it enforces the
//! single-object convention, checks presence, kind and code membership of each
//! declared field, and fills declared defaults. All failures are
//! `InvalidArgument` and happen before any native call.
mod args;
mod schema;

pub use self::args::{ArgValue, MarshalledArgs, Point, Size};
pub use self::schema::{CodeSet, DefaultValue, OptionSchema, ParamKind, ParamSpec};

use crate::error::BindingError;
use crate::host::{HostObject, HostValue};
use log::debug;
use std::collections::BTreeMap;

/// Failure raised when the call does not consist of exactly one object.
pub fn object_required(operation: &str) -> BindingError {
    BindingError::invalid_argument(
        "args",
        "object",
        format!("{operation}: expected an object argument"),
    )
}

pub fn validate(schema: &OptionSchema, args: &[HostValue]) -> Result<MarshalledArgs, BindingError> {
    let empty = HostObject::new();
    let options = match args {
        [] if schema.allows_no_args() => &empty,
        [HostValue::Object(map)] => map,
        _ => return Err(object_required(schema.operation)),
    };

    let mut values = BTreeMap::new();
    for spec in schema.params {
        match options.get(spec.name).filter(|v| !v.is_nullish()) {
            Some(value) => {
                let arg = convert(spec, value)
                    .ok_or_else(|| BindingError::invalid_type(spec.name, spec.kind.describe()))?;
                values.insert(spec.name, arg);
            }
            None if spec.required => {
                return Err(BindingError::invalid_type(spec.name, spec.kind.describe()));
            }
            None => {
                if let Some(default) = spec.default {
                    values.insert(spec.name, ArgValue::from(default));
                }
            }
        }
    }

    for key in options.keys().filter(|k| schema.param(k).is_none()) {
        debug!("{}: ignoring unknown option '{key}'", schema.operation);
    }

    Ok(MarshalledArgs::new(schema.operation, values))
}

fn convert(spec: &ParamSpec, value: &HostValue) -> Option<ArgValue> {
    match spec.kind {
        ParamKind::Number => value
            .as_number()
            .filter(|n| n.is_finite())
            .map(ArgValue::Number),
        ParamKind::Int => value.as_integer().map(ArgValue::Int),
        ParamKind::Bool => value.as_bool().map(ArgValue::Bool),
        ParamKind::Mat => value.as_mat().map(|m| ArgValue::Mat(m.clone())),
        ParamKind::Point => {
            let (x, y) = pair(value, "x", "y")?;
            Some(ArgValue::Point(Point::new(
                i32::try_from(x).ok()?,
                i32::try_from(y).ok()?,
            )))
        }
        ParamKind::Size => {
            let (w, h) = pair(value, "width", "height")?;
            Some(ArgValue::Size(Size::new(
                usize::try_from(w).ok()?,
                usize::try_from(h).ok()?,
            )))
        }
        ParamKind::Code(set) => {
            let code = value.as_integer().filter(|&c| set.contains(c))?;
            Some(ArgValue::Code(i32::try_from(code).ok()?))
        }
    }
}

/// Two integers from `{ a, b }` or `[a, b]`.
fn pair(value: &HostValue, a: &str, b: &str) -> Option<(i64, i64)> {
    match value {
        HostValue::Array(items) if items.len() == 2 => {
            Some((items[0].as_integer()?, items[1].as_integer()?))
        }
        HostValue::Object(_) => Some((value.get(a).as_integer()?, value.get(b).as_integer()?)),
        _ => None,
    }
}
