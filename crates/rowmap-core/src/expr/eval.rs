use super::{CmpOp, EvalContext, Expr};
use crate::{Error, Result, Value};

use std::cmp::Ordering;

impl Expr {
    /// Evaluates the expression to a value. Missing paths evaluate to
    /// `Null`.
    pub fn eval_value(&self, cx: &EvalContext<'_>) -> Result<Value> {
        match self {
            Expr::Value(value) => Ok(value.clone()),
            Expr::Path(path) => Ok(cx.resolve(path)),
            Expr::Cmp(cmp) => {
                let lhs = cmp.lhs.eval_value(cx)?;
                let rhs = cmp.rhs.eval_value(cx)?;

                let ret = match cmp.op {
                    CmpOp::Eq => values_eq(&lhs, &rhs),
                    CmpOp::Ne => !values_eq(&lhs, &rhs),
                    CmpOp::Ge => cmp_ordered(&lhs, &rhs)? != Ordering::Less,
                    CmpOp::Gt => cmp_ordered(&lhs, &rhs)? == Ordering::Greater,
                    CmpOp::Le => cmp_ordered(&lhs, &rhs)? != Ordering::Greater,
                    CmpOp::Lt => cmp_ordered(&lhs, &rhs)? == Ordering::Less,
                };
                Ok(ret.into())
            }
            Expr::And(and) => {
                debug_assert!(!and.operands.is_empty());

                for operand in &and.operands {
                    if !operand.eval_bool(cx)? {
                        return Ok(false.into());
                    }
                }

                Ok(true.into())
            }
            Expr::Or(or) => {
                debug_assert!(!or.operands.is_empty());

                for operand in &or.operands {
                    if operand.eval_bool(cx)? {
                        return Ok(true.into());
                    }
                }

                Ok(false.into())
            }
            Expr::Not(not) => Ok((!not.expr.eval_bool(cx)?).into()),
        }
    }

    /// Evaluates the expression in boolean context.
    ///
    /// Numeric truthiness applies: non-zero numeric values are true,
    /// null and missing are false.
    pub fn eval_bool(&self, cx: &EvalContext<'_>) -> Result<bool> {
        Ok(self.eval_value(cx)?.is_truthy())
    }

    /// Evaluates the expression in iteration context, yielding
    /// (index-or-key, element) pairs in source order.
    ///
    /// Lists yield their elements with integer indices; maps and
    /// objects yield their entries keyed by name; a scalar iterates as
    /// a one-element sequence. Null or missing is an error: there is
    /// nothing meaningful to iterate.
    pub fn eval_iterable(&self, cx: &EvalContext<'_>) -> Result<Vec<(Value, Value)>> {
        match self.eval_value(cx)? {
            Value::Null => Err(Error::expression(format!(
                "cannot iterate null expression `{self:?}`"
            ))),
            Value::List(items) => Ok(items
                .into_iter()
                .enumerate()
                .map(|(i, item)| (Value::I64(i as i64), item))
                .collect()),
            Value::Map(map) => Ok(map
                .into_iter()
                .map(|(key, item)| (Value::String(key), item))
                .collect()),
            Value::Object(object) => Ok(object
                .properties()
                .into_iter()
                .map(|(key, item)| (Value::String(key), item))
                .collect()),
            scalar => Ok(vec![(Value::I64(0), scalar)]),
        }
    }
}

fn values_eq(lhs: &Value, rhs: &Value) -> bool {
    if let (Some(l), Some(r)) = (lhs.as_i64(), rhs.as_i64()) {
        return l == r;
    }
    match numeric_pair(lhs, rhs) {
        Some((l, r)) => l == r,
        None => lhs == rhs,
    }
}

fn cmp_ordered(lhs: &Value, rhs: &Value) -> Result<Ordering> {
    if lhs.is_null() || rhs.is_null() {
        return Err(Error::expression(
            "ordered comparison with null is undefined",
        ));
    }

    if let (Some(l), Some(r)) = (lhs.as_i64(), rhs.as_i64()) {
        return Ok(l.cmp(&r));
    }

    if let Some((l, r)) = numeric_pair(lhs, rhs) {
        return l.partial_cmp(&r).ok_or_else(|| {
            Error::expression("ordered comparison with NaN is undefined")
        });
    }

    match (lhs, rhs) {
        (Value::String(l), Value::String(r)) => Ok(l.cmp(r)),
        (Value::Bool(l), Value::Bool(r)) => Ok(l.cmp(r)),
        _ => Err(Error::expression(format!(
            "ordered comparison between {} and {} is undefined",
            lhs.type_name(),
            rhs.type_name()
        ))),
    }
}

fn numeric_pair(lhs: &Value, rhs: &Value) -> Option<(f64, f64)> {
    Some((as_f64(lhs)?, as_f64(rhs)?))
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::I32(v) => Some(*v as f64),
        Value::I64(v) => Some(*v as f64),
        Value::F64(v) => Some(*v),
        _ => None,
    }
}
