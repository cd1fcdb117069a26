use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Payload;

/// Field used when a condition node does not name one.
pub const DEFAULT_CONDITION_FIELD: &str = "match_score";
/// Threshold used when a condition node does not name one.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    #[serde(rename = ">", alias = "gt")]
    Gt,
    #[serde(rename = ">=", alias = "gte")]
    Gte,
    #[serde(rename = "<", alias = "lt")]
    Lt,
    #[serde(rename = "<=", alias = "lte")]
    Lte,
    #[serde(rename = "==", alias = "eq")]
    Eq,
    #[serde(rename = "!=", alias = "ne")]
    Ne,
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "exists")]
    Exists,
}

/// Predicate a condition node evaluates against the payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionSpec {
    pub field: String,
    pub operator: CompareOp,
    pub value: Value,
}

impl Default for ConditionSpec {
    fn default() -> Self {
        Self::match_score_above(DEFAULT_MATCH_THRESHOLD)
    }
}

/// Authored form of a condition node's `data`.
///
/// Authors either spell out `field`/`operator`/`value`, or pick the
/// `matchScoreAbove` preset with a `threshold`. Anything left out falls back
/// to `match_score > 80`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthoredCondition {
    field: Option<String>,
    operator: Option<CompareOp>,
    value: Option<Value>,
    condition_type: Option<String>,
    threshold: Option<f64>,
}

impl<'de> Deserialize<'de> for ConditionSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let authored = AuthoredCondition::deserialize(deserializer)?;

        match authored.condition_type.as_deref() {
            None | Some("matchScoreAbove") => {}
            Some(other) => {
                return Err(serde::de::Error::custom(format!(
                    "unknown conditionType '{}'",
                    other
                )))
            }
        }

        if authored.condition_type.is_some() {
            return Ok(Self::match_score_above(
                authored.threshold.unwrap_or(DEFAULT_MATCH_THRESHOLD),
            ));
        }

        let default = Self::default();
        Ok(Self {
            field: authored.field.unwrap_or(default.field),
            operator: authored.operator.unwrap_or(default.operator),
            value: authored
                .value
                .or_else(|| authored.threshold.map(Value::from))
                .unwrap_or(default.value),
        })
    }
}

impl ConditionSpec {
    pub fn match_score_above(threshold: f64) -> Self {
        Self {
            field: DEFAULT_CONDITION_FIELD.to_string(),
            operator: CompareOp::Gt,
            value: Value::from(threshold),
        }
    }

    pub fn new(field: impl Into<String>, operator: CompareOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// Evaluate against a payload. A missing field, or a non-numeric field under a
    /// numeric operator, evaluates to false.
    pub fn evaluate(&self, payload: &Payload) -> bool {
        let actual = payload.get(&self.field);

        match self.operator {
            CompareOp::Exists => actual.is_some_and(|v| !v.is_null()),
            CompareOp::Eq => actual.is_some_and(|v| loosely_equal(v, &self.value)),
            CompareOp::Ne => !actual.is_some_and(|v| loosely_equal(v, &self.value)),
            CompareOp::Contains => match (actual, &self.value) {
                (Some(Value::String(s)), Value::String(needle)) => s.contains(needle.as_str()),
                (Some(Value::Array(items)), needle) => {
                    items.iter().any(|item| loosely_equal(item, needle))
                }
                _ => false,
            },
            CompareOp::Gt | CompareOp::Gte | CompareOp::Lt | CompareOp::Lte => {
                let (Some(a), Some(b)) = (actual.and_then(as_number), as_number(&self.value))
                else {
                    return false;
                };
                match self.operator {
                    CompareOp::Gt => a > b,
                    CompareOp::Gte => a >= b,
                    CompareOp::Lt => a < b,
                    _ => a <= b,
                }
            }
        }
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn loosely_equal(a: &Value, b: &Value) -> bool {
    match (as_number(a), as_number(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}
