//! Property values and CloudFormation intrinsic functions.
//!
//! [`Expr`] is the value type of every resource property. Besides plain
//! scalars, lists and maps it models the intrinsics the stacks need, and it
//! knows which logical ids it references so the stack can derive implicit
//! dependency edges from property values.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};

/// Prefix shared by all CloudFormation pseudo parameters.
const PSEUDO_PREFIX: &str = "AWS::";

/// A property value, possibly containing intrinsic functions.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal string
    Str(String),
    /// Literal integer
    Int(i64),
    /// Literal boolean
    Bool(bool),
    /// List of values
    List(Vec<Expr>),
    /// Ordered key/value object
    Map(IndexMap<String, Expr>),
    /// `Ref` to a resource, parameter or pseudo parameter
    Ref(String),
    /// `Fn::GetAtt` on a resource attribute
    GetAtt(String, String),
    /// `Fn::Join` with a delimiter
    Join(String, Vec<Expr>),
    /// `Fn::Select` by index
    Select(usize, Box<Expr>),
    /// `Fn::GetAZs` for the current region
    GetAzs,
    /// `Fn::FindInMap` with a computed top-level key
    FindInMap(String, Box<Expr>, String),
    /// `Fn::Base64`
    Base64(Box<Expr>),
}

impl Expr {
    /// Literal string value.
    pub fn str(value: impl Into<String>) -> Self {
        Expr::Str(value.into())
    }

    /// `Ref` to a logical id.
    pub fn reference(logical_id: impl Into<String>) -> Self {
        Expr::Ref(logical_id.into())
    }

    /// `Fn::GetAtt` on a logical id.
    pub fn get_att(logical_id: impl Into<String>, attribute: impl Into<String>) -> Self {
        Expr::GetAtt(logical_id.into(), attribute.into())
    }

    /// The `AWS::Region` pseudo parameter.
    pub fn region() -> Self {
        Expr::Ref(format!("{PSEUDO_PREFIX}Region"))
    }

    /// Availability zone `index` of the deployment region.
    pub fn availability_zone(index: usize) -> Self {
        Expr::Select(index, Box::new(Expr::GetAzs))
    }

    /// Build a map from key/value pairs.
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Expr)>) -> Self {
        Expr::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build a CloudFormation tag list.
    pub fn tags(tags: &[(&str, &str)]) -> Self {
        Expr::List(
            tags.iter()
                .map(|(key, value)| {
                    Expr::map([("Key", Expr::str(*key)), ("Value", Expr::str(*value))])
                })
                .collect(),
        )
    }

    /// Get the string value of a literal.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Expr::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get the boolean value of a literal.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Expr::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the items of a list.
    pub fn as_list(&self) -> Option<&[Expr]> {
        match self {
            Expr::List(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a key in a map value.
    pub fn get(&self, key: &str) -> Option<&Expr> {
        match self {
            Expr::Map(entries) => entries.get(key),
            _ => None,
        }
    }

    /// Mutable lookup of a key in a map value.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Expr> {
        match self {
            Expr::Map(entries) => entries.get_mut(key),
            _ => None,
        }
    }

    /// The logical id this value points at, if it is a `Ref` or `Fn::GetAtt`.
    pub fn target(&self) -> Option<&str> {
        match self {
            Expr::Ref(id) if !id.starts_with(PSEUDO_PREFIX) => Some(id),
            Expr::GetAtt(id, _) => Some(id),
            _ => None,
        }
    }

    /// Collect every logical id referenced anywhere in this value.
    pub fn collect_references(&self, out: &mut Vec<String>) {
        match self {
            Expr::Str(_) | Expr::Int(_) | Expr::Bool(_) | Expr::GetAzs => {}
            Expr::Ref(id) => {
                if !id.starts_with(PSEUDO_PREFIX) && !out.contains(id) {
                    out.push(id.clone());
                }
            }
            Expr::GetAtt(id, _) => {
                if !out.contains(id) {
                    out.push(id.clone());
                }
            }
            Expr::List(items) | Expr::Join(_, items) => {
                for item in items {
                    item.collect_references(out);
                }
            }
            Expr::Map(entries) => {
                for value in entries.values() {
                    value.collect_references(out);
                }
            }
            Expr::Select(_, inner) | Expr::Base64(inner) | Expr::FindInMap(_, inner, _) => {
                inner.collect_references(out);
            }
        }
    }

    /// Render as CloudFormation JSON.
    pub fn to_json(&self) -> Value {
        match self {
            Expr::Str(s) => Value::String(s.clone()),
            Expr::Int(i) => json!(i),
            Expr::Bool(b) => Value::Bool(*b),
            Expr::List(items) => Value::Array(items.iter().map(Expr::to_json).collect()),
            Expr::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Expr::Ref(id) => json!({ "Ref": id }),
            Expr::GetAtt(id, attr) => json!({ "Fn::GetAtt": [id, attr] }),
            Expr::Join(sep, items) => json!({
                "Fn::Join": [sep, items.iter().map(Expr::to_json).collect::<Vec<_>>()]
            }),
            Expr::Select(index, inner) => json!({ "Fn::Select": [index, inner.to_json()] }),
            Expr::GetAzs => json!({ "Fn::GetAZs": "" }),
            Expr::FindInMap(map, key, attr) => {
                json!({ "Fn::FindInMap": [map, key.to_json(), attr] })
            }
            Expr::Base64(inner) => json!({ "Fn::Base64": inner.to_json() }),
        }
    }
}

impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Expr::Str(value.to_string())
    }
}

impl From<String> for Expr {
    fn from(value: String) -> Self {
        Expr::Str(value)
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        Expr::Bool(value)
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::Int(value)
    }
}

impl From<Vec<Expr>> for Expr {
    fn from(value: Vec<Expr>) -> Self {
        Expr::List(value)
    }
}
