use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub age: u8,
    #[serde(serialize_with = "serialize_millis")]
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: u64, name: String, email: String, age: u8) -> Self {
        Self {
            id,
            name,
            email,
            age,
            created_at: Utc::now(),
        }
    }
}

/// `2025-01-01T12:00:00.000Z`
fn serialize_millis<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// 待校验的用户数据，字段类型不受约束
///
/// `null` 与缺失等价。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserCandidate {
    pub name: Option<Value>,
    pub email: Option<Value>,
    pub age: Option<Value>,
}

impl UserCandidate {
    /// 从任意 JSON 值构造；非对象视为所有字段缺失
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(mut map) => Self {
                name: map.remove("name").filter(|v| !v.is_null()),
                email: map.remove("email").filter(|v| !v.is_null()),
                age: map.remove("age").filter(|v| !v.is_null()),
            },
            _ => Self::default(),
        }
    }
}

/// 通过校验的用户数据，尚未规范化
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub age: u8,
}
