use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use super::models::{NewUser, User, UserCandidate};

pub const MIN_NAME_LEN: usize = 3;
pub const MIN_AGE: u8 = 1;
pub const MAX_AGE: u8 = 150;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern must compile"));

/// 单个字段的校验失败原因，Display 即返回给调用方的提示信息
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    #[error("Name is required and must be a valid string")]
    NameRequired,

    #[error("Name must be at least 3 characters long")]
    NameTooShort,

    #[error("Email is required")]
    EmailRequired,

    #[error("Invalid email")]
    EmailInvalid,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Age is required")]
    AgeRequired,

    #[error("Age must be an integer")]
    AgeNotInteger,

    #[error("Age must be between 1 and 150")]
    AgeOutOfRange,
}

/// 校验候选用户，返回按 name -> email -> age 排列的错误列表，空列表表示通过
pub fn validate(candidate: &UserCandidate, existing: &[User]) -> Vec<FieldError> {
    match check(candidate, existing) {
        Ok(_) => Vec::new(),
        Err(errors) => errors,
    }
}

/// 与 [`validate`] 规则相同，通过时返回类型化的数据
pub fn check(candidate: &UserCandidate, existing: &[User]) -> Result<NewUser, Vec<FieldError>> {
    let name = check_name(candidate.name.as_ref());
    let email = check_email(candidate.email.as_ref(), existing);
    let age = check_age(candidate.age.as_ref());

    match (name, email, age) {
        (Ok(name), Ok(email), Ok(age)) => Ok(NewUser {
            name: name.to_string(),
            email: email.to_string(),
            age,
        }),
        (name, email, age) => Err([name.err(), email.err(), age.err()]
            .into_iter()
            .flatten()
            .collect()),
    }
}

fn check_name(name: Option<&Value>) -> Result<&str, FieldError> {
    let name = match name {
        Some(Value::String(s)) => s.trim(),
        _ => return Err(FieldError::NameRequired),
    };

    if name.is_empty() {
        Err(FieldError::NameRequired)
    } else if name.chars().count() < MIN_NAME_LEN {
        Err(FieldError::NameTooShort)
    } else {
        Ok(name)
    }
}

fn check_email<'a>(email: Option<&'a Value>, existing: &[User]) -> Result<&'a str, FieldError> {
    let email = match email {
        Some(Value::String(s)) => s.trim(),
        _ => return Err(FieldError::EmailRequired),
    };

    if email.is_empty() {
        return Err(FieldError::EmailRequired);
    }
    // 格式不合法时不做重复检查
    if !EMAIL_RE.is_match(email) {
        return Err(FieldError::EmailInvalid);
    }

    let lowered = email.to_lowercase();
    if existing.iter().any(|u| u.email.to_lowercase() == lowered) {
        return Err(FieldError::EmailTaken);
    }
    Ok(email)
}

fn check_age(age: Option<&Value>) -> Result<u8, FieldError> {
    let n = match age {
        None | Some(Value::Null) => return Err(FieldError::AgeRequired),
        Some(Value::Number(n)) => n,
        Some(_) => return Err(FieldError::AgeNotInteger),
    };

    let whole = match n.as_i64() {
        Some(i) => i,
        // 超出 i64 的正整数
        None if n.is_u64() => return Err(FieldError::AgeOutOfRange),
        None => {
            let f = n.as_f64().unwrap_or(f64::NAN);
            if !f.is_finite() || f.fract() != 0.0 {
                return Err(FieldError::AgeNotInteger);
            }
            if f < f64::from(MIN_AGE) || f > f64::from(MAX_AGE) {
                return Err(FieldError::AgeOutOfRange);
            }
            f as i64
        }
    };

    u8::try_from(whole)
        .ok()
        .filter(|age| (MIN_AGE..=MAX_AGE).contains(age))
        .ok_or(FieldError::AgeOutOfRange)
}
