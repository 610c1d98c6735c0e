use std::sync::Arc;

use axum::{
    body::Bytes,
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::Json,
};
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use tracing::{info, instrument, warn};

use super::response::{HealthResp, Response};
use crate::biz::{User, UserCandidate, UserRepo, UserUseCase};
use crate::data::UserRepoImpl;
use crate::error::UserError;

// 为实际使用创建类型别名
pub type UserServiceImpl = UserService<UserRepoImpl>;

#[derive(Debug)]
pub struct UserService<R>
where
    R: UserRepo,
{
    uuc: Arc<UserUseCase<R>>,
}

impl<R> Clone for UserService<R>
where
    R: UserRepo,
{
    fn clone(&self) -> Self {
        Self {
            uuc: Arc::clone(&self.uuc),
        }
    }
}

impl<R: UserRepo> UserService<R> {
    pub fn new(uuc: Arc<UserUseCase<R>>) -> Self {
        Self { uuc }
    }

    /// 获取全部用户
    #[instrument(skip(self), fields(operation = "list_users"))]
    pub async fn list_users(&self) -> Json<Response<Vec<User>>> {
        let users = self.uuc.list_users().await;
        let count = users.len();
        Json(Response::success(users).set_count(count))
    }

    /// 创建用户，非 JSON 请求、空请求体或非对象时按字段缺失处理
    #[instrument(skip(self, headers, body), fields(operation = "create_user"))]
    pub async fn create_user(
        &self,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<(StatusCode, Json<Response<User>>), UserError> {
        let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
        let candidate = parse_candidate(content_type, &body)?;

        let user = self.uuc.create_user(candidate).await.map_err(|e| {
            warn!("create user rejected: {}", e);
            e
        })?;
        info!("User registered: {} (ID: {})", user.name, user.id);

        Ok((
            StatusCode::CREATED,
            Json(Response::success(user).set_message("User registered successfully")),
        ))
    }

    /// 获取用户信息
    #[instrument(skip(self), fields(operation = "get_user"))]
    pub async fn get_user(&self, id: String) -> Result<Json<Response<User>>, UserError> {
        let user = match parse_id(&id)? {
            Some(id) => self.uuc.get_user(id).await?,
            None => return Err(UserError::NotFound(id)),
        };
        Ok(Json(Response::success(user)))
    }

    /// 删除用户
    #[instrument(skip(self), fields(operation = "delete_user"))]
    pub async fn delete_user(&self, id: String) -> Result<Json<Response<User>>, UserError> {
        let user = match parse_id(&id)? {
            Some(id) => self.uuc.delete_user(id).await?,
            None => return Err(UserError::NotFound(id)),
        };
        info!("User removed: {} (ID: {})", user.name, user.id);

        Ok(Json(
            Response::success(user).set_message("User removed successfully"),
        ))
    }

    /// 健康检查
    pub async fn health(&self) -> Json<HealthResp> {
        Json(HealthResp {
            success: true,
            message: "API is running".to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            total_users: self.uuc.count().await,
        })
    }
}

/// 非整数返回 MalformedId；负数或超出 u64 的整数不可能是已分配的 id，返回 None
fn parse_id(raw: &str) -> Result<Option<u64>, UserError> {
    let digits = raw
        .strip_prefix('-')
        .or_else(|| raw.strip_prefix('+'))
        .unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(UserError::MalformedId(raw.to_string()));
    }
    Ok(raw.parse::<u64>().ok())
}

fn is_json(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

fn parse_candidate(content_type: Option<&str>, body: &[u8]) -> Result<UserCandidate, UserError> {
    if !is_json(content_type) || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(UserCandidate::default());
    }
    let value: Value =
        serde_json::from_slice(body).map_err(|e| UserError::InvalidBody(e.to_string()))?;
    Ok(UserCandidate::from_json(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: Option<&str> = Some("application/json");

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42").unwrap(), Some(42));
        assert_eq!(parse_id("+7").unwrap(), Some(7));
        for raw in ["abc", "", "-", "1.5", "12abc", " 3"] {
            assert!(
                matches!(parse_id(raw), Err(UserError::MalformedId(_))),
                "raw = {raw:?}"
            );
        }
    }

    #[test]
    fn test_parse_id_integers_that_cannot_be_stored() {
        let raws = [
            "-1",
            "-0",
            "18446744073709551616",
            "99999999999999999999999999999999999999999",
        ];
        for raw in raws {
            assert_eq!(parse_id(raw).unwrap(), None, "raw = {raw:?}");
        }
    }

    #[test]
    fn test_parse_candidate() {
        assert_eq!(parse_candidate(JSON, b"").unwrap(), UserCandidate::default());
        assert_eq!(parse_candidate(JSON, b"  \n").unwrap(), UserCandidate::default());
        assert_eq!(parse_candidate(JSON, b"[]").unwrap(), UserCandidate::default());
        assert!(matches!(
            parse_candidate(JSON, b"{\"name\":"),
            Err(UserError::InvalidBody(_))
        ));

        let candidate = parse_candidate(JSON, br#"{"name":"Ana","age":3}"#).unwrap();
        assert_eq!(candidate.name, Some(Value::from("Ana")));
        assert_eq!(candidate.email, None);

        let candidate =
            parse_candidate(Some("Application/JSON; charset=utf-8"), br#"{"name":"Ana"}"#)
                .unwrap();
        assert_eq!(candidate.name, Some(Value::from("Ana")));
    }

    #[test]
    fn test_parse_candidate_ignores_non_json_content_type() {
        let body = br#"{"name":"Ana Silva","email":"ana@example.com","age":30}"#;
        let content_types = [
            None,
            Some("text/plain"),
            Some("application/x-www-form-urlencoded"),
        ];
        for content_type in content_types {
            assert_eq!(
                parse_candidate(content_type, body).unwrap(),
                UserCandidate::default(),
                "content_type = {content_type:?}"
            );
        }
        // 非 JSON 请求不解析，即使内容不合法也不报错
        assert_eq!(
            parse_candidate(Some("text/plain"), b"{not json").unwrap(),
            UserCandidate::default()
        );
    }
}
