/*
 * @Description: API 统一响应结构 {success, message, count, data, errors}
 */

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Response<T = ()>
where
    T: Serialize,
{
    /// 请求是否成功
    pub success: bool,
    /// 提示消息
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// 列表接口返回的记录数
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    /// 响应数据
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// 校验失败时的错误列表
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl<T> Response<T>
where
    T: Serialize,
{
    // 成功响应
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            count: None,
            data: Some(data),
            errors: None,
        }
    }

    // 失败响应
    pub fn failed(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(msg.into()),
            count: None,
            data: None,
            errors: None,
        }
    }

    pub fn set_message(mut self, msg: impl Into<String>) -> Self {
        self.message = Some(msg.into());
        self
    }

    pub fn set_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn set_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = Some(errors);
        self
    }
}

/// 健康检查响应
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthResp {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
    pub total_users: usize,
}
