use serde::Deserialize;
use thiserror::Error;

use crate::http::TransportError;

// =========================================================
// 错误分类
// =========================================================

/// 错误类别
///
/// 与后端返回的状态码对应，决定调用方如何处理：
/// `Unauthorized` 在解析用户时由会话统一处理，其余在调用点提示用户。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// 网络层失败（无响应）
    Network,
    /// 401: token 缺失、过期或无效
    Unauthorized,
    /// 403: 权限不足（非超级用户访问管理接口）
    Forbidden,
    /// 404: 资源不存在
    NotFound,
    /// 409: 资源冲突
    Conflict,
    /// 400/422 或本地表单校验失败
    Validation,
    /// 5xx 及其他未预期的状态码
    Server,
    /// 响应体无法解析
    Decode,
}

impl ApiErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ApiErrorKind::Unauthorized,
            403 => ApiErrorKind::Forbidden,
            404 => ApiErrorKind::NotFound,
            409 => ApiErrorKind::Conflict,
            400 | 422 => ApiErrorKind::Validation,
            _ => ApiErrorKind::Server,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiErrorKind::Network => "NETWORK_ERROR",
            ApiErrorKind::Unauthorized => "UNAUTHORIZED",
            ApiErrorKind::Forbidden => "FORBIDDEN",
            ApiErrorKind::NotFound => "RESOURCE_NOT_FOUND",
            ApiErrorKind::Conflict => "RESOURCE_CONFLICT",
            ApiErrorKind::Validation => "INVALID_INPUT",
            ApiErrorKind::Server => "SERVER_ERROR",
            ApiErrorKind::Decode => "DECODE_ERROR",
        }
    }
}

// =========================================================
// 核心错误类型
// =========================================================

#[derive(Debug, Clone, PartialEq, Error)]
#[error("[{}] {}", .kind.error_code(), .message)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
    /// HTTP 状态码（网络错误和本地校验错误没有）
    pub status: Option<u16>,
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Network, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Unauthorized, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Validation, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Decode, message)
    }

    /// 根据非 2xx 响应构建错误
    ///
    /// FastAPI 的错误体形如 `{"detail": "..."}`，校验错误则是
    /// `{"detail": [{"msg": "..."}, ...]}`，两种都会被展开成消息文本。
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = detail_message(body).unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() || trimmed.len() > 200 {
                format!("HTTP {}", status)
            } else {
                trimmed.to_string()
            }
        });

        Self {
            kind: ApiErrorKind::from_status(status),
            message,
            status: Some(status),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ApiErrorKind::Unauthorized
    }
}

impl From<TransportError> for ApiError {
    fn from(e: TransportError) -> Self {
        ApiError::network(e.0)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Detail,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Detail {
    Text(String),
    Items(Vec<DetailItem>),
}

#[derive(Deserialize)]
struct DetailItem {
    msg: String,
}

fn detail_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        Detail::Text(text) => Some(text),
        Detail::Items(items) if !items.is_empty() => Some(
            items
                .into_iter()
                .map(|item| item.msg)
                .collect::<Vec<_>>()
                .join("; "),
        ),
        Detail::Items(_) => None,
    }
}
