//! 接口协议定义
//!
//! 每个后端接口都是一个实现了 [`ApiRequest`] 的类型，描述请求方法、路径、请求体
//! 以及响应的解析方式。标准的增删改查接口通过 [`Resource`] 泛化。

use std::fmt::Display;
use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ApiError, ApiResult};
use crate::http::HttpMethod;
use crate::models::{
    AppSetting, AppSettingPayload, AppSettingUpdate, Budget, BudgetPayload, Client, ClientPayload,
    Pool, PoolPayload, Project, ProjectPayload, RecordId, RegisterPayload, Service,
    ServicePayload, TokenResponse, User, UserUpdate,
};

// =========================================================
// 请求体与响应解析
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    Empty,
    Json(String),
    /// `application/x-www-form-urlencoded`
    Form(String),
}

impl RequestBody {
    pub fn json<T: Serialize>(value: &T) -> ApiResult<Self> {
        serde_json::to_string(value)
            .map(RequestBody::Json)
            .map_err(|e| ApiError::validation(e.to_string()))
    }

    pub fn form(fields: &[(&str, &str)]) -> Self {
        let encoded = fields
            .iter()
            .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
            .collect::<Vec<_>>()
            .join("&");
        RequestBody::Form(encoded)
    }

    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            RequestBody::Empty => None,
            RequestBody::Json(_) => Some("application/json"),
            RequestBody::Form(_) => Some("application/x-www-form-urlencoded"),
        }
    }

    pub fn into_string(self) -> Option<String> {
        match self {
            RequestBody::Empty => None,
            RequestBody::Json(s) | RequestBody::Form(s) => Some(s),
        }
    }
}

/// 百分号编码（保留 RFC 3986 的 unreserved 字符）
pub fn encode_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// 解析 JSON 响应；空响应体按 `null` 处理
pub fn decode_json<T: DeserializeOwned>(body: &str) -> ApiResult<T> {
    let body = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|e| ApiError::decode(e.to_string()))
}

/// 接口元数据：请求与响应的对应关系
pub trait ApiRequest {
    type Response;
    const METHOD: HttpMethod;

    /// 相对于 API 根地址的路径（包含查询串）
    fn path(&self) -> String;

    fn body(&self) -> ApiResult<RequestBody> {
        Ok(RequestBody::Empty)
    }

    fn decode(body: &str) -> ApiResult<Self::Response>;
}

// =========================================================
// 认证接口
// =========================================================

/// 登录，表单提交用户名和密码
#[derive(Debug, Clone)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

impl ApiRequest for TokenRequest {
    type Response = TokenResponse;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/auth/token".to_string()
    }

    fn body(&self) -> ApiResult<RequestBody> {
        Ok(RequestBody::form(&[
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
        ]))
    }

    fn decode(body: &str) -> ApiResult<Self::Response> {
        decode_json(body)
    }
}

/// 注册新账号（响应内容不使用）
impl ApiRequest for RegisterPayload {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/auth/register".to_string()
    }

    fn body(&self) -> ApiResult<RequestBody> {
        RequestBody::json(self)
    }

    fn decode(_body: &str) -> ApiResult<Self::Response> {
        Ok(())
    }
}

/// 当前登录用户
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentUserRequest;

impl ApiRequest for CurrentUserRequest {
    type Response = User;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/users/me".to_string()
    }

    fn decode(body: &str) -> ApiResult<Self::Response> {
        decode_json(body)
    }
}

// =========================================================
// 资源接口 (CRUD)
// =========================================================

/// 标准增删改查资源
pub trait Resource: Clone + DeserializeOwned + 'static {
    type Key: Display + Clone + PartialEq + 'static;
    type Payload: Serialize + 'static;
    type Update: Serialize + 'static;

    /// 列表与创建的路径
    const COLLECTION: &'static str;
    /// 单条记录路径的前缀，后接 `/{key}`
    const ITEM_PREFIX: &'static str;

    fn key(&self) -> Self::Key;

    fn item_path(key: &Self::Key) -> String {
        format!("{}/{}", Self::ITEM_PREFIX, encode_component(&key.to_string()))
    }
}

impl Resource for Project {
    type Key = RecordId;
    type Payload = ProjectPayload;
    type Update = ProjectPayload;
    const COLLECTION: &'static str = "/projetos/";
    const ITEM_PREFIX: &'static str = "/projetos";

    fn key(&self) -> RecordId {
        self.id
    }
}

impl Resource for Client {
    type Key = RecordId;
    type Payload = ClientPayload;
    type Update = ClientPayload;
    const COLLECTION: &'static str = "/api/v1/clientes/";
    const ITEM_PREFIX: &'static str = "/api/v1/clientes";

    fn key(&self) -> RecordId {
        self.id
    }
}

impl Resource for Pool {
    type Key = RecordId;
    type Payload = PoolPayload;
    type Update = PoolPayload;
    const COLLECTION: &'static str = "/api/v1/piscinas/";
    const ITEM_PREFIX: &'static str = "/api/v1/piscinas";

    fn key(&self) -> RecordId {
        self.id
    }
}

impl Resource for Service {
    type Key = RecordId;
    type Payload = ServicePayload;
    type Update = ServicePayload;
    const COLLECTION: &'static str = "/api/v1/servicos/";
    const ITEM_PREFIX: &'static str = "/api/v1/servicos";

    fn key(&self) -> RecordId {
        self.id
    }
}

impl Resource for Budget {
    type Key = RecordId;
    type Payload = BudgetPayload;
    type Update = BudgetPayload;
    const COLLECTION: &'static str = "/api/v1/orcamentos/";
    const ITEM_PREFIX: &'static str = "/api/v1/orcamentos";

    fn key(&self) -> RecordId {
        self.id
    }
}

/// 管理员的用户列表（只读 + 编辑 + 删除）
impl Resource for User {
    type Key = RecordId;
    type Payload = UserUpdate;
    type Update = UserUpdate;
    const COLLECTION: &'static str = "/api/v1/admin/users";
    const ITEM_PREFIX: &'static str = "/api/v1/admin/users";

    fn key(&self) -> RecordId {
        self.id
    }
}

/// 全局配置以 key 作为路径参数
impl Resource for AppSetting {
    type Key = String;
    type Payload = AppSettingPayload;
    type Update = AppSettingUpdate;
    const COLLECTION: &'static str = "/api/v1/admin/settings/";
    const ITEM_PREFIX: &'static str = "/api/v1/admin/settings";

    fn key(&self) -> String {
        self.key.clone()
    }
}

/// 列出集合，可附加服务端过滤参数
pub struct ListRequest<R> {
    query: Vec<(&'static str, String)>,
    _marker: PhantomData<fn() -> R>,
}

impl<R: Resource> ListRequest<R> {
    pub fn new() -> Self {
        Self {
            query: Vec::new(),
            _marker: PhantomData,
        }
    }

    pub fn filter(mut self, name: &'static str, value: impl Display) -> Self {
        self.query.push((name, value.to_string()));
        self
    }
}

impl<R: Resource> Default for ListRequest<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Resource> ApiRequest for ListRequest<R> {
    type Response = Vec<R>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        with_query(R::COLLECTION, &self.query)
    }

    fn decode(body: &str) -> ApiResult<Self::Response> {
        decode_json(body)
    }
}

pub struct GetRequest<R: Resource> {
    pub key: R::Key,
}

impl<R: Resource> ApiRequest for GetRequest<R> {
    type Response = R;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        R::item_path(&self.key)
    }

    fn decode(body: &str) -> ApiResult<Self::Response> {
        decode_json(body)
    }
}

pub struct CreateRequest<R: Resource> {
    pub payload: R::Payload,
}

impl<R: Resource> ApiRequest for CreateRequest<R> {
    type Response = R;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        R::COLLECTION.to_string()
    }

    fn body(&self) -> ApiResult<RequestBody> {
        RequestBody::json(&self.payload)
    }

    fn decode(body: &str) -> ApiResult<Self::Response> {
        decode_json(body)
    }
}

pub struct UpdateRequest<R: Resource> {
    pub key: R::Key,
    pub payload: R::Update,
}

impl<R: Resource> ApiRequest for UpdateRequest<R> {
    type Response = R;
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        R::item_path(&self.key)
    }

    fn body(&self) -> ApiResult<RequestBody> {
        RequestBody::json(&self.payload)
    }

    fn decode(body: &str) -> ApiResult<Self::Response> {
        decode_json(body)
    }
}

/// 删除记录；204 或者带消息的响应体都视为成功，内容被忽略
pub struct DeleteRequest<R: Resource> {
    pub key: R::Key,
}

impl<R: Resource> ApiRequest for DeleteRequest<R> {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Delete;

    fn path(&self) -> String {
        R::item_path(&self.key)
    }

    fn decode(_body: &str) -> ApiResult<Self::Response> {
        Ok(())
    }
}

// =========================================================
// 其他接口
// =========================================================

/// 某个客户的全部泳池
#[derive(Debug, Clone, Copy)]
pub struct PoolsByClientRequest {
    pub client_id: RecordId,
}

impl ApiRequest for PoolsByClientRequest {
    type Response = Vec<Pool>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("/api/v1/piscinas/cliente/{}", self.client_id)
    }

    fn decode(body: &str) -> ApiResult<Self::Response> {
        decode_json(body)
    }
}

/// 系统日志的最后 N 行（纯文本）
#[derive(Debug, Clone, Copy)]
pub struct SystemLogsRequest {
    pub last_n_lines: u32,
}

impl ApiRequest for SystemLogsRequest {
    type Response = String;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("/api/v1/admin/system-logs?last_n_lines={}", self.last_n_lines)
    }

    fn decode(body: &str) -> ApiResult<Self::Response> {
        Ok(body.to_string())
    }
}

fn with_query(path: &str, query: &[(&'static str, String)]) -> String {
    if query.is_empty() {
        return path.to_string();
    }
    let pairs = query
        .iter()
        .map(|(k, v)| format!("{}={}", k, encode_component(v)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", path, pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_body_is_url_encoded() {
        let req = TokenRequest {
            username: "alice".to_string(),
            password: "s3cr&t =ok".to_string(),
        };
        let body = req.body().unwrap();
        assert_eq!(body.content_type(), Some("application/x-www-form-urlencoded"));
        assert_eq!(
            body.into_string().unwrap(),
            "username=alice&password=s3cr%26t%20%3Dok"
        );
    }

    #[test]
    fn test_resource_paths() {
        assert_eq!(ListRequest::<Client>::new().path(), "/api/v1/clientes/");
        assert_eq!(
            ListRequest::<Service>::new().filter("client_id", 7).path(),
            "/api/v1/servicos/?client_id=7"
        );
        assert_eq!(DeleteRequest::<Budget> { key: 9 }.path(), "/api/v1/orcamentos/9");
        assert_eq!(GetRequest::<Client> { key: 4 }.path(), "/api/v1/clientes/4");
        assert_eq!(ListRequest::<User>::new().path(), "/api/v1/admin/users");
        assert_eq!(
            DeleteRequest::<AppSetting> {
                key: "taxa visita".to_string()
            }
            .path(),
            "/api/v1/admin/settings/taxa%20visita"
        );
        assert_eq!(
            PoolsByClientRequest { client_id: 3 }.path(),
            "/api/v1/piscinas/cliente/3"
        );
        assert_eq!(
            SystemLogsRequest { last_n_lines: 50 }.path(),
            "/api/v1/admin/system-logs?last_n_lines=50"
        );
    }

    #[test]
    fn test_empty_body_decodes_as_unit() {
        assert!(decode_json::<()>("").is_ok());
        assert!(DeleteRequest::<AppSetting>::decode(r#"{"message":"ok"}"#).is_ok());
    }

    #[test]
    fn test_logs_are_plain_text() {
        let text = SystemLogsRequest::decode("INFO: started\nINFO: ready\n").unwrap();
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_decode_failure_is_decode_error() {
        let err = ListRequest::<Client>::decode("<html>").unwrap_err();
        assert_eq!(err.kind, crate::error::ApiErrorKind::Decode);
    }
}
