use crate::error::{ApiError, ApiResult};
use crate::http::{HttpClient, HttpRequest};
use crate::protocol::ApiRequest;

/// 后端 API 客户端
///
/// 持有根地址和具体的 HTTP 实现，为每个请求补上默认请求头和 Bearer token。
#[derive(Debug, Clone)]
pub struct ApiClient<C> {
    base_url: String,
    http: C,
}

impl<C: HttpClient> ApiClient<C> {
    pub fn new(base_url: impl Into<String>, http: C) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// 发送请求并解析响应
    ///
    /// 非 2xx 响应转换为带分类的 [`ApiError`]，传输失败归为网络错误。
    pub async fn send<R: ApiRequest>(&self, request: &R, token: Option<&str>) -> ApiResult<R::Response> {
        let url = self.url(&request.path());
        let body = request.body()?;

        let mut req = HttpRequest::new(&url, R::METHOD).with_header("Accept", "application/json");
        if let Some(content_type) = body.content_type() {
            req = req.with_header("Content-Type", content_type);
        }
        if let Some(token) = token {
            req = req.with_header("Authorization", &format!("Bearer {}", token));
        }
        if let Some(body) = body.into_string() {
            req = req.with_body(body);
        }

        tracing::debug!(method = R::METHOD.as_str(), %url, "api request");

        let resp = self.http.send(req).await.map_err(|e| {
            tracing::warn!(method = R::METHOD.as_str(), %url, error = %e, "transport failure");
            ApiError::from(e)
        })?;

        if !resp.ok() {
            let err = ApiError::from_response(resp.status, &resp.body);
            tracing::warn!(method = R::METHOD.as_str(), %url, status = resp.status, error = %err, "api error");
            return Err(err);
        }

        R::decode(&resp.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiErrorKind;
    use crate::http::{HttpMethod, MockHttpClient};
    use crate::models::{Client, ClientPayload};
    use crate::protocol::{CreateRequest, CurrentUserRequest, ListRequest, TokenRequest};
    use serde_json::json;
    use std::rc::Rc;

    const BASE: &str = "http://api.test";

    fn client() -> (Rc<MockHttpClient>, ApiClient<Rc<MockHttpClient>>) {
        let mock = Rc::new(MockHttpClient::new());
        let api = ApiClient::new(format!("{}/", BASE), mock.clone());
        (mock, api)
    }

    #[tokio::test]
    async fn test_bearer_header_attached_when_token_present() {
        let (mock, api) = client();
        mock.mock_response(
            HttpMethod::Get,
            "http://api.test/users/me",
            200,
            json!({"id": 1, "email": "a@b.c", "username": "alice", "is_superuser": false}),
        );

        let user = api.send(&CurrentUserRequest, Some("T")).await.unwrap();
        assert_eq!(user.username, "alice");

        let req = mock.last_request().unwrap();
        assert_eq!(req.header("Authorization"), Some("Bearer T"));
        assert_eq!(req.header("Accept"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_no_auth_header_without_token() {
        let (mock, api) = client();
        mock.mock_response(
            HttpMethod::Post,
            "http://api.test/auth/token",
            200,
            json!({"access_token": "T", "token_type": "bearer"}),
        );

        let req = TokenRequest {
            username: "alice".to_string(),
            password: "secret".to_string(),
        };
        api.send(&req, None).await.unwrap();

        let sent = mock.last_request().unwrap();
        assert_eq!(sent.header("Authorization"), None);
        assert_eq!(
            sent.header("Content-Type"),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(sent.body.as_deref(), Some("username=alice&password=secret"));
    }

    #[tokio::test]
    async fn test_json_body_for_create() {
        let (mock, api) = client();
        mock.mock_response(
            HttpMethod::Post,
            "http://api.test/api/v1/clientes/",
            200,
            json!({"id": 5, "name": "Bob"}),
        );

        let req = CreateRequest::<Client> {
            payload: ClientPayload {
                name: "Bob".to_string(),
                ..Default::default()
            },
        };
        let created = api.send(&req, Some("T")).await.unwrap();
        assert_eq!(created.id, 5);

        let sent = mock.last_request().unwrap();
        assert_eq!(sent.header("Content-Type"), Some("application/json"));
        assert_eq!(sent.body.as_deref(), Some(r#"{"name":"Bob"}"#));
    }

    #[tokio::test]
    async fn test_error_status_is_classified() {
        let (mock, api) = client();
        mock.mock_response(
            HttpMethod::Get,
            "http://api.test/api/v1/clientes/",
            401,
            json!({"detail": "Could not validate credentials"}),
        );

        let err = api
            .send(&ListRequest::<Client>::new(), Some("expired"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Unauthorized);
        assert_eq!(err.message, "Could not validate credentials");
    }

    #[tokio::test]
    async fn test_network_failure() {
        let (mock, api) = client();
        mock.mock_network_error(HttpMethod::Get, "http://api.test/api/v1/clientes/");

        let err = api
            .send(&ListRequest::<Client>::new(), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Network);
    }
}
