use std::collections::HashMap;
use std::rc::Rc;

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::collections::VecDeque;

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

/// 通用 HTTP 方法枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// 通用 HTTP 请求结构
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(String::as_str)
    }
}

/// 通用 HTTP 响应结构
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// 检查响应是否成功 (2xx)
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// 传输层错误：请求没有得到任何 HTTP 响应
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// HTTP 客户端特性 (Trait)
///
/// 浏览器环境下 future 不是 Send 的，所以使用 `?Send`。
#[async_trait::async_trait(?Send)]
pub trait HttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait::async_trait(?Send)]
impl<T: HttpClient + ?Sized> HttpClient for Rc<T> {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(req).await
    }
}

// =========================================================
// 测试工具: MockHttpClient
// =========================================================

#[cfg(test)]
type MockReply = Result<(u16, String), String>;

/// 同一个 (方法, URL) 的响应队列
#[cfg(test)]
#[derive(Default)]
struct MockQueue {
    replies: VecDeque<MockReply>,
    /// 队首的最后一个响应已经被返回过
    served: bool,
}

/// 按 (方法, URL) 返回预设响应的客户端
///
/// 同一个 key 可以排队多个响应，依次消费；队列只剩最后一个时会一直返回它，
/// 方便模拟“变更前 / 变更后”的两次列表查询。
/// 已经返回过的最后一个响应在追加新响应时被丢弃，新响应立即生效。
#[cfg(test)]
pub struct MockHttpClient {
    responses: RefCell<HashMap<(HttpMethod, String), MockQueue>>,
    gate: RefCell<Option<futures::channel::oneshot::Receiver<()>>>,
    pub requests: RefCell<Vec<HttpRequest>>,
}

#[cfg(test)]
impl MockHttpClient {
    pub fn new() -> Self {
        Self {
            responses: RefCell::new(HashMap::new()),
            gate: RefCell::new(None),
            requests: RefCell::new(Vec::new()),
        }
    }

    /// 让下一个请求挂起，直到返回的 sender 被触发或丢弃
    pub fn hold_next(&self) -> futures::channel::oneshot::Sender<()> {
        let (tx, rx) = futures::channel::oneshot::channel();
        *self.gate.borrow_mut() = Some(rx);
        tx
    }

    pub fn mock_response(&self, method: HttpMethod, url: &str, status: u16, body: serde_json::Value) {
        self.push(method, url, Ok((status, body.to_string())));
    }

    pub fn mock_text(&self, method: HttpMethod, url: &str, status: u16, body: &str) {
        self.push(method, url, Ok((status, body.to_string())));
    }

    pub fn mock_network_error(&self, method: HttpMethod, url: &str) {
        self.push(method, url, Err("connection refused".to_string()));
    }

    fn push(&self, method: HttpMethod, url: &str, reply: MockReply) {
        let mut responses = self.responses.borrow_mut();
        let queue = responses.entry((method, url.to_string())).or_default();
        if queue.served {
            queue.replies.clear();
            queue.served = false;
        }
        queue.replies.push_back(reply);
    }

    /// 统计某个 (方法, URL) 被调用的次数
    pub fn count(&self, method: HttpMethod, url: &str) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.method == method && r.url == url)
            .count()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.borrow().last().cloned()
    }
}

#[cfg(test)]
#[async_trait::async_trait(?Send)]
impl HttpClient for MockHttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.borrow_mut().push(req.clone());

        let gate = self.gate.borrow_mut().take();
        if let Some(rx) = gate {
            let _ = rx.await;
        }

        let mut responses = self.responses.borrow_mut();
        let reply = match responses.get_mut(&(req.method, req.url.clone())) {
            Some(queue) if queue.replies.len() > 1 => queue.replies.pop_front(),
            Some(queue) => {
                queue.served = true;
                queue.replies.front().cloned()
            }
            None => None,
        };

        match reply {
            Some(Ok((status, body))) => Ok(HttpResponse { status, body }),
            Some(Err(msg)) => Err(TransportError(msg)),
            None => Ok(HttpResponse {
                status: 404,
                body: r#"{"detail":"Not Found"}"#.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "http://api.test/users/me";

    async fn status_of(mock: &MockHttpClient) -> Result<u16, TransportError> {
        mock.send(HttpRequest::new(URL, HttpMethod::Get))
            .await
            .map(|r| r.status)
    }

    #[tokio::test]
    async fn test_queued_replies_then_last_is_sticky() {
        let mock = MockHttpClient::new();
        mock.mock_text(HttpMethod::Get, URL, 200, "a");
        mock.mock_text(HttpMethod::Get, URL, 201, "b");

        assert_eq!(status_of(&mock).await, Ok(200));
        assert_eq!(status_of(&mock).await, Ok(201));
        assert_eq!(status_of(&mock).await, Ok(201));
        assert_eq!(mock.count(HttpMethod::Get, URL), 3);
    }

    #[tokio::test]
    async fn test_reply_pushed_after_serving_replaces_sticky_one() {
        let mock = MockHttpClient::new();
        mock.mock_text(HttpMethod::Get, URL, 200, "ok");
        assert_eq!(status_of(&mock).await, Ok(200));

        mock.mock_network_error(HttpMethod::Get, URL);

        assert!(status_of(&mock).await.is_err());
        assert!(status_of(&mock).await.is_err());
    }

    #[tokio::test]
    async fn test_unmocked_url_is_not_found() {
        let mock = MockHttpClient::new();
        assert_eq!(status_of(&mock).await, Ok(404));
    }
}
