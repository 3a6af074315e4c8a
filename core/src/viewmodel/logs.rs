use std::rc::Rc;

use crate::http::HttpClient;
use crate::protocol::SystemLogsRequest;
use crate::session::SessionStore;
use crate::storage::TokenStorage;

use super::StateCell;

/// 系统日志页面状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogState {
    pub text: String,
    /// 要读取的最后 N 行
    pub lines: u32,
    pub loading: bool,
    pub error: Option<String>,
}

impl LogState {
    pub fn new(lines: u32) -> Self {
        Self {
            text: String::new(),
            lines,
            loading: false,
            error: None,
        }
    }
}

pub struct LogViewer<C, S, Cell> {
    session: Rc<SessionStore<C, S>>,
    cell: Cell,
    lines: std::cell::Cell<u32>,
}

impl<C, S, Cell> LogViewer<C, S, Cell>
where
    C: HttpClient,
    S: TokenStorage,
    Cell: StateCell<LogState>,
{
    pub fn new(session: Rc<SessionStore<C, S>>, cell: Cell, lines: u32) -> Self {
        Self {
            session,
            cell,
            lines: std::cell::Cell::new(lines),
        }
    }

    pub fn cell(&self) -> &Cell {
        &self.cell
    }

    /// 按当前行数重新拉取；失败时保留上一次的文本
    pub async fn refresh(&self) {
        let lines = self.lines.get();
        self.cell.update(|s| s.loading = true);

        let result = self.session.call(&SystemLogsRequest { last_n_lines: lines }).await;

        self.cell.update(|s| {
            s.loading = false;
            match result {
                Ok(text) => {
                    s.text = text;
                    s.error = None;
                }
                Err(e) => {
                    tracing::warn!(lines, error = %e, "system log fetch failed");
                    s.error = Some(format!("Erro ao carregar logs: {}", e.message));
                }
            }
        });
    }

    /// 修改行数，有变化时重新拉取
    pub async fn show_lines(&self, lines: u32) {
        let lines = lines.max(1);
        if lines == self.lines.get() {
            return;
        }
        self.lines.set(lines);
        self.cell.update(|s| s.lines = lines);
        self.refresh().await;
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::config::DEFAULT_LOG_LINES;
    use crate::http::HttpMethod;
    use serde_json::json;
    use std::cell::RefCell;

    fn viewer(
        session: Rc<TestSession>,
    ) -> LogViewer<Rc<crate::http::MockHttpClient>, crate::storage::MemoryStorage, Rc<RefCell<LogState>>> {
        LogViewer::new(
            session,
            Rc::new(RefCell::new(LogState::new(DEFAULT_LOG_LINES))),
            DEFAULT_LOG_LINES,
        )
    }

    #[tokio::test]
    async fn test_default_fetch_uses_200_lines() {
        let (mock, session) = signed_in().await;
        let logs = url("/api/v1/admin/system-logs?last_n_lines=200");
        mock.mock_text(HttpMethod::Get, &logs, 200, "INFO startup\nINFO ready\n");
        let viewer = viewer(session);

        viewer.refresh().await;

        let state = viewer.cell().borrow();
        assert_eq!(state.text, "INFO startup\nINFO ready\n");
        assert_eq!(state.lines, 200);
        assert!(!state.loading);
        assert_eq!(mock.last_request().unwrap().header("Authorization"), Some("Bearer T"));
    }

    #[tokio::test]
    async fn test_changing_lines_refetches() {
        let (mock, session) = signed_in().await;
        mock.mock_text(HttpMethod::Get, &url("/api/v1/admin/system-logs?last_n_lines=200"), 200, "a\n");
        mock.mock_text(HttpMethod::Get, &url("/api/v1/admin/system-logs?last_n_lines=50"), 200, "b\n");
        let viewer = viewer(session);
        viewer.refresh().await;

        viewer.show_lines(50).await;
        assert_eq!(viewer.cell().borrow().text, "b\n");
        assert_eq!(viewer.cell().borrow().lines, 50);

        // mesmo valor não gera pedido
        viewer.show_lines(50).await;
        assert_eq!(mock.requests.borrow().len(), 2);
    }

    #[tokio::test]
    async fn test_failure_keeps_last_text() {
        let (mock, session) = signed_in().await;
        let logs = url("/api/v1/admin/system-logs?last_n_lines=200");
        mock.mock_text(HttpMethod::Get, &logs, 200, "INFO ok\n");
        mock.mock_response(HttpMethod::Get, &logs, 403, json!({"detail": "Not enough permissions"}));
        let viewer = viewer(session);

        viewer.refresh().await;
        viewer.refresh().await;

        let state = viewer.cell().borrow();
        assert_eq!(state.text, "INFO ok\n");
        assert_eq!(
            state.error.as_deref(),
            Some("Erro ao carregar logs: Not enough permissions")
        );
    }
}
