//! 页面视图模型
//!
//! 每个页面的状态（列表、加载标记、错误）放在一个 [`StateCell`] 里，
//! 具体的单元类型由前端决定（Leptos 信号），测试里用 `Rc<RefCell<_>>`。
//!
//! 统一约定：
//! - 挂载时拉取列表；每次成功的创建/修改/删除之后无条件重新拉取。
//! - 删除前必须确认，拒绝时不发请求。
//! - 拉取失败保留旧列表并显示内联错误；变更失败弹出提示，列表不变。
//! - 不做任何重试。

mod client_detail;
mod clients;
mod drafts;
mod logs;

pub use client_detail::{ClientDetailModel, ClientDetailState};
pub use clients::{filter_clients, matches_query};
pub use drafts::{
    BudgetDraft, ClientDraft, Editor, PoolDraft, ProjectDraft, ServiceDraft, SettingDraft,
    UserDraft,
};
pub use logs::{LogState, LogViewer};

use std::cell::RefCell;
use std::future::Future;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::error::{ApiError, ApiResult};
use crate::http::HttpClient;
use crate::models::{AppSetting, Budget, Client, Pool, Project, Service, User};
use crate::protocol::{CreateRequest, DeleteRequest, ListRequest, Resource, UpdateRequest};
use crate::session::SessionStore;
use crate::storage::TokenStorage;

// =========================================================
// 平台接缝
// =========================================================

/// 可变状态单元
pub trait StateCell<S> {
    fn update(&self, f: impl FnOnce(&mut S));
}

impl<S> StateCell<S> for Rc<RefCell<S>> {
    fn update(&self, f: impl FnOnce(&mut S)) {
        f(&mut self.borrow_mut());
    }
}

/// 阻塞式对话框（确认 / 提示）
pub trait Prompter {
    fn confirm(&self, message: &str) -> bool;
    fn alert(&self, message: &str);
}

// =========================================================
// 列表状态
// =========================================================

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionState<T> {
    pub items: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
    /// 至少成功拉取过一次
    pub loaded: bool,
}

impl<T> Default for CollectionState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
            loaded: false,
        }
    }
}

impl<T> CollectionState<T> {
    pub fn begin_fetch(&mut self) {
        self.loading = true;
    }

    /// 失败时保留旧列表
    pub fn finish_fetch(&mut self, result: ApiResult<Vec<T>>) {
        self.loading = false;
        match result {
            Ok(items) => {
                self.items = items;
                self.error = None;
                self.loaded = true;
            }
            Err(e) => self.error = Some(e.message),
        }
    }
}

/// 变更操作的结果
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// 请求成功，列表已重新拉取
    Applied,
    /// 用户取消了确认框
    Declined,
    /// 请求失败，已弹出提示
    Failed(ApiError),
}

impl MutationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, MutationOutcome::Applied)
    }
}

// =========================================================
// 资源的界面文案
// =========================================================

/// 提示文案
#[derive(Debug, Clone, Copy)]
pub struct CrudMessages {
    /// 带冠词的名词，用于确认框，例如 "o cliente"
    pub noun: &'static str,
    pub create_failed: &'static str,
    pub update_failed: &'static str,
    pub delete_failed: &'static str,
}

/// 可以在界面上管理的资源
pub trait Managed: Resource {
    const MESSAGES: CrudMessages;

    /// 确认框里用来指代这条记录的文字
    fn describe(&self) -> String;

    fn confirm_delete_message(&self) -> String {
        format!(
            "Tem certeza que deseja excluir {} \"{}\"?",
            Self::MESSAGES.noun,
            self.describe()
        )
    }
}

impl Managed for Project {
    const MESSAGES: CrudMessages = CrudMessages {
        noun: "o projeto",
        create_failed: "Erro ao criar projeto",
        update_failed: "Erro ao atualizar projeto",
        delete_failed: "Erro ao excluir projeto",
    };

    fn describe(&self) -> String {
        self.name.clone()
    }
}

impl Managed for Client {
    const MESSAGES: CrudMessages = CrudMessages {
        noun: "o cliente",
        create_failed: "Erro ao criar cliente",
        update_failed: "Erro ao atualizar cliente",
        delete_failed: "Erro ao excluir cliente",
    };

    fn describe(&self) -> String {
        self.name.clone()
    }
}

impl Managed for Pool {
    const MESSAGES: CrudMessages = CrudMessages {
        noun: "a piscina",
        create_failed: "Erro ao cadastrar piscina",
        update_failed: "Erro ao atualizar piscina",
        delete_failed: "Erro ao excluir piscina",
    };

    fn describe(&self) -> String {
        format!("{} ({} L)", self.pool_type, self.volume)
    }
}

impl Managed for Service {
    const MESSAGES: CrudMessages = CrudMessages {
        noun: "o serviço",
        create_failed: "Erro ao registrar serviço",
        update_failed: "Erro ao atualizar serviço",
        delete_failed: "Erro ao excluir serviço",
    };

    fn describe(&self) -> String {
        self.service_type.clone()
    }
}

impl Managed for Budget {
    const MESSAGES: CrudMessages = CrudMessages {
        noun: "o orçamento",
        create_failed: "Erro ao criar orçamento",
        update_failed: "Erro ao atualizar orçamento",
        delete_failed: "Erro ao excluir orçamento",
    };

    fn describe(&self) -> String {
        format!("#{} (R$ {})", self.id, self.total)
    }
}

impl Managed for User {
    const MESSAGES: CrudMessages = CrudMessages {
        noun: "o usuário",
        create_failed: "Erro ao criar usuário",
        update_failed: "Erro ao atualizar usuário",
        delete_failed: "Erro ao excluir usuário",
    };

    fn describe(&self) -> String {
        self.username.clone()
    }
}

impl Managed for AppSetting {
    const MESSAGES: CrudMessages = CrudMessages {
        noun: "a configuração",
        create_failed: "Erro ao criar configuração",
        update_failed: "Erro ao atualizar configuração",
        delete_failed: "Erro ao excluir configuração",
    };

    fn describe(&self) -> String {
        self.key.clone()
    }
}

// =========================================================
// 通用变更流程
// =========================================================

/// 执行一次变更；失败时弹出提示
pub(crate) async fn run_mutation<T>(
    prompter: &dyn Prompter,
    failure: &str,
    op: impl Future<Output = ApiResult<T>>,
) -> Result<T, MutationOutcome> {
    match op.await {
        Ok(value) => Ok(value),
        Err(e) => {
            tracing::warn!(error = %e, "{}", failure);
            prompter.alert(&format!("{}: {}", failure, e.message));
            Err(MutationOutcome::Failed(e))
        }
    }
}

/// 单一资源列表的视图模型
pub struct CrudModel<R, C, S, Cell> {
    session: Rc<SessionStore<C, S>>,
    cell: Cell,
    prompter: Rc<dyn Prompter>,
    _marker: PhantomData<fn() -> R>,
}

impl<R, C, S, Cell> CrudModel<R, C, S, Cell>
where
    R: Managed,
    C: HttpClient,
    S: TokenStorage,
    Cell: StateCell<CollectionState<R>>,
{
    pub fn new(session: Rc<SessionStore<C, S>>, cell: Cell, prompter: Rc<dyn Prompter>) -> Self {
        Self {
            session,
            cell,
            prompter,
            _marker: PhantomData,
        }
    }

    pub fn cell(&self) -> &Cell {
        &self.cell
    }

    /// 重新拉取列表
    pub async fn refresh(&self) {
        self.cell.update(|s| s.begin_fetch());
        let result = self.session.call(&ListRequest::<R>::new()).await;
        if let Err(e) = &result {
            tracing::warn!(collection = R::COLLECTION, error = %e, "list fetch failed");
        }
        self.cell.update(|s| s.finish_fetch(result));
    }

    pub async fn create(&self, payload: R::Payload) -> MutationOutcome {
        let request = CreateRequest::<R> { payload };
        let op = self.session.call(&request);
        match run_mutation(self.prompter.as_ref(), R::MESSAGES.create_failed, op).await {
            Ok(_) => self.applied().await,
            Err(outcome) => outcome,
        }
    }

    pub async fn update(&self, key: R::Key, payload: R::Update) -> MutationOutcome {
        let request = UpdateRequest::<R> { key, payload };
        let op = self.session.call(&request);
        match run_mutation(self.prompter.as_ref(), R::MESSAGES.update_failed, op).await {
            Ok(_) => self.applied().await,
            Err(outcome) => outcome,
        }
    }

    /// 确认后删除
    pub async fn delete(&self, record: &R) -> MutationOutcome {
        if !self.prompter.confirm(&record.confirm_delete_message()) {
            return MutationOutcome::Declined;
        }
        let request = DeleteRequest::<R> { key: record.key() };
        let op = self.session.call(&request);
        match run_mutation(self.prompter.as_ref(), R::MESSAGES.delete_failed, op).await {
            Ok(()) => self.applied().await,
            Err(outcome) => outcome,
        }
    }

    async fn applied(&self) -> MutationOutcome {
        self.refresh().await;
        MutationOutcome::Applied
    }
}

// =========================================================
// 测试工具
// =========================================================
