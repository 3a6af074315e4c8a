//! 客户详情页
//!
//! 客户、泳池、服务、报价四个请求并行发出，各自返回时独立提交。
//! 服务和报价带 `client_id` 过滤参数请求，但归属关系在读取时再校验一次，
//! 因此无论返回顺序如何，视图都一致。

use std::rc::Rc;

use crate::error::ApiResult;
use crate::http::HttpClient;
use crate::models::{Budget, Client, Pool, RecordId, Service};
use crate::protocol::{CreateRequest, DeleteRequest, GetRequest, ListRequest, PoolsByClientRequest};
use crate::session::SessionStore;
use crate::storage::TokenStorage;

use super::drafts::{BudgetDraft, PoolDraft, ServiceDraft};
use super::{Managed, MutationOutcome, Prompter, StateCell, run_mutation};

const FETCH_COUNT: u8 = 4;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientDetailState {
    pub client: Option<Client>,
    pub pools: Vec<Pool>,
    /// 服务端返回的全部服务，读取时按泳池过滤
    pub services: Vec<Service>,
    /// 服务端返回的全部报价，读取时按客户过滤
    pub budgets: Vec<Budget>,
    /// 尚未返回的请求数
    pub pending: u8,
    pub errors: Vec<String>,
}

impl ClientDetailState {
    pub fn is_loading(&self) -> bool {
        self.pending > 0
    }

    /// 属于该客户某个泳池的服务
    pub fn client_services(&self) -> Vec<&Service> {
        self.services
            .iter()
            .filter(|s| self.pools.iter().any(|p| p.id == s.pool_id))
            .collect()
    }

    pub fn client_budgets(&self) -> Vec<&Budget> {
        let Some(client) = &self.client else {
            return Vec::new();
        };
        self.budgets.iter().filter(|b| b.client_id == client.id).collect()
    }

    pub fn pool(&self, id: RecordId) -> Option<&Pool> {
        self.pools.iter().find(|p| p.id == id)
    }
}

pub struct ClientDetailModel<C, S, Cell> {
    session: Rc<SessionStore<C, S>>,
    client_id: RecordId,
    cell: Cell,
    prompter: Rc<dyn Prompter>,
}

impl<C, S, Cell> ClientDetailModel<C, S, Cell>
where
    C: HttpClient,
    S: TokenStorage,
    Cell: StateCell<ClientDetailState>,
{
    pub fn new(
        session: Rc<SessionStore<C, S>>,
        client_id: RecordId,
        cell: Cell,
        prompter: Rc<dyn Prompter>,
    ) -> Self {
        Self {
            session,
            client_id,
            cell,
            prompter,
        }
    }

    pub fn cell(&self) -> &Cell {
        &self.cell
    }

    /// 并行拉取全部数据
    pub async fn refresh(&self) {
        let id = self.client_id;
        self.cell.update(|s| {
            s.pending = FETCH_COUNT;
            s.errors.clear();
        });

        let client = async {
            let result = self.session.call(&GetRequest::<Client> { key: id }).await;
            self.settle("cliente", result, |s, client| s.client = Some(client));
        };
        let pools = async {
            let result = self.session.call(&PoolsByClientRequest { client_id: id }).await;
            self.settle("piscinas", result, |s, pools| s.pools = pools);
        };
        let services = async {
            let request = ListRequest::<Service>::new().filter("client_id", id);
            let result = self.session.call(&request).await;
            self.settle("serviços", result, |s, services| s.services = services);
        };
        let budgets = async {
            let request = ListRequest::<Budget>::new().filter("client_id", id);
            let result = self.session.call(&request).await;
            self.settle("orçamentos", result, |s, budgets| s.budgets = budgets);
        };

        futures::join!(client, pools, services, budgets);
    }

    fn settle<T>(
        &self,
        what: &str,
        result: ApiResult<T>,
        apply: impl FnOnce(&mut ClientDetailState, T),
    ) {
        self.cell.update(|s| {
            s.pending = s.pending.saturating_sub(1);
            match result {
                Ok(value) => apply(s, value),
                Err(e) => {
                    tracing::warn!(client_id = self.client_id, part = what, error = %e, "client detail fetch failed");
                    s.errors.push(format!("Erro ao carregar {}: {}", what, e.message));
                }
            }
        });
    }

    pub async fn create_pool(&self, draft: &PoolDraft) -> MutationOutcome {
        self.create::<Pool>(draft.to_payload(self.client_id)).await
    }

    pub async fn delete_pool(&self, pool: &Pool) -> MutationOutcome {
        self.delete(pool).await
    }

    /// 必须先选中一个泳池
    pub async fn create_service(&self, draft: &ServiceDraft) -> MutationOutcome {
        self.create::<Service>(draft.to_payload()).await
    }

    pub async fn delete_service(&self, service: &Service) -> MutationOutcome {
        self.delete(service).await
    }

    pub async fn create_budget(&self, draft: &BudgetDraft) -> MutationOutcome {
        self.create::<Budget>(draft.to_payload(self.client_id)).await
    }

    pub async fn delete_budget(&self, budget: &Budget) -> MutationOutcome {
        self.delete(budget).await
    }

    async fn create<R: Managed>(&self, payload: ApiResult<R::Payload>) -> MutationOutcome {
        let payload = match payload {
            Ok(payload) => payload,
            Err(e) => {
                self.prompter.alert(&e.message);
                return MutationOutcome::Failed(e);
            }
        };
        let request = CreateRequest::<R> { payload };
        let op = self.session.call(&request);
        match run_mutation(self.prompter.as_ref(), R::MESSAGES.create_failed, op).await {
            Ok(_) => {
                self.refresh().await;
                MutationOutcome::Applied
            }
            Err(outcome) => outcome,
        }
    }

    async fn delete<R: Managed>(&self, record: &R) -> MutationOutcome {
        if !self.prompter.confirm(&record.confirm_delete_message()) {
            return MutationOutcome::Declined;
        }
        let request = DeleteRequest::<R> { key: record.key() };
        let op = self.session.call(&request);
        match run_mutation(self.prompter.as_ref(), R::MESSAGES.delete_failed, op).await {
            Ok(()) => {
                self.refresh().await;
                MutationOutcome::Applied
            }
            Err(outcome) => outcome,
        }
    }
}
