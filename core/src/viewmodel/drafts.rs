//! 表单草稿
//!
//! 草稿保存输入框里的原始文本，提交时通过 `to_payload` 校验并转换为请求体。
//! 成功提交或取消后草稿被重置；编辑时从所选记录预填。

use chrono::NaiveDate;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    AppSetting, AppSettingPayload, AppSettingUpdate, BudgetItem, BudgetPayload, Client,
    ClientPayload, Pool, PoolPayload, Project, ProjectPayload, RecordId, ServicePayload, User,
    UserUpdate,
};

pub const DEFAULT_POOL_TYPE: &str = "alvenaria";
pub const DEFAULT_SERVICE_TYPE: &str = "Manutenção";

fn required(value: &str, label: &str) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ApiError::validation(format!("{} é obrigatório", label)))
    } else {
        Ok(trimmed.to_string())
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// 编辑器：创建模式或编辑某条记录
#[derive(Debug, Clone, PartialEq)]
pub struct Editor<K, D> {
    /// `None` 表示创建
    pub target: Option<K>,
    pub draft: D,
    pub open: bool,
}

impl<K, D: Default> Default for Editor<K, D> {
    fn default() -> Self {
        Self {
            target: None,
            draft: D::default(),
            open: false,
        }
    }
}

impl<K, D: Default> Editor<K, D> {
    pub fn open_create(&mut self) {
        self.target = None;
        self.draft = D::default();
        self.open = true;
    }

    pub fn open_edit(&mut self, key: K, draft: D) {
        self.target = Some(key);
        self.draft = draft;
        self.open = true;
    }

    /// 关闭并丢弃草稿
    pub fn close(&mut self) {
        *self = Self::default();
    }

    pub fn is_editing(&self) -> bool {
        self.target.is_some()
    }
}

// --- 项目 ---

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectDraft {
    pub name: String,
    pub description: String,
}

impl ProjectDraft {
    pub fn to_payload(&self) -> ApiResult<ProjectPayload> {
        Ok(ProjectPayload {
            name: required(&self.name, "Nome")?,
            description: optional(&self.description),
        })
    }
}

impl From<&Project> for ProjectDraft {
    fn from(p: &Project) -> Self {
        Self {
            name: p.name.clone(),
            description: p.description.clone().unwrap_or_default(),
        }
    }
}

// --- 客户 ---

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientDraft {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub cpf_cnpj: String,
}

impl ClientDraft {
    pub fn to_payload(&self) -> ApiResult<ClientPayload> {
        Ok(ClientPayload {
            name: required(&self.name, "Nome")?,
            phone: optional(&self.phone),
            email: optional(&self.email),
            address: optional(&self.address),
            cpf_cnpj: optional(&self.cpf_cnpj),
        })
    }
}

impl From<&Client> for ClientDraft {
    fn from(c: &Client) -> Self {
        Self {
            name: c.name.clone(),
            phone: c.phone.clone().unwrap_or_default(),
            email: c.email.clone().unwrap_or_default(),
            address: c.address.clone().unwrap_or_default(),
            cpf_cnpj: c.cpf_cnpj.clone().unwrap_or_default(),
        }
    }
}

// --- 泳池 ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolDraft {
    /// 升，整数
    pub volume: String,
    pub pool_type: String,
    pub coating: String,
    pub depth: String,
}

impl Default for PoolDraft {
    fn default() -> Self {
        Self {
            volume: String::new(),
            pool_type: DEFAULT_POOL_TYPE.to_string(),
            coating: String::new(),
            depth: String::new(),
        }
    }
}

impl PoolDraft {
    pub fn to_payload(&self, client_id: RecordId) -> ApiResult<PoolPayload> {
        let volume = self
            .volume
            .trim()
            .parse::<i64>()
            .map_err(|_| ApiError::validation("Volume deve ser um número inteiro"))?;
        if volume <= 0 {
            return Err(ApiError::validation("Volume deve ser maior que zero"));
        }
        Ok(PoolPayload {
            client_id,
            volume,
            pool_type: required(&self.pool_type, "Tipo")?,
            coating: optional(&self.coating),
            depth: optional(&self.depth),
        })
    }
}

impl From<&Pool> for PoolDraft {
    fn from(p: &Pool) -> Self {
        Self {
            volume: p.volume.to_string(),
            pool_type: p.pool_type.clone(),
            coating: p.coating.clone().unwrap_or_default(),
            depth: p.depth.clone().unwrap_or_default(),
        }
    }
}

// --- 服务 ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDraft {
    pub pool_id: Option<RecordId>,
    pub service_type: String,
    pub description: String,
    pub value: String,
    pub time_spent: String,
    /// `YYYY-MM-DD`
    pub date: String,
}

impl Default for ServiceDraft {
    fn default() -> Self {
        Self {
            pool_id: None,
            service_type: DEFAULT_SERVICE_TYPE.to_string(),
            description: String::new(),
            value: String::new(),
            time_spent: String::new(),
            date: String::new(),
        }
    }
}

impl ServiceDraft {
    /// 日期默认填今天
    pub fn dated(today: NaiveDate) -> Self {
        Self {
            date: today.format("%Y-%m-%d").to_string(),
            ..Self::default()
        }
    }

    pub fn to_payload(&self) -> ApiResult<ServicePayload> {
        let pool_id = self
            .pool_id
            .ok_or_else(|| ApiError::validation("Selecione uma piscina"))?;
        let date = match optional(&self.date) {
            Some(raw) => Some(parse_date(&raw)?.format("%Y-%m-%d").to_string()),
            None => None,
        };
        Ok(ServicePayload {
            pool_id,
            service_type: required(&self.service_type, "Tipo de serviço")?,
            description: optional(&self.description),
            value: optional(&self.value),
            time_spent: optional(&self.time_spent),
            date,
        })
    }
}

// --- 报价 ---

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BudgetDraft {
    pub description: String,
    pub total: String,
    /// `YYYY-MM-DD`，可为空
    pub validity: String,
}

impl BudgetDraft {
    /// 条目编码为 `[{"description": ...}]`，有效期转换为当天零点的 ISO 时间
    pub fn to_payload(&self, client_id: RecordId) -> ApiResult<BudgetPayload> {
        let item = BudgetItem {
            description: required(&self.description, "Descrição")?,
        };
        let items = serde_json::to_string(&vec![item])
            .map_err(|e| ApiError::validation(e.to_string()))?;
        let validity = match optional(&self.validity) {
            Some(raw) => Some(
                parse_date(&raw)?
                    .format("%Y-%m-%dT00:00:00Z")
                    .to_string(),
            ),
            None => None,
        };
        Ok(BudgetPayload {
            client_id,
            items,
            total: required(&self.total, "Total")?,
            validity,
        })
    }
}

fn parse_date(raw: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ApiError::validation(format!("Data inválida: {}", raw)))
}

// --- 全局配置 ---

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingDraft {
    pub key: String,
    pub value: String,
}

impl SettingDraft {
    pub fn to_payload(&self) -> ApiResult<AppSettingPayload> {
        Ok(AppSettingPayload {
            key: required(&self.key, "Chave")?,
            value: self.value.clone(),
        })
    }

    pub fn to_update(&self) -> ApiResult<AppSettingUpdate> {
        let payload = self.to_payload()?;
        Ok(AppSettingUpdate {
            key: Some(payload.key),
            value: Some(payload.value),
        })
    }
}

impl From<&AppSetting> for SettingDraft {
    fn from(s: &AppSetting) -> Self {
        Self {
            key: s.key.clone(),
            value: s.value.clone(),
        }
    }
}

// --- 用户（管理员） ---

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDraft {
    pub email: String,
    pub username: String,
    pub is_superuser: bool,
}

impl UserDraft {
    pub fn to_update(&self) -> ApiResult<UserUpdate> {
        Ok(UserUpdate {
            email: Some(required(&self.email, "E-mail")?),
            username: Some(required(&self.username, "Usuário")?),
            is_superuser: Some(self.is_superuser),
            password: None,
        })
    }
}

impl From<&User> for UserDraft {
    fn from(u: &User) -> Self {
        Self {
            email: u.email.clone(),
            username: u.username.clone(),
            is_superuser: u.is_superuser,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiErrorKind;

    #[test]
    fn test_pool_volume_must_be_integer() {
        let draft = PoolDraft {
            volume: "20 mil".to_string(),
            ..Default::default()
        };
        let err = draft.to_payload(1).unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Validation);

        let ok = PoolDraft {
            volume: " 20000 ".to_string(),
            ..Default::default()
        }
        .to_payload(1)
        .unwrap();
        assert_eq!(ok.volume, 20000);
        assert_eq!(ok.pool_type, "alvenaria");
        assert_eq!(ok.coating, None);
    }

    #[test]
    fn test_service_requires_pool() {
        let draft = ServiceDraft::dated(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(draft.date, "2024-03-05");
        assert_eq!(draft.service_type, "Manutenção");
        let err = draft.to_payload().unwrap_err();
        assert_eq!(err.message, "Selecione uma piscina");

        let payload = ServiceDraft {
            pool_id: Some(4),
            value: "150.00".to_string(),
            ..draft
        }
        .to_payload()
        .unwrap();
        assert_eq!(payload.pool_id, 4);
        assert_eq!(payload.date.as_deref(), Some("2024-03-05"));
        assert_eq!(payload.value.as_deref(), Some("150.00"));
    }

    #[test]
    fn test_budget_encoding() {
        let draft = BudgetDraft {
            description: "Troca de areia do filtro".to_string(),
            total: "480.00".to_string(),
            validity: "2024-12-31".to_string(),
        };
        let payload = draft.to_payload(7).unwrap();
        assert_eq!(payload.items, r#"[{"description":"Troca de areia do filtro"}]"#);
        assert_eq!(payload.validity.as_deref(), Some("2024-12-31T00:00:00Z"));

        let open_ended = BudgetDraft {
            validity: String::new(),
            ..draft.clone()
        };
        assert_eq!(open_ended.to_payload(7).unwrap().validity, None);

        let malformed = BudgetDraft {
            validity: "31/12/2024".to_string(),
            ..draft
        };
        assert_eq!(
            malformed.to_payload(7).unwrap_err().kind,
            ApiErrorKind::Validation
        );
    }

    #[test]
    fn test_required_name() {
        assert!(ClientDraft::default().to_payload().is_err());
        let payload = ClientDraft {
            name: "  Bob ".to_string(),
            email: " ".to_string(),
            ..Default::default()
        }
        .to_payload()
        .unwrap();
        assert_eq!(payload.name, "Bob");
        assert_eq!(payload.email, None);
    }

    #[test]
    fn test_editor_lifecycle() {
        let project = Project {
            id: 3,
            name: "Reforma".to_string(),
            description: Some("casa de praia".to_string()),
            owner_id: Some(1),
            created_at: None,
            updated_at: None,
        };
        let mut editor: Editor<RecordId, ProjectDraft> = Editor::default();

        editor.open_edit(project.id, ProjectDraft::from(&project));
        assert!(editor.is_editing());
        assert_eq!(editor.draft.description, "casa de praia");

        editor.close();
        assert_eq!(editor, Editor::default());

        editor.open_create();
        assert!(editor.open);
        assert!(!editor.is_editing());
        assert_eq!(editor.draft, ProjectDraft::default());
    }

    #[test]
    fn test_user_draft_sends_all_editable_fields() {
        let user = User {
            id: 2,
            email: "bia@example.com".to_string(),
            username: "bia".to_string(),
            is_superuser: false,
        };
        let mut draft = UserDraft::from(&user);
        draft.is_superuser = true;
        let update = draft.to_update().unwrap();
        assert_eq!(update.is_superuser, Some(true));
        assert_eq!(update.username.as_deref(), Some("bia"));
        assert_eq!(update.password, None);
    }
}
