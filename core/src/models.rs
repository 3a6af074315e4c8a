use serde::{Deserialize, Serialize};

// =========================================================
// 领域模型 (Domain Models)
// =========================================================
//
// 字段与后端 schema 一一对应。时间戳保持服务端原样的字符串，
// 前端只做展示，不做时区换算。

pub type RecordId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: RecordId,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub is_superuser: bool,
}

/// `POST /auth/token` 的响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterPayload {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// 管理员编辑用户，未设置的字段不会发送
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_superuser: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner_id: Option<RecordId>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub cpf_cnpj: Option<String>,
    #[serde(default)]
    pub owner_id: Option<RecordId>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientPayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpf_cnpj: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub id: RecordId,
    pub client_id: RecordId,
    pub volume: i64,
    pub pool_type: String,
    #[serde(default)]
    pub coating: Option<String>,
    #[serde(default)]
    pub depth: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolPayload {
    pub client_id: RecordId,
    pub volume: i64,
    pub pool_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coating: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<String>,
}

/// 一次上门服务记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: RecordId,
    pub pool_id: RecordId,
    pub service_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub time_spent: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePayload {
    pub pool_id: RecordId,
    pub service_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_spent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// 报价单
///
/// `items` 是后端存储的 JSON 字符串，见 [`BudgetItem`]。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub id: RecordId,
    pub client_id: RecordId,
    pub items: String,
    pub total: String,
    #[serde(default = "default_budget_status")]
    pub status: String,
    #[serde(default)]
    pub validity: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn default_budget_status() -> String {
    "Open".to_string()
}

impl Budget {
    /// 解析 `items` 中的条目描述；格式不符时原样返回整个字符串
    pub fn item_descriptions(&self) -> Vec<String> {
        match serde_json::from_str::<Vec<BudgetItem>>(&self.items) {
            Ok(items) => items.into_iter().map(|i| i.description).collect(),
            Err(_) => vec![self.items.clone()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetItem {
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetPayload {
    pub client_id: RecordId,
    pub items: String,
    pub total: String,
    pub validity: Option<String>,
}

/// 全局键值配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSetting {
    pub id: RecordId,
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettingPayload {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_ignores_relations() {
        let user: User = serde_json::from_value(json!({
            "id": 1,
            "email": "alice@example.com",
            "username": "alice",
            "is_superuser": false,
            "projects": [],
            "clients": []
        }))
        .unwrap();
        assert_eq!(user.username, "alice");
        assert!(!user.is_superuser);
    }

    #[test]
    fn test_budget_item_descriptions() {
        let budget = Budget {
            id: 1,
            client_id: 2,
            items: r#"[{"description":"Troca de filtro"}]"#.to_string(),
            total: "350.00".to_string(),
            status: "Open".to_string(),
            validity: None,
            created_at: None,
        };
        assert_eq!(budget.item_descriptions(), vec!["Troca de filtro".to_string()]);

        let legacy = Budget {
            items: "limpeza geral".to_string(),
            ..budget
        };
        assert_eq!(legacy.item_descriptions(), vec!["limpeza geral".to_string()]);
    }

    #[test]
    fn test_budget_status_defaults_to_open() {
        let budget: Budget = serde_json::from_value(json!({
            "id": 3,
            "client_id": 2,
            "items": "[]",
            "total": "10"
        }))
        .unwrap();
        assert_eq!(budget.status, "Open");
    }

    #[test]
    fn test_update_skips_unset_fields() {
        let update = UserUpdate {
            is_superuser: Some(true),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({ "is_superuser": true }));
    }
}
