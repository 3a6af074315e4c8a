use crate::models::Client;

/// 客户是否匹配搜索词（名称或邮箱，不区分大小写）
pub fn matches_query(client: &Client, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    client.name.to_lowercase().contains(&query)
        || client
            .email
            .as_deref()
            .is_some_and(|email| email.to_lowercase().contains(&query))
}

pub fn filter_clients<'a>(clients: &'a [Client], query: &str) -> Vec<&'a Client> {
    clients.iter().filter(|c| matches_query(c, query)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(id: i64, name: &str, email: Option<&str>) -> Client {
        Client {
            id,
            name: name.to_string(),
            phone: None,
            email: email.map(str::to_string),
            address: None,
            cpf_cnpj: None,
            owner_id: Some(1),
            is_active: Some(true),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_search_by_name_or_email() {
        let clients = vec![
            client(1, "Ana Souza", Some("ana@piscinas.com")),
            client(2, "Bruno Lima", None),
            client(3, "Carla", Some("CARLA.SOUZA@exemplo.com")),
        ];

        let ids = |q: &str| filter_clients(&clients, q).iter().map(|c| c.id).collect::<Vec<_>>();

        assert_eq!(ids("souza"), vec![1, 3]);
        assert_eq!(ids("BRUNO"), vec![2]);
        assert_eq!(ids("piscinas.com"), vec![1]);
        assert_eq!(ids("   "), vec![1, 2, 3]);
        assert!(ids("zzz").is_empty());
    }
}
