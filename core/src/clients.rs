//! Customer records (`/clients`).

use serde::{Deserialize, Serialize};

use crate::client::VendusClient;
use crate::error::ApiError;
use crate::query::QueryParams;
use crate::request::RequestSpec;
use crate::transport::Transport;

/// Vendus encodes booleans as `"yes"` / `"no"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YesNo {
    Yes,
    No,
}

impl From<bool> for YesNo {
    fn from(value: bool) -> Self {
        if value {
            YesNo::Yes
        } else {
            YesNo::No
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    #[default]
    Active,
    Inactive,
}

impl ClientStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ClientStatus::Active => "active",
            ClientStatus::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceGroup {
    pub id: u64,
    pub title: String,
    pub is_default: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Balance {
    pub total: String,
    pub on_time: String,
    pub overdue: String,
}

/// A customer as returned by the API. Listings omit `balance`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Client {
    pub id: u64,
    pub fiscal_id: String,
    pub external_reference: String,
    pub default_pay_due: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub postalcode: String,
    pub phone: String,
    pub mobile: String,
    pub email: String,
    pub website: String,
    pub country: String,
    pub price_group: Option<PriceGroup>,
    pub send_email: Option<YesNo>,
    pub irs_retention: Option<YesNo>,
    pub status: ClientStatus,
    pub notes: String,
    pub date: String,
    pub balance: Option<Balance>,
}

/// Fields accepted when creating a customer. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateClient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiscal_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_reference: Option<String>,
    /// `now`, or a number of days: `1`, `15`, `30`, `45`, `60`, `90`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_pay_due: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postalcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_email: Option<YesNo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub irs_retention: Option<YesNo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_group_id: Option<u64>,
}

/// Partial update; only set fields change on the server.
pub type UpdateClient = CreateClient;

/// Filters for listing customers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientQuery {
    /// Free-text search.
    pub q: Option<String>,
    pub fiscal_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub external_reference: Option<String>,
    pub status: Option<ClientStatus>,
    pub date: Option<String>,
    pub id: Option<String>,
}

impl ClientQuery {
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        let text = [
            ("q", &self.q),
            ("fiscal_id", &self.fiscal_id),
            ("name", &self.name),
            ("email", &self.email),
            ("external_reference", &self.external_reference),
        ];
        for (key, value) in text {
            if let Some(value) = value {
                params.insert(key, value);
            }
        }
        if let Some(status) = self.status {
            params.insert("status", status.as_str());
        }
        if let Some(date) = &self.date {
            params.insert("date", date);
        }
        if let Some(id) = &self.id {
            params.insert("id", id);
        }
        params
    }
}

/// `/clients` operations, borrowed from a [`VendusClient`].
pub struct ClientsApi<'a, T: Transport> {
    client: &'a VendusClient<T>,
}

impl<'a, T: Transport> ClientsApi<'a, T> {
    pub(crate) fn new(client: &'a VendusClient<T>) -> Self {
        Self { client }
    }

    pub fn list(&self, query: &ClientQuery) -> Result<Vec<Client>, ApiError> {
        self.client
            .request(RequestSpec::get("clients").query_params(query.to_params()))
    }

    pub fn get(&self, id: u64) -> Result<Client, ApiError> {
        self.client.request(RequestSpec::get(format!("clients/{id}")))
    }

    pub fn create(&self, input: &CreateClient) -> Result<Client, ApiError> {
        self.client.request(RequestSpec::post("clients").json(input)?)
    }

    pub fn update(&self, id: u64, changes: &UpdateClient) -> Result<Client, ApiError> {
        self.client
            .request(RequestSpec::patch(format!("clients/{id}")).json(changes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::encode_query;

    #[test]
    fn query_encodes_only_set_filters() {
        let query = ClientQuery {
            name: Some("Acme Lda".to_string()),
            status: Some(ClientStatus::Inactive),
            ..Default::default()
        };
        assert_eq!(encode_query(&query.to_params()), "name=Acme%20Lda&status=inactive");
        assert!(ClientQuery::default().to_params().is_empty());
    }

    #[test]
    fn create_skips_unset_fields() {
        let input = CreateClient {
            name: Some("Acme".to_string()),
            send_email: Some(YesNo::Yes),
            price_group_id: Some(2),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&input).unwrap(),
            r#"{"name":"Acme","send_email":"yes","price_group_id":2}"#
        );
    }

    #[test]
    fn client_tolerates_missing_fields() {
        let client: Client =
            serde_json::from_str(r#"{"id":3,"name":"Acme","status":"inactive","send_email":"no"}"#)
                .unwrap();
        assert_eq!(client.id, 3);
        assert_eq!(client.status, ClientStatus::Inactive);
        assert_eq!(client.send_email, Some(YesNo::No));
        assert!(client.balance.is_none());
    }
}
