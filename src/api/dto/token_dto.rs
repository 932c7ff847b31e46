//! Token pool, transfer, and balance DTOs.
//!
//! Amounts travel as strings end to end so large integer values keep
//! their precision.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::str_at;
use crate::error::GatewayError;

/// Token pool kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TokenPoolType {
    /// Interchangeable units (ERC-20 style).
    Fungible,
    /// Unique indexed tokens (ERC-721 style).
    Nonfungible,
}

/// Request body for `POST /api/tokens/pools`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateTokenPoolRequest {
    /// Pool name, unique within the namespace.
    pub name: String,
    /// Optional ticker symbol.
    #[serde(default)]
    pub symbol: Option<String>,
    /// Pool kind.
    #[serde(rename = "type")]
    pub kind: TokenPoolType,
    /// Connector-specific configuration (e.g. an existing contract address).
    #[serde(default)]
    pub config: Option<Value>,
}

/// Request body for `POST /api/tokens/mint`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MintRequest {
    /// Pool name or id.
    pub pool: String,
    /// Amount to mint (string-encoded integer).
    pub amount: String,
    /// Token index for non-fungible pools.
    #[serde(default)]
    pub token_index: Option<String>,
    /// Recipient key; defaults to the caller's own key upstream.
    #[serde(default)]
    pub to: Option<String>,
}

/// Request body for `POST /api/tokens/burn`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BurnRequest {
    /// Pool name or id.
    pub pool: String,
    /// Amount to burn (string-encoded integer).
    pub amount: String,
    /// Token index for non-fungible pools.
    #[serde(default)]
    pub token_index: Option<String>,
}

/// Request body for `POST /api/tokens/transfer`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    /// Pool name or id.
    pub pool: String,
    /// Recipient key or identity.
    pub to: String,
    /// Amount to transfer (string-encoded integer).
    pub amount: String,
    /// Token index for non-fungible pools.
    #[serde(default)]
    pub token_index: Option<String>,
}

/// Query for `GET /api/tokens/balances`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct BalanceParams {
    /// Namespace to address.
    #[serde(default)]
    pub ns: Option<String>,
    /// Restrict to one pool.
    #[serde(default)]
    pub pool: Option<String>,
    /// Restrict to one key.
    #[serde(default)]
    pub key: Option<String>,
}

/// Token pool summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TokenPoolDto {
    /// Pool id.
    pub id: Option<String>,
    /// Pool name.
    pub name: Option<String>,
    /// Ticker symbol.
    pub symbol: Option<String>,
    /// `fungible` or `nonfungible`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Token standard reported by the connector (e.g. `ERC20`).
    pub standard: Option<String>,
    /// Decimal places.
    pub decimals: Option<String>,
}

impl TokenPoolDto {
    /// Maps an upstream token pool record.
    #[must_use]
    pub fn from_upstream(pool: &Value) -> Self {
        Self {
            id: str_at(pool, "/id"),
            name: str_at(pool, "/name"),
            symbol: str_at(pool, "/symbol"),
            kind: str_at(pool, "/type"),
            standard: str_at(pool, "/standard"),
            decimals: str_at(pool, "/decimals"),
        }
    }
}

/// Balance of one key in one pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalanceDto {
    /// Pool id.
    pub pool: Option<String>,
    /// Holder key.
    pub key: Option<String>,
    /// Balance (string-encoded integer).
    pub balance: Option<String>,
    /// Token index for non-fungible pools.
    pub token_index: Option<String>,
}

impl TokenBalanceDto {
    /// Maps an upstream balance record.
    #[must_use]
    pub fn from_upstream(balance: &Value) -> Self {
        Self {
            pool: str_at(balance, "/pool"),
            key: str_at(balance, "/key"),
            balance: str_at(balance, "/balance"),
            token_index: str_at(balance, "/tokenIndex"),
        }
    }
}

/// Rejects amounts that are not non-negative integers.
fn validate_amount(amount: &str) -> Result<(), GatewayError> {
    amount
        .parse::<u128>()
        .map(|_| ())
        .map_err(|_| GatewayError::InvalidRequest(format!("invalid amount: {amount}")))
}

/// Builds a transfer-style body, skipping unset optional fields.
fn transfer_body(fields: &[(&str, Option<&str>)]) -> Value {
    let body: Map<String, Value> = fields
        .iter()
        .filter_map(|(k, v)| v.map(|v| ((*k).to_string(), json!(v))))
        .collect();
    Value::Object(body)
}

impl CreateTokenPoolRequest {
    /// Upstream body for pool creation.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if the name is blank.
    pub fn to_upstream(&self) -> Result<Value, GatewayError> {
        if self.name.trim().is_empty() {
            return Err(GatewayError::InvalidRequest("pool name is required".to_string()));
        }
        let mut body = json!({ "name": self.name, "type": self.kind });
        if let Some(fields) = body.as_object_mut() {
            if let Some(symbol) = self.symbol.as_ref().filter(|s| !s.is_empty()) {
                fields.insert("symbol".to_string(), json!(symbol));
            }
            if let Some(config) = &self.config {
                fields.insert("config".to_string(), config.clone());
            }
        }
        Ok(body)
    }
}

impl MintRequest {
    /// Upstream body for a mint.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] on a malformed amount.
    pub fn to_upstream(&self) -> Result<Value, GatewayError> {
        validate_amount(&self.amount)?;
        Ok(transfer_body(&[
            ("pool", Some(self.pool.as_str())),
            ("amount", Some(self.amount.as_str())),
            ("tokenIndex", self.token_index.as_deref()),
            ("to", self.to.as_deref()),
        ]))
    }
}

impl BurnRequest {
    /// Upstream body for a burn.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] on a malformed amount.
    pub fn to_upstream(&self) -> Result<Value, GatewayError> {
        validate_amount(&self.amount)?;
        Ok(transfer_body(&[
            ("pool", Some(self.pool.as_str())),
            ("amount", Some(self.amount.as_str())),
            ("tokenIndex", self.token_index.as_deref()),
        ]))
    }
}

impl TransferRequest {
    /// Upstream body for a transfer.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] on a malformed amount or a
    /// blank recipient.
    pub fn to_upstream(&self) -> Result<Value, GatewayError> {
        validate_amount(&self.amount)?;
        if self.to.trim().is_empty() {
            return Err(GatewayError::InvalidRequest("recipient is required".to_string()));
        }
        Ok(transfer_body(&[
            ("pool", Some(self.pool.as_str())),
            ("to", Some(self.to.as_str())),
            ("amount", Some(self.amount.as_str())),
            ("tokenIndex", self.token_index.as_deref()),
        ]))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn mint_skips_unset_fields() {
        let req = MintRequest {
            pool: "p1".to_string(),
            amount: "100".to_string(),
            token_index: None,
            to: None,
        };
        let Ok(body) = req.to_upstream() else {
            panic!("valid mint");
        };
        assert_eq!(body, json!({ "pool": "p1", "amount": "100" }));
    }

    #[test]
    fn non_numeric_amount_is_rejected() {
        let req = BurnRequest {
            pool: "p1".to_string(),
            amount: "ten".to_string(),
            token_index: Some("1".to_string()),
        };
        assert!(matches!(req.to_upstream(), Err(GatewayError::InvalidRequest(_))));
    }

    #[test]
    fn transfer_requires_recipient() {
        let req = TransferRequest {
            pool: "p1".to_string(),
            to: " ".to_string(),
            amount: "1".to_string(),
            token_index: None,
        };
        assert!(matches!(req.to_upstream(), Err(GatewayError::InvalidRequest(_))));
    }

    #[test]
    fn pool_request_serializes_type() {
        let Ok(req) = serde_json::from_value::<CreateTokenPoolRequest>(json!({
            "name": "coins",
            "symbol": "CN",
            "type": "fungible"
        })) else {
            panic!("valid request");
        };
        let Ok(body) = req.to_upstream() else {
            panic!("valid body");
        };
        assert_eq!(body, json!({ "name": "coins", "type": "fungible", "symbol": "CN" }));
    }

    #[test]
    fn pool_mapping_reads_numeric_decimals() {
        let dto = TokenPoolDto::from_upstream(&json!({
            "id": "p1",
            "name": "coins",
            "type": "fungible",
            "standard": "ERC20",
            "decimals": 18
        }));
        assert_eq!(dto.decimals.as_deref(), Some("18"));
        assert_eq!(dto.symbol, None);
    }
}
