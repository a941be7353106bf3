use crate::error::{ClientError, ClientResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The parsed response object, exactly as the service sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiResponse(Map<String, Value>);

impl ApiResponse {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn status(&self) -> Option<&str> {
        self.0.get("status").and_then(Value::as_str)
    }

    /// `true` when the service reported `"status": "ok"`.
    pub fn is_ok(&self) -> bool {
        self.status() == Some("ok")
    }

    pub fn error_message(&self) -> Option<&str> {
        self.0.get("error").and_then(Value::as_str)
    }

    pub fn data(&self) -> Option<&Value> {
        self.0.get("data").filter(|v| !v.is_null())
    }

    /// Decodes `data` into the documented simulation summary.
    pub fn simulation(&self) -> ClientResult<SimulationData> {
        let data = self
            .data()
            .ok_or_else(|| ClientError::invalid_response(None, "response has no data", None))?;
        serde_json::from_value(data.clone()).map_err(|e| {
            ClientError::invalid_response(
                None,
                format!("unexpected data shape: {e}"),
                Some(data.to_string()),
            )
        })
    }
}

impl From<ApiResponse> for Value {
    fn from(response: ApiResponse) -> Self {
        Value::Object(response.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationData {
    pub total_spins: u32,
    pub num_reels: u32,
    pub bet_per_spin: f64,
    #[serde(default)]
    pub spins: Vec<Spin>,
    pub total_bet: f64,
    pub total_winnings: f64,
    pub net_profit: f64,
    pub wins: u32,
    pub losses: u32,
    pub win_percentage: f64,
    #[serde(default)]
    pub available_symbols: Vec<AvailableSymbol>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spin {
    pub spin_number: u32,
    #[serde(default)]
    pub reels: Vec<Reel>,
    pub bet: f64,
    pub payout: f64,
    #[serde(default)]
    pub win_type: String,
    pub is_win: bool,
}

impl Spin {
    /// Reel symbols joined for one-line display.
    pub fn symbols(&self) -> String {
        self.reels
            .iter()
            .map(|r| r.symbol.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reel {
    pub symbol: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSymbol {
    pub symbol: String,
    pub name: String,
    pub payout_multiplier: f64,
}
