use std::collections::BTreeMap;
use std::fmt;

/// A scalar that can be placed in a query string.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Int(v) => write!(f, "{v}"),
            QueryValue::Float(v) => write!(f, "{v}"),
            QueryValue::Bool(v) => write!(f, "{v}"),
            QueryValue::Text(v) => f.write_str(v),
        }
    }
}

macro_rules! query_value_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for QueryValue {
            fn from(v: $t) -> Self {
                QueryValue::Int(i64::from(v))
            }
        })*
    };
}

query_value_from_int!(i8, i16, i32, i64, u8, u16, u32);

// Wider unsigned types only convert when the value fits in an i64.
impl TryFrom<u64> for QueryValue {
    type Error = std::num::TryFromIntError;

    fn try_from(v: u64) -> Result<Self, Self::Error> {
        i64::try_from(v).map(QueryValue::Int)
    }
}

impl TryFrom<usize> for QueryValue {
    type Error = std::num::TryFromIntError;

    fn try_from(v: usize) -> Result<Self, Self::Error> {
        i64::try_from(v).map(QueryValue::Int)
    }
}

impl From<f32> for QueryValue {
    fn from(v: f32) -> Self {
        QueryValue::Float(f64::from(v))
    }
}

impl From<f64> for QueryValue {
    fn from(v: f64) -> Self {
        QueryValue::Float(v)
    }
}

impl From<bool> for QueryValue {
    fn from(v: bool) -> Self {
        QueryValue::Bool(v)
    }
}

impl From<&str> for QueryValue {
    fn from(v: &str) -> Self {
        QueryValue::Text(v.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(v: String) -> Self {
        QueryValue::Text(v)
    }
}

/// Parameters for one simulation request.
///
/// The three documented options are typed. Anything else the service learns to
/// accept can be passed through [`QueryOptions::param`]; the service decides
/// whether a value is acceptable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    /// Number of spins to simulate.
    pub spins: Option<u32>,
    /// Reels per spin.
    pub reels: Option<u32>,
    /// Bet placed on each spin.
    pub bet: Option<f64>,
    /// Unrecognized parameters, sent in key order after the typed ones.
    pub extra: BTreeMap<String, QueryValue>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every entry lands in `extra`; no key is interpreted locally.
    pub fn from_params<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<QueryValue>,
    {
        Self {
            extra: params
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn spins(mut self, spins: u32) -> Self {
        self.spins = Some(spins);
        self
    }

    pub fn reels(mut self, reels: u32) -> Self {
        self.reels = Some(reels);
        self
    }

    pub fn bet(mut self, bet: f64) -> Self {
        self.bet = Some(bet);
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.spins.is_none() && self.reels.is_none() && self.bet.is_none() && self.extra.is_empty()
    }

    /// Key/value pairs in the order they go on the wire. A typed option shadows
    /// an extra with the same key.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(3 + self.extra.len());
        if let Some(spins) = self.spins {
            pairs.push(("spins".to_string(), spins.to_string()));
        }
        if let Some(reels) = self.reels {
            pairs.push(("reels".to_string(), reels.to_string()));
        }
        if let Some(bet) = self.bet {
            pairs.push(("bet".to_string(), bet.to_string()));
        }

        for (key, value) in &self.extra {
            if pairs.iter().any(|(typed, _)| typed == key) {
                continue;
            }
            pairs.push((key.clone(), value.to_string()));
        }
        pairs
    }
}
