use serde::{Deserialize, Deserializer, Serialize};

/// One transaction exactly as the API serves it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransaction {
    #[serde(rename = "Date")]
    pub date: String,
    /// Decimal text; numeric JSON values are accepted and kept as text
    #[serde(rename = "Amount", deserialize_with = "amount_text")]
    pub amount: String,
    #[serde(rename = "Ledger", default)]
    pub ledger: String,
    #[serde(rename = "Company", default)]
    pub company: String,
}

/// One page of the paginated transaction feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(rename = "totalCount")]
    pub total_count: usize,
    #[serde(default)]
    pub transactions: Vec<RawTransaction>,
}

fn amount_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Repr::deserialize(deserializer)? {
        Repr::Text(s) => s,
        Repr::Number(n) => n.to_string(),
    })
}
