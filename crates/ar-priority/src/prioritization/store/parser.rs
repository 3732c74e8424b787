use super::{LoadError, Relation};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::io::Read;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OpsItemRow {
    pub ops_item_id: String,
    #[serde(rename = "type", default, deserialize_with = "optional_text")]
    pub item_type: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub sla_due: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub owner: Option<String>,
    #[serde(default, deserialize_with = "optional_count")]
    pub age_days: Option<f64>,
    #[serde(default, deserialize_with = "optional_text")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TransactionRow {
    #[serde(default, deserialize_with = "optional_text")]
    pub transaction_id: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub ops_item_id: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub client_id: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub invoice_id: Option<String>,
    #[serde(default, deserialize_with = "optional_number")]
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "optional_text")]
    pub due_date: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RiskRow {
    pub ops_item_id: String,
    #[serde(default, deserialize_with = "optional_count")]
    pub missing_fields: Option<f64>,
    #[serde(default, deserialize_with = "optional_count")]
    pub dup_flag: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub error_rate_by_client: Option<f64>,
    #[serde(default, deserialize_with = "optional_count")]
    pub blocks_invoicing: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ClientTierRow {
    pub client_id: String,
    #[serde(default, deserialize_with = "optional_text")]
    pub client_name: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub tier: Option<String>,
}

/// Rows of one relation plus whether its header carried a `status` column.
#[derive(Debug, Clone, Default)]
pub(crate) struct ParsedRelation<T> {
    pub(crate) rows: Vec<T>,
    pub(crate) has_status: bool,
}

pub(crate) fn parse_relation<T, R>(
    relation: Relation,
    reader: R,
) -> Result<ParsedRelation<T>, LoadError>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|source| LoadError::Csv { relation, source })?
        .clone();
    let header_names: Vec<String> = headers
        .iter()
        .map(|name| name.trim_start_matches('\u{feff}').to_string())
        .collect();

    for &column in relation.required_columns() {
        if !header_names.iter().any(|name| name == column) {
            return Err(LoadError::MissingColumn { relation, column });
        }
    }
    let has_status = header_names.iter().any(|name| name == "status");
    csv_reader.set_headers(csv::StringRecord::from(header_names));

    let mut rows = Vec::new();
    for record in csv_reader.deserialize::<T>() {
        rows.push(record.map_err(|source| LoadError::Csv { relation, source })?);
    }

    Ok(ParsedRelation { rows, has_status })
}

/// Cell spellings read as missing, matching what common dataframe exports
/// write for nulls.
const NULL_TOKENS: [&str; 19] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null", "",
];

fn is_null_token(raw: &str) -> bool {
    NULL_TOKENS.contains(&raw.trim())
}

fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !is_null_token(value)))
}

/// Null tokens and non-finite values are missing; any other unparseable cell
/// is an error.
fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if is_null_token(&raw) {
        return Ok(None);
    }
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| serde::de::Error::custom(format!("expected a number, got '{raw}'")))?;
    Ok(Some(value).filter(|value| value.is_finite()))
}

/// Counts and 0/1 flags arrive as `3` or, after a null-bearing export, `3.0`.
fn optional_count<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match optional_number(deserializer)? {
        Some(value) if value.fract() != 0.0 => Err(serde::de::Error::custom(format!(
            "expected a whole number, got {value}"
        ))),
        other => Ok(other),
    }
}
