//! Request validation and response envelopes for the demo transport.
//!
//! The tree accepts any integers. The rules here are the front door's:
//! search positions must be present, numeric, non-negative and ordered, and
//! a new gene must have `start < end`. Positions arrive as JSON integers or
//! numeric strings (form-style input).

use crate::interval::{keys, GeneRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// User-visible validation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("Missing parameter: {0}")]
    Missing(&'static str),

    #[error("Invalid number format for {field}: '{value}'")]
    NotANumber { field: &'static str, value: String },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: i64 },

    #[error("Invalid query: start ({start}) is greater than end ({end})")]
    InvertedQuery { start: i64, end: i64 },

    #[error("Invalid number format for positions")]
    PositionFormat,

    #[error("Start position must be less than end position")]
    EmptyRange,

    #[error("Gene name must not be empty")]
    MissingName,

    #[error("Malformed request: {0}")]
    Malformed(String),
}

/// A request line as received by the server.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Search(SearchParams),
    Add(AddGeneParams),
    Stats,
}

impl Request {
    /// Decode one JSON request.
    pub fn parse(line: &str) -> Result<Self, RequestError> {
        serde_json::from_str(line).map_err(|e| RequestError::Malformed(e.to_string()))
    }
}

/// Raw search parameters, validated by [`SearchParams::validate`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query_start: Option<Value>,
    #[serde(default)]
    pub query_end: Option<Value>,
}

impl SearchParams {
    pub fn validate(&self) -> Result<SearchQuery, RequestError> {
        let start = parse_position("query_start", self.query_start.as_ref())?;
        let end = parse_position("query_end", self.query_end.as_ref())?;
        SearchQuery::new(start, end)
    }
}

/// A validated search range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchQuery {
    pub start: i64,
    pub end: i64,
}

impl SearchQuery {
    /// Apply the transport rules: non-negative and `start <= end`.
    pub fn new(start: i64, end: i64) -> Result<Self, RequestError> {
        if start < 0 {
            return Err(RequestError::Negative {
                field: "query_start",
                value: start,
            });
        }
        if end < 0 {
            return Err(RequestError::Negative {
                field: "query_end",
                value: end,
            });
        }
        if start > end {
            return Err(RequestError::InvertedQuery { start, end });
        }
        Ok(Self { start, end })
    }
}

/// Raw add-gene parameters, validated by [`AddGeneParams::into_record`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddGeneParams {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub start: Option<Value>,
    #[serde(default)]
    pub end: Option<Value>,
    #[serde(default)]
    pub chromosome: Option<String>,
    #[serde(default, rename = "type")]
    pub gene_type: Option<String>,
    #[serde(default)]
    pub function: Option<String>,
    #[serde(default)]
    pub disease: Option<String>,
    #[serde(default)]
    pub applications: Option<String>,
}

impl AddGeneParams {
    /// Validate and build the record to insert.
    pub fn into_record(self) -> Result<GeneRecord, RequestError> {
        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or(RequestError::MissingName)?;
        let start = parse_gene_position("start", self.start.as_ref())?;
        let end = parse_gene_position("end", self.end.as_ref())?;
        if start >= end {
            return Err(RequestError::EmptyRange);
        }

        let mut record = GeneRecord::new(start, end, name);
        let attrs = [
            (keys::CHROMOSOME, self.chromosome),
            (keys::TYPE, self.gene_type),
            (keys::FUNCTION, self.function),
            (keys::DISEASE, self.disease),
            (keys::APPLICATIONS, self.applications),
        ];
        for (key, value) in attrs {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                record.metadata.insert(key.to_string(), value);
            }
        }
        Ok(record)
    }
}

/// Add-gene positions report a non-number without naming the field.
fn parse_gene_position(field: &'static str, value: Option<&Value>) -> Result<i64, RequestError> {
    parse_position(field, value).map_err(|e| match e {
        RequestError::NotANumber { .. } => RequestError::PositionFormat,
        other => other,
    })
}

fn parse_position(field: &'static str, value: Option<&Value>) -> Result<i64, RequestError> {
    match value {
        None | Some(Value::Null) => Err(RequestError::Missing(field)),
        Some(Value::Number(n)) => n.as_i64().ok_or_else(|| RequestError::NotANumber {
            field,
            value: n.to_string(),
        }),
        Some(Value::String(s)) if s.trim().is_empty() => Err(RequestError::Missing(field)),
        Some(Value::String(s)) => s.trim().parse().map_err(|_| RequestError::NotANumber {
            field,
            value: s.clone(),
        }),
        Some(other) => Err(RequestError::NotANumber {
            field,
            value: other.to_string(),
        }),
    }
}

/// Response envelope: `{success, message, data}`.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }

    /// Serialize to a single JSON line.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            serde_json::json!({ "success": false, "message": e.to_string() }).to_string()
        })
    }
}

impl Envelope<()> {
    pub fn error(err: &RequestError) -> Self {
        Self::fail(err.to_string())
    }
}

/// Payload of a successful search.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResults<'a> {
    pub query_start: i64,
    pub query_end: i64,
    pub count: usize,
    pub genes: Vec<&'a GeneRecord>,
}

impl<'a> SearchResults<'a> {
    pub fn new(query: SearchQuery, genes: Vec<&'a GeneRecord>) -> Self {
        Self {
            query_start: query.start,
            query_end: query.end,
            count: genes.len(),
            genes,
        }
    }
}

/// Payload of a stats request.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TreeStats {
    pub genes: usize,
    pub height: usize,
    pub root_max_end: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn search(v: Value) -> Result<SearchQuery, RequestError> {
        serde_json::from_value::<SearchParams>(v).unwrap().validate()
    }

    #[test]
    fn test_search_numbers_and_strings() {
        assert_eq!(
            search(json!({"query_start": 200, "query_end": "600"})),
            Ok(SearchQuery { start: 200, end: 600 })
        );
    }

    #[test]
    fn test_search_rejections() {
        assert_eq!(
            search(json!({"query_end": 5})),
            Err(RequestError::Missing("query_start"))
        );
        assert!(matches!(
            search(json!({"query_start": "abc", "query_end": 5})),
            Err(RequestError::NotANumber { field: "query_start", .. })
        ));
        assert!(matches!(
            search(json!({"query_start": 1.5, "query_end": 5})),
            Err(RequestError::NotANumber { .. })
        ));
        assert!(matches!(
            search(json!({"query_start": -1, "query_end": 5})),
            Err(RequestError::Negative { .. })
        ));
        assert_eq!(
            search(json!({"query_start": 10, "query_end": 5})),
            Err(RequestError::InvertedQuery { start: 10, end: 5 })
        );
    }

    #[test]
    fn test_search_point_query_allowed() {
        assert!(search(json!({"query_start": 7, "query_end": 7})).is_ok());
    }

    #[test]
    fn test_add_gene() {
        let params: AddGeneParams = serde_json::from_value(json!({
            "name": "NEW1", "start": "10", "end": 20,
            "chromosome": "Chr1", "type": "lncRNA", "disease": ""
        }))
        .unwrap();
        let record = params.into_record().unwrap();
        assert_eq!(record.label, "NEW1");
        assert_eq!((record.start, record.end), (10, 20));
        assert_eq!(record.attr(keys::TYPE), Some("lncRNA"));
        assert_eq!(record.attr(keys::DISEASE), None);
    }

    #[test]
    fn test_add_gene_rejections() {
        let build = |v: Value| serde_json::from_value::<AddGeneParams>(v).unwrap().into_record();

        assert_eq!(
            build(json!({"name": "G", "start": 20, "end": 20})),
            Err(RequestError::EmptyRange)
        );
        assert_eq!(
            build(json!({"name": " ", "start": 1, "end": 2})),
            Err(RequestError::MissingName)
        );
        let err = build(json!({"name": "G", "start": "x", "end": 2})).unwrap_err();
        assert_eq!(err, RequestError::PositionFormat);
        assert_eq!(err.to_string(), "Invalid number format for positions");
        assert_eq!(
            build(json!({"name": "G", "start": 1, "end": [2]})),
            Err(RequestError::PositionFormat)
        );
        assert_eq!(
            build(json!({"name": "G", "start": 1})),
            Err(RequestError::Missing("end"))
        );
    }

    #[test]
    fn test_request_tagging() {
        assert!(matches!(Request::parse(r#"{"op":"stats"}"#), Ok(Request::Stats)));
        assert!(matches!(
            Request::parse(r#"{"op":"search","query_start":1,"query_end":2}"#),
            Ok(Request::Search(_))
        ));
        assert!(matches!(
            Request::parse(r#"{"op":"delete"}"#),
            Err(RequestError::Malformed(_))
        ));
        assert!(matches!(Request::parse("not json"), Err(RequestError::Malformed(_))));
    }

    #[test]
    fn test_envelope_json() {
        let ok = Envelope::ok("done", 3).to_json();
        assert_eq!(ok, r#"{"success":true,"message":"done","data":3}"#);

        let fail = Envelope::error(&RequestError::EmptyRange).to_json();
        assert_eq!(
            fail,
            r#"{"success":false,"message":"Start position must be less than end position"}"#
        );
    }
}
