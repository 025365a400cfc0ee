use std::collections::HashSet;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateKind {
    Count,
    SumPrice,
}

impl AggregateKind {
    pub fn column_name(self) -> &'static str {
        match self {
            AggregateKind::Count => "count",
            AggregateKind::SumPrice => "sum_price",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "COUNT" => Some(AggregateKind::Count),
            "SUM_PRICE" => Some(AggregateKind::SumPrice),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    pub time_range: String,
    pub limit: Option<usize>,
}

/// `/aggregates` query parameters (spec §4.3). `aggregates` is a
/// comma-separated set (`COUNT,SUM_PRICE`), matching the comma-joined
/// list convention `allezon-config` already uses for its own
/// multi-valued environment options.
#[derive(Debug, Deserialize)]
pub struct AggregatesQuery {
    pub time_range: String,
    pub action: String,
    pub aggregates: String,
    pub origin: Option<String>,
    pub brand_id: Option<String>,
    pub category_id: Option<String>,
}

impl AggregatesQuery {
    /// Parses `aggregates` into its distinct, order-preserving list of
    /// kinds. Rejects unknown values and duplicates (spec §4.3).
    pub fn parse_aggregates(&self) -> Result<Vec<AggregateKind>, String> {
        let mut seen = HashSet::new();
        let mut kinds = Vec::new();
        for raw in self.aggregates.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let kind = AggregateKind::parse(raw).ok_or_else(|| format!("unknown aggregate '{raw}'"))?;
            if !seen.insert(raw) {
                return Err(format!("duplicate aggregate '{raw}'"));
            }
            kinds.push(kind);
        }
        if kinds.is_empty() {
            return Err("aggregates must name at least one of COUNT, SUM_PRICE".to_string());
        }
        Ok(kinds)
    }
}
