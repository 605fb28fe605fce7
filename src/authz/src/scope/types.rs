//! Scope filter types
//!
//! A [`ScopeFilter`] is the declarative twin of the region matcher: it admits
//! exactly the records the matcher would accept for the same actor.

use crate::region::{RegionDescriptor, RegionLevel};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Constraint on one region level
///
/// Admits a record whose level equals `value`, or whose level is not
/// populated at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConstraint {
    /// Constrained level
    pub level: RegionLevel,

    /// Required value when the record populates the level
    pub value: String,
}

impl LevelConstraint {
    pub fn new(level: RegionLevel, value: impl Into<String>) -> Self {
        Self {
            level,
            value: value.into(),
        }
    }

    /// Whether a record region satisfies this constraint
    pub fn admits(&self, region: &RegionDescriptor) -> bool {
        region
            .get(self.level)
            .map_or(true, |value| value == self.value)
    }

    /// Document-store clause for this constraint
    ///
    /// `null` matches both missing and null fields; blank strings are
    /// treated as unpopulated, the same as on the in-memory side.
    fn to_clause(&self, prefix: &str) -> Value {
        let field = field_path(prefix, self.level);
        json!({ field: { "$in": [self.value, Value::Null, ""] } })
    }
}

/// Filter narrowing list and search queries to an actor's region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ScopeFilter {
    /// Matches every record (top-level actors)
    Unrestricted,

    /// Matches no record (misconfigured actors)
    Nothing,

    /// Every constraint must admit the record
    Levels { constraints: Vec<LevelConstraint> },
}

impl ScopeFilter {
    /// Whether a record tagged with `region` is in scope
    pub fn admits(&self, region: &RegionDescriptor) -> bool {
        match self {
            ScopeFilter::Unrestricted => true,
            ScopeFilter::Nothing => false,
            ScopeFilter::Levels { constraints } => constraints.iter().all(|c| c.admits(region)),
        }
    }

    /// Keep only in-scope items
    pub fn apply<T, I, F>(&self, items: I, region_of: F) -> Vec<T>
    where
        I: IntoIterator<Item = T>,
        F: Fn(&T) -> &RegionDescriptor,
    {
        items
            .into_iter()
            .filter(|item| self.admits(region_of(item)))
            .collect()
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, ScopeFilter::Unrestricted)
    }

    /// Render as a document-store query over fields under `prefix`
    ///
    /// # Examples
    ///
    /// ```
    /// use healthgrid_authz::scope::{LevelConstraint, ScopeFilter};
    /// use healthgrid_authz::region::RegionLevel;
    ///
    /// let filter = ScopeFilter::Levels {
    ///     constraints: vec![LevelConstraint::new(RegionLevel::State, "X")],
    /// };
    /// let query = filter.to_document_query("region");
    /// assert_eq!(query["$and"][0]["region.state"]["$in"][0], "X");
    /// ```
    pub fn to_document_query(&self, prefix: &str) -> Value {
        match self {
            ScopeFilter::Unrestricted => json!({}),
            ScopeFilter::Nothing => json!({ "_id": { "$in": [] } }),
            ScopeFilter::Levels { constraints } => {
                let clauses: Vec<Value> = constraints.iter().map(|c| c.to_clause(prefix)).collect();
                json!({ "$and": clauses })
            }
        }
    }

    /// Conjoin caller-supplied filters (date range, status, ...) with the scope
    pub fn merge(&self, prefix: &str, caller_filter: Value) -> Value {
        let caller_is_empty = match &caller_filter {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            _ => false,
        };

        match (self, caller_is_empty) {
            (ScopeFilter::Unrestricted, true) => json!({}),
            (ScopeFilter::Unrestricted, false) => caller_filter,
            (_, true) => self.to_document_query(prefix),
            (_, false) => json!({ "$and": [self.to_document_query(prefix), caller_filter] }),
        }
    }
}

fn field_path(prefix: &str, level: RegionLevel) -> String {
    if prefix.is_empty() {
        level.field_name().to_string()
    } else {
        format!("{}.{}", prefix, level.field_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn district_filter() -> ScopeFilter {
        ScopeFilter::Levels {
            constraints: vec![
                LevelConstraint::new(RegionLevel::State, "X"),
                LevelConstraint::new(RegionLevel::District, "A"),
            ],
        }
    }

    #[test]
    fn test_constraint_admits_absent_level() {
        let constraint = LevelConstraint::new(RegionLevel::District, "A");
        assert!(constraint.admits(&RegionDescriptor::new().with_state("X")));
        assert!(constraint.admits(&RegionDescriptor::new().with_district("A")));
        assert!(!constraint.admits(&RegionDescriptor::new().with_district("B")));
    }

    #[test]
    fn test_apply() {
        let reports = vec![
            ("r1", RegionDescriptor::new().with_state("X").with_district("A")),
            ("r2", RegionDescriptor::new().with_state("X").with_district("B")),
            ("r3", RegionDescriptor::new().with_state("Y")),
        ];

        let kept = district_filter().apply(reports, |(_, region)| region);
        let ids: Vec<&str> = kept.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec!["r1"]);
    }

    #[test]
    fn test_document_query_shape() {
        let query = district_filter().to_document_query("scope.region");
        let clauses = query["$and"].as_array().unwrap();

        assert_eq!(clauses.len(), 2);
        assert_eq!(
            clauses[1],
            json!({ "scope.region.district": { "$in": ["A", null, ""] } })
        );
    }

    #[test]
    fn test_unrestricted_and_nothing_queries() {
        assert_eq!(ScopeFilter::Unrestricted.to_document_query("region"), json!({}));
        assert_eq!(
            ScopeFilter::Nothing.to_document_query("region"),
            json!({ "_id": { "$in": [] } })
        );
    }

    #[test]
    fn test_merge() {
        let status = json!({ "status": "submitted" });

        assert_eq!(ScopeFilter::Unrestricted.merge("region", status.clone()), status);
        assert_eq!(
            district_filter().merge("region", json!({})),
            district_filter().to_document_query("region")
        );

        let merged = district_filter().merge("region", status.clone());
        assert_eq!(merged["$and"][1], status);
    }

    #[test]
    fn test_serde_tagging() {
        let json = serde_json::to_value(&district_filter()).unwrap();
        assert_eq!(json["type"], "levels");
        assert_eq!(json["constraints"][0]["level"], "state");

        let nothing = serde_json::to_value(&ScopeFilter::Nothing).unwrap();
        assert_eq!(nothing, json!({ "type": "nothing" }));
    }
}
