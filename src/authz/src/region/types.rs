//! Region descriptor and hierarchy level definitions
//!
//! A region is a partial record over five fixed levels. Levels may be left
//! unpopulated; comparison only ever looks at levels populated on both sides.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// One level of the geographic/organizational hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RegionLevel {
    State,
    District,
    SubDistrict,
    #[serde(rename = "hospitalId")]
    Hospital,
    #[serde(rename = "departmentId")]
    Department,
}

impl RegionLevel {
    /// All levels, broadest first. Matching always walks this order.
    pub const ALL: [RegionLevel; 5] = [
        RegionLevel::State,
        RegionLevel::District,
        RegionLevel::SubDistrict,
        RegionLevel::Hospital,
        RegionLevel::Department,
    ];

    /// Field name of this level in stored documents
    pub fn field_name(self) -> &'static str {
        match self {
            RegionLevel::State => "state",
            RegionLevel::District => "district",
            RegionLevel::SubDistrict => "subDistrict",
            RegionLevel::Hospital => "hospitalId",
            RegionLevel::Department => "departmentId",
        }
    }

    /// Position in [`RegionLevel::ALL`]
    pub fn depth(self) -> usize {
        self as usize
    }
}

impl fmt::Display for RegionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Partial hierarchy record attached to actors and resources
///
/// # Examples
///
/// ```
/// use healthgrid_authz::region::{RegionDescriptor, RegionLevel};
///
/// let region = RegionDescriptor::new().with_state("X").with_district("A");
/// assert_eq!(region.get(RegionLevel::District), Some("A"));
/// assert_eq!(region.populated_levels().count(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionDescriptor {
    #[serde(default, deserialize_with = "non_blank", skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(default, deserialize_with = "non_blank", skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,

    #[serde(default, deserialize_with = "non_blank", skip_serializing_if = "Option::is_none")]
    pub sub_district: Option<String>,

    #[serde(default, deserialize_with = "non_blank", skip_serializing_if = "Option::is_none")]
    pub hospital_id: Option<String>,

    #[serde(default, deserialize_with = "non_blank", skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,
}

impl RegionDescriptor {
    /// Creates an empty descriptor
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(self, value: impl Into<String>) -> Self {
        self.with(RegionLevel::State, value)
    }

    pub fn with_district(self, value: impl Into<String>) -> Self {
        self.with(RegionLevel::District, value)
    }

    pub fn with_sub_district(self, value: impl Into<String>) -> Self {
        self.with(RegionLevel::SubDistrict, value)
    }

    pub fn with_hospital(self, value: impl Into<String>) -> Self {
        self.with(RegionLevel::Hospital, value)
    }

    pub fn with_department(self, value: impl Into<String>) -> Self {
        self.with(RegionLevel::Department, value)
    }

    /// Returns a copy with `level` set; an empty value clears the level
    pub fn with(mut self, level: RegionLevel, value: impl Into<String>) -> Self {
        self.set(level, Some(value.into()));
        self
    }

    /// Sets or clears a level
    pub fn set(&mut self, level: RegionLevel, value: Option<String>) {
        let value = value.filter(|v| !v.is_empty());
        *self.slot_mut(level) = value;
    }

    /// Value populated at `level`, if any
    pub fn get(&self, level: RegionLevel) -> Option<&str> {
        match level {
            RegionLevel::State => self.state.as_deref(),
            RegionLevel::District => self.district.as_deref(),
            RegionLevel::SubDistrict => self.sub_district.as_deref(),
            RegionLevel::Hospital => self.hospital_id.as_deref(),
            RegionLevel::Department => self.department_id.as_deref(),
        }
    }

    /// Whether no level is populated
    pub fn is_empty(&self) -> bool {
        self.populated_levels().next().is_none()
    }

    /// Populated levels with their values, broadest first
    pub fn populated_levels(&self) -> impl Iterator<Item = (RegionLevel, &str)> + '_ {
        RegionLevel::ALL
            .into_iter()
            .filter_map(move |level| self.get(level).map(|value| (level, value)))
    }

    /// Whether this descriptor sits under `other`
    ///
    /// Unlike region matching this is strict: every level populated in `other`
    /// must be repeated here with the same value.
    pub fn is_within(&self, other: &RegionDescriptor) -> bool {
        other
            .populated_levels()
            .all(|(level, value)| self.get(level) == Some(value))
    }

    fn slot_mut(&mut self, level: RegionLevel) -> &mut Option<String> {
        match level {
            RegionLevel::State => &mut self.state,
            RegionLevel::District => &mut self.district,
            RegionLevel::SubDistrict => &mut self.sub_district,
            RegionLevel::Hospital => &mut self.hospital_id,
            RegionLevel::Department => &mut self.department_id,
        }
    }
}

impl fmt::Display for RegionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("{}");
        }

        let parts: Vec<String> = self
            .populated_levels()
            .map(|(level, value)| format!("{}={}", level, value))
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

/// Empty strings coming from forms count as "not populated"
fn non_blank<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.is_empty()))
}
