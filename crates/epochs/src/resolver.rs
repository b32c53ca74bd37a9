use std::str::FromStr;

use foundation::{Age, AssetId};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::table::{EpochEntry, EpochTable};

/// How a continuous timeline position picks a discrete epoch.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPolicy {
    /// Greatest key `<= q`, clamped to the smallest key below the table.
    #[default]
    NearestBelow,
    /// Key minimizing `|k - q|`; ties go to the smaller key.
    Nearest,
}

impl ResolutionPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            ResolutionPolicy::NearestBelow => "nearest_below",
            ResolutionPolicy::Nearest => "nearest",
        }
    }
}

impl FromStr for ResolutionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest_below" | "nearest-below" | "floor" | "step" => {
                Ok(ResolutionPolicy::NearestBelow)
            }
            "nearest" => Ok(ResolutionPolicy::Nearest),
            other => Err(format!(
                "unknown resolution policy '{other}' (expected nearest_below or nearest)"
            )),
        }
    }
}

impl std::fmt::Display for ResolutionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    EmptyTable,
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::EmptyTable => write!(f, "cannot resolve against an empty epoch table"),
        }
    }
}

impl std::error::Error for ResolveError {}

/// The epoch selected for a query.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Resolution<'a> {
    /// Table key that won, not the query.
    pub age: Age,
    pub asset: &'a AssetId,
    pub name: Option<&'a str>,
}

impl<'a> From<&'a EpochEntry> for Resolution<'a> {
    fn from(e: &'a EpochEntry) -> Self {
        Self {
            age: e.age,
            asset: &e.asset,
            name: e.name.as_deref(),
        }
    }
}

/// Maps slider values onto an owned [`EpochTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineResolver {
    table: EpochTable,
    policy: ResolutionPolicy,
}

impl TimelineResolver {
    pub fn new(table: EpochTable, policy: ResolutionPolicy) -> Self {
        Self { table, policy }
    }

    pub fn table(&self) -> &EpochTable {
        &self.table
    }

    pub fn policy(&self) -> ResolutionPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: ResolutionPolicy) {
        self.policy = policy;
    }

    pub fn resolve(&self, query: Age) -> Result<Resolution<'_>, ResolveError> {
        self.resolve_with(self.policy, query)
    }

    pub fn resolve_with(
        &self,
        policy: ResolutionPolicy,
        query: Age,
    ) -> Result<Resolution<'_>, ResolveError> {
        if self.table.is_empty() {
            return Err(ResolveError::EmptyTable);
        }

        let entry = match policy {
            ResolutionPolicy::NearestBelow => self.table.floor_entry(query),
            ResolutionPolicy::Nearest => self.table.nearest_entry(query),
        };
        trace!(query = query.ma(), key = entry.age.ma(), %policy, "resolved epoch");
        Ok(entry.into())
    }
}
