mod loader;

use std::fmt;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub use loader::{load_builtin_v1, load_taxonomy_tsv, parse_taxonomy_tsv};

/// Clinical priority attached to a condition.
///
/// Declaration order is triage order from least to most urgent, so the derived
/// `Ord` sorts `High` last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Standard,
    Moderate,
    High,
}

impl Urgency {
    pub const ALL: [Urgency; 4] = [
        Urgency::High,
        Urgency::Moderate,
        Urgency::Standard,
        Urgency::Low,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Self::High),
            "moderate" => Some(Self::Moderate),
            "low" => Some(Self::Low),
            "standard" => Some(Self::Standard),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Moderate => "MODERATE",
            Self::Low => "LOW",
            Self::Standard => "STANDARD",
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            Self::High => "seek emergency care immediately",
            Self::Moderate => "schedule within 24-48 hours",
            Self::Low => "routine follow-up",
            Self::Standard => "schedule within 1-2 weeks",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub index: usize,
    pub name: String,
    pub urgency: Urgency,
    pub recommendation: String,
}

/// Immutable, index-ordered condition table. `conditions[i].index == i` always holds.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionTaxonomy {
    pub version: String,
    conditions: Vec<Condition>,
}

impl ConditionTaxonomy {
    pub(crate) fn from_validated(version: String, conditions: Vec<Condition>) -> Self {
        Self {
            version,
            conditions,
        }
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Condition> {
        self.conditions.get(index)
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Display name, or `class_<index>` for an index outside the table.
    pub fn name(&self, index: usize) -> String {
        self.get(index)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| format!("class_{}", index))
    }

    pub fn urgency(&self, index: usize) -> Option<Urgency> {
        self.get(index).map(|c| c.urgency)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Condition> {
        let wanted = normalize_name(name);
        self.conditions
            .iter()
            .find(|c| normalize_name(&c.name) == wanted)
    }

    /// Resolves a ground-truth label given either as a class index or a condition name.
    pub fn resolve_label(&self, label: &str) -> Option<usize> {
        let label = label.trim();
        if let Ok(idx) = label.parse::<usize>() {
            return (idx < self.len()).then_some(idx);
        }
        self.find_by_name(label).map(|c| c.index)
    }
}

fn normalize_name(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(|c| c.to_lowercase())
        .collect()
}

pub fn load_builtin() -> Result<ConditionTaxonomy> {
    load_builtin_v1()
}

pub fn load_user(path: &Path) -> Result<ConditionTaxonomy> {
    load_taxonomy_tsv(path)
}
