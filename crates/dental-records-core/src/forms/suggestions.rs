//! Suggestion lists for the intake form's autocomplete inputs.
//!
//! Each list is one full-column scan reduced to unique, non-empty values in
//! first-seen order. Narrowing for typed input:
//! - Substring hits (case-insensitive), in list order
//! - Then near-misses ranked by Jaro-Winkler similarity

use std::collections::HashSet;

use serde::Serialize;
use strsim::jaro_winkler;

use crate::models::VisitField;
use crate::store::{RecordStore, StoreResult};

/// Minimum similarity for a near-miss suggestion.
const NEAR_MISS_THRESHOLD: f64 = 0.85;

/// Which lookup a suggestion list serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionKind {
    Doctors,
    Services,
    ReturnReasons,
}

impl SuggestionKind {
    pub const ALL: [SuggestionKind; 3] = [
        SuggestionKind::Doctors,
        SuggestionKind::Services,
        SuggestionKind::ReturnReasons,
    ];

    /// Column scanned for this lookup.
    pub fn source_field(&self) -> VisitField {
        match self {
            SuggestionKind::Doctors => VisitField::Doctor,
            SuggestionKind::Services => VisitField::Services,
            SuggestionKind::ReturnReasons => VisitField::ReturnReason,
        }
    }

    /// Lookup feeding a form field's autocomplete, if any.
    pub fn for_field(field: VisitField) -> Option<SuggestionKind> {
        match field {
            VisitField::Doctor | VisitField::CorrectiveDoctor | VisitField::ReturnDoctor => {
                Some(SuggestionKind::Doctors)
            }
            VisitField::Services => Some(SuggestionKind::Services),
            VisitField::ReturnReason => Some(SuggestionKind::ReturnReasons),
            _ => None,
        }
    }
}

impl std::str::FromStr for SuggestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "doctors" | "doctor" => Ok(SuggestionKind::Doctors),
            "services" | "service" => Ok(SuggestionKind::Services),
            "return_reasons" | "return_reason" | "reasons" => Ok(SuggestionKind::ReturnReasons),
            _ => Err(format!("Unknown suggestion list: {}", s)),
        }
    }
}

/// Unique, non-empty values in first-seen order.
pub fn distinct_values<I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|value| !value.is_empty())
        .filter(|value| seen.insert(value.clone()))
        .collect()
}

/// One autocomplete list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SuggestionList {
    values: Vec<String>,
}

impl SuggestionList {
    pub fn new<I>(values: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            values: distinct_values(values),
        }
    }

    /// Scan the store for one lookup.
    pub fn fetch(store: &dyn RecordStore, kind: SuggestionKind) -> StoreResult<Self> {
        let raw = store.select_column(kind.source_field())?;
        Ok(Self::new(raw))
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries to offer for the typed `input`.
    pub fn matching(&self, input: &str) -> Vec<&str> {
        let needle = input.trim().to_lowercase();
        if needle.is_empty() {
            return self.values.iter().map(String::as_str).collect();
        }

        let (hits, rest): (Vec<&String>, Vec<&String>) = self
            .values
            .iter()
            .partition(|value| value.to_lowercase().contains(&needle));

        let mut near: Vec<(f64, &String)> = rest
            .into_iter()
            .map(|value| (jaro_winkler(&needle, &value.to_lowercase()), value))
            .filter(|(score, _)| *score >= NEAR_MISS_THRESHOLD)
            .collect();
        near.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        hits.into_iter()
            .chain(near.into_iter().map(|(_, value)| value))
            .map(String::as_str)
            .collect()
    }
}

/// The three lookups behind the intake form.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Suggestions {
    pub doctors: SuggestionList,
    pub services: SuggestionList,
    pub return_reasons: SuggestionList,
}

impl Suggestions {
    /// Fetch every lookup independently; a failed one stays empty.
    pub fn load(store: &dyn RecordStore) -> Self {
        let mut suggestions = Suggestions::default();
        for kind in SuggestionKind::ALL {
            match SuggestionList::fetch(store, kind) {
                Ok(list) => {
                    tracing::debug!(?kind, count = list.values().len(), "Loaded suggestions");
                    *suggestions.list_mut(kind) = list;
                }
                Err(e) => tracing::error!(?kind, error = %e, "Failed to load suggestions"),
            }
        }
        suggestions
    }

    pub fn list(&self, kind: SuggestionKind) -> &SuggestionList {
        match kind {
            SuggestionKind::Doctors => &self.doctors,
            SuggestionKind::Services => &self.services,
            SuggestionKind::ReturnReasons => &self.return_reasons,
        }
    }

    fn list_mut(&mut self, kind: SuggestionKind) -> &mut SuggestionList {
        match kind {
            SuggestionKind::Doctors => &mut self.doctors,
            SuggestionKind::Services => &mut self.services,
            SuggestionKind::ReturnReasons => &mut self.return_reasons,
        }
    }

    /// Suggestions for a form field's current input.
    pub fn for_field(&self, field: VisitField, input: &str) -> Vec<&str> {
        SuggestionKind::for_field(field)
            .map(|kind| self.list(kind).matching(input))
            .unwrap_or_default()
    }
}
