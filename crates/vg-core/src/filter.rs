use crate::view::display_value;
use std::collections::BTreeSet;
use vg_types::ValidationResult;

/// Column filter for the result buffer. Sets are OR within a column and
/// AND across columns; an empty set leaves its column unconstrained.
/// `value_contains` matches case-insensitively against the displayed
/// value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub events: BTreeSet<String>,
    pub fields: BTreeSet<String>,
    pub expected_types: BTreeSet<String>,
    pub received_types: BTreeSet<String>,
    pub statuses: BTreeSet<String>,
    pub value_contains: Option<String>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
            && self.fields.is_empty()
            && self.expected_types.is_empty()
            && self.received_types.is_empty()
            && self.statuses.is_empty()
            && self.value_contains.as_deref().is_none_or(str::is_empty)
    }

    pub fn matches(&self, row: &ValidationResult) -> bool {
        set_allows(&self.events, &row.event_name)
            && set_allows(&self.fields, &row.key)
            && set_allows(&self.expected_types, &row.expected_type)
            && set_allows(&self.received_types, &row.received_type)
            && set_allows(&self.statuses, row.validation_status.as_str())
            && self.value_allows(row)
    }

    fn value_allows(&self, row: &ValidationResult) -> bool {
        let Some(needle) = self.value_contains.as_deref() else {
            return true;
        };
        if needle.is_empty() {
            return true;
        }
        display_value(&row.value)
            .to_lowercase()
            .contains(&needle.to_lowercase())
    }
}

fn set_allows(set: &BTreeSet<String>, value: &str) -> bool {
    set.is_empty() || set.contains(value)
}

/// Distinct column values currently present in the buffer; feeds the
/// filter controls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub events: BTreeSet<String>,
    pub fields: BTreeSet<String>,
    pub expected_types: BTreeSet<String>,
    pub received_types: BTreeSet<String>,
    pub statuses: BTreeSet<String>,
}

impl FilterOptions {
    pub fn collect<'a>(rows: impl Iterator<Item = &'a ValidationResult>) -> Self {
        let mut options = Self::default();
        for row in rows {
            options.events.insert(row.event_name.clone());
            options.fields.insert(row.key.clone());
            options.expected_types.insert(row.expected_type.clone());
            options.received_types.insert(row.received_type.clone());
            options.statuses.insert(row.validation_status.as_str().to_string());
        }
        options
    }
}
