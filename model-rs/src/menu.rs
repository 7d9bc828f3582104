use crate::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single dish as extracted from the menu page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Price exactly as printed on the page (e.g. "12,70 €")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    /// Dietary markers such as "L", "G", "VEG"
    #[serde(default)]
    pub diets: Vec<String>,
}

impl MenuItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            price: None,
            diets: Vec::new(),
        }
    }
}

/// Items for every weekday, serialized as `{"monday": [...], ...}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekMenu(BTreeMap<Weekday, Vec<MenuItem>>);

impl WeekMenu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any items previously stored for `day`
    pub fn insert(&mut self, day: Weekday, items: Vec<MenuItem>) {
        self.0.insert(day, items);
    }

    pub fn get(&self, day: Weekday) -> Option<&[MenuItem]> {
        self.0.get(&day).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True once every weekday has an entry (possibly empty)
    pub fn is_complete(&self) -> bool {
        Weekday::ALL.iter().all(|day| self.0.contains_key(day))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &[MenuItem])> {
        self.0.iter().map(|(day, items)| (*day, items.as_slice()))
    }
}
