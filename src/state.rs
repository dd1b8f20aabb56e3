// src/state.rs

use crate::dataset::DisasterKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// User-driven filter state shared by all views.
///
/// Passed explicitly to whatever consumes it; the aggregation pipeline never
/// reads it. Mutations are plain set-membership flips.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionState {
    pub selected_disaster_types: HashSet<DisasterKind>,
    /// ISO3 codes.
    pub selected_countries: HashSet<String>,
    /// User-pinned countries, shown regardless of the current selection.
    pub highlighted_countries: HashSet<String>,
    pub mouse_over_country: Option<String>,
    pub normalize: bool,
}

impl SelectionState {
    pub fn new() -> Self {
        SelectionState::default()
    }

    /// Add the kind if absent, remove it if present. Returns whether it is
    /// selected afterwards.
    pub fn toggle_disaster_type(&mut self, kind: DisasterKind) -> bool {
        if !self.selected_disaster_types.remove(&kind) {
            self.selected_disaster_types.insert(kind);
            true
        } else {
            false
        }
    }

    pub fn toggle_country(&mut self, iso3: &str) -> bool {
        if !self.selected_countries.remove(iso3) {
            self.selected_countries.insert(iso3.to_string());
            true
        } else {
            false
        }
    }

    pub fn toggle_highlight(&mut self, iso3: &str) -> bool {
        if !self.highlighted_countries.remove(iso3) {
            self.highlighted_countries.insert(iso3.to_string());
            true
        } else {
            false
        }
    }

    pub fn set_mouse_over(&mut self, iso3: Option<&str>) {
        self.mouse_over_country = iso3.map(str::to_string);
    }

    pub fn toggle_normalize(&mut self) -> bool {
        self.normalize = !self.normalize;
        self.normalize
    }

    /// A country is visible when selected, highlighted, or when nothing is
    /// selected at all.
    pub fn is_country_visible(&self, iso3: &str) -> bool {
        self.selected_countries.is_empty()
            || self.selected_countries.contains(iso3)
            || self.highlighted_countries.contains(iso3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_flip_membership() {
        let mut state = SelectionState::new();
        assert!(state.toggle_disaster_type(DisasterKind::Flood));
        assert!(state.selected_disaster_types.contains(&DisasterKind::Flood));
        assert!(!state.toggle_disaster_type(DisasterKind::Flood));
        assert!(state.selected_disaster_types.is_empty());

        assert!(state.toggle_country("AUS"));
        assert!(!state.toggle_country("AUS"));
        assert!(state.selected_countries.is_empty());
    }

    #[test]
    fn highlight_is_independent_of_selection() {
        let mut state = SelectionState::new();
        state.toggle_country("CHL");
        state.toggle_highlight("AUS");
        assert!(state.is_country_visible("AUS"));
        assert!(state.is_country_visible("CHL"));
        assert!(!state.is_country_visible("NZL"));
    }

    #[test]
    fn everything_visible_with_empty_selection() {
        let state = SelectionState::new();
        assert!(state.is_country_visible("NZL"));
    }

    #[test]
    fn mouse_over_and_normalize() {
        let mut state = SelectionState::new();
        state.set_mouse_over(Some("AUS"));
        assert_eq!(state.mouse_over_country.as_deref(), Some("AUS"));
        state.set_mouse_over(None);
        assert_eq!(state.mouse_over_country, None);

        assert!(state.toggle_normalize());
        assert!(!state.toggle_normalize());
    }
}
