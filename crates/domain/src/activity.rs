//! Activity catalog — the last-synced activity list with id and label lookup.

use std::collections::HashMap;

use crate::hub::Activity;
use crate::id::ActivityId;

/// Ordered activity list indexed by id and by exact label.
///
/// When several activities share a label, the first one in hub order owns
/// the label; later ones stay reachable by id and are reported by
/// [`duplicate_labels`](Self::duplicate_labels).
#[derive(Debug, Clone, Default)]
pub struct ActivityCatalog {
    activities: Vec<Activity>,
    by_id: HashMap<ActivityId, usize>,
    by_label: HashMap<String, usize>,
    duplicates: Vec<Activity>,
}

impl ActivityCatalog {
    #[must_use]
    pub fn new(activities: Vec<Activity>) -> Self {
        let mut by_id = HashMap::with_capacity(activities.len());
        let mut by_label = HashMap::with_capacity(activities.len());
        let mut duplicates = Vec::new();

        for (index, activity) in activities.iter().enumerate() {
            by_id.entry(activity.id.clone()).or_insert(index);
            if by_label.contains_key(&activity.label) {
                duplicates.push(activity.clone());
            } else {
                by_label.insert(activity.label.clone(), index);
            }
        }

        Self {
            activities,
            by_id,
            by_label,
            duplicates,
        }
    }

    #[must_use]
    pub fn get(&self, id: &ActivityId) -> Option<&Activity> {
        self.by_id.get(id).and_then(|&i| self.activities.get(i))
    }

    /// Exact, case-sensitive label lookup.
    #[must_use]
    pub fn find_by_label(&self, label: &str) -> Option<&Activity> {
        self.by_label.get(label).and_then(|&i| self.activities.get(i))
    }

    /// Activities in hub order.
    #[must_use]
    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    /// Labels in hub order, duplicates included once.
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.activities
            .iter()
            .enumerate()
            .filter(|(i, a)| self.by_label.get(&a.label) == Some(i))
            .map(|(_, a)| a.label.as_str())
            .collect()
    }

    /// Activities whose label was already taken by an earlier one.
    #[must_use]
    pub fn duplicate_labels(&self) -> &[Activity] {
        &self.duplicates
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.activities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ActivityCatalog {
        ActivityCatalog::new(vec![
            Activity::new(ActivityId::power_off(), "PowerOff"),
            Activity::new(ActivityId::new("10"), "Watch TV"),
            Activity::new(ActivityId::new("20"), "Listen to Music"),
            Activity::new(ActivityId::new("30"), "Watch TV"),
        ])
    }

    #[test]
    fn should_find_activity_by_id() {
        let catalog = catalog();
        let found = catalog.get(&ActivityId::new("20")).unwrap();
        assert_eq!(found.label, "Listen to Music");
    }

    #[test]
    fn should_return_none_for_unknown_id() {
        assert!(catalog().get(&ActivityId::new("99")).is_none());
    }

    #[test]
    fn should_match_label_exactly() {
        let catalog = catalog();
        assert!(catalog.find_by_label("Listen to Music").is_some());
        assert!(catalog.find_by_label("listen to music").is_none());
    }

    #[test]
    fn should_keep_first_activity_for_duplicate_label() {
        let catalog = catalog();
        let found = catalog.find_by_label("Watch TV").unwrap();
        assert_eq!(found.id, ActivityId::new("10"));
        assert_eq!(catalog.duplicate_labels().len(), 1);
        assert_eq!(catalog.duplicate_labels()[0].id, ActivityId::new("30"));
    }

    #[test]
    fn should_keep_duplicates_reachable_by_id() {
        let catalog = catalog();
        assert!(catalog.get(&ActivityId::new("30")).is_some());
        assert_eq!(catalog.len(), 4);
    }

    #[test]
    fn should_list_unique_labels_in_hub_order() {
        assert_eq!(
            catalog().labels(),
            vec!["PowerOff", "Watch TV", "Listen to Music"]
        );
    }

    #[test]
    fn should_be_empty_by_default() {
        let catalog = ActivityCatalog::default();
        assert!(catalog.is_empty());
        assert!(catalog.labels().is_empty());
    }
}
