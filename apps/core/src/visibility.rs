use std::collections::BTreeSet;

use crate::model::EntryId;
use crate::page::EntryContainer;
use crate::registry::EntrySet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisibilityChange {
    pub shown: usize,
    pub hidden: usize,
}

impl VisibilityChange {
    pub fn is_empty(&self) -> bool {
        self.shown == 0 && self.hidden == 0
    }
}

/// Makes exactly the entries in `matched` visible.
pub fn apply_visibility(
    entries: &mut EntrySet,
    container: &mut EntryContainer,
    matched: &BTreeSet<EntryId>,
) -> VisibilityChange {
    let mut change = VisibilityChange::default();

    for entry in entries.iter_mut() {
        let visible = matched.contains(&entry.id());
        entry.set_visible(visible);

        let Some(element) = container.elements.get_mut(entry.element_index()) else {
            continue;
        };
        if element.is_hidden() != visible {
            continue;
        }

        element.set_hidden(!visible);
        if visible {
            change.shown += 1;
        } else {
            change.hidden += 1;
        }
    }

    change
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::apply_visibility;
    use crate::model::EntryId;
    use crate::page::{Page, DEFAULT_FILTER_ATTRIBUTE};
    use crate::registry::initialize;

    #[test]
    fn applies_matched_set_and_is_idempotent() {
        let page = Page::namespace_list(DEFAULT_FILTER_ATTRIBUTE, &["a", "b", "c"]);
        let mut container = page.container.unwrap();
        let mut entries = initialize(Some(&container), DEFAULT_FILTER_ATTRIBUTE).unwrap();
        let matched: BTreeSet<EntryId> = entries
            .iter()
            .filter(|entry| entry.label() != "b")
            .map(|entry| entry.id())
            .collect();

        let first = apply_visibility(&mut entries, &mut container, &matched);
        let writes: Vec<u64> = container.elements.iter().map(|e| e.hidden_writes()).collect();
        let second = apply_visibility(&mut entries, &mut container, &matched);

        assert_eq!(first.hidden, 1);
        assert_eq!(first.shown, 0);
        assert!(second.is_empty());
        assert_eq!(
            container.elements.iter().map(|e| e.hidden_writes()).collect::<Vec<_>>(),
            writes
        );
        assert!(container.elements[1].is_hidden());
        assert_eq!(entries.visible_count(), 2);
    }

    #[test]
    fn visible_entries_are_never_rewritten() {
        let page = Page::namespace_list(DEFAULT_FILTER_ATTRIBUTE, &["a", "b"]);
        let mut container = page.container.unwrap();
        let mut entries = initialize(Some(&container), DEFAULT_FILTER_ATTRIBUTE).unwrap();
        let all: BTreeSet<EntryId> = entries.iter().map(|entry| entry.id()).collect();

        apply_visibility(&mut entries, &mut container, &all);
        apply_visibility(&mut entries, &mut container, &all);

        assert!(container.elements.iter().all(|e| e.hidden_writes() == 0));
    }

    #[test]
    fn hidden_entries_are_shown_again() {
        let page = Page::namespace_list(DEFAULT_FILTER_ATTRIBUTE, &["a", "b"]);
        let mut container = page.container.unwrap();
        let mut entries = initialize(Some(&container), DEFAULT_FILTER_ATTRIBUTE).unwrap();
        let all: BTreeSet<EntryId> = entries.iter().map(|entry| entry.id()).collect();

        apply_visibility(&mut entries, &mut container, &BTreeSet::new());
        let change = apply_visibility(&mut entries, &mut container, &all);

        assert_eq!(change.shown, 2);
        assert!(container.elements.iter().all(|e| !e.is_hidden()));
    }
}
