use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryId(usize);

impl EntryId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for EntryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "entry-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    id: EntryId,
    label: String,
    search_key: String,
    visible: bool,
    element: usize,
}

impl Entry {
    pub(crate) fn new(id: EntryId, label: String, search_key: String, visible: bool, element: usize) -> Self {
        Self {
            id,
            label,
            search_key,
            visible,
            element,
        }
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    /// Element id from the page, or the registry id when the element has none.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn search_key(&self) -> &str {
        &self.search_key
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub(crate) fn element_index(&self) -> usize {
        self.element
    }
}

pub fn is_blank_query(query: &str) -> bool {
    query.trim().is_empty()
}
