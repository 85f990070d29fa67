use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::model::{Entry, EntryId};
use crate::page::EntryContainer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputChannel {
    Status,
    Polite,
    Alert,
}

impl Display for OutputChannel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status => write!(f, "status text"),
            Self::Polite => write!(f, "polite live region"),
            Self::Alert => write!(f, "alert live region"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitError {
    #[error("filter container not found")]
    NoContainer,
    #[error("filter input not found")]
    NoInput,
    #[error("missing output channel: {0}")]
    MissingOutputChannel(OutputChannel),
    #[error("no filterable entries found")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySet {
    entries: Vec<Entry>,
}

impl EntrySet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.entries.get(id.index())
    }

    pub fn visible_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_visible()).count()
    }

    pub fn first_visible(&self) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.is_visible())
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entry> {
        self.entries.iter_mut()
    }
}

pub fn initialize(
    container: Option<&EntryContainer>,
    attribute: &str,
) -> Result<EntrySet, InitError> {
    let container = container.ok_or(InitError::NoContainer)?;

    let entries: Vec<Entry> = container
        .elements
        .iter()
        .enumerate()
        .filter_map(|(element, node)| {
            node.attribute(attribute)
                .map(|search_key| (element, node, search_key))
        })
        .enumerate()
        .map(|(index, (element, node, search_key))| {
            let id = EntryId::new(index);
            let label = node.id.clone().unwrap_or_else(|| id.to_string());
            Entry::new(id, label, search_key.to_string(), !node.is_hidden(), element)
        })
        .collect();

    if entries.is_empty() {
        return Err(InitError::Empty);
    }

    Ok(EntrySet { entries })
}
