use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const DEFAULT_FILTER_ATTRIBUTE: &str = "data-filter";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Page {
    pub form: Option<FilterForm>,
    pub container: Option<EntryContainer>,
}

impl Page {
    pub fn namespace_list(attribute: &str, keys: &[&str]) -> Self {
        let elements = keys
            .iter()
            .map(|key| EntryElement::tagged(key, attribute, key))
            .collect();

        Self {
            form: Some(FilterForm::complete()),
            container: Some(EntryContainer { elements }),
        }
    }

    pub fn hide_form(&mut self) {
        if let Some(form) = self.form.as_mut() {
            form.hidden = true;
        }
    }

    pub fn form_hidden(&self) -> bool {
        self.form.as_ref().map(|form| form.hidden).unwrap_or(true)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterForm {
    pub hidden: bool,
    pub input: Option<SearchInput>,
    pub status: Option<TextNode>,
    pub polite_region: Option<LiveRegion>,
    pub alert_region: Option<LiveRegion>,
}

impl FilterForm {
    pub fn complete() -> Self {
        Self {
            hidden: false,
            input: Some(SearchInput::default()),
            status: Some(TextNode::default()),
            polite_region: Some(LiveRegion::default()),
            alert_region: Some(LiveRegion::default()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchInput {
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextNode {
    text: String,
    #[serde(skip)]
    writes: u64,
}

impl TextNode {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
        self.writes += 1;
    }

    pub fn writes(&self) -> u64 {
        self.writes
    }
}

/// An assistive-technology live region.
///
/// Screen readers speak a region when its content changes to a non-empty value,
/// so every such write is kept in `spoken`. Clearing is silent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveRegion {
    text: String,
    #[serde(skip)]
    spoken: Vec<String>,
}

impl LiveRegion {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
        if !text.is_empty() {
            self.spoken.push(text.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn spoken(&self) -> &[String] {
        &self.spoken
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryContainer {
    pub elements: Vec<EntryElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryElement {
    pub id: Option<String>,
    pub attributes: BTreeMap<String, String>,
    hidden: bool,
    #[serde(skip)]
    hidden_writes: u64,
}

impl EntryElement {
    pub fn tagged(id: &str, attribute: &str, value: &str) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert(attribute.to_string(), value.to_string());
        Self {
            id: Some(id.to_string()),
            attributes,
            hidden: false,
            hidden_writes: 0,
        }
    }

    pub fn untagged(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            ..Self::default()
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
        self.hidden_writes += 1;
    }

    pub fn hidden_writes(&self) -> u64 {
        self.hidden_writes
    }
}
