//! Preview descriptors discovered on a rendered page

use serde::{Deserialize, Serialize};

/// One preview-annotated DOM node.
///
/// `name` groups descriptors; several descriptors may share it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewDescriptor {
    pub name: String,

    /// Absolute URL taken from the sibling link
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Serialized action-state list, decoded lazily at capture time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_states: Option<String>,

    /// Overrides the element used for the bounding box
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_selector: Option<String>,

    pub viewport: String,
}

/// Descriptors grouped by name, in DOM encounter order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviewMap {
    groups: Vec<(String, Vec<PreviewDescriptor>)>,
}

impl PreviewMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a descriptor to its name's group, opening a new group on first sight
    pub fn insert(&mut self, descriptor: PreviewDescriptor) {
        match self
            .groups
            .iter_mut()
            .find(|(name, _)| *name == descriptor.name)
        {
            Some((_, list)) => list.push(descriptor),
            None => self.groups.push((descriptor.name.clone(), vec![descriptor])),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[PreviewDescriptor]> {
        self.groups
            .iter()
            .find(|(group, _)| group == name)
            .map(|(_, list)| list.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PreviewDescriptor])> {
        self.groups
            .iter()
            .map(|(name, list)| (name.as_str(), list.as_slice()))
    }

    /// Number of distinct names
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total descriptors across all names; this is the progress total
    pub fn descriptor_count(&self) -> usize {
        self.groups.iter().map(|(_, list)| list.len()).sum()
    }
}

impl FromIterator<PreviewDescriptor> for PreviewMap {
    fn from_iter<I: IntoIterator<Item = PreviewDescriptor>>(iter: I) -> Self {
        let mut map = PreviewMap::new();
        for descriptor in iter {
            map.insert(descriptor);
        }
        map
    }
}
