//! The ordered collection of known fields.

use std::collections::{BTreeMap, HashMap};

use crate::field::Field;

/// Ordered set of [`Field`]s, unique by name.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    fields: Vec<Field>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register fields. A field whose name is already registered replaces the
    /// existing one at the same position; new names are appended.
    pub fn add(&mut self, fields: impl IntoIterator<Item = Field>) {
        for field in fields {
            match self.fields.iter_mut().find(|f| f.name == field.name) {
                Some(slot) => *slot = field,
                None => self.fields.push(field),
            }
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields whose name starts with any of `prefixes`, in registry order.
    /// An empty prefix list selects everything. A field matching several
    /// prefixes is returned once.
    pub fn by_prefix<S: AsRef<str>>(&self, prefixes: &[S]) -> Vec<&Field> {
        if prefixes.is_empty() {
            return self.fields.iter().collect();
        }
        self.fields
            .iter()
            .filter(|f| prefixes.iter().any(|p| f.name.starts_with(p.as_ref())))
            .collect()
    }

    /// All fields grouped by `group`; see [`group_sorted`].
    pub fn grouped_sorted(&self) -> Vec<(&str, Vec<&Field>)> {
        group_sorted(self.fields.iter())
    }

    /// Name → field map for constant-time lookup.
    pub fn lookup_by_name(&self) -> HashMap<&str, &Field> {
        self.fields.iter().map(|f| (f.name.as_str(), f)).collect()
    }

    /// Fields exposed as `config set` flags (everything not hidden).
    pub fn settable(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| !f.hidden)
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// Group `fields` by their group name. Groups come out sorted by name, and
/// fields are sorted by name inside each group, so output is deterministic.
pub fn group_sorted<'a>(
    fields: impl IntoIterator<Item = &'a Field>,
) -> Vec<(&'a str, Vec<&'a Field>)> {
    let mut groups: BTreeMap<&str, Vec<&Field>> = BTreeMap::new();
    for field in fields {
        groups.entry(field.group.as_str()).or_default().push(field);
    }
    groups
        .into_iter()
        .map(|(group, mut fields)| {
            fields.sort_by(|a, b| a.name.cmp(&b.name));
            (group, fields)
        })
        .collect()
}
