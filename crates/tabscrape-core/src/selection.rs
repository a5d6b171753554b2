use std::collections::BTreeSet;

use crate::model::Table;

/// Set of table ids marked for export.
///
/// Owned by the caller; tables themselves are never touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<usize>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, id: usize) {
        self.ids.insert(id);
    }

    pub fn deselect(&mut self, id: usize) {
        self.ids.remove(&id);
    }

    /// Flip the selection state of `id`; returns whether it is now selected.
    pub fn toggle(&mut self, id: usize) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn is_selected(&self, id: usize) -> bool {
        self.ids.contains(&id)
    }

    pub fn select_all(&mut self, tables: &[Table]) {
        self.ids.extend(tables.iter().map(|t| t.id));
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The selected tables in batch order. Ids with no matching table are ignored.
    pub fn resolve<'a>(&self, tables: &'a [Table]) -> Vec<&'a Table> {
        tables.iter().filter(|t| self.ids.contains(&t.id)).collect()
    }
}

impl FromIterator<usize> for Selection {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Selection {
            ids: iter.into_iter().collect(),
        }
    }
}
