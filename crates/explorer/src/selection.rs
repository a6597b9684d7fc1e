/// A selected directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Ordered set of selected entries, keyed by name.
#[derive(Debug, Default, Clone)]
pub struct SelectionSet {
    items: Vec<SelectedEntry>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `name` if absent, removes it otherwise. Returns whether the
    /// entry is selected afterwards.
    pub fn toggle(&mut self, name: &str, is_dir: bool) -> bool {
        if let Some(pos) = self.items.iter().position(|e| e.name == name) {
            self.items.remove(pos);
            return false;
        }
        self.items.push(SelectedEntry {
            name: name.to_string(),
            is_dir,
        });
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.iter().any(|e| e.name == name)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[SelectedEntry] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The selected file when exactly one non-directory entry is selected.
    pub fn single_file(&self) -> Option<&SelectedEntry> {
        match self.items.as_slice() {
            [only] if !only.is_dir => Some(only),
            _ => None,
        }
    }
}
