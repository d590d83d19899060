use std::collections::HashSet;

/// Position of an operation inside the loaded catalog. Selections hold keys,
/// never copies, so membership follows catalog identity rather than id text.
pub type OperationKey = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub id: String,
    pub title: String,
    pub description: String,
}

impl Operation {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Operations advertised by the backend. Populated once per session and
/// read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CapabilityCatalog {
    operations: Vec<Operation>,
}

impl CapabilityCatalog {
    /// Build a catalog, dropping entries whose id was already seen.
    /// Returns the catalog and the ids that were dropped.
    pub fn from_operations(operations: Vec<Operation>) -> (Self, Vec<String>) {
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(operations.len());
        let mut dropped = Vec::new();
        for op in operations {
            if seen.insert(op.id.clone()) {
                kept.push(op);
            } else {
                dropped.push(op.id);
            }
        }
        (Self { operations: kept }, dropped)
    }

    pub fn get(&self, key: OperationKey) -> Option<&Operation> {
        self.operations.get(key)
    }

    pub fn key_of(&self, id: &str) -> Option<OperationKey> {
        self.operations.iter().position(|op| op.id == id)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (OperationKey, &Operation)> {
        self.operations.iter().enumerate()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CatalogStatus {
    #[default]
    NotRequested,
    Loading,
    Loaded,
    /// Load failed; the catalog stays empty for the rest of the session.
    Failed { reason: String },
}

impl CatalogStatus {
    pub fn is_settled(&self) -> bool {
        matches!(self, CatalogStatus::Loaded | CatalogStatus::Failed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_ids_keep_first_entry() {
        let (catalog, dropped) = CapabilityCatalog::from_operations(vec![
            Operation::new("merge", "Merge", "first"),
            Operation::new("split", "Split", ""),
            Operation::new("merge", "Merge again", "second"),
        ]);

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(0).map(|op| op.description.as_str()), Some("first"));
        assert_eq!(catalog.key_of("split"), Some(1));
        assert_eq!(dropped, vec!["merge".to_string()]);
    }

    #[test]
    fn unknown_id_has_no_key() {
        let (catalog, _) = CapabilityCatalog::from_operations(vec![Operation::new("a", "A", "")]);
        assert_eq!(catalog.key_of("b"), None);
        assert!(catalog.get(3).is_none());
    }
}
