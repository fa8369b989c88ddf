use serde::Serialize;

/// Rendered source fragment per node id, filled once per node during a
/// single traversal.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct TranslationTable {
    fragments: Vec<Option<String>>,
}

impl TranslationTable {
    pub fn with_capacity(node_count: usize) -> Self {
        Self {
            fragments: vec![None; node_count],
        }
    }

    /// Store the fragment of a node. Returns `false` and keeps the first
    /// fragment if the node was already translated.
    pub fn insert(&mut self, id: usize, fragment: String) -> bool {
        if id >= self.fragments.len() {
            self.fragments.resize(id + 1, None);
        }
        let slot = &mut self.fragments[id];
        if slot.is_some() {
            return false;
        }
        *slot = Some(fragment);
        true
    }

    pub fn get(&self, id: usize) -> Option<&str> {
        self.fragments.get(id).and_then(|f| f.as_deref())
    }

    pub fn len(&self) -> usize {
        self.fragments.iter().filter(|f| f.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_once() {
        let mut table = TranslationTable::with_capacity(2);
        assert!(table.is_empty());
        assert!(table.insert(0, "x".to_string()));
        assert!(!table.insert(0, "y".to_string()));
        assert_eq!(table.get(0), Some("x"));
        assert_eq!(table.get(1), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_grows_past_capacity() {
        let mut table = TranslationTable::default();
        assert!(table.insert(3, "k".to_string()));
        assert_eq!(table.get(3), Some("k"));
        assert_eq!(table.get(7), None);
    }

    #[test]
    fn test_serializes_as_array() {
        let mut table = TranslationTable::with_capacity(2);
        table.insert(1, "x".to_string());
        let json = serde_json::to_string(&table).expect("serialize");
        assert_eq!(json, r#"{"fragments":[null,"x"]}"#);
    }
}
