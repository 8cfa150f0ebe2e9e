use std::collections::HashMap;

/// Column metadata as reported by the backing store: the column's name and the
/// database-reported type name used to pick its decoded representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    pub name: String,
    pub type_name: String,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// The live column set of one relation, fetched fresh per request.
///
/// Requests reference columns by name; every referenced name must be a member
/// of this set before it may appear in statement text.
#[derive(Debug, Clone)]
pub struct TableSchema {
    columns: Vec<ColumnMeta>,
    index: HashMap<String, usize>,
}

impl TableSchema {
    pub fn new(columns: Vec<ColumnMeta>) -> Self {
        let index = columns
            .iter()
            .enumerate()
            .map(|(idx, col)| (col.name.clone(), idx))
            .collect();
        Self { columns, index }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnMeta> {
        self.index.get(name).map(|&idx| &self.columns[idx])
    }

    pub fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
