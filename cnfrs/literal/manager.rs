use rustc_hash::FxHashMap;

use crate::literal::VariableIdx;

/// Allocator of variable indices shared by named atoms and anonymous
/// Tseitin auxiliaries. Indices are handed out from a single counter,
/// so they are unique regardless of their origin.
#[derive(Debug, Default, Clone)]
pub struct VariableManager {
    indices: FxHashMap<String, VariableIdx>,
    // Label of every allocated variable, `None` for auxiliaries.
    // Position `i` holds variable `i + 1`.
    labels: Vec<Option<String>>,
}

impl VariableManager {
    #[must_use]
    pub fn new() -> Self {
        VariableManager::default()
    }

    /// Get the index of a named variable, allocating a new one on first sight.
    pub fn lookup_or_assign(&mut self, label: &str) -> VariableIdx {
        if let Some(idx) = self.indices.get(label) {
            return *idx;
        }

        let idx = self.next(Some(label.to_owned()));
        self.indices.insert(label.to_owned(), idx);
        tracing::trace!(label, idx = idx.0, "assigned variable");
        idx
    }

    /// Allocate an anonymous variable.
    pub fn fresh(&mut self) -> VariableIdx {
        self.next(None)
    }

    /// Number of allocated variables, named and anonymous.
    #[must_use]
    pub fn count(&self) -> usize {
        self.labels.len()
    }

    /// Number of named variables.
    #[must_use]
    pub fn named(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn index(&self, label: &str) -> Option<VariableIdx> {
        self.indices.get(label).copied()
    }

    /// Named variables ordered by their index.
    pub fn variables(&self) -> impl Iterator<Item = (&str, VariableIdx)> + '_ {
        self.labels
            .iter()
            .enumerate()
            .filter_map(|(position, label)| {
                label
                    .as_deref()
                    .map(|label| (label, VariableIdx::from(position + 1)))
            })
    }

    /// Write `<name>: <index>` for every named variable, ordered by index.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `writer` fails.
    pub fn write_symbol_table(&self, writer: &mut dyn std::io::Write) -> std::io::Result<()> {
        for (label, idx) in self.variables() {
            writeln!(writer, "{label}: {idx}")?;
        }

        Ok(())
    }

    fn next(&mut self, label: Option<String>) -> VariableIdx {
        self.labels.push(label);
        VariableIdx::from(self.labels.len())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::VariableManager;
    use crate::literal::VariableIdx;

    #[test]
    fn lookup_is_idempotent() {
        let mut variables = VariableManager::new();
        assert_eq!(variables.lookup_or_assign("a"), VariableIdx(1));
        assert_eq!(variables.lookup_or_assign("b"), VariableIdx(2));
        assert_eq!(variables.lookup_or_assign("a"), VariableIdx(1));
        assert_eq!(variables.count(), 2);
    }

    #[test]
    fn fresh_shares_counter_with_named() {
        let mut variables = VariableManager::new();
        assert_eq!(variables.lookup_or_assign("a"), VariableIdx(1));
        assert_eq!(variables.fresh(), VariableIdx(2));
        assert_eq!(variables.lookup_or_assign("b"), VariableIdx(3));

        assert_eq!(variables.count(), 3);
        assert_eq!(variables.named(), 2);
        assert_eq!(
            variables.variables().collect::<Vec<_>>(),
            vec![("a", VariableIdx(1)), ("b", VariableIdx(3))]
        );
    }

    #[test]
    fn symbol_table() {
        let mut variables = VariableManager::new();
        variables.lookup_or_assign("q");
        variables.fresh();
        variables.lookup_or_assign("p");

        let mut out = Vec::new();
        variables.write_symbol_table(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "q: 1\np: 3\n");
    }
}
