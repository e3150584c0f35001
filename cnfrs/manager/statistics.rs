use std::fmt::Display;
use tabled::{builder::Builder, settings::Style};

/// Size of the current run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistics {
    /// Distinct formula nodes in the arena.
    pub nodes: usize,
    /// Constructions answered by an already interned node.
    pub interning_hits: usize,
    pub named_variables: usize,
    pub auxiliary_variables: usize,
}

impl Display for Statistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut builder = Builder::default();
        builder.push_record(["nodes".to_owned(), self.nodes.to_string()]);
        builder.push_record(["interning hits".to_owned(), self.interning_hits.to_string()]);
        builder.push_record(["named variables".to_owned(), self.named_variables.to_string()]);
        builder.push_record([
            "auxiliary variables".to_owned(),
            self.auxiliary_variables.to_string(),
        ]);

        let output = builder.build().with(Style::blank()).to_string();
        write!(f, "{output}")
    }
}
