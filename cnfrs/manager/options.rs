use bon::Builder;
use clap::ValueEnum;

/// Which directions of the Tseitin definitions are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Definitions {
    /// Emit only the direction required by the polarity of the occurrence.
    Polarity,
    /// Emit both directions for every node.
    Full,
}

#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Clone, Builder)]
pub struct CnfOptions {
    /// Collapse chains of `&` and `|` into n-ary nodes before encoding.
    #[builder(default = true)]
    pub flatten: bool,

    #[builder(default = Definitions::Polarity)]
    pub definitions: Definitions,

    /// Atoms registered up-front, receiving indices `1..=k` in this order.
    #[builder(default, into)]
    pub variables: Vec<String>,
}

impl Default for CnfOptions {
    fn default() -> Self {
        CnfOptions::builder().build()
    }
}
