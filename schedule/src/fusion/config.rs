//! Fusion configuration types.
//!
//! Typed configuration with bon builders and environment variable fallbacks.

use std::path::PathBuf;

use bon::bon;

/// One pass of the fusion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(strum::EnumString, strum::Display, strum::AsRefStr, strum::VariantArray)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FuseStrategy {
    /// Keep one kernel per instruction.
    Singleton,
    /// Merge pairs that cannot block another fusion.
    Gentle,
    /// Merge along the heaviest weight edges while the graph stays acyclic.
    Greedy,
}

/// Configuration of the fusion driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuseConfig {
    /// Passes applied in order.
    pub strategies: Vec<FuseStrategy>,
    /// Greedy skips pairs the policy does not deem fusible.
    pub greedy_requires_fusible: bool,
    /// Directory for per-batch DOT dumps before and after fusion.
    pub dot_dir: Option<PathBuf>,
}

fn default_strategies() -> Vec<FuseStrategy> {
    vec![FuseStrategy::Gentle, FuseStrategy::Greedy]
}

impl Default for FuseConfig {
    fn default() -> Self {
        Self { strategies: default_strategies(), greedy_requires_fusible: true, dot_dir: None }
    }
}

#[bon]
impl FuseConfig {
    /// Create a fusion configuration with builder pattern.
    #[builder]
    pub fn builder(
        #[builder(default = default_strategies())] strategies: Vec<FuseStrategy>,
        #[builder(default = true)] greedy_requires_fusible: bool,
        #[builder(into)] dot_dir: Option<PathBuf>,
    ) -> Self {
        Self { strategies, greedy_requires_fusible, dot_dir }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// * `KERNFUSE_FUSE` - Comma-separated passes (`singleton`, `gentle`, `greedy`).
    ///   `singleton` anywhere disables fusion. Unknown names are ignored.
    /// * `KERNFUSE_GREEDY_UNCHECKED` - Greedy ignores fusibility if set
    /// * `KERNFUSE_DOT_DIR` - Dump DOT files for every batch into this directory
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// [`FuseConfig::from_env`] over an arbitrary variable lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let strategies = var("KERNFUSE_FUSE").map(|list| parse_strategies(&list)).unwrap_or_else(default_strategies);
        let greedy_requires_fusible = var("KERNFUSE_GREEDY_UNCHECKED").is_none();
        let dot_dir = var("KERNFUSE_DOT_DIR").filter(|dir| !dir.is_empty()).map(PathBuf::from);

        Self { strategies, greedy_requires_fusible, dot_dir }
    }

    /// True when no pass merges anything.
    pub fn is_singleton(&self) -> bool {
        self.strategies.iter().all(|s| *s == FuseStrategy::Singleton)
    }
}

fn parse_strategies(list: &str) -> Vec<FuseStrategy> {
    let mut strategies = Vec::new();
    for name in list.split(',').map(str::trim).filter(|name| !name.is_empty()) {
        match name.parse::<FuseStrategy>() {
            Ok(FuseStrategy::Singleton) => return vec![FuseStrategy::Singleton],
            Ok(strategy) => strategies.push(strategy),
            Err(_) => tracing::warn!(name, "ignoring unknown fusion strategy"),
        }
    }
    strategies
}
