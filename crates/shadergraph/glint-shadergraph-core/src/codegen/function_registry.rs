//! Shared, key-deduplicated sink for generated function definitions.

use hashbrown::HashMap;
use log::trace;

/// Collects one generated function definition per distinct key during a
/// generation pass.
///
/// Registration is idempotent by key: a repeated key neither stores a second
/// definition nor re-invokes the builder, so call order across nodes never
/// changes the outcome. First-registration order is preserved for
/// deterministic concatenation.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    sources: HashMap<String, String>,
    order: Vec<String>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `build` against a fresh buffer and store the result under `key`,
    /// unless `key` is already registered.
    pub fn provide<F>(&mut self, key: &str, build: F)
    where
        F: FnOnce(&mut String),
    {
        if self.sources.contains_key(key) {
            trace!("function {key} already registered, skipping");
            return;
        }
        let mut source = String::new();
        build(&mut source);
        self.sources.insert(key.to_string(), source);
        self.order.push(key.to_string());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.sources.contains_key(key)
    }

    /// Source registered under `key`, if any.
    pub fn source(&self, key: &str) -> Option<&str> {
        self.sources.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// All registered definitions, concatenated in first-registration order.
    pub fn concat(&self) -> String {
        let mut out = String::new();
        for key in &self.order {
            if let Some(source) = self.sources.get(key) {
                out.push_str(source);
                out.push('\n');
            }
        }
        out
    }
}
