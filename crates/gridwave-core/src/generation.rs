// crates/gridwave-core/src/generation.rs
use std::fmt;

/// Identity of one configuration object as assigned by `init`/`updateConfig`.
///
/// Two resolved configurations are "the same" exactly when their generations
/// are equal; settings are never compared field by field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(u64);

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen#{}", self.0)
    }
}

/// Monotonic source of [`Generation`]s, owned by the orchestrator.
#[derive(Debug, Default)]
pub struct GenerationCounter {
    last: u64,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self) -> Generation {
        self.last += 1;
        Generation(self.last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generations_are_unique_and_increasing() {
        let mut counter = GenerationCounter::new();
        let a = counter.next();
        let b = counter.next();
        assert_ne!(a, b);
        assert!(b > a);
        assert_eq!(a.to_string(), "gen#1");
    }
}
