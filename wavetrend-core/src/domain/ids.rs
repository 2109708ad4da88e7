use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Order ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic order-ID generator.
///
/// Atomic: IDs may be allocated from the calculation thread while fill
/// callbacks run elsewhere.
#[derive(Debug, Default)]
pub struct IdGen {
    next: AtomicU64,
}

impl IdGen {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Allocate the next ID under a role prefix, e.g. `entry-7`.
    pub fn next_id(&self, prefix: &str) -> OrderId {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        OrderId(format!("{prefix}-{n}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_prefixed() {
        let gen = IdGen::new();
        let a = gen.next_id("entry");
        let b = gen.next_id("stop");
        assert_ne!(a, b);
        assert!(a.0.starts_with("entry-"));
        assert!(b.0.starts_with("stop-"));
    }

    #[test]
    fn order_id_display() {
        assert_eq!(OrderId::new("entry-1").to_string(), "entry-1");
    }
}
