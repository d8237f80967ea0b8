//! Liveness guard for attached objects.
//!
//! # Responsibility
//! - Turn use of a stale attached object into a typed failure.
//!
//! # Invariants
//! - The check is a single synchronous query with no side effects.
//! - Success is a point-in-time statement only; the scene graph may change
//!   right after. Use `AttachedFeature::with_node_mut` to check and use under
//!   one lock.

use crate::errors::InvalidAttachedObjectError;

/// Anything bound to a node of an externally-owned scene graph.
pub trait AttachedObject {
    /// Returns whether the referenced node still exists and is reachable.
    fn has_valid_node(&self) -> bool;
}

impl<T: AttachedObject + ?Sized> AttachedObject for &T {
    fn has_valid_node(&self) -> bool {
        (**self).has_valid_node()
    }
}

/// Fails with `InvalidAttachedObjectError` unless `obj` refers to a live node.
pub fn assert_valid<T: AttachedObject + ?Sized>(obj: &T) -> Result<(), InvalidAttachedObjectError> {
    if obj.has_valid_node() {
        Ok(())
    } else {
        Err(InvalidAttachedObjectError)
    }
}

#[cfg(test)]
mod tests {
    use super::{assert_valid, AttachedObject};
    use crate::errors::InvalidAttachedObjectError;
    use std::cell::Cell;

    struct Probe {
        valid: bool,
        queries: Cell<u32>,
    }

    impl AttachedObject for Probe {
        fn has_valid_node(&self) -> bool {
            self.queries.set(self.queries.get() + 1);
            self.valid
        }
    }

    #[test]
    fn passes_for_valid_object_with_single_query() {
        let probe = Probe {
            valid: true,
            queries: Cell::new(0),
        };
        assert_valid(&probe).expect("valid probe should pass");
        assert_eq!(probe.queries.get(), 1);
    }

    #[test]
    fn fails_for_invalid_object() {
        let probe = Probe {
            valid: false,
            queries: Cell::new(0),
        };
        assert_eq!(assert_valid(&probe), Err(InvalidAttachedObjectError));
    }

    #[test]
    fn accepts_trait_objects() {
        let probe = Probe {
            valid: true,
            queries: Cell::new(0),
        };
        let object: &dyn AttachedObject = &probe;
        assert!(assert_valid(object).is_ok());
    }
}
