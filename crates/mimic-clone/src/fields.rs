//! Copyable field enumeration.
//!
//! Lists every instance field a composite copy must carry over: the fields
//! declared by the class itself, then those of each ancestor up to the root.
//! Static and transient fields are left out. Results are cached per class
//! for the life of the process.

use crate::cache::{CacheStats, MetadataCache};
use mimic_core::{Class, FieldRef};
use std::sync::{Arc, LazyLock};

static FIELDS: LazyLock<MetadataCache<Arc<[FieldRef]>>> = LazyLock::new(|| MetadataCache::new("fields"));

/// Fields copied for instances of `class`, most-derived class first
pub fn copyable_fields(class: &Arc<Class>) -> Arc<[FieldRef]> {
    FIELDS.get_or_build(class, || {
        class
            .ancestors()
            .flat_map(|c| c.declared_field_refs())
            .filter(|f| {
                let desc = f.descriptor();
                !desc.is_static() && !desc.is_transient()
            })
            .collect()
    })
}

/// Counters of the process-wide field cache
pub fn cache_stats() -> CacheStats {
    FIELDS.stats()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mimic_core::{ClassBuilder, FieldModifiers, ValueType};

    fn names(fields: &[FieldRef]) -> Vec<String> {
        fields.iter().map(|f| format!("{:?}", f)).collect()
    }

    #[test]
    fn test_order_most_derived_first() {
        let base = ClassBuilder::new("Base")
            .field("a", ValueType::Int)
            .field("b", ValueType::Int)
            .build();
        let mid = ClassBuilder::new("Mid").extends(&base).field("c", ValueType::Int).build();
        let leaf = ClassBuilder::new("Leaf")
            .extends(&mid)
            .field("d", ValueType::Int)
            .field("e", ValueType::Int)
            .build();

        assert_eq!(names(&copyable_fields(&leaf)), ["Leaf.d", "Leaf.e", "Mid.c", "Base.a", "Base.b"]);
    }

    #[test]
    fn test_static_and_transient_skipped() {
        let class = ClassBuilder::new("Mixed")
            .field("kept", ValueType::Text)
            .static_field("COUNTER", ValueType::Int)
            .field_with("scratch", ValueType::Any, FieldModifiers::private().transient())
            .field_with("shared", ValueType::Any, FieldModifiers::public().with_static())
            .public_field("visible", ValueType::Int)
            .build();
        assert_eq!(names(&copyable_fields(&class)), ["Mixed.kept", "Mixed.visible"]);
    }

    #[test]
    fn test_shadowed_fields_both_listed() {
        let base = ClassBuilder::new("Outer").field("name", ValueType::Text).build();
        let child = ClassBuilder::new("Inner").extends(&base).field("name", ValueType::Int).build();
        assert_eq!(names(&copyable_fields(&child)), ["Inner.name", "Outer.name"]);
    }

    #[test]
    fn test_cached_per_class() {
        let class = ClassBuilder::new("Once").field("x", ValueType::Int).build();
        let first = copyable_fields(&class);
        let second = copyable_fields(&class);
        assert!(Arc::ptr_eq(&first, &second));
    }
}
