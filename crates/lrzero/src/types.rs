//! Utility types.
//!
//! Every user-observable collection in this crate is insertion-ordered: the
//! position of a symbol in a grammar or of an item in a state is part of the
//! deterministic output contract. `IndexMap`/`IndexSet` provide that order
//! while keeping hash-based lookup, and `FxHasher` keeps the hashing itself
//! deterministic and cheap.

type BuildHasher = std::hash::BuildHasherDefault<rustc_hash::FxHasher>;

pub type Map<K, V> = indexmap::IndexMap<K, V, BuildHasher>;
pub type Set<T> = indexmap::IndexSet<T, BuildHasher>;
