//! Symbol interning for constants, functions, and predicates.
//!
//! Symbol names live in per-kind string arenas and are referred to by typed
//! `u32` ids, giving O(1) comparison and `Copy` semantics. Variables are not
//! interned: they are bare numeric indices (see `logic::term::Variable`),
//! because the fluted discipline compares variable indices arithmetically.
//!
//! The interner doubles as the prover's signature: it hands out the fresh
//! definition predicates (`fl0`, `fl1`, ...) used by the definitional
//! preprocessor and the name predicates (`sp0`, `sp1`, ...) used by the
//! clause separator.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// ID for an interned constant name
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstantId(pub(crate) u32);

/// ID for an interned function symbol name
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(pub(crate) u32);

/// ID for an interned predicate symbol name
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PredicateId(pub(crate) u32);

impl ConstantId {
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl FunctionId {
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl PredicateId {
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// Internal string arena for a single symbol kind
#[derive(Debug, Clone, Default)]
struct StringArena {
    strings: Vec<String>,
    lookup: HashMap<String, u32>,
}

impl StringArena {
    fn intern(&mut self, name: &str) -> u32 {
        if let Some(&id) = self.lookup.get(name) {
            return id;
        }
        let id = self.strings.len() as u32;
        self.strings.push(name.to_string());
        self.lookup.insert(name.to_string(), id);
        id
    }

    fn resolve(&self, id: u32) -> &str {
        &self.strings[id as usize]
    }

    fn get(&self, name: &str) -> Option<u32> {
        self.lookup.get(name).copied()
    }

    fn contains(&self, name: &str) -> bool {
        self.lookup.contains_key(name)
    }

    fn len(&self) -> usize {
        self.strings.len()
    }
}

/// Symbol interner and signature.
///
/// Passed through the prover environment rather than held in global state.
#[derive(Debug, Clone, Default)]
pub struct Interner {
    constants: StringArena,
    functions: StringArena,
    predicates: StringArena,
    /// Counter for fresh definition/name predicates, shared across prefixes
    /// so generated names never collide with each other.
    fresh_counter: u32,
}

impl Interner {
    pub fn new() -> Self {
        Interner::default()
    }

    // === Constants ===

    pub fn intern_constant(&mut self, name: &str) -> ConstantId {
        ConstantId(self.constants.intern(name))
    }

    pub fn resolve_constant(&self, id: ConstantId) -> &str {
        self.constants.resolve(id.0)
    }

    pub fn get_constant(&self, name: &str) -> Option<ConstantId> {
        self.constants.get(name).map(ConstantId)
    }

    pub fn constant_count(&self) -> usize {
        self.constants.len()
    }

    // === Functions ===

    pub fn intern_function(&mut self, name: &str) -> FunctionId {
        FunctionId(self.functions.intern(name))
    }

    pub fn resolve_function(&self, id: FunctionId) -> &str {
        self.functions.resolve(id.0)
    }

    pub fn get_function(&self, name: &str) -> Option<FunctionId> {
        self.functions.get(name).map(FunctionId)
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    // === Predicates ===

    pub fn intern_predicate(&mut self, name: &str) -> PredicateId {
        PredicateId(self.predicates.intern(name))
    }

    pub fn resolve_predicate(&self, id: PredicateId) -> &str {
        self.predicates.resolve(id.0)
    }

    pub fn get_predicate(&self, name: &str) -> Option<PredicateId> {
        self.predicates.get(name).map(PredicateId)
    }

    pub fn predicate_count(&self) -> usize {
        self.predicates.len()
    }

    /// Allocate a fresh predicate with the given prefix, guaranteed not to
    /// clash with any predicate interned so far. The definitional
    /// preprocessor calls this with prefix `"fl"`.
    pub fn fresh_predicate(&mut self, prefix: &str) -> PredicateId {
        loop {
            let name = format!("{}{}", prefix, self.fresh_counter);
            self.fresh_counter += 1;
            if !self.predicates.contains(&name) {
                return PredicateId(self.predicates.intern(&name));
            }
        }
    }

    /// Allocate a fresh name predicate for the separation rule.
    pub fn name_predicate(&mut self) -> PredicateId {
        self.fresh_predicate("sp")
    }
}

// === Display implementations for debugging without an interner ===

impl fmt::Display for ConstantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}", self.0)
    }
}

impl fmt::Display for PredicateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

// === Serde: ids serialize as bare u32 ===

impl Serialize for ConstantId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ConstantId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u32::deserialize(deserializer).map(ConstantId)
    }
}

impl Serialize for FunctionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FunctionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u32::deserialize(deserializer).map(FunctionId)
    }
}

impl Serialize for PredicateId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PredicateId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u32::deserialize(deserializer).map(PredicateId)
    }
}
