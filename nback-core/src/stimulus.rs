use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use string_cache::DefaultAtom as Atom;
use thiserror::Error;

/// Opaque stimulus identifier. Interned, so clones and comparisons are cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StimulusId(Atom);

impl StimulusId {
    pub fn new(id: &str) -> Self {
        Self(Atom::from(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StimulusId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for StimulusId {
    fn from(id: String) -> Self {
        Self(Atom::from(id))
    }
}

impl fmt::Display for StimulusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for StimulusId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StimulusId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(StimulusId::from)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("stimulus pool is empty")]
    Empty,
    #[error("duplicate stimulus in pool: {0}")]
    Duplicate(StimulusId),
}

/// Fixed, duplicate-free set of stimuli a run draws from.
///
/// The pool is never mutated after construction; exclusion draws go through
/// [`StimulusPool::without`], which is a filtered view.
#[derive(Debug, Clone, PartialEq)]
pub struct StimulusPool {
    items: Vec<StimulusId>,
}

impl StimulusPool {
    pub fn new<I, S>(items: I) -> Result<Self, PoolError>
    where
        I: IntoIterator<Item = S>,
        S: Into<StimulusId>,
    {
        let items: Vec<StimulusId> = items.into_iter().map(Into::into).collect();
        if items.is_empty() {
            return Err(PoolError::Empty);
        }
        let mut seen = HashSet::with_capacity(items.len());
        for id in &items {
            if !seen.insert(id) {
                return Err(PoolError::Duplicate(id.clone()));
            }
        }
        Ok(Self { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[StimulusId] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StimulusId> {
        self.items.iter()
    }

    pub fn contains(&self, id: &StimulusId) -> bool {
        self.items.contains(id)
    }

    /// Every stimulus except `excluded`, in pool order.
    pub fn without<'a>(
        &'a self,
        excluded: &'a StimulusId,
    ) -> impl Iterator<Item = &'a StimulusId> + Clone + 'a {
        self.items.iter().filter(move |id| *id != excluded)
    }
}

impl<'a> IntoIterator for &'a StimulusPool {
    type Item = &'a StimulusId;
    type IntoIter = std::slice::Iter<'a, StimulusId>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
