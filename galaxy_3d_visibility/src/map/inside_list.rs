/// Object-inside-object occlusion hints.
///
/// A pair (inner, outer) records that `inner` lies within the bounds of
/// `outer` in the same SubMap, so `inner` can inherit `outer`'s cull
/// result without being tested itself. Pairs reference objects through
/// generational SubMapObjectKeys: a removed object leaves a dead key that
/// `retain_live` drops, never an index pointing at some other object.

use slotmap::SlotMap;
use crate::world::{MapObjectKey, ObjectFlags};
use super::resolver::ObjectResolver;
use super::submap::SubMapObjectKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InsidePair {
    pub inner: SubMapObjectKey,
    pub outer: SubMapObjectKey,
}

impl InsidePair {
    pub fn new(inner: SubMapObjectKey, outer: SubMapObjectKey) -> Self {
        Self { inner, outer }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ObjectInsideList {
    pairs: Vec<InsidePair>,
    /// Object table changed since the pairs were generated
    dirty: bool,
}

impl ObjectInsideList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pairs(&self) -> &[InsidePair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Replace the pairs, clearing the dirty flag.
    pub(crate) fn set_pairs(&mut self, pairs: Vec<InsidePair>) {
        self.pairs = pairs;
        self.dirty = false;
    }

    /// Drop every pair for which `is_live` rejects the inner or outer key.
    /// Returns the number of pairs dropped.
    pub(crate) fn retain_live(&mut self, is_live: impl Fn(SubMapObjectKey) -> bool) -> usize {
        let before = self.pairs.len();
        self.pairs.retain(|pair| is_live(pair.inner) && is_live(pair.outer));
        before - self.pairs.len()
    }

    /// Drop every pair mentioning `key`.
    pub(crate) fn forget(&mut self, key: SubMapObjectKey) -> usize {
        self.retain_live(|k| k != key)
    }

    /// Generate pairs from object bounds.
    ///
    /// Only objects flagged `CONTAINER` act as outers. Each inner keeps its
    /// smallest enclosing container, and pairs are ordered by decreasing
    /// outer volume so enclosing containers are decided before the
    /// containers nested in them.
    pub fn generate(
        objects: &SlotMap<SubMapObjectKey, MapObjectKey>,
        resolver: &dyn ObjectResolver,
    ) -> Vec<InsidePair> {
        let resolved: Vec<_> = objects
            .iter()
            .filter_map(|(key, &object)| {
                resolver.world_bounds(object).map(|bounds| (key, object, bounds))
            })
            .collect();

        let containers: Vec<_> = resolved
            .iter()
            .filter(|(_, object, _)| resolver.flags(*object).contains(ObjectFlags::CONTAINER))
            .collect();

        let mut pairs: Vec<(InsidePair, f32)> = Vec::new();
        for (inner_key, _, inner_bounds) in &resolved {
            let tightest = containers
                .iter()
                .filter(|(outer_key, _, outer_bounds)| {
                    outer_key != inner_key
                        && outer_bounds.contains(inner_bounds)
                        // identical boxes would nest both ways
                        && outer_bounds.volume() > inner_bounds.volume()
                })
                .min_by(|a, b| a.2.volume().total_cmp(&b.2.volume()));

            if let Some((outer_key, _, outer_bounds)) = tightest {
                pairs.push((InsidePair::new(*inner_key, *outer_key), outer_bounds.volume()));
            }
        }

        pairs.sort_by(|a, b| b.1.total_cmp(&a.1));
        pairs.into_iter().map(|(pair, _)| pair).collect()
    }
}
