/// SubMap - one visibility cell of the level graph.
///
/// A SubMap references placed objects (it never owns them), owns its
/// portals and lights, keeps the object-inside-object hints for its
/// objects, and mirrors the membership of the mobile GameObjects whose
/// position currently lies inside it.

use glam::Vec3;
use slotmap::{new_key_type, SecondaryMap, SlotMap};
use crate::camera::{Camera, Frustum, SphereTest};
use crate::error::{Error, Result};
use crate::utils::SlotAllocator;
use crate::world::{GameObjectKey, MapObjectKey, ObjectFlags};
use super::inside_list::{InsidePair, ObjectInsideList};
use super::light::Light;
use super::portal::{Portal, PortalKey, PortalKind};
use super::resolver::ObjectResolver;

/// Width of the traversal's per-submap arrival mask
pub const MAX_PORTALS_PER_SUBMAP: u32 = u64::BITS;

// ===== SLOT MAP KEY =====

new_key_type! {
    /// Stable key for an object reference within a SubMap.
    ///
    /// Keys remain valid when other references are removed. A key
    /// becomes invalid only when its own reference is removed.
    pub struct SubMapObjectKey;
}

/// Visibility decision for one object reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Not decided yet
    Unknown,
    /// Passed its frustum test
    Draw,
    /// Failed its frustum test
    Culled,
    /// Container was culled; never tested itself
    CulledInside,
    /// Container is drawn and hides its contents
    IsInside,
    /// Reference could not be resolved to bounds
    NoObject,
}

#[derive(Debug)]
pub struct SubMap {
    name: String,
    objects: SlotMap<SubMapObjectKey, MapObjectKey>,
    portals: SlotMap<PortalKey, Portal>,
    portal_bits: SlotAllocator,
    lights: Vec<Light>,
    inside_list: ObjectInsideList,
    dynamic_objects: Vec<GameObjectKey>,
}

impl SubMap {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objects: SlotMap::with_key(),
            portals: SlotMap::with_key(),
            portal_bits: SlotAllocator::new(MAX_PORTALS_PER_SUBMAP),
            lights: Vec::new(),
            inside_list: ObjectInsideList::new(),
            dynamic_objects: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // ===== STATIC OBJECT REFERENCES =====

    /// Reference a placed object from this SubMap.
    pub fn add_map_object(&mut self, object: MapObjectKey) -> SubMapObjectKey {
        let key = self.objects.insert(object);
        self.inside_list.mark_dirty();
        key
    }

    /// Drop a reference. Inside pairs naming it are dropped immediately.
    pub fn remove_map_object(&mut self, key: SubMapObjectKey) -> Option<MapObjectKey> {
        let removed = self.objects.remove(key)?;
        self.inside_list.forget(key);
        self.inside_list.mark_dirty();
        Some(removed)
    }

    /// Point an existing reference at another object.
    pub fn change_object_ref(&mut self, key: SubMapObjectKey, object: MapObjectKey) -> Result<()> {
        let slot = self.objects.get_mut(key).ok_or_else(|| {
            Error::InvalidHandle(format!("{:?} is not an object of submap '{}'", key, self.name))
        })?;
        *slot = object;
        // Pairs were derived from the old object's bounds
        self.inside_list.forget(key);
        self.inside_list.mark_dirty();
        Ok(())
    }

    /// Drop every reference to `object` (the object left the world).
    pub(crate) fn purge_object(&mut self, object: MapObjectKey) -> usize {
        let dead: Vec<SubMapObjectKey> = self
            .objects
            .iter()
            .filter(|(_, o)| **o == object)
            .map(|(key, _)| key)
            .collect();
        for key in &dead {
            self.remove_map_object(*key);
        }
        dead.len()
    }

    /// Drop the inside pairs naming any reference to `object` (its bounds
    /// or flags changed) and mark the list for regeneration. The remaining
    /// pairs stay usable until the next refresh. Returns the pairs dropped.
    pub(crate) fn invalidate_object(&mut self, object: MapObjectKey) -> usize {
        let stale: Vec<SubMapObjectKey> = self
            .objects
            .iter()
            .filter(|(_, o)| **o == object)
            .map(|(key, _)| key)
            .collect();
        if stale.is_empty() {
            return 0;
        }
        let dropped = stale.iter().map(|&key| self.inside_list.forget(key)).sum();
        self.inside_list.mark_dirty();
        dropped
    }

    pub fn references(&self, object: MapObjectKey) -> bool {
        self.objects.values().any(|&o| o == object)
    }

    pub fn object(&self, key: SubMapObjectKey) -> Option<MapObjectKey> {
        self.objects.get(key).copied()
    }

    pub fn objects(&self) -> impl Iterator<Item = (SubMapObjectKey, MapObjectKey)> + '_ {
        self.objects.iter().map(|(key, &object)| (key, object))
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    // ===== PORTALS =====

    /// Add a portal, assigning it a free arrival bit.
    ///
    /// Fails once the submap holds `MAX_PORTALS_PER_SUBMAP` portals: the
    /// traversal's visited set could not tell further arrivals apart.
    pub fn add_portal(&mut self, mut portal: Portal) -> Result<PortalKey> {
        let bit = self.portal_bits.alloc().ok_or(Error::PortalLimitExceeded {
            limit: MAX_PORTALS_PER_SUBMAP,
        })?;
        portal.set_arrival_bit(bit);
        let key = self.portals.insert(portal);
        self.inside_list.mark_dirty();
        Ok(key)
    }

    /// Delete a portal and recycle its arrival bit. Portals elsewhere that
    /// link to it are left dangling and skipped by the traversal.
    pub fn delete_portal(&mut self, key: PortalKey) -> Option<Portal> {
        let portal = self.portals.remove(key)?;
        self.portal_bits.free(portal.arrival_bit());
        self.inside_list.mark_dirty();
        Some(portal)
    }

    /// Re-target a portal (relink, unlink, or turn into a mirror).
    pub fn change_portal_ref(&mut self, key: PortalKey, kind: PortalKind) -> Result<()> {
        let portal = self.portals.get_mut(key).ok_or_else(|| {
            Error::InvalidHandle(format!("{:?} is not a portal of submap '{}'", key, self.name))
        })?;
        portal.set_kind(kind);
        self.inside_list.mark_dirty();
        Ok(())
    }

    pub fn portal(&self, key: PortalKey) -> Option<&Portal> {
        self.portals.get(key)
    }

    pub fn portals(&self) -> impl Iterator<Item = (PortalKey, &Portal)> {
        self.portals.iter()
    }

    pub fn portal_count(&self) -> usize {
        self.portals.len()
    }

    /// Portals to follow when this SubMap is reached by `camera`.
    ///
    /// Every portal of a visited SubMap is returned: portals are not
    /// re-culled against the incoming frustum.
    pub fn visible_portals(&self, _camera: &Camera) -> Vec<PortalKey> {
        self.portals.keys().collect()
    }

    // ===== LIGHTS =====

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn remove_light(&mut self, index: usize) -> Option<Light> {
        (index < self.lights.len()).then(|| self.lights.remove(index))
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    // ===== OBJECT-INSIDE-OBJECT LIST =====

    pub fn inside_list(&self) -> &ObjectInsideList {
        &self.inside_list
    }

    /// Install hand-authored inside pairs. Pairs naming dead references,
    /// or an object inside itself, are dropped and logged.
    pub fn set_inside_list(&mut self, pairs: Vec<InsidePair>) -> usize {
        let (valid, rejected): (Vec<_>, Vec<_>) = pairs.into_iter().partition(|pair| {
            pair.inner != pair.outer
                && self.objects.contains_key(pair.inner)
                && self.objects.contains_key(pair.outer)
        });
        if !rejected.is_empty() {
            crate::engine_warn!("galaxy3d::SubMap",
                "Submap '{}': dropped {} inside pairs with invalid references", self.name, rejected.len());
        }
        let count = valid.len();
        self.inside_list.set_pairs(valid);
        count
    }

    /// Regenerate the inside list from object bounds.
    pub fn rebuild_inside_list(&mut self, resolver: &dyn ObjectResolver) {
        let pairs = ObjectInsideList::generate(&self.objects, resolver);
        crate::engine_trace!("galaxy3d::SubMap",
            "Submap '{}': {} inside pairs from {} objects", self.name, pairs.len(), self.objects.len());
        self.inside_list.set_pairs(pairs);
    }

    pub fn inside_list_dirty(&self) -> bool {
        self.inside_list.is_dirty()
    }

    // ===== DYNAMIC MEMBERSHIP =====

    pub fn dynamic_objects(&self) -> &[GameObjectKey] {
        &self.dynamic_objects
    }

    pub(crate) fn add_dynamic(&mut self, key: GameObjectKey) {
        debug_assert!(!self.dynamic_objects.contains(&key), "{:?} already a member", key);
        self.dynamic_objects.push(key);
    }

    pub(crate) fn remove_dynamic(&mut self, key: GameObjectKey) -> bool {
        match self.dynamic_objects.iter().position(|&k| k == key) {
            Some(index) => {
                self.dynamic_objects.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn clear_dynamic(&mut self) {
        self.dynamic_objects.clear();
    }

    // ===== SPATIAL QUERIES =====

    /// Whether any referenced object's world bounds contain `point`.
    pub fn contains_point(&self, point: Vec3, resolver: &dyn ObjectResolver) -> bool {
        self.objects
            .values()
            .filter_map(|&object| resolver.world_bounds(object))
            .any(|bounds| bounds.contains_point(point))
    }

    /// Mean of the referenced objects' world bounds centres.
    pub fn centroid(&self, resolver: &dyn ObjectResolver) -> Option<Vec3> {
        let (sum, count) = self
            .objects
            .values()
            .filter_map(|&object| resolver.world_bounds(object))
            .fold((Vec3::ZERO, 0u32), |(sum, count), bounds| (sum + bounds.center(), count + 1));

        (count > 0).then(|| sum / count as f32)
    }

    // ===== CLASSIFICATION =====

    /// Classify every object reference against `camera`'s frustum.
    ///
    /// 1. For each inside pair, the outer is tested once; a culled outer
    ///    makes the inner `CulledInside` without testing the inner.
    /// 2. A drawn outer without `SHOW_CONTAINED` hides each undecided inner
    ///    (`IsInside`).
    /// 3. Every remaining reference is tested directly.
    pub fn classify_objects(
        &self,
        camera: &Camera,
        resolver: &dyn ObjectResolver,
    ) -> SecondaryMap<SubMapObjectKey, Classification> {
        let frustum = camera.frustum();
        let pairs = self.inside_list.pairs();

        let mut results = SecondaryMap::with_capacity(self.objects.len());
        for key in self.objects.keys() {
            results.insert(key, Classification::Unknown);
        }

        for pair in pairs {
            if !results.contains_key(pair.inner) {
                continue;
            }
            let outer_state = match results.get(pair.outer) {
                Some(Classification::Unknown) => {
                    let state = self.test_object(pair.outer, frustum, resolver);
                    results.insert(pair.outer, state);
                    state
                }
                Some(&state) => state,
                None => continue,
            };
            if matches!(outer_state, Classification::Culled | Classification::CulledInside) {
                results.insert(pair.inner, Classification::CulledInside);
            }
        }

        for pair in pairs {
            if results.get(pair.outer) != Some(&Classification::Draw)
                || results.get(pair.inner) != Some(&Classification::Unknown)
            {
                continue;
            }
            let Some(outer_object) = self.objects.get(pair.outer) else {
                continue;
            };
            if resolver.flags(*outer_object).contains(ObjectFlags::SHOW_CONTAINED) {
                continue;
            }
            results.insert(pair.inner, Classification::IsInside);
        }

        for (key, state) in results.iter_mut() {
            if *state == Classification::Unknown {
                *state = self.test_object(key, frustum, resolver);
            }
        }

        results
    }

    /// Resolve one reference and test its bounding sphere.
    fn test_object(
        &self,
        key: SubMapObjectKey,
        frustum: &Frustum,
        resolver: &dyn ObjectResolver,
    ) -> Classification {
        let Some(bounds) = self.objects.get(key).and_then(|&object| resolver.world_bounds(object)) else {
            return Classification::NoObject;
        };
        let sphere = bounds.bounding_sphere();

        match frustum.test_bounding_sphere(&sphere) {
            SphereTest::Inside => Classification::Draw,
            SphereTest::Culled => Classification::Culled,
        }
    }
}

#[cfg(test)]
#[path = "submap_tests.rs"]
mod tests;
