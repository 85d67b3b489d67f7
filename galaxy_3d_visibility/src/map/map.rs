/// Map - the static level graph.
///
/// An ordered collection of SubMaps connected by portals. SubMaps are
/// stored in a SlotMap so keys held by portals, game objects and visible
/// lists survive the removal of unrelated SubMaps; a separate order list
/// keeps the authoring order used by the containment scan.

use glam::Vec3;
use slotmap::{new_key_type, SlotMap};
use crate::error::{Error, Result};
use crate::world::MapObjectKey;
use super::portal::{Portal, PortalId, PortalKind};
use super::resolver::ObjectResolver;
use super::submap::SubMap;

// ===== SLOT MAP KEY =====

new_key_type! {
    /// Stable key for a SubMap within a Map.
    pub struct SubMapKey;
}

#[derive(Debug, Default)]
pub struct Map {
    name: String,
    submaps: SlotMap<SubMapKey, SubMap>,
    /// Authoring order, scanned by `submap_containing`
    order: Vec<SubMapKey>,
}

impl Map {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            submaps: SlotMap::with_key(),
            order: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // ===== SUBMAPS =====

    pub fn add_submap(&mut self, submap: SubMap) -> SubMapKey {
        let key = self.submaps.insert(submap);
        self.order.push(key);
        crate::engine_debug!("galaxy3d::Map", "Map '{}': added submap {:?}", self.name, key);
        key
    }

    /// Remove a SubMap. Normal portals elsewhere that lead into it are
    /// unlinked.
    pub fn remove_submap(&mut self, key: SubMapKey) -> Option<SubMap> {
        let removed = self.submaps.remove(key)?;
        self.order.retain(|&k| k != key);

        let mut unlinked = 0usize;
        for submap in self.submaps.values_mut() {
            let dangling: Vec<_> = submap
                .portals()
                .filter(|(_, portal)| portal.link().is_some_and(|link| link.submap == key))
                .map(|(portal_key, _)| portal_key)
                .collect();
            for portal_key in dangling {
                // Key was just read from this submap
                let _ = submap.change_portal_ref(portal_key, PortalKind::Normal { link: None });
                unlinked += 1;
            }
        }

        crate::engine_debug!("galaxy3d::Map",
            "Map '{}': removed submap {:?}, unlinked {} portals", self.name, key, unlinked);
        Some(removed)
    }

    pub fn submap(&self, key: SubMapKey) -> Option<&SubMap> {
        self.submaps.get(key)
    }

    pub fn submap_mut(&mut self, key: SubMapKey) -> Option<&mut SubMap> {
        self.submaps.get_mut(key)
    }

    /// Mutable access for level editing, failing on a dead key.
    pub fn edit(&mut self, key: SubMapKey) -> Result<&mut SubMap> {
        self.submaps
            .get_mut(key)
            .ok_or_else(|| Error::InvalidHandle(format!("{:?} is not a submap of map '{}'", key, self.name)))
    }

    /// SubMaps in authoring order
    pub fn submaps(&self) -> impl Iterator<Item = (SubMapKey, &SubMap)> {
        self.order
            .iter()
            .filter_map(move |&key| self.submaps.get(key).map(|submap| (key, submap)))
    }

    pub fn submap_count(&self) -> usize {
        self.submaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.submaps.is_empty()
    }

    // ===== PORTALS =====

    /// Add a portal to `submap`, returning its graph-wide id.
    pub fn add_portal(&mut self, submap: SubMapKey, portal: Portal) -> Result<PortalId> {
        let portal_key = self.edit(submap)?.add_portal(portal)?;
        Ok(PortalId::new(submap, portal_key))
    }

    pub fn portal(&self, id: PortalId) -> Option<&Portal> {
        self.submaps.get(id.submap)?.portal(id.portal)
    }

    /// Connect two Normal portals to each other.
    pub fn link_portals(&mut self, a: PortalId, b: PortalId) -> Result<()> {
        for id in [a, b] {
            let portal = self
                .portal(id)
                .ok_or_else(|| Error::InvalidHandle(format!("{:?} does not resolve", id)))?;
            if portal.is_mirror() {
                return Err(Error::InvalidState(format!("{:?} is a mirror and cannot be linked", id)));
            }
        }

        self.edit(a.submap)?.change_portal_ref(a.portal, PortalKind::Normal { link: Some(b) })?;
        self.edit(b.submap)?.change_portal_ref(b.portal, PortalKind::Normal { link: Some(a) })?;
        Ok(())
    }

    // ===== MAINTENANCE =====

    /// Regenerate every dirty inside list. Returns the number rebuilt.
    pub fn refresh(&mut self, resolver: &dyn ObjectResolver) -> usize {
        let mut rebuilt = 0;
        for submap in self.submaps.values_mut().filter(|submap| submap.inside_list_dirty()) {
            submap.rebuild_inside_list(resolver);
            rebuilt += 1;
        }
        rebuilt
    }

    /// Drop every reference to a placed object that left the world.
    pub fn purge_object_refs(&mut self, object: MapObjectKey) -> usize {
        self.submaps.values_mut().map(|submap| submap.purge_object(object)).sum()
    }

    /// Drop the inside pairs naming `object` (its bounds or flags changed)
    /// and mark those lists dirty. Returns the number of pairs dropped.
    pub fn invalidate_object(&mut self, object: MapObjectKey) -> usize {
        self.submaps
            .values_mut()
            .map(|submap| submap.invalidate_object(object))
            .sum()
    }

    // ===== SPATIAL QUERIES =====

    /// First SubMap, in authoring order, one of whose objects contains
    /// `position`.
    pub fn submap_containing(&self, position: Vec3, resolver: &dyn ObjectResolver) -> Option<SubMapKey> {
        self.submaps()
            .find(|(_, submap)| submap.contains_point(position, resolver))
            .map(|(key, _)| key)
    }

    /// SubMap whose object centroid is nearest to `position`.
    ///
    /// SubMaps without any resolvable object have no centroid and are
    /// skipped.
    pub fn nearest_submap(&self, position: Vec3, resolver: &dyn ObjectResolver) -> Option<SubMapKey> {
        self.submaps()
            .filter_map(|(key, submap)| {
                submap
                    .centroid(resolver)
                    .map(|centroid| (key, centroid.distance_squared(position)))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(key, _)| key)
    }

    /// `submap_containing`, falling back to `nearest_submap`
    pub fn locate(&self, position: Vec3, resolver: &dyn ObjectResolver) -> Option<SubMapKey> {
        self.submap_containing(position, resolver)
            .or_else(|| self.nearest_submap(position, resolver))
    }
}

#[cfg(test)]
#[path = "map_tests.rs"]
mod tests;
