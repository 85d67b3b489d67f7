/// World - owner of every object the visibility core reasons about.
///
/// Holds the loaded Map (if any), the placed MapObjects the Map refers
/// to, the mobile GameObjects and the asset registry. The World is the
/// production `ObjectResolver`, and it keeps the dynamic spatial index
/// consistent: every GameObject is listed by exactly the SubMap that
/// contains its position, or by none.

use glam::{Quat, Vec3};
use slotmap::SlotMap;
use crate::bounds::AABB;
use crate::error::{Error, Result};
use crate::map::{Map, ObjectResolver, SubMap, SubMapKey};
use super::assets::AssetRegistry;
use super::game_object::{GameObject, GameObjectKey};
use super::map_object::{MapObject, MapObjectKey, ObjectFlags};

/// Resolver over borrowed object and asset tables.
///
/// Borrowing the two tables rather than the whole World lets the Map be
/// mutated while objects are resolved.
#[derive(Clone, Copy)]
pub struct ObjectLookup<'a> {
    objects: &'a SlotMap<MapObjectKey, MapObject>,
    assets: &'a AssetRegistry,
}

impl<'a> ObjectLookup<'a> {
    pub fn new(objects: &'a SlotMap<MapObjectKey, MapObject>, assets: &'a AssetRegistry) -> Self {
        Self { objects, assets }
    }
}

impl ObjectResolver for ObjectLookup<'_> {
    fn world_bounds(&self, object: MapObjectKey) -> Option<AABB> {
        self.objects.get(object)?.world_bounds(self.assets)
    }

    fn flags(&self, object: MapObjectKey) -> ObjectFlags {
        self.objects.get(object).map_or(ObjectFlags::empty(), |o| o.flags)
    }
}

#[derive(Debug, Default)]
pub struct World {
    map: Option<Map>,
    map_objects: SlotMap<MapObjectKey, MapObject>,
    game_objects: SlotMap<GameObjectKey, GameObject>,
    assets: AssetRegistry,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_assets(assets: AssetRegistry) -> Self {
        Self { assets, ..Self::default() }
    }

    pub fn assets(&self) -> &AssetRegistry {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut AssetRegistry {
        &mut self.assets
    }

    /// Resolver borrowing this World's objects and assets
    pub fn resolver(&self) -> ObjectLookup<'_> {
        ObjectLookup::new(&self.map_objects, &self.assets)
    }

    // ===== MAP =====

    /// Load a map, replacing the current one. Inside lists are rebuilt
    /// and every GameObject is re-indexed against the new graph.
    pub fn set_map(&mut self, mut map: Map) -> Option<Map> {
        let previous = self.take_map();

        clear_dynamic_lists(&mut map);
        let rebuilt = map.refresh(&ObjectLookup::new(&self.map_objects, &self.assets));
        crate::engine_info!("galaxy3d::World",
            "Loaded map '{}' ({} submaps, {} inside lists built)", map.name(), map.submap_count(), rebuilt);
        self.map = Some(map);

        let keys: Vec<GameObjectKey> = self.game_objects.keys().collect();
        for key in keys {
            // Keys were just collected from the table
            let _ = self.refresh_submap_membership(key);
        }
        previous
    }

    /// Unload the current map. GameObjects become loose.
    pub fn take_map(&mut self) -> Option<Map> {
        let mut map = self.map.take()?;
        clear_dynamic_lists(&mut map);
        for object in self.game_objects.values_mut() {
            object.current_submap = None;
        }
        Some(map)
    }

    pub fn map(&self) -> Option<&Map> {
        self.map.as_ref()
    }

    /// Mutable map access for level editing. Call `refresh_map` before
    /// the next build. Remove SubMaps with `World::remove_submap` so the
    /// GameObjects they held are re-indexed.
    pub fn map_mut(&mut self) -> Option<&mut Map> {
        self.map.as_mut()
    }

    /// Remove a SubMap from the current map and re-index the GameObjects
    /// that were members of it.
    pub fn remove_submap(&mut self, key: SubMapKey) -> Option<SubMap> {
        let mut removed = self.map.as_mut()?.remove_submap(key)?;

        let orphans = removed.dynamic_objects().to_vec();
        removed.clear_dynamic();
        for &object in &orphans {
            if let Some(object) = self.game_objects.get_mut(object) {
                object.current_submap = None;
            }
        }
        for object in orphans {
            // Keys were just taken from the membership list
            let _ = self.refresh_submap_membership(object);
        }
        crate::engine_debug!("galaxy3d::World", "Removed submap '{}'", removed.name());
        Some(removed)
    }

    /// Rebuild dirty inside lists. Returns the number rebuilt.
    pub fn refresh_map(&mut self) -> usize {
        let lookup = ObjectLookup::new(&self.map_objects, &self.assets);
        self.map.as_mut().map_or(0, |map| map.refresh(&lookup))
    }

    // ===== MAP OBJECTS =====

    /// Place an object. Its mesh must be registered.
    pub fn add_map_object(&mut self, object: MapObject) -> Result<MapObjectKey> {
        if self.assets.mesh(object.mesh).is_none() {
            crate::engine_bail!("galaxy3d::World", "Mesh {:?} not registered", object.mesh);
        }
        Ok(self.map_objects.insert(object))
    }

    /// Remove a placed object and every SubMap reference to it.
    pub fn remove_map_object(&mut self, key: MapObjectKey) -> Option<MapObject> {
        let removed = self.map_objects.remove(key)?;
        if let Some(map) = self.map.as_mut() {
            let purged = map.purge_object_refs(key);
            crate::engine_debug!("galaxy3d::World", "Removed map object {:?} ({} references)", key, purged);
        }
        Some(removed)
    }

    pub fn map_object(&self, key: MapObjectKey) -> Option<&MapObject> {
        self.map_objects.get(key)
    }

    pub fn map_objects(&self) -> impl Iterator<Item = (MapObjectKey, &MapObject)> {
        self.map_objects.iter()
    }

    /// Move a placed object. SubMaps referencing it regenerate their
    /// inside lists on the next refresh.
    pub fn set_map_object_transform(&mut self, key: MapObjectKey, position: Vec3, rotation: Quat) -> Result<()> {
        let object = self
            .map_objects
            .get_mut(key)
            .ok_or_else(|| Error::InvalidHandle(format!("{:?} is not a map object", key)))?;
        object.position = position;
        object.rotation = rotation;
        if let Some(map) = self.map.as_mut() {
            map.invalidate_object(key);
        }
        Ok(())
    }

    pub fn set_map_object_flags(&mut self, key: MapObjectKey, flags: ObjectFlags) -> Result<()> {
        let object = self
            .map_objects
            .get_mut(key)
            .ok_or_else(|| Error::InvalidHandle(format!("{:?} is not a map object", key)))?;
        object.flags = flags;
        if let Some(map) = self.map.as_mut() {
            map.invalidate_object(key);
        }
        Ok(())
    }

    // ===== GAME OBJECTS =====

    /// Add a GameObject and index it immediately.
    pub fn spawn(&mut self, object: GameObject) -> GameObjectKey {
        let key = self.game_objects.insert(object);
        let _ = self.refresh_submap_membership(key);
        key
    }

    /// Remove a GameObject and its membership entry.
    pub fn despawn(&mut self, key: GameObjectKey) -> Option<GameObject> {
        let object = self.game_objects.remove(key)?;
        if let (Some(map), Some(submap)) = (self.map.as_mut(), object.current_submap) {
            if let Some(submap) = map.submap_mut(submap) {
                submap.remove_dynamic(key);
            }
        }
        Some(object)
    }

    pub fn game_object(&self, key: GameObjectKey) -> Option<&GameObject> {
        self.game_objects.get(key)
    }

    /// Mutable access. Position changes take effect in the spatial index
    /// on the next `update` or `refresh_submap_membership`.
    pub fn game_object_mut(&mut self, key: GameObjectKey) -> Option<&mut GameObject> {
        self.game_objects.get_mut(key)
    }

    pub fn game_objects(&self) -> impl Iterator<Item = (GameObjectKey, &GameObject)> {
        self.game_objects.iter()
    }

    pub fn game_object_count(&self) -> usize {
        self.game_objects.len()
    }

    /// GameObjects not indexed by any SubMap
    pub fn loose_game_objects(&self) -> impl Iterator<Item = (GameObjectKey, &GameObject)> {
        self.game_objects.iter().filter(|(_, object)| object.current_submap.is_none())
    }

    /// Move a GameObject and re-index it.
    pub fn set_game_object_position(&mut self, key: GameObjectKey, position: Vec3) -> Result<bool> {
        let object = self
            .game_objects
            .get_mut(key)
            .ok_or_else(|| Error::InvalidHandle(format!("{:?} is not a game object", key)))?;
        object.position = position;
        self.refresh_submap_membership(key)
    }

    // ===== SPATIAL INDEX =====

    /// Move `key` into the dynamic list of the SubMap containing its
    /// position. Returns whether its membership changed.
    pub fn refresh_submap_membership(&mut self, key: GameObjectKey) -> Result<bool> {
        let object = self
            .game_objects
            .get(key)
            .ok_or_else(|| Error::InvalidHandle(format!("{:?} is not a game object", key)))?;
        let (position, current) = (object.position, object.current_submap);

        let lookup = ObjectLookup::new(&self.map_objects, &self.assets);
        let target = self
            .map
            .as_ref()
            .and_then(|map| map.submap_containing(position, &lookup));
        if target == current {
            return Ok(false);
        }

        if let Some(map) = self.map.as_mut() {
            if let Some(old) = current.and_then(|k| map.submap_mut(k)) {
                old.remove_dynamic(key);
            }
            if let Some(new) = target.and_then(|k| map.submap_mut(k)) {
                new.add_dynamic(key);
            }
        }
        if let Some(object) = self.game_objects.get_mut(key) {
            object.current_submap = target;
        }

        crate::engine_trace!("galaxy3d::World", "{:?}: submap {:?} -> {:?}", key, current, target);
        Ok(true)
    }

    /// Advance one tick: integrate physics, re-index every GameObject, then
    /// rebuild dirty inside lists. Returns the number of membership changes.
    pub fn update(&mut self, dt: f32) -> usize {
        for object in self.game_objects.values_mut() {
            object.integrate(dt);
        }

        let keys: Vec<GameObjectKey> = self.game_objects.keys().collect();
        let changed = keys
            .into_iter()
            .filter(|&key| self.refresh_submap_membership(key).unwrap_or(false))
            .count();

        self.refresh_map();
        changed
    }

    /// SubMap to start a traversal from: the one containing `position`,
    /// else the nearest by centroid.
    pub fn locate(&self, position: Vec3) -> Option<SubMapKey> {
        self.map.as_ref()?.locate(position, &self.resolver())
    }
}

impl ObjectResolver for World {
    fn world_bounds(&self, object: MapObjectKey) -> Option<AABB> {
        self.resolver().world_bounds(object)
    }

    fn flags(&self, object: MapObjectKey) -> ObjectFlags {
        self.resolver().flags(object)
    }
}

fn clear_dynamic_lists(map: &mut Map) {
    let keys: Vec<SubMapKey> = map.submaps().map(|(key, _)| key).collect();
    for key in keys {
        if let Some(submap) = map.submap_mut(key) {
            submap.clear_dynamic();
        }
    }
}

#[cfg(test)]
#[path = "world_tests.rs"]
mod tests;
