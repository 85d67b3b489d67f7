/// Tests for Map
///
/// These tests validate SubMap lifecycle, portal linking, inside-list
/// refresh and the containment / nearest-centroid queries.

use super::*;
use crate::bounds::AABB;
use crate::map::submap::SubMapObjectKey;
use crate::world::{ObjectFlags, TextureKey};
use rustc_hash::FxHashMap;

// ============================================================================
// Helper Functions
// ============================================================================

#[derive(Default)]
struct TableResolver {
    keys: SlotMap<MapObjectKey, ()>,
    bounds: FxHashMap<MapObjectKey, AABB>,
    flags: FxHashMap<MapObjectKey, ObjectFlags>,
}

impl TableResolver {
    fn add(&mut self, center: Vec3, half: f32, flags: ObjectFlags) -> MapObjectKey {
        let key = self.keys.insert(());
        self.bounds.insert(key, AABB::from_center_half_extents(center, Vec3::splat(half)));
        self.flags.insert(key, flags);
        key
    }
}

impl ObjectResolver for TableResolver {
    fn world_bounds(&self, object: MapObjectKey) -> Option<AABB> {
        self.bounds.get(&object).copied()
    }

    fn flags(&self, object: MapObjectKey) -> ObjectFlags {
        self.flags.get(&object).copied().unwrap_or_default()
    }
}

fn door(z: f32) -> Portal {
    Portal::from_corners(
        [
            Vec3::new(-1.0, -1.0, z),
            Vec3::new(1.0, -1.0, z),
            Vec3::new(1.0, 1.0, z),
            Vec3::new(-1.0, 1.0, z),
        ],
        PortalKind::Normal { link: None },
    )
}

/// A submap whose only object is a cube of half size 5 centred on `center`
fn room(resolver: &mut TableResolver, name: &str, center: Vec3) -> (SubMap, SubMapObjectKey) {
    let mut submap = SubMap::new(name);
    let key = submap.add_map_object(resolver.add(center, 5.0, ObjectFlags::empty()));
    (submap, key)
}

// ============================================================================
// SubMap Lifecycle Tests
// ============================================================================

#[test]
fn test_submaps_in_authoring_order() {
    let mut map = Map::new("level");
    let a = map.add_submap(SubMap::new("a"));
    let b = map.add_submap(SubMap::new("b"));
    let c = map.add_submap(SubMap::new("c"));

    let order: Vec<SubMapKey> = map.submaps().map(|(key, _)| key).collect();
    assert_eq!(order, vec![a, b, c]);

    map.remove_submap(b);
    let names: Vec<&str> = map.submaps().map(|(_, s)| s.name()).collect();
    assert_eq!(names, vec!["a", "c"]);
    assert_eq!(map.submap_count(), 2);
}

#[test]
fn test_edit_dead_submap_fails() {
    let mut map = Map::new("level");
    let a = map.add_submap(SubMap::new("a"));
    assert!(map.edit(a).is_ok());

    map.remove_submap(a);
    assert!(matches!(map.edit(a), Err(Error::InvalidHandle(_))));
    assert!(map.add_portal(a, door(0.0)).is_err());
    assert!(map.is_empty());
}

// ============================================================================
// Portal Linking Tests
// ============================================================================

#[test]
fn test_link_portals_both_ways() {
    let mut map = Map::new("level");
    let a = map.add_submap(SubMap::new("a"));
    let b = map.add_submap(SubMap::new("b"));
    let pa = map.add_portal(a, door(-5.0)).unwrap();
    let pb = map.add_portal(b, door(-5.0)).unwrap();

    map.link_portals(pa, pb).unwrap();

    assert_eq!(map.portal(pa).unwrap().link(), Some(pb));
    assert_eq!(map.portal(pb).unwrap().link(), Some(pa));
}

#[test]
fn test_link_mirror_fails() {
    let mut textures: SlotMap<TextureKey, ()> = SlotMap::with_key();
    let mut map = Map::new("level");
    let a = map.add_submap(SubMap::new("a"));
    let pa = map.add_portal(a, door(-5.0)).unwrap();
    let mirror = map
        .add_portal(a, Portal::from_corners(*door(-8.0).corners(), PortalKind::Mirror { texture: textures.insert(()) }))
        .unwrap();

    assert!(matches!(map.link_portals(pa, mirror), Err(Error::InvalidState(_))));
    assert_eq!(map.portal(pa).unwrap().link(), None);
}

#[test]
fn test_remove_submap_unlinks_incoming_portals() {
    let mut map = Map::new("level");
    let a = map.add_submap(SubMap::new("a"));
    let b = map.add_submap(SubMap::new("b"));
    let pa = map.add_portal(a, door(-5.0)).unwrap();
    let pb = map.add_portal(b, door(-5.0)).unwrap();
    map.link_portals(pa, pb).unwrap();

    assert!(map.remove_submap(b).is_some());
    assert!(map.remove_submap(b).is_none());

    assert_eq!(map.portal(pa).unwrap().link(), None);
    assert!(map.portal(pb).is_none());
}

// ============================================================================
// Maintenance Tests
// ============================================================================

#[test]
fn test_refresh_rebuilds_only_dirty_lists() {
    let mut resolver = TableResolver::default();
    let mut map = Map::new("level");
    let (hall, _) = room(&mut resolver, "hall", Vec3::ZERO);
    let (cellar, _) = room(&mut resolver, "cellar", Vec3::new(20.0, 0.0, 0.0));
    let hall = map.add_submap(hall);
    map.add_submap(cellar);

    assert_eq!(map.refresh(&resolver), 2);
    assert_eq!(map.refresh(&resolver), 0);

    let crate_key = resolver.add(Vec3::ZERO, 1.0, ObjectFlags::empty());
    map.edit(hall).unwrap().add_map_object(crate_key);
    assert_eq!(map.refresh(&resolver), 1);

    // Hall holds a 5-cube and a 1-cube, but the big one is no container
    assert!(map.submap(hall).unwrap().inside_list().is_empty());
}

#[test]
fn test_invalidate_and_purge_object() {
    let mut resolver = TableResolver::default();
    let mut map = Map::new("level");
    let shared = resolver.add(Vec3::ZERO, 1.0, ObjectFlags::empty());

    let mut a = SubMap::new("a");
    a.add_map_object(shared);
    let mut b = SubMap::new("b");
    b.add_map_object(resolver.add(Vec3::X, 1.0, ObjectFlags::empty()));
    let a = map.add_submap(a);
    let b = map.add_submap(b);
    map.refresh(&resolver);

    map.invalidate_object(shared);
    assert!(map.submap(a).unwrap().inside_list_dirty());
    assert!(!map.submap(b).unwrap().inside_list_dirty());

    assert_eq!(map.purge_object_refs(shared), 1);
    assert_eq!(map.submap(a).unwrap().object_count(), 0);
    assert_eq!(map.submap(b).unwrap().object_count(), 1);
}

// ============================================================================
// Containment Tests
// ============================================================================

#[test]
fn test_submap_containing_disjoint_volumes() {
    let mut resolver = TableResolver::default();
    let mut map = Map::new("level");
    let centers = [Vec3::new(0.0, 0.0, 0.0), Vec3::new(20.0, 0.0, 0.0), Vec3::new(40.0, 0.0, 0.0)];
    let keys: Vec<SubMapKey> = centers
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let (submap, _) = room(&mut resolver, &format!("room{}", i), c);
            map.add_submap(submap)
        })
        .collect();

    for (k, &center) in centers.iter().enumerate() {
        let point = center + Vec3::new(1.0, -2.0, 3.0);
        assert_eq!(map.submap_containing(point, &resolver), Some(keys[k]));
    }
}

#[test]
fn test_outside_all_volumes_falls_back_to_nearest() {
    let mut resolver = TableResolver::default();
    let mut map = Map::new("level");
    let (r0, _) = room(&mut resolver, "r0", Vec3::new(0.0, 0.0, 0.0));
    let (r1, _) = room(&mut resolver, "r1", Vec3::new(20.0, 0.0, 0.0));
    let (r2, _) = room(&mut resolver, "r2", Vec3::new(40.0, 0.0, 0.0));
    map.add_submap(r0);
    map.add_submap(r1);
    let r2 = map.add_submap(r2);

    let point = Vec3::new(38.0, 30.0, 0.0);
    assert_eq!(map.submap_containing(point, &resolver), None);
    assert_eq!(map.nearest_submap(point, &resolver), Some(r2));
    assert_eq!(map.locate(point, &resolver), Some(r2));
}

#[test]
fn test_nearest_submap_skips_empty_submaps() {
    let mut resolver = TableResolver::default();
    let mut map = Map::new("level");
    map.add_submap(SubMap::new("empty"));
    let (r1, _) = room(&mut resolver, "r1", Vec3::new(100.0, 0.0, 0.0));
    let r1 = map.add_submap(r1);

    assert_eq!(map.nearest_submap(Vec3::ZERO, &resolver), Some(r1));
}

#[test]
fn test_empty_map_locates_nothing() {
    let resolver = TableResolver::default();
    let map = Map::new("void");
    assert_eq!(map.submap_containing(Vec3::ZERO, &resolver), None);
    assert_eq!(map.nearest_submap(Vec3::ZERO, &resolver), None);
}
