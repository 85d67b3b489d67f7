/// Object resolution contract between the map graph and the object store.
///
/// A SubMap only holds `MapObjectKey` references. Whenever the map needs a
/// volume (classification, containment, inside-list generation) it asks a
/// resolver, which may answer `None` for a dead or incomplete object. The
/// World provides the production resolver; tests substitute their own.

use crate::bounds::AABB;
use crate::world::{MapObjectKey, ObjectFlags};

pub trait ObjectResolver {
    /// World-space bounds of a placed object, `None` if it cannot be resolved.
    fn world_bounds(&self, object: MapObjectKey) -> Option<AABB>;

    /// Placement flags of the object (empty if it cannot be resolved).
    fn flags(&self, object: MapObjectKey) -> ObjectFlags;
}
