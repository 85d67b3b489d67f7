//! Static level graph: Map, SubMaps, portals, lights and the
//! object-inside-object hints.

mod inside_list;
mod light;
mod map;
mod portal;
mod resolver;
mod submap;

pub use inside_list::{InsidePair, ObjectInsideList};
pub use light::Light;
pub use map::{Map, SubMapKey};
pub use portal::{Portal, PortalId, PortalKey, PortalKind};
pub use resolver::ObjectResolver;
pub use submap::{Classification, SubMap, SubMapObjectKey, MAX_PORTALS_PER_SUBMAP};
