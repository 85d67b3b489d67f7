//! Object store: placed MapObjects, mobile GameObjects, assets and the
//! World that owns them.

mod assets;
mod game_object;
mod map_object;
mod physics;
mod world;

pub use assets::{AssetRegistry, MeshInfo, MeshKey, TextureInfo, TextureKey};
pub use game_object::{GameObject, GameObjectKey};
pub use map_object::{MapObject, MapObjectKey, ObjectFlags};
pub use physics::{LinearMotion, Physics, Shading, TintShading};
pub use world::{ObjectLookup, World};
