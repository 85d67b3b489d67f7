/// WorldRender - one resolved visibility result.
///
/// `build` walks the SubMap graph from the viewer's SubMap through Normal
/// portals, narrowing the frustum to each portal opening, and collects
/// flat lists of visible static objects, dynamic objects, portals and
/// lights. Mirror portals are then rendered by independent child
/// WorldRenders into their textures. `draw` consumes the flat lists.
///
/// A WorldRender is reusable: every `build` starts from empty lists and
/// an empty visited set.

use rustc_hash::{FxHashMap, FxHashSet};
use crate::camera::{Camera, SphereTest};
use crate::config::RenderConfig;
use crate::error::{Error, Result};
use crate::map::{Classification, Light, Map, PortalId, PortalKind, SubMapKey, SubMapObjectKey};
use crate::world::{GameObjectKey, TextureKey, World};
use super::backend::{DrawFlags, DrawRequest, DrawResult, DrawSource, RenderBackend, ViewFlags, ViewSetup};

/// Arrival mask used for the start SubMap: blocks any later arrival
const ALL_BITS: u64 = u64::MAX;

// ===== VISIBLE-LIST TAGS =====

/// Visible static object: an object reference of a SubMap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectTag {
    pub submap: SubMapKey,
    pub object: SubMapObjectKey,
}

/// Visible dynamic object. `submap` is `None` for the no-map fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameObjectTag {
    pub submap: Option<SubMapKey>,
    pub object: GameObjectKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Idle,
    Traversing,
    MirrorResolution,
    Ready,
}

/// Counters of the last build (this level only, not mirror children)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalStats {
    pub submaps_visited: u32,
    /// Arrivals rejected by the visited set
    pub revisits_skipped: u32,
    pub sphere_tests: u32,
    /// Normal portals whose partner does not resolve
    pub links_skipped: u32,
    pub mirrors_rendered: u32,
    pub mirrors_depth_limited: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorOutcome {
    /// Child pass built, drawn and captured
    Rendered,
    /// Depth limit reached, texture filled with a placeholder
    Placeholder,
}

/// One mirror portal resolved during `build`
#[derive(Debug)]
pub struct MirrorPass {
    pub portal: PortalId,
    pub texture: TextureKey,
    pub outcome: MirrorOutcome,
    /// The child pass, kept for inspection
    pub child: Option<Box<WorldRender>>,
}

/// Counters of one `draw`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawSummary {
    pub drawn: u32,
    /// Culled or not visible according to the backend
    pub rejected: u32,
    pub errors: u32,
    /// Tags that no longer resolve
    pub unresolved: u32,
    pub cancelled: bool,
    pub portals_outlined: u32,
}

#[derive(Debug)]
pub struct WorldRender {
    config: RenderConfig,
    /// 0 for the main pass, +1 per mirror level
    depth: u32,
    /// Mirror this pass renders for; never resolved again inside it
    base_portal: Option<PortalId>,
    state: BuildState,
    camera: Option<Camera>,
    start_submap: Option<SubMapKey>,
    /// Arrival bits already processed, per SubMap
    visited: FxHashMap<SubMapKey, u64>,
    visible_objects: Vec<ObjectTag>,
    visible_dynamic: Vec<GameObjectTag>,
    visible_portals: Vec<PortalId>,
    visible_lights: Vec<Light>,
    seen_objects: FxHashSet<ObjectTag>,
    seen_dynamic: FxHashSet<GameObjectKey>,
    seen_portals: FxHashSet<PortalId>,
    seen_lights: FxHashSet<(SubMapKey, usize)>,
    mirrors: Vec<MirrorPass>,
    stats: TraversalStats,
}

impl WorldRender {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            depth: 0,
            base_portal: None,
            state: BuildState::Idle,
            camera: None,
            start_submap: None,
            visited: FxHashMap::default(),
            visible_objects: Vec::new(),
            visible_dynamic: Vec::new(),
            visible_portals: Vec::new(),
            visible_lights: Vec::new(),
            seen_objects: FxHashSet::default(),
            seen_dynamic: FxHashSet::default(),
            seen_portals: FxHashSet::default(),
            seen_lights: FxHashSet::default(),
            mirrors: Vec::new(),
            stats: TraversalStats::default(),
        }
    }

    /// Child pass rendering the mirror `portal`
    fn for_mirror(config: RenderConfig, portal: PortalId, depth: u32) -> Self {
        Self {
            depth,
            base_portal: Some(portal),
            ..Self::new(config)
        }
    }

    // ===== ACCESSORS =====

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn base_portal(&self) -> Option<PortalId> {
        self.base_portal
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    /// Camera of the last build
    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    /// SubMap the last build started from, `None` for the flat fallback
    pub fn start_submap(&self) -> Option<SubMapKey> {
        self.start_submap
    }

    pub fn visible_objects(&self) -> &[ObjectTag] {
        &self.visible_objects
    }

    pub fn visible_dynamic_objects(&self) -> &[GameObjectTag] {
        &self.visible_dynamic
    }

    pub fn visible_portals(&self) -> &[PortalId] {
        &self.visible_portals
    }

    pub fn visible_lights(&self) -> &[Light] {
        &self.visible_lights
    }

    /// Arrival bits recorded for `submap` during the last build
    pub fn visited_bits(&self, submap: SubMapKey) -> u64 {
        self.visited.get(&submap).copied().unwrap_or(0)
    }

    pub fn mirror_passes(&self) -> &[MirrorPass] {
        &self.mirrors
    }

    pub fn stats(&self) -> &TraversalStats {
        &self.stats
    }

    // ===== BUILD =====

    fn reset(&mut self) {
        self.state = BuildState::Idle;
        self.camera = None;
        self.start_submap = None;
        self.visited.clear();
        self.visible_objects.clear();
        self.visible_dynamic.clear();
        self.visible_portals.clear();
        self.visible_lights.clear();
        self.seen_objects.clear();
        self.seen_dynamic.clear();
        self.seen_portals.clear();
        self.seen_lights.clear();
        self.mirrors.clear();
        self.stats = TraversalStats::default();
    }

    /// Resolve visibility for `camera`.
    ///
    /// The World must be up to date (`World::update` or
    /// `World::refresh_map` after level edits). Mirror portals are drawn
    /// and captured through `backend` before this returns.
    pub fn build(&mut self, world: &World, camera: &Camera, backend: &mut dyn RenderBackend) -> Result<()> {
        self.reset();
        self.state = BuildState::Traversing;

        let mut camera = camera.clone();
        camera.compute_frustum_planes();

        let start = world.locate(camera.position());
        let (Some(map), Some(start)) = (world.map(), start) else {
            self.cull_loose_objects(world, &camera);
            crate::engine_trace!("galaxy3d::WorldRender",
                "No start submap (depth {}), {} loose objects visible", self.depth, self.visible_dynamic.len());
            self.camera = Some(camera);
            self.state = BuildState::Ready;
            return Ok(());
        };

        self.start_submap = Some(start);
        self.traverse_from(world, map, start, ALL_BITS, &camera);
        self.camera = Some(camera);

        self.state = BuildState::MirrorResolution;
        self.resolve_mirrors(world, map, backend)?;

        crate::engine_trace!("galaxy3d::WorldRender",
            "Build depth {}: {} submaps, {} objects, {} dynamic, {} portals",
            self.depth, self.stats.submaps_visited, self.visible_objects.len(),
            self.visible_dynamic.len(), self.visible_portals.len());
        self.state = BuildState::Ready;
        Ok(())
    }

    /// Flat visibility: test GameObjects that no SubMap indexes against
    /// the camera's own planes.
    fn cull_loose_objects(&mut self, world: &World, camera: &Camera) {
        let frustum = camera.frustum();
        for (key, object) in world.loose_game_objects() {
            let Some(bounds) = object.world_bounds(world.assets()) else {
                crate::engine_warn!("galaxy3d::WorldRender", "Game object {:?} has no bounds", key);
                continue;
            };
            self.stats.sphere_tests += 1;
            if frustum.test_bounding_sphere(&bounds.bounding_sphere()) == SphereTest::Inside {
                self.push_dynamic(GameObjectTag { submap: None, object: key });
            }
        }
    }

    /// Visit `submap_key` arriving through the portals in `arrival_bits`.
    fn traverse_from(
        &mut self,
        world: &World,
        map: &Map,
        submap_key: SubMapKey,
        arrival_bits: u64,
        camera: &Camera,
    ) {
        let visited = self.visited.entry(submap_key).or_insert(0);
        if *visited & arrival_bits != 0 {
            self.stats.revisits_skipped += 1;
            return;
        }
        *visited |= arrival_bits;

        let Some(submap) = map.submap(submap_key) else {
            crate::engine_warn!("galaxy3d::WorldRender", "Submap {:?} does not resolve", submap_key);
            return;
        };
        self.stats.submaps_visited += 1;

        // Static objects
        let resolver = world.resolver();
        let results = submap.classify_objects(camera, &resolver);
        for (object, state) in submap.objects().filter_map(|(key, _)| results.get(key).map(|s| (key, *s))) {
            match state {
                Classification::Draw => {
                    self.stats.sphere_tests += 1;
                    self.push_object(ObjectTag { submap: submap_key, object });
                }
                Classification::Culled => self.stats.sphere_tests += 1,
                Classification::NoObject => {
                    crate::engine_warn!("galaxy3d::WorldRender",
                        "Object {:?} of submap '{}' does not resolve", object, submap.name());
                }
                _ => {}
            }
        }

        // Dynamic objects, no inside-list shortcut
        let frustum = camera.frustum();
        for &key in submap.dynamic_objects() {
            let Some(bounds) = world.game_object(key).and_then(|o| o.world_bounds(world.assets())) else {
                crate::engine_warn!("galaxy3d::WorldRender", "Game object {:?} does not resolve", key);
                continue;
            };
            self.stats.sphere_tests += 1;
            if frustum.test_bounding_sphere(&bounds.bounding_sphere()) == SphereTest::Inside {
                self.push_dynamic(GameObjectTag { submap: Some(submap_key), object: key });
            }
        }

        for (index, light) in submap.lights().iter().enumerate() {
            let reaches = !self.config.cull_lights
                || frustum.test_sphere(light.position, light.radius) == SphereTest::Inside;
            if reaches && self.seen_lights.insert((submap_key, index)) {
                self.visible_lights.push(*light);
            }
        }

        let portals = submap.visible_portals(camera);
        for &portal_key in &portals {
            let id = PortalId::new(submap_key, portal_key);
            if self.seen_portals.insert(id) {
                self.visible_portals.push(id);
            }
        }

        // Recurse through Normal portals only; mirrors wait for resolve_mirrors
        for portal_key in portals {
            let Some(portal) = submap.portal(portal_key) else {
                continue;
            };
            let link = match portal.kind() {
                PortalKind::Normal { link: Some(link) } => *link,
                PortalKind::Normal { link: None } | PortalKind::Mirror { .. } => continue,
            };
            let Some(partner) = map.portal(link) else {
                crate::engine_warn!("galaxy3d::WorldRender",
                    "Portal {:?} links to {:?}, which does not resolve", portal_key, link);
                self.stats.links_skipped += 1;
                continue;
            };
            let Some(mask) = partner.arrival_mask() else {
                debug_assert!(false, "arrival bit {} out of range", partner.arrival_bit());
                continue;
            };

            let child_camera = portal.make_viewing_camera(camera, world.assets());
            self.traverse_from(world, map, link.submap, mask, &child_camera);
        }
    }

    fn push_object(&mut self, tag: ObjectTag) {
        if self.seen_objects.insert(tag) {
            self.visible_objects.push(tag);
        }
    }

    fn push_dynamic(&mut self, tag: GameObjectTag) {
        if self.seen_dynamic.insert(tag.object) {
            self.visible_dynamic.push(tag);
        }
    }

    /// Render every collected mirror (except this pass's own) into its
    /// texture with an independent child pass.
    fn resolve_mirrors(&mut self, world: &World, map: &Map, backend: &mut dyn RenderBackend) -> Result<()> {
        let Some(camera) = self.camera.as_ref() else {
            return Ok(());
        };

        let pending: Vec<(PortalId, TextureKey, Camera)> = self
            .visible_portals
            .iter()
            .filter(|&&id| Some(id) != self.base_portal)
            .filter_map(|&id| {
                let portal = map.portal(id)?;
                match *portal.kind() {
                    PortalKind::Mirror { texture } => {
                        Some((id, texture, portal.make_viewing_camera(camera, world.assets())))
                    }
                    PortalKind::Normal { .. } => None,
                }
            })
            .collect();

        for (portal, texture, mirror_camera) in pending {
            if self.depth >= self.config.max_mirror_depth {
                crate::engine_debug!("galaxy3d::WorldRender",
                    "Mirror {:?} past depth {}, placeholder", portal, self.config.max_mirror_depth);
                backend.fill_placeholder(texture)?;
                self.stats.mirrors_depth_limited += 1;
                self.mirrors.push(MirrorPass { portal, texture, outcome: MirrorOutcome::Placeholder, child: None });
                continue;
            }

            let mut child = WorldRender::for_mirror(self.config.clone(), portal, self.depth + 1);
            child.build(world, &mirror_camera, backend)?;
            child.draw(world, backend)?;
            backend.capture_into(&mirror_camera, texture)?;

            self.stats.mirrors_rendered += 1;
            self.mirrors.push(MirrorPass {
                portal,
                texture,
                outcome: MirrorOutcome::Rendered,
                child: Some(Box::new(child)),
            });
        }
        Ok(())
    }

    // ===== DRAW =====

    /// Issue the draw calls for the last build.
    ///
    /// Static objects are drawn first, then dynamic objects, each once and
    /// flagged `ALREADY_CULLED`. A `Cancelled` result stops the pass.
    pub fn draw(&self, world: &World, backend: &mut dyn RenderBackend) -> Result<DrawSummary> {
        let camera = match (self.state, self.camera.as_ref()) {
            (BuildState::Ready, Some(camera)) => camera,
            (state, _) => {
                return Err(Error::InvalidState(format!("draw() requires a completed build, state is {:?}", state)));
            }
        };

        let mut flags = self.config.view_flags();
        if self.depth > 0 {
            flags.insert(ViewFlags::OFFSCREEN);
        }
        backend.begin_view(&ViewSetup {
            camera,
            flags,
            clear_color: self.config.clear_color,
            lights: &self.visible_lights,
        })?;

        let mut summary = DrawSummary::default();
        let requests = self.static_requests(world).chain(self.dynamic_requests(world));
        for request in requests {
            let Some(request) = request else {
                summary.unresolved += 1;
                continue;
            };
            match backend.draw_object(&request) {
                DrawResult::Drawn => summary.drawn += 1,
                DrawResult::Culled | DrawResult::NotVisible => summary.rejected += 1,
                DrawResult::Error => {
                    crate::engine_warn!("galaxy3d::WorldRender", "Draw failed for {:?}", request.source);
                    summary.errors += 1;
                }
                DrawResult::Cancelled => {
                    summary.cancelled = true;
                    break;
                }
            }
        }

        if flags.contains(ViewFlags::DEBUG_PORTALS) && !summary.cancelled {
            if let Some(map) = world.map() {
                for portal in self.visible_portals.iter().filter_map(|&id| map.portal(id)) {
                    backend.draw_portal_outline(portal.corners(), portal.is_mirror());
                    summary.portals_outlined += 1;
                }
            }
        }

        backend.end_view()?;
        Ok(summary)
    }

    /// Draw requests for the static list, `None` where a tag no longer
    /// resolves
    fn static_requests<'a>(&'a self, world: &'a World) -> impl Iterator<Item = Option<DrawRequest<'a>>> + 'a {
        self.visible_objects.iter().map(move |&tag| {
            let object = world
                .map()?
                .submap(tag.submap)?
                .object(tag.object)
                .and_then(|key| world.map_object(key))?;
            Some(DrawRequest {
                source: DrawSource::Static(tag),
                mesh: object.mesh,
                texture: object.texture,
                world_matrix: object.world_matrix(),
                colour: object.colour,
                shader: None,
                flags: DrawFlags::ALREADY_CULLED,
            })
        })
    }

    fn dynamic_requests<'a>(&'a self, world: &'a World) -> impl Iterator<Item = Option<DrawRequest<'a>>> + 'a {
        self.visible_dynamic.iter().map(move |&tag| {
            let object = world.game_object(tag.object)?;
            Some(DrawRequest {
                source: DrawSource::Dynamic(tag),
                mesh: object.mesh,
                texture: object.texture,
                world_matrix: object.world_matrix(),
                colour: object.shaded_colour(),
                shader: object.shading.as_ref().map(|shading| shading.shader_name()),
                flags: DrawFlags::ALREADY_CULLED | DrawFlags::DYNAMIC,
            })
        })
    }
}

#[cfg(test)]
#[path = "world_render_tests.rs"]
mod tests;
