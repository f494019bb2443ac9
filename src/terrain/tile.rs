use std::sync::Arc;

use glam::Vec2;

use crate::terrain::height_field::TileData;
use crate::terrain::mesh_builder::TerrainMesh;

/// Integer grid coordinate identifying a tile. The world-space footprint is
/// the coordinate scaled by the tile edge length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub fn new(x: i32, y: i32) -> TileCoord {
        TileCoord { x, y }
    }

    /// Center of this tile's footprint in world space.
    pub fn world_center(self, tile_edge: f32) -> Vec2 {
        Vec2::new(self.x as f32 * tile_edge, self.y as f32 * tile_edge)
    }
}

/// Lifecycle of a tile's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileState {
    /// Created, no height-field request issued (or the last one failed).
    Empty,
    /// Height-field generation in flight.
    AwaitingData,
    /// Data arrived; meshes can be requested per LOD.
    Ready,
}

// Per-LOD mesh slot. `requested` latches while a build is in flight so a LOD
// is never submitted twice concurrently.
#[derive(Default)]
struct LodSlot {
    mesh: Option<Arc<TerrainMesh>>,
    requested: bool,
}

/// Per-coordinate terrain tile. Created the first time its coordinate enters
/// the visible window and kept for the lifetime of the manager (unless an
/// eviction policy removes it); leaving the window only hides it.
pub struct Tile {
    coord: TileCoord,
    state: TileState,
    data: Option<Arc<TileData>>,
    slots: Vec<LodSlot>,
    displayed_lod: Option<usize>,
    visible: bool,
}

impl Tile {
    pub fn new(coord: TileCoord, lod_count: usize) -> Tile {
        let mut slots = Vec::with_capacity(lod_count);
        slots.resize_with(lod_count, LodSlot::default);
        Tile {
            coord,
            state: TileState::Empty,
            data: None,
            slots,
            displayed_lod: None,
            visible: false,
        }
    }

    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    pub fn state(&self) -> TileState {
        self.state
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Index into the LOD table of the currently displayed mesh, if any.
    pub fn displayed_lod(&self) -> Option<usize> {
        self.displayed_lod
    }

    pub fn data(&self) -> Option<&Arc<TileData>> {
        self.data.as_ref()
    }

    pub fn mesh(&self, lod_index: usize) -> Option<&Arc<TerrainMesh>> {
        self.slots.get(lod_index).and_then(|s| s.mesh.as_ref())
    }

    pub fn mesh_built(&self, lod_index: usize) -> bool {
        self.mesh(lod_index).is_some()
    }

    pub fn mesh_requested(&self, lod_index: usize) -> bool {
        self.slots.get(lod_index).map(|s| s.requested).unwrap_or(false)
    }

    /// Does any LOD of this tile have a build in flight?
    pub fn any_mesh_in_flight(&self) -> bool {
        self.slots.iter().any(|s| s.requested)
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub(crate) fn mark_awaiting_data(&mut self) {
        self.state = TileState::AwaitingData;
    }

    pub(crate) fn on_data_ready(&mut self, data: Arc<TileData>) {
        self.data = Some(data);
        self.state = TileState::Ready;
    }

    /// Height-field generation failed: fall back to `Empty` so the next
    /// visible-set pass can retry.
    pub(crate) fn on_data_failed(&mut self) {
        self.state = TileState::Empty;
    }

    pub(crate) fn mark_mesh_requested(&mut self, lod_index: usize) {
        if let Some(slot) = self.slots.get_mut(lod_index) {
            slot.requested = true;
        }
    }

    pub(crate) fn store_mesh(&mut self, lod_index: usize, mesh: Arc<TerrainMesh>) {
        if let Some(slot) = self.slots.get_mut(lod_index) {
            slot.mesh = Some(mesh);
            slot.requested = false;
        }
    }

    pub(crate) fn on_mesh_failed(&mut self, lod_index: usize) {
        if let Some(slot) = self.slots.get_mut(lod_index) {
            slot.requested = false;
        }
    }

    pub(crate) fn set_displayed_lod(&mut self, lod_index: usize) {
        self.displayed_lod = Some(lod_index);
    }

    /// Squared distance from the viewer to this tile's square footprint
    /// (zero when the viewer stands on the tile).
    pub fn footprint_sq_distance(&self, viewer: Vec2, tile_edge: f32) -> f32 {
        let center = self.coord.world_center(tile_edge);
        let half = tile_edge / 2.0;
        let dx = ((viewer.x - center.x).abs() - half).max(0.0);
        let dy = ((viewer.y - center.y).abs() - half).max(0.0);
        dx * dx + dy * dy
    }
}
