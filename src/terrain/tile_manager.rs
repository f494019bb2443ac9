use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::sync::Arc;

use glam::Vec2;
use log::{debug, info, warn};

use crate::config::terrain_config::TerrainConfig;
use crate::error::{ConfigError, GenerationError};
use crate::terrain::color_banding::build_color_map;
use crate::terrain::eviction::{EvictionPolicy, LruEviction, NeverEvict};
use crate::terrain::falloff::{apply_falloff, generate_falloff_mask, FalloffMask};
use crate::terrain::height_field::{HeightField, TileData};
use crate::terrain::mesh_builder::build_terrain_mesh;
use crate::terrain::noise::field_generator::generate_height_field;
use crate::terrain::presentation::PresentationSink;
use crate::terrain::tile::{Tile, TileCoord, TileState};
use crate::threading::generation_pipeline::{Completion, GenerationPipeline};

/// Owns every live tile and drives the streaming loop.
///
/// All tile state lives here and is only ever mutated from the thread that
/// calls [`TileManager::update`]; background workers hand results back
/// through the pipeline's completion queue and never touch tiles directly.
pub struct TileManager {
    config: TerrainConfig,
    pipeline: GenerationPipeline,
    sink: Box<dyn PresentationSink>,
    eviction: Box<dyn EvictionPolicy>,
    tiles: HashMap<TileCoord, Tile>,
    /// Coordinates inside the current visible window, in scan order.
    window: Vec<TileCoord>,
    falloff: Option<Arc<FalloffMask>>,
    viewer: Vec2,
    /// Viewer position at the last visible-set recomputation.
    last_window_viewer: Option<Vec2>,
}

impl TileManager {
    pub fn new(config: TerrainConfig, sink: Box<dyn PresentationSink>) -> Result<TileManager, ConfigError> {
        config.validate()?;
        let eviction: Box<dyn EvictionPolicy> = match config.tile_cache_capacity {
            Some(capacity) => match NonZeroUsize::new(capacity) {
                Some(capacity) => Box::new(LruEviction::new(capacity)),
                None => Box::new(NeverEvict),
            },
            None => Box::new(NeverEvict),
        };
        let falloff = if config.use_falloff {
            Some(Arc::new(generate_falloff_mask(config.bordered_size())))
        } else {
            None
        };
        let pipeline = GenerationPipeline::new(config.max_threads);
        info!(
            "tile manager ready: {} LOD levels, tile edge {}, view distance {}, {} workers",
            config.lod_table.len(),
            config.tile_edge_length(),
            config.max_view_distance(),
            pipeline.num_threads(),
        );
        Ok(TileManager {
            config,
            pipeline,
            sink,
            eviction,
            tiles: HashMap::new(),
            window: Vec::new(),
            falloff,
            viewer: Vec2::ZERO,
            last_window_viewer: None,
        })
    }

    /// One streaming cycle: drain finished background work, recompute the
    /// visible window if the viewer moved far enough, then refresh every
    /// windowed tile's LOD. Call once per frame (or tick) from the owning
    /// thread.
    pub fn update(&mut self, viewer: Vec2) {
        self.viewer = viewer;
        self.drain_completions();

        let moved_enough = match self.last_window_viewer {
            None => true,
            Some(last) => {
                last.distance_squared(viewer)
                    > self.config.viewer_move_threshold * self.config.viewer_move_threshold
            }
        };
        if moved_enough {
            self.last_window_viewer = Some(viewer);
            self.update_visible_set();
        }

        // LOD selection runs every cycle even when the window did not move:
        // a tile near a threshold can change detail without the viewer
        // traveling the hysteresis distance.
        for coord in self.window.clone() {
            self.refresh_lod(coord);
        }
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &GenerationPipeline {
        &self.pipeline
    }

    pub fn tile(&self, coord: TileCoord) -> Option<&Tile> {
        self.tiles.get(&coord)
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn visible_tile_count(&self) -> usize {
        self.tiles.values().filter(|t| t.visible()).count()
    }

    /// Recompute the coordinate window around the viewer, creating missing
    /// tiles (and issuing their height-field requests) and hiding tiles that
    /// fell out.
    fn update_visible_set(&mut self) {
        let range = self.config.visible_range_in_tiles();
        let edge = self.config.tile_edge_length();
        let center_x = (self.viewer.x / edge).round() as i32;
        let center_y = (self.viewer.y / edge).round() as i32;

        let mut new_window = Vec::with_capacity(((2 * range + 1) * (2 * range + 1)) as usize);
        let mut victims = Vec::new();
        for y_offset in -range..=range {
            for x_offset in -range..=range {
                let coord = TileCoord::new(center_x + x_offset, center_y + y_offset);
                new_window.push(coord);
                self.ensure_tile(coord);
                if let Some(victim) = self.eviction.note_visible(coord) {
                    victims.push(victim);
                }
            }
        }

        let window_set: HashSet<TileCoord> = new_window.iter().copied().collect();
        for coord in std::mem::take(&mut self.window) {
            if window_set.contains(&coord) {
                continue;
            }
            if let Some(tile) = self.tiles.get_mut(&coord) {
                if tile.visible() {
                    tile.set_visible(false);
                    self.sink.set_visible(coord, false);
                }
            }
        }
        self.window = new_window;

        for victim in victims {
            self.try_evict(victim, &window_set);
        }

        debug!(
            "visible window recomputed around ({center_x}, {center_y}): {} coords, {} tiles live",
            self.window.len(),
            self.tiles.len()
        );
    }

    /// Create the tile if needed and make sure its height-field request is in
    /// flight. A tile left in `Empty` by an earlier failure gets retried
    /// here.
    fn ensure_tile(&mut self, coord: TileCoord) {
        let lod_count = self.config.lod_table.len();
        let tile = self
            .tiles
            .entry(coord)
            .or_insert_with(|| Tile::new(coord, lod_count));
        if tile.state() != TileState::Empty {
            return;
        }
        tile.mark_awaiting_data();
        self.request_height_field(coord);
    }

    fn request_height_field(&self, coord: TileCoord) {
        let bordered = self.config.bordered_size();
        let params = self.config.noise.clone();
        let regions = self.config.regions.clone();
        let comparison = self.config.band_comparison;
        let falloff = self.falloff.clone();
        let center = coord.world_center(self.config.tile_edge_length());

        self.pipeline.submit_height_field(coord, move || {
            if !params.scale.is_finite() || params.scale <= 0.0 {
                return Err(GenerationError::height_field(
                    coord,
                    format!("invalid noise scale {}", params.scale),
                ));
            }
            let mut samples =
                generate_height_field(bordered, bordered, &params, [center.x, center.y]);
            if let Some(mask) = &falloff {
                apply_falloff(&mut samples, mask);
            }
            let height_field = HeightField::from_samples(bordered, samples);
            let color_map = build_color_map(&height_field, &regions, comparison);
            Ok(TileData {
                height_field,
                color_map,
            })
        });
    }

    /// Pull every finished background result and apply it. Runs on the
    /// owning thread; no worker ever mutates tile state.
    fn drain_completions(&mut self) {
        let mut batch = Vec::new();
        self.pipeline.drain(|completion| batch.push(completion));
        for completion in batch {
            match completion {
                Completion::HeightField { coord, result } => match result {
                    Ok(data) => self.on_height_field_ready(coord, data),
                    Err(err) => {
                        warn!("height field generation failed: {err}");
                        if let Some(tile) = self.tiles.get_mut(&coord) {
                            tile.on_data_failed();
                        }
                    }
                },
                Completion::Mesh { coord, lod, result } => match result {
                    Ok(mesh) => self.on_mesh_ready(coord, lod, mesh),
                    Err(err) => {
                        warn!("mesh generation failed: {err}");
                        if let Some(index) = self.lod_index(lod) {
                            if let Some(tile) = self.tiles.get_mut(&coord) {
                                tile.on_mesh_failed(index);
                            }
                        }
                    }
                },
            }
        }
    }

    fn on_height_field_ready(&mut self, coord: TileCoord, data: TileData) {
        let tile = match self.tiles.get_mut(&coord) {
            Some(tile) => tile,
            None => {
                // Evicted while the request was in flight; nothing to attach
                // the result to.
                debug!("dropping stale height field for {:?}", coord);
                return;
            }
        };
        let data = Arc::new(data);
        self.sink.tile_colors(coord, &data.color_map);
        tile.on_data_ready(data);
        // The tile can start showing geometry right away.
        self.refresh_lod(coord);
    }

    fn on_mesh_ready(&mut self, coord: TileCoord, lod: u32, mesh: crate::terrain::mesh_builder::TerrainMesh) {
        let index = match self.lod_index(lod) {
            Some(index) => index,
            None => {
                warn!("mesh completion for unknown LOD {lod} at {:?}", coord);
                return;
            }
        };
        let tile = match self.tiles.get_mut(&coord) {
            Some(tile) => tile,
            None => {
                debug!("dropping stale mesh for {:?} lod {lod}", coord);
                return;
            }
        };
        // Stored unconditionally: a result for a LOD that is no longer
        // desired still goes into the cache, it just is not displayed.
        tile.store_mesh(index, Arc::new(mesh));
        self.refresh_lod(coord);
    }

    /// Re-select the LOD a tile should display for the current viewer
    /// position, requesting or swapping meshes as needed. Only meaningful
    /// once the tile's data arrived.
    fn refresh_lod(&mut self, coord: TileCoord) {
        let edge = self.config.tile_edge_length();
        let max_view = self.config.max_view_distance();
        let viewer = self.viewer;

        let tile = match self.tiles.get_mut(&coord) {
            Some(tile) => tile,
            None => return,
        };
        if tile.state() != TileState::Ready {
            return;
        }

        let sq_distance = tile.footprint_sq_distance(viewer, edge);
        if sq_distance > max_view * max_view {
            if tile.visible() {
                tile.set_visible(false);
                self.sink.set_visible(coord, false);
            }
            return;
        }

        // Smallest LOD index whose threshold contains the viewer; a distance
        // exactly on a threshold stays at the finer level.
        let mut desired = self.config.lod_table.len() - 1;
        for (index, level) in self.config.lod_table.iter().enumerate() {
            let threshold = level.visible_distance_threshold;
            if sq_distance <= threshold * threshold {
                desired = index;
                break;
            }
        }

        if tile.displayed_lod() != Some(desired) {
            if let Some(mesh) = tile.mesh(desired) {
                let mesh = Arc::clone(mesh);
                tile.set_displayed_lod(desired);
                self.sink
                    .display_mesh(coord, self.config.lod_table[desired].lod, &mesh);
            } else if !tile.mesh_requested(desired) {
                tile.mark_mesh_requested(desired);
                let lod = self.config.lod_table[desired].lod;
                let mesh_params = self.config.mesh_params();
                // Data is present in `Ready`; the Arc share keeps the worker
                // independent of tile state.
                if let Some(data) = tile.data().cloned() {
                    self.pipeline.submit_mesh(coord, lod, move || {
                        Ok(build_terrain_mesh(&data.height_field, &mesh_params, lod))
                    });
                }
            }
        }

        if !tile.visible() {
            tile.set_visible(true);
            self.sink.set_visible(coord, true);
        }
    }

    /// Index into the LOD table for a LOD level value.
    fn lod_index(&self, lod: u32) -> Option<usize> {
        self.config.lod_table.iter().position(|l| l.lod == lod)
    }

    /// Honor an eviction request if it is safe: never drop tiles in the
    /// current window, visible tiles, or tiles with work in flight (their
    /// completions would otherwise resurrect half a tile).
    fn try_evict(&mut self, coord: TileCoord, window: &HashSet<TileCoord>) {
        if window.contains(&coord) {
            return;
        }
        let safe = match self.tiles.get(&coord) {
            Some(tile) => {
                !tile.visible()
                    && tile.state() != TileState::AwaitingData
                    && !tile.any_mesh_in_flight()
            }
            None => false,
        };
        if safe {
            debug!("evicting tile {:?}", coord);
            self.tiles.remove(&coord);
            self.sink.tile_evicted(coord);
        }
    }
}
