use crate::terrain::height_field::ColorMap;
use crate::terrain::mesh_builder::TerrainMesh;
use crate::terrain::tile::TileCoord;

/// Where finished tiles go. The core never draws; whatever renders the
/// terrain implements this and receives geometry, colors, and visibility
/// toggles. All calls happen on the consumer thread that drives the manager.
pub trait PresentationSink {
    /// A tile's banded color data is ready (arrives once, with the height
    /// field, before any mesh).
    fn tile_colors(&mut self, coord: TileCoord, colors: &ColorMap);

    /// Swap the displayed geometry of a tile. `lod` is the LOD level value
    /// from the configuration table.
    fn display_mesh(&mut self, coord: TileCoord, lod: u32, mesh: &TerrainMesh);

    /// Show or hide a tile without touching its cached data.
    fn set_visible(&mut self, coord: TileCoord, visible: bool);

    /// A tile left the cache entirely (eviction); drop any resources held
    /// for it. Default: nothing to do.
    fn tile_evicted(&mut self, _coord: TileCoord) {}
}

/// Sink that discards everything. Useful headless and in tests.
pub struct NullSink;

impl PresentationSink for NullSink {
    fn tile_colors(&mut self, _coord: TileCoord, _colors: &ColorMap) {}
    fn display_mesh(&mut self, _coord: TileCoord, _lod: u32, _mesh: &TerrainMesh) {}
    fn set_visible(&mut self, _coord: TileCoord, _visible: bool) {}
}
