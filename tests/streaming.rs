// End-to-end streaming through the public API: a viewer appears, tiles get
// generated on background workers, meshes arrive and are displayed through
// the sink, and walking away hides them without destroying their data.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use glam::Vec2;
use terrastream::{
    ColorMap, LodLevel, NoiseParameters, PresentationSink, TerrainConfig, TerrainMesh, TileCoord,
    TileManager, TileState,
};

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Colors(TileCoord),
    Mesh(TileCoord, u32, usize),
    Visible(TileCoord, bool),
}

#[derive(Default)]
struct RecordingSink {
    events: Arc<Mutex<Vec<Event>>>,
}

impl PresentationSink for RecordingSink {
    fn tile_colors(&mut self, coord: TileCoord, colors: &ColorMap) {
        assert_eq!(colors.size() * colors.size(), colors.pixels().len());
        self.events.lock().unwrap().push(Event::Colors(coord));
    }

    fn display_mesh(&mut self, coord: TileCoord, lod: u32, mesh: &TerrainMesh) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Mesh(coord, lod, mesh.vertex_count()));
    }

    fn set_visible(&mut self, coord: TileCoord, visible: bool) {
        self.events.lock().unwrap().push(Event::Visible(coord, visible));
    }
}

fn small_config() -> TerrainConfig {
    TerrainConfig {
        // 13 usable samples -> bordered 15, tile edge 12.
        samples_per_edge: 13,
        lod_table: vec![
            LodLevel { lod: 0, visible_distance_threshold: 20.0 },
            LodLevel { lod: 1, visible_distance_threshold: 40.0 },
        ],
        viewer_move_threshold: 5.0,
        noise: NoiseParameters {
            seed: 1234,
            scale: 20.0,
            ..NoiseParameters::default()
        },
        max_threads: 2,
        ..TerrainConfig::default()
    }
}

fn pump_until(manager: &mut TileManager, viewer: Vec2, mut done: impl FnMut(&TileManager) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(15);
    loop {
        manager.update(viewer);
        if done(manager) {
            return;
        }
        assert!(Instant::now() < deadline, "timed out pumping the manager");
        std::thread::sleep(Duration::from_millis(2));
    }
}

#[test]
fn tiles_stream_in_and_display() {
    let _ = env_logger::builder().is_test(true).try_init();

    let sink = RecordingSink::default();
    let events = Arc::clone(&sink.events);
    let mut manager = TileManager::new(small_config(), Box::new(sink)).expect("config is valid");

    let origin = TileCoord::new(0, 0);
    pump_until(&mut manager, Vec2::ZERO, |m| {
        m.tile(origin).map(|t| t.displayed_lod().is_some()).unwrap_or(false)
    });

    let tile = manager.tile(origin).expect("origin tile exists");
    assert_eq!(tile.state(), TileState::Ready);
    assert!(tile.visible());
    // Viewer stands on the tile: finest LOD.
    assert_eq!(tile.displayed_lod(), Some(0));

    let recorded = events.lock().unwrap().clone();
    assert!(recorded.contains(&Event::Colors(origin)));
    assert!(recorded.contains(&Event::Visible(origin, true)));
    // LOD 0 of a 15-sample bordered grid is a 13x13 vertex sheet.
    assert!(recorded.contains(&Event::Mesh(origin, 0, 169)));
    // Colors always precede geometry for a tile.
    let colors_at = recorded.iter().position(|e| *e == Event::Colors(origin));
    let mesh_at = recorded.iter().position(|e| matches!(e, Event::Mesh(c, ..) if *c == origin));
    assert!(colors_at < mesh_at);
}

#[test]
fn distant_tiles_use_coarser_lods() {
    let sink = RecordingSink::default();
    let mut manager = TileManager::new(small_config(), Box::new(sink)).expect("config is valid");

    // A tile roughly 30 world units out sits between the two thresholds.
    let viewer = Vec2::ZERO;
    let far_coord = TileCoord::new(3, 0); // centered at x=36, near edge at 30
    pump_until(&mut manager, viewer, |m| {
        m.tile(far_coord).map(|t| t.displayed_lod().is_some()).unwrap_or(false)
    });
    assert_eq!(manager.tile(far_coord).unwrap().displayed_lod(), Some(1));
}

#[test]
fn walking_away_hides_but_keeps_tiles() {
    let sink = RecordingSink::default();
    let events = Arc::clone(&sink.events);
    let mut manager = TileManager::new(small_config(), Box::new(sink)).expect("config is valid");

    let origin = TileCoord::new(0, 0);
    pump_until(&mut manager, Vec2::ZERO, |m| {
        m.tile(origin).map(|t| t.displayed_lod().is_some()).unwrap_or(false)
    });
    let tiles_before = manager.tile_count();

    pump_until(&mut manager, Vec2::new(400.0, 0.0), |m| {
        m.tile(origin).map(|t| !t.visible()).unwrap_or(false)
    });

    // Hidden, not destroyed; its mesh cache survives a revisit.
    assert!(manager.tile_count() >= tiles_before);
    assert!(manager.tile(origin).unwrap().mesh_built(0));
    assert!(events.lock().unwrap().contains(&Event::Visible(origin, false)));

    // Coming back shows the cached mesh again without regenerating data.
    pump_until(&mut manager, Vec2::ZERO, |m| {
        m.tile(origin).map(|t| t.visible()).unwrap_or(false)
    });
    let tile = manager.tile(origin).unwrap();
    assert_eq!(tile.state(), TileState::Ready);
    assert_eq!(tile.displayed_lod(), Some(0));
}
