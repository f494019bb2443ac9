use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};

use log::trace;

use crate::error::GenerationError;
use crate::terrain::height_field::TileData;
use crate::terrain::mesh_builder::TerrainMesh;
use crate::terrain::tile::TileCoord;

/// A completed unit of background work, tagged with the identity of the tile
/// (and LOD) it belongs to. Failures travel the same path as results so a bad
/// request can never take the pipeline down.
#[derive(Debug)]
pub enum Completion {
    HeightField {
        coord: TileCoord,
        result: Result<TileData, GenerationError>,
    },
    Mesh {
        coord: TileCoord,
        lod: u32,
        result: Result<TerrainMesh, GenerationError>,
    },
}

/// Owns the worker pool and the completion queue.
///
/// `submit_*` never blocks: each job runs on a worker and appends its
/// completion to an internal channel. The pipeline holds the only receiver,
/// so whoever owns the pipeline is the single consumer; `drain` is the only
/// way results come out, which keeps every callback on the consumer's thread.
/// The type is deliberately not `Sync` (the receiver pins consumption to one
/// context).
pub struct GenerationPipeline {
    pool: super::thread_pool::ThreadPool,
    sender: Sender<Completion>,
    receiver: Receiver<Completion>,
    submitted: AtomicUsize,
}

impl GenerationPipeline {
    pub fn new(num_threads: usize) -> GenerationPipeline {
        let (sender, receiver) = channel();
        GenerationPipeline {
            pool: super::thread_pool::ThreadPool::new(num_threads),
            sender,
            receiver,
            submitted: AtomicUsize::new(0),
        }
    }

    /// Launch height-field generation for a tile. Returns immediately.
    pub fn submit_height_field<F>(&self, coord: TileCoord, job: F)
    where
        F: FnOnce() -> Result<TileData, GenerationError> + Send + 'static,
    {
        trace!("submitting height field request for {:?}", coord);
        self.submitted.fetch_add(1, Ordering::Relaxed);
        let sender = self.sender.clone();
        self.pool.execute(move || {
            let result = job();
            // The send only fails if the pipeline was dropped; the result is
            // moot then.
            let _ = sender.send(Completion::HeightField { coord, result });
        });
    }

    /// Launch mesh construction for one (tile, LOD). Returns immediately.
    pub fn submit_mesh<F>(&self, coord: TileCoord, lod: u32, job: F)
    where
        F: FnOnce() -> Result<TerrainMesh, GenerationError> + Send + 'static,
    {
        trace!("submitting mesh request for {:?} lod {}", coord, lod);
        self.submitted.fetch_add(1, Ordering::Relaxed);
        let sender = self.sender.clone();
        self.pool.execute(move || {
            let result = job();
            let _ = sender.send(Completion::Mesh { coord, lod, result });
        });
    }

    /// Remove and hand over everything queued so far, in the order workers
    /// completed (FIFO). The queue is snapshotted before dispatch: entries
    /// appended by workers while the handler runs are left for the next
    /// drain. Returns the number of completions dispatched.
    pub fn drain<F>(&self, mut handle: F) -> usize
    where
        F: FnMut(Completion),
    {
        let batch: Vec<Completion> = self.receiver.try_iter().collect();
        let count = batch.len();
        for completion in batch {
            handle(completion);
        }
        count
    }

    /// Total requests submitted since creation.
    pub fn submitted_jobs(&self) -> usize {
        self.submitted.load(Ordering::Relaxed)
    }

    pub fn num_threads(&self) -> usize {
        self.pool.num_threads()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;
    use std::time::{Duration, Instant};

    fn coord_of(completion: &Completion) -> TileCoord {
        match completion {
            Completion::HeightField { coord, .. } => *coord,
            Completion::Mesh { coord, .. } => *coord,
        }
    }

    /// Drain in a spin loop until at least `want` completions arrived.
    fn drain_until(pipeline: &GenerationPipeline, order: &mut Vec<TileCoord>, want: usize) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while order.len() < want {
            pipeline.drain(|c| order.push(coord_of(&c)));
            assert!(Instant::now() < deadline, "timed out waiting for completions");
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn drain_dispatches_in_completion_order() {
        // Three requests whose workers are released in the order R2, R1, R3;
        // the callbacks must fire in that same order.
        let pipeline = GenerationPipeline::new(3);
        let coords = [TileCoord::new(1, 0), TileCoord::new(2, 0), TileCoord::new(3, 0)];
        let mut releases = Vec::new();
        for &coord in &coords {
            let (tx, rx) = channel::<()>();
            releases.push(tx);
            pipeline.submit_height_field(coord, move || {
                rx.recv().ok();
                Err(GenerationError::height_field(coord, "released"))
            });
        }

        let mut order = Vec::new();
        releases[1].send(()).ok();
        drain_until(&pipeline, &mut order, 1);
        releases[0].send(()).ok();
        drain_until(&pipeline, &mut order, 2);
        releases[2].send(()).ok();
        drain_until(&pipeline, &mut order, 3);

        assert_eq!(order, vec![coords[1], coords[0], coords[2]]);
    }

    #[test]
    fn failures_are_delivered_with_identity() {
        let pipeline = GenerationPipeline::new(1);
        let coord = TileCoord::new(-4, 7);
        pipeline.submit_mesh(coord, 2, move || {
            Err(GenerationError::mesh(coord, 2, "synthetic failure"))
        });

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut seen = None;
        while seen.is_none() {
            pipeline.drain(|c| seen = Some(c));
            assert!(Instant::now() < deadline, "timed out waiting for failure");
            std::thread::sleep(Duration::from_millis(1));
        }
        match seen {
            Some(Completion::Mesh { coord: c, lod, result }) => {
                assert_eq!(c, coord);
                assert_eq!(lod, 2);
                let err = result.expect_err("job reported failure");
                assert_eq!(err.lod, Some(2));
                assert!(err.message.contains("synthetic"));
            }
            other => panic!("unexpected completion: {other:?}"),
        }
    }

    #[test]
    fn submitted_jobs_counts_requests() {
        let pipeline = GenerationPipeline::new(1);
        assert_eq!(pipeline.submitted_jobs(), 0);
        let coord = TileCoord::new(0, 0);
        pipeline.submit_height_field(coord, move || {
            Err(GenerationError::height_field(coord, "count me"))
        });
        assert_eq!(pipeline.submitted_jobs(), 1);
    }
}
