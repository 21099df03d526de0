//! Off-thread generation with a single-writer, single-reader handoff.
//!
//! A [`GenerationWorker`] runs at most one job at a time on its own thread.
//! The result moves to whoever calls [`GenerationWorker::poll`] or
//! [`GenerationWorker::wait`]; nothing is shared while the job runs.

use std::f32::consts::TAU;
use std::thread::{self, JoinHandle};

use glam::Vec2;

use crate::error::{ViewerError, ViewerResult};
use crate::mesh::{MeshData, Shape};

/// Anything that can produce raw mesh data.
pub trait MeshSource {
    fn mesh(&self) -> ViewerResult<MeshData>;
}

impl MeshSource for Shape {
    fn mesh(&self) -> ViewerResult<MeshData> {
        self.generate()
    }
}

/// Position, normal and index arrays handed over as-is.
///
/// Nothing is checked here; the layout builder validates them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMeshSource {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl MeshSource for RawMeshSource {
    fn mesh(&self) -> ViewerResult<MeshData> {
        Ok(MeshData::from_raw(
            self.positions.clone(),
            self.normals.clone(),
            self.indices.clone(),
        )
        .with_label("raw"))
    }
}

/// Anything that produces logical 2D points for a radius.
pub trait PointSource {
    fn points(&self, radius: f32) -> Vec<Vec2>;
}

impl<F> PointSource for F
where
    F: Fn(f32) -> Vec<Vec2>,
{
    fn points(&self, radius: f32) -> Vec<Vec2> {
        self(radius)
    }
}

/// `count` evenly spaced points on a circle around the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CirclePoints {
    pub count: u32,
}

impl PointSource for CirclePoints {
    fn points(&self, radius: f32) -> Vec<Vec2> {
        (0..self.count)
            .map(|i| Vec2::from_angle(i as f32 / self.count as f32 * TAU) * radius)
            .collect()
    }
}

/// Runs one job at a time on a background thread.
#[derive(Debug)]
pub struct GenerationWorker<T> {
    name: String,
    pending: Option<JoinHandle<T>>,
}

impl<T: Send + 'static> GenerationWorker<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pending: None,
        }
    }

    /// True while a job's result has not been collected.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Spawn `job`. Fails with [`ViewerError::WorkerBusy`] if the previous
    /// result has not been collected yet.
    pub fn start<F>(&mut self, job: F) -> ViewerResult<()>
    where
        F: FnOnce() -> T + Send + 'static,
    {
        if self.pending.is_some() {
            log::warn!("Worker '{}' already running, start rejected", self.name);
            return Err(ViewerError::WorkerBusy);
        }
        let handle = thread::Builder::new()
            .name(self.name.clone())
            .spawn(job)
            .map_err(|e| ViewerError::WorkerSpawnFailed(e.to_string()))?;
        log::debug!("Worker '{}' started", self.name);
        self.pending = Some(handle);
        Ok(())
    }

    /// Take the result if the job has finished.
    pub fn poll(&mut self) -> ViewerResult<Option<T>> {
        match &self.pending {
            Some(handle) if handle.is_finished() => self.wait(),
            _ => Ok(None),
        }
    }

    /// Block until the pending job finishes and take its result.
    pub fn wait(&mut self) -> ViewerResult<Option<T>> {
        let Some(handle) = self.pending.take() else {
            return Ok(None);
        };
        let result = handle.join().map_err(|_| {
            log::error!("Worker '{}' job panicked", self.name);
            ViewerError::WorkerPanicked
        })?;
        log::debug!("Worker '{}' finished", self.name);
        Ok(Some(result))
    }
}

impl GenerationWorker<ViewerResult<MeshData>> {
    /// Generate a mesh from `source` in the background.
    pub fn start_mesh<M>(&mut self, source: M) -> ViewerResult<()>
    where
        M: MeshSource + Send + 'static,
    {
        self.start(move || source.mesh())
    }
}

impl GenerationWorker<Vec<Vec2>> {
    /// Produce points from `source` in the background.
    pub fn start_points<P>(&mut self, source: P, radius: f32) -> ViewerResult<()>
    where
        P: PointSource + Send + 'static,
    {
        self.start(move || source.points(radius))
    }
}

impl<T> Drop for GenerationWorker<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            log::debug!("Worker '{}' dropped while busy, waiting", self.name);
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn test_start_and_wait() {
        let mut worker = GenerationWorker::new("test");
        worker.start(|| 21 * 2).unwrap();
        assert!(worker.is_busy());
        assert_eq!(worker.wait().unwrap(), Some(42));
        assert!(!worker.is_busy());
        assert_eq!(worker.wait().unwrap(), None);
    }

    #[test]
    fn test_second_start_rejected() {
        let (tx, rx) = mpsc::channel::<()>();
        let mut worker = GenerationWorker::new("busy");
        worker
            .start(move || {
                rx.recv().ok();
                1
            })
            .unwrap();

        assert_eq!(worker.start(|| 2), Err(ViewerError::WorkerBusy));
        assert_eq!(worker.poll().unwrap(), None);

        tx.send(()).unwrap();
        assert_eq!(worker.wait().unwrap(), Some(1));
        worker.start(|| 3).unwrap();
        assert_eq!(worker.wait().unwrap(), Some(3));
    }

    #[test]
    fn test_poll_collects_once() {
        let mut worker = GenerationWorker::new("poll");
        worker.start(|| "done").unwrap();

        let mut result = None;
        for _ in 0..500 {
            if let Some(value) = worker.poll().unwrap() {
                result = Some(value);
                break;
            }
            thread::sleep(Duration::from_millis(2));
        }
        assert_eq!(result, Some("done"));
        assert_eq!(worker.poll().unwrap(), None);
    }

    #[test]
    fn test_panicking_job() {
        let mut worker: GenerationWorker<u32> = GenerationWorker::new("panics");
        worker.start(|| panic!("boom")).unwrap();
        assert_eq!(worker.wait(), Err(ViewerError::WorkerPanicked));
        assert!(!worker.is_busy());
    }

    #[test]
    fn test_mesh_sources() {
        let mut worker: GenerationWorker<ViewerResult<MeshData>> = GenerationWorker::new("mesh");
        worker.start_mesh(Shape::Cube { size: 1.0 }).unwrap();
        let mesh = worker.wait().unwrap().unwrap().unwrap();
        assert_eq!(mesh.vertex_count().unwrap(), 24);

        let raw = RawMeshSource {
            positions: vec![[0.0; 3]; 3],
            normals: vec![[0.0, 0.0, 1.0]; 3],
            indices: vec![0, 1, 2],
        };
        let mesh = raw.mesh().unwrap();
        assert_eq!(mesh.index_count(), 3);
        assert_eq!(mesh.label(), Some("raw"));
    }

    #[test]
    fn test_point_sources() {
        let circle = CirclePoints { count: 4 };
        let points = circle.points(0.5);
        assert_eq!(points.len(), 4);
        assert!(points[1].abs_diff_eq(Vec2::new(0.0, 0.5), 1e-6));

        let mut worker: GenerationWorker<Vec<Vec2>> = GenerationWorker::new("points");
        worker
            .start_points(|r: f32| vec![Vec2::splat(r)], 0.25)
            .unwrap();
        assert_eq!(worker.wait().unwrap(), Some(vec![Vec2::splat(0.25)]));
    }
}
