//! # Background Generation Pool
//!
//! A fixed pool of worker threads that generate chunks off the caller's
//! thread. Jobs and results travel over bounded channels; a submission
//! that would overflow the queue is refused rather than blocking the
//! caller.
//!
//! ## Cancellation
//!
//! Cancellation is cooperative and epoch-based. Every job carries the
//! epoch current at submission time; advancing the pool epoch marks all
//! in-flight jobs stale. Workers check the epoch before generating and
//! answer stale jobs with [`GenerationResult::Skipped`] so the consumer
//! can resubmit coordinates it still wants under the new epoch. Nothing
//! is ever silently dropped inside the pool.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::chunk::{Chunk, ChunkCoord, ChunkGenerator};
use crate::noise::WorldSeed;

/// How long an idle worker waits on the job queue before re-checking the
/// shutdown flag.
const IDLE_POLL: Duration = Duration::from_millis(50);

struct GenerationJob {
    coord: ChunkCoord,
    epoch: u64,
}

/// Outcome of one submitted job.
pub enum GenerationResult {
    /// The chunk was generated under a still-current epoch.
    Completed {
        /// Coordinate of the generated chunk.
        coord: ChunkCoord,
        /// Epoch the job was submitted under.
        epoch: u64,
        /// The finished chunk.
        chunk: Chunk,
    },
    /// The job's epoch was stale by the time a worker picked it up; no
    /// work was done.
    Skipped {
        /// Coordinate of the refused job.
        coord: ChunkCoord,
        /// The stale epoch the job carried.
        epoch: u64,
    },
}

/// Bounded worker pool for off-thread chunk generation.
///
/// Workers share the generation pipeline but each owns an independent,
/// deterministically seeded random stream.
pub struct GenerationPool {
    job_tx: Sender<GenerationJob>,
    result_rx: Receiver<GenerationResult>,
    epoch: Arc<AtomicU64>,
    running: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
}

impl GenerationPool {
    /// Spawns `workers` threads over a shared pipeline.
    ///
    /// `queue_depth` bounds both the job and result queues.
    #[must_use]
    pub fn new(
        generator: Arc<ChunkGenerator>,
        seed: WorldSeed,
        workers: usize,
        queue_depth: usize,
    ) -> Self {
        let (job_tx, job_rx) = bounded::<GenerationJob>(queue_depth);
        let (result_tx, result_rx) = bounded::<GenerationResult>(queue_depth);
        let epoch = Arc::new(AtomicU64::new(0));
        let running = Arc::new(AtomicBool::new(true));

        let handles = (0..workers)
            .map(|index| {
                let generator = Arc::clone(&generator);
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                let epoch = Arc::clone(&epoch);
                let running = Arc::clone(&running);
                let rng_seed = seed.derive(0x3097 + index as u64).value();

                std::thread::Builder::new()
                    .name(format!("wander-gen-{index}"))
                    .spawn(move || {
                        worker_loop(&generator, &job_rx, &result_tx, &epoch, &running, rng_seed);
                    })
                    .unwrap_or_else(|e| panic!("failed to spawn generation worker: {e}"))
            })
            .collect();

        tracing::info!(workers, queue_depth, "generation pool started");

        Self {
            job_tx,
            result_rx,
            epoch,
            running,
            workers: handles,
        }
    }

    /// Submits a coordinate for generation under the current epoch.
    ///
    /// Returns `false` if the job queue is full; the caller retries on a
    /// later frame.
    pub fn submit(&self, coord: ChunkCoord) -> bool {
        let job = GenerationJob {
            coord,
            epoch: self.epoch.load(Ordering::Acquire),
        };
        self.job_tx.try_send(job).is_ok()
    }

    /// Drains one finished result, if any is ready.
    #[must_use]
    pub fn try_recv(&self) -> Option<GenerationResult> {
        self.result_rx.try_recv().ok()
    }

    /// Waits up to `timeout` for one finished result.
    #[must_use]
    pub fn recv_timeout(&self, timeout: Duration) -> Option<GenerationResult> {
        self.result_rx.recv_timeout(timeout).ok()
    }

    /// Marks every in-flight job stale and returns the new epoch.
    pub fn advance_epoch(&self) -> u64 {
        let next = self.epoch.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::debug!(epoch = next, "generation epoch advanced");
        next
    }

    /// The epoch new submissions are tagged with.
    #[must_use]
    pub fn current_epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }
}

impl Drop for GenerationPool {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
        tracing::info!("generation pool stopped");
    }
}

fn worker_loop(
    generator: &ChunkGenerator,
    job_rx: &Receiver<GenerationJob>,
    result_tx: &Sender<GenerationResult>,
    epoch: &AtomicU64,
    running: &AtomicBool,
    rng_seed: u64,
) {
    let mut rng = ChaCha8Rng::seed_from_u64(rng_seed);

    while running.load(Ordering::Acquire) {
        let job = match job_rx.recv_timeout(IDLE_POLL) {
            Ok(job) => job,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        let result = if job.epoch == epoch.load(Ordering::Acquire) {
            let chunk = generator.generate(job.coord, &mut rng);
            GenerationResult::Completed {
                coord: job.coord,
                epoch: job.epoch,
                chunk,
            }
        } else {
            tracing::debug!(x = job.coord.x, y = job.coord.y, "stale job skipped");
            GenerationResult::Skipped {
                coord: job.coord,
                epoch: job.epoch,
            }
        };

        // The result queue is bounded; keep re-checking the shutdown
        // flag rather than blocking forever against a gone consumer.
        let mut pending = result;
        loop {
            match result_tx.send_timeout(pending, IDLE_POLL) {
                Ok(()) => break,
                Err(crossbeam_channel::SendTimeoutError::Timeout(back)) => {
                    if !running.load(Ordering::Acquire) {
                        return;
                    }
                    pending = back;
                }
                Err(crossbeam_channel::SendTimeoutError::Disconnected(_)) => return,
            }
        }
    }
}
