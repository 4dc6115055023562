use std::fs::File;
use std::io::{self, Seek, SeekFrom};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use thiserror::Error;

use super::core::SegmentCounts;
use crate::common::io::{open_scan, read_full};

/// Exit code: scan completed and a report was produced.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code: bad or missing parameters.
pub const EXIT_INVALID_INPUT: i32 = 1;
/// Exit code: the file could not be opened, sized, or read.
pub const EXIT_FILE_INACCESSIBLE: i32 = 2;
/// Exit code: a read buffer could not be allocated.
pub const EXIT_ALLOCATION_FAILURE: i32 = 3;
/// Exit code: no worker thread completed the scan.
pub const EXIT_NO_THREAD_ALIVE: i32 = 4;

/// Everything that can end a scan early, or take down a single worker.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Parameter validation failed; carries the human-readable reason.
    #[error("{0}")]
    InvalidInput(String),
    /// The file could not be opened, sized, seeked, or read.
    #[error("file inaccessible: {0}")]
    FileInaccessible(#[from] io::Error),
    /// A worker's read buffer allocation failed.
    #[error("failed to allocate read buffer")]
    AllocationFailure,
    /// Zero workers started, or every started worker failed.
    #[error("no worker thread completed the scan")]
    NoThreadAlive,
}

impl ScanError {
    /// Process exit code for this error kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            ScanError::InvalidInput(_) => EXIT_INVALID_INPUT,
            ScanError::FileInaccessible(_) => EXIT_FILE_INACCESSIBLE,
            ScanError::AllocationFailure => EXIT_ALLOCATION_FAILURE,
            ScanError::NoThreadAlive => EXIT_NO_THREAD_ALIVE,
        }
    }
}

/// Validated knobs for one scan run.
///
/// `workload` must be a multiple of `buffer_size`; run a raw request
/// through [`adjust_workload`](super::core::adjust_workload) first.
#[derive(Debug, Clone)]
pub struct ScanParams {
    /// Worker threads to launch.
    pub num_workers: usize,
    /// Bytes claimed from the shared cursor per dispatch round.
    pub workload: u64,
    /// Per-worker read buffer size; divides `workload` evenly.
    pub buffer_size: usize,
}

/// The next unclaimed byte offset of the file, shared by every worker.
///
/// This is the engine's single synchronization point: no locks, no
/// queues. Each worker reserves a segment with one fetch-and-add, so
/// concurrent claims can never overlap and the granted ranges partition
/// `[0, file_size)` regardless of scheduling.
#[derive(Debug, Default)]
pub struct SharedCursor(AtomicU64);

impl SharedCursor {
    pub fn new() -> Self {
        SharedCursor(AtomicU64::new(0))
    }

    /// Reserve the next `amount` bytes; returns the offset where the
    /// reservation starts. Relaxed suffices: the counter orders nothing
    /// besides itself, and a fetch-and-add is atomic at any ordering.
    #[inline]
    pub fn claim(&self, amount: u64) -> u64 {
        self.0.fetch_add(amount, Ordering::Relaxed)
    }
}

/// One scan worker: a private read handle plus an exclusively owned
/// buffer. Workers share no mutable state besides the [`SharedCursor`].
///
/// Construction is the worker's init phase; if either the buffer
/// allocation or the open fails the dispatch loop is never entered and
/// the worker terminates with that error.
struct ScanWorker {
    file: File,
    buf: Vec<u8>,
}

impl ScanWorker {
    /// Allocate the read buffer (fallibly) and open an independent
    /// handle to the file.
    fn init(path: &Path, buffer_size: usize) -> Result<ScanWorker, ScanError> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(buffer_size)
            .map_err(|_| ScanError::AllocationFailure)?;
        buf.resize(buffer_size, 0);
        let file = open_scan(path)?;
        Ok(ScanWorker { file, buf })
    }

    /// Dispatch loop: claim a segment and stream it through the buffer
    /// until the cursor has passed the end of the file.
    fn run(
        mut self,
        file_size: u64,
        workload: u64,
        cursor: &SharedCursor,
    ) -> Result<SegmentCounts, ScanError> {
        let mut counts = SegmentCounts::default();
        loop {
            let start = cursor.claim(workload);
            if start >= file_size {
                break;
            }
            // Tail segment: less than one workload remains past `start`.
            // Its length is file_size % workload, the historical formula,
            // kept as-is. Every start handed out below file_size is a
            // workload multiple, so this equals file_size - start.
            let segment_len = if file_size - start < workload {
                file_size % workload
            } else {
                workload
            };
            self.file.seek(SeekFrom::Start(start))?;
            self.scan_segment(segment_len, &mut counts)?;
        }
        Ok(counts)
    }

    /// Stream one claimed segment: full buffers first, then one partial
    /// chunk of `segment_len % buffer_size` bytes (nonzero only in the
    /// tail segment, since every other segment is buffer-aligned).
    fn scan_segment(
        &mut self,
        segment_len: u64,
        counts: &mut SegmentCounts,
    ) -> Result<(), ScanError> {
        let buffer_size = self.buf.len() as u64;
        for _ in 0..segment_len / buffer_size {
            let n = read_full(&mut self.file, &mut self.buf)?;
            counts.record(&self.buf[..n]);
            if (n as u64) < buffer_size {
                // File shrank underneath the scan; score what arrived.
                return Ok(());
            }
        }
        let tail = (segment_len % buffer_size) as usize;
        if tail > 0 {
            let n = read_full(&mut self.file, &mut self.buf[..tail])?;
            counts.record(&self.buf[..n]);
        }
        Ok(())
    }
}

/// Final merged totals plus per-worker accounting.
#[derive(Debug)]
pub struct SummaryReport {
    pub file_size: u64,
    pub newlines: u64,
    pub alnum: u64,
    pub utf8_units: u64,
    pub utf8_compliant: bool,
    /// Workers asked for by the caller.
    pub workers_requested: usize,
    /// Workers whose threads actually started.
    pub workers_launched: usize,
    /// Workers that finished their dispatch loop normally.
    pub workers_succeeded: usize,
    /// Errors from launched workers that failed; counts from these
    /// workers are not part of the totals above.
    pub worker_errors: Vec<ScanError>,
}

/// Fold per-worker outcomes into the final report.
///
/// Outcomes may arrive in any order. Failed workers contribute nothing;
/// their errors are kept for the caller's diagnostics. A single
/// non-compliant worker makes the whole file non-compliant. With zero
/// successful workers there is nothing to report and the run fails.
pub fn aggregate(
    file_size: u64,
    workers_requested: usize,
    workers_launched: usize,
    outcomes: Vec<Result<SegmentCounts, ScanError>>,
) -> Result<SummaryReport, ScanError> {
    let mut totals = SegmentCounts::default();
    let mut worker_errors = Vec::new();
    let mut workers_succeeded = 0;
    for outcome in outcomes {
        match outcome {
            Ok(counts) => {
                totals.merge(&counts);
                workers_succeeded += 1;
            }
            Err(e) => worker_errors.push(e),
        }
    }
    if workers_succeeded == 0 {
        return Err(ScanError::NoThreadAlive);
    }
    Ok(SummaryReport {
        file_size,
        newlines: totals.newlines,
        alnum: totals.alnum,
        utf8_units: totals.utf8_units,
        utf8_compliant: totals.utf8_compliant,
        workers_requested,
        workers_launched,
        workers_succeeded,
        worker_errors,
    })
}

/// Launch the worker pool, wait for every launched worker, and fold
/// their per-thread counts into one report.
///
/// `file_size` comes from the caller's probe; the cursor is constructed
/// here and lent to the workers for the duration of the scope. Launch
/// failures are tolerated: the scan proceeds with whichever workers
/// started, and the report carries the requested/launched/succeeded
/// tallies so the caller can warn about the difference.
pub fn scan_file(
    path: &Path,
    file_size: u64,
    params: &ScanParams,
) -> Result<SummaryReport, ScanError> {
    debug_assert!(params.workload > 0 && params.buffer_size > 0);
    debug_assert_eq!(params.workload % params.buffer_size as u64, 0);

    let cursor = SharedCursor::new();
    let mut outcomes = Vec::with_capacity(params.num_workers);
    let mut workers_launched = 0;

    thread::scope(|s| {
        let mut handles = Vec::with_capacity(params.num_workers);
        for i in 0..params.num_workers {
            let cursor = &cursor;
            let spawned = thread::Builder::new()
                .name(format!("scan-{i}"))
                .spawn_scoped(s, move || {
                    ScanWorker::init(path, params.buffer_size)
                        .and_then(|w| w.run(file_size, params.workload, cursor))
                });
            if let Ok(handle) = spawned {
                handles.push(handle);
            }
        }
        workers_launched = handles.len();
        for handle in handles {
            outcomes.push(handle.join().unwrap());
        }
    });

    if workers_launched == 0 {
        return Err(ScanError::NoThreadAlive);
    }
    aggregate(file_size, params.num_workers, workers_launched, outcomes)
}
