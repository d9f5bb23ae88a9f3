//! Concurrent reconciliation of a whole catalogue.
//!
//! Runs in three steps, the first and last on a pool of `jobs` worker
//! threads:
//!
//! 1. Every entry is surveyed (detect + backend selection) in parallel.
//! 2. If any pending install runs under `sudo`, credentials are obtained
//!    once, before anything is launched.
//! 3. Pending installs are grouped into units and the workers pull units
//!    from a shared queue. Each system package manager gets a single
//!    serial lane because it holds a host-wide lock; every other pending
//!    entry is its own unit.
//!
//! Once the cancel token trips, nothing new is launched: remaining entries
//! come back `interrupted` while in-flight installs run out their grace
//! period.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{mpsc, Mutex};
use std::thread;

use tracing::warn;

use crate::backend::Backend;
use crate::catalogue::Catalogue;
use crate::shell::CancelToken;

use super::reconciler::{interrupted, Reconciler, Survey};
use super::result::ReconcileResult;

/// Progress events emitted while reconciling.
///
/// Events arrive from worker threads, in completion order.
#[derive(Debug)]
pub enum ReconcileProgress<'a> {
    /// Detection finished for every entry.
    Surveyed { total: usize, pending: usize },
    /// An install is starting.
    Installing { name: &'a str, backend: Backend },
    /// An entry reached its final outcome.
    Finished { result: &'a ReconcileResult },
}

/// Reconcile every entry of a catalogue.
///
/// Results come back in catalogue order regardless of completion order.
pub fn reconcile_all(
    reconciler: &Reconciler<'_>,
    catalogue: &Catalogue,
    cancel: &CancelToken,
    on_progress: &(dyn Fn(ReconcileProgress<'_>) + Sync),
) -> Vec<ReconcileResult> {
    let entries = catalogue.entries();
    let jobs = reconciler.options().jobs.max(1);

    let surveys = run_pool(jobs, entries.iter().collect(), |entry| {
        if cancel.is_cancelled() {
            Survey::Settled(interrupted(entry))
        } else {
            reconciler.survey(entry)
        }
    });

    let mut results: Vec<Option<ReconcileResult>> = (0..entries.len()).map(|_| None).collect();
    let mut pending = Vec::new();
    for (idx, survey) in surveys.into_iter().enumerate() {
        match survey {
            Survey::Settled(result) => {
                on_progress(ReconcileProgress::Finished { result: &result });
                results[idx] = Some(result);
            }
            Survey::Pending { installer, elapsed } => pending.push((idx, installer, elapsed)),
        }
    }

    if !pending.is_empty()
        && !cancel.is_cancelled()
        && !reconciler.authorize(pending.iter().map(|(_, installer, _)| *installer))
    {
        warn!("could not obtain sudo credentials; system package installs will fail");
    }

    on_progress(ReconcileProgress::Surveyed {
        total: entries.len(),
        pending: pending.len(),
    });

    let units = plan_units(pending.iter().map(|(_, installer, _)| installer.backend));
    let installed = run_pool(jobs, units, |unit| {
        unit.into_iter()
            .map(|p| {
                let (idx, installer, elapsed) = pending[p];
                let entry = &entries[idx];

                let result = if cancel.is_cancelled() {
                    interrupted(entry)
                } else {
                    on_progress(ReconcileProgress::Installing {
                        name: &entry.name,
                        backend: installer.backend,
                    });
                    let result = reconciler.install(entry, installer, cancel);
                    let total = result.duration + elapsed;
                    result.with_duration(total)
                };

                on_progress(ReconcileProgress::Finished { result: &result });
                (idx, result)
            })
            .collect::<Vec<_>>()
    });

    for (idx, result) in installed.into_iter().flatten() {
        results[idx] = Some(result);
    }

    results.into_iter().flatten().collect()
}

/// Group pending installs into schedulable units.
///
/// Returns indices into the input: one serial lane per system backend
/// (lanes first, so the longest serial chain starts early), then one unit
/// per remaining install.
pub fn plan_units(backends: impl Iterator<Item = Backend>) -> Vec<Vec<usize>> {
    let mut lanes: BTreeMap<Backend, Vec<usize>> = BTreeMap::new();
    let mut independent = Vec::new();

    for (idx, backend) in backends.enumerate() {
        if backend.is_system() {
            lanes.entry(backend).or_default().push(idx);
        } else {
            independent.push(vec![idx]);
        }
    }

    lanes.into_values().chain(independent).collect()
}

/// Apply `work` to every item on at most `jobs` threads.
///
/// Output order matches input order.
pub fn run_pool<T, R, F>(jobs: usize, items: Vec<T>, work: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Sync,
{
    let total = items.len();
    if total == 0 {
        return Vec::new();
    }

    let workers = jobs.clamp(1, total);
    let queue = Mutex::new(items.into_iter().enumerate().collect::<VecDeque<_>>());
    let (tx, rx) = mpsc::channel();

    thread::scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let queue = &queue;
            let work = &work;
            scope.spawn(move || loop {
                let next = queue.lock().unwrap_or_else(|e| e.into_inner()).pop_front();
                let Some((idx, item)) = next else {
                    break;
                };
                if tx.send((idx, work(item))).is_err() {
                    break;
                }
            });
        }
    });
    drop(tx);

    let mut slots: Vec<Option<R>> = (0..total).map(|_| None).collect();
    for (idx, result) in rx {
        slots[idx] = Some(result);
    }
    slots.into_iter().flatten().collect()
}
