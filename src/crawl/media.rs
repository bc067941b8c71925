//! Bounded media download pool
//!
//! A fixed number of scoped worker threads pull download jobs from a shared
//! queue while the crawler keeps traversing pages. Outcomes are collected
//! when the pool is finished.

use crate::crawl::page::MediaKind;
use crate::crawl::CrawlEvent;
use crate::fetch::Fetch;
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::{Scope, ScopedJoinHandle};
use tracing::{debug, error};

/// Default number of concurrent media downloads
pub const DEFAULT_WORKERS: usize = 8;

/// One file to download
#[derive(Debug, Clone)]
pub struct MediaJob {
    pub kind: MediaKind,
    pub url: String,
    pub dest: PathBuf,
}

/// What happened to a media job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum MediaStatus {
    Downloaded { bytes: u64, sha256: String },
    /// Target already existed or was already scheduled in this run
    Skipped,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaOutcome {
    pub kind: MediaKind,
    pub url: String,
    pub path: PathBuf,
    #[serde(flatten)]
    pub status: MediaStatus,
}

impl MediaOutcome {
    fn new(job: MediaJob, status: MediaStatus) -> Self {
        Self {
            kind: job.kind,
            url: job.url,
            path: job.dest,
            status,
        }
    }

    pub fn is_downloaded(&self) -> bool {
        matches!(self.status, MediaStatus::Downloaded { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, MediaStatus::Failed { .. })
    }
}

/// Callback invoked from worker threads as downloads complete
pub type EventSink<'env> = &'env (dyn Fn(CrawlEvent<'_>) + Sync);

/// Download pool bound to a thread scope
pub struct MediaPool<'scope> {
    sender: Option<mpsc::Sender<MediaJob>>,
    workers: Vec<ScopedJoinHandle<'scope, Vec<MediaOutcome>>>,
    scheduled: HashSet<PathBuf>,
    immediate: Vec<MediaOutcome>,
}

impl<'scope> MediaPool<'scope> {
    /// Spawn `workers` download threads inside `scope` (at least one)
    pub fn start<'env, F: Fetch>(
        scope: &'scope Scope<'scope, 'env>,
        fetcher: &'env F,
        workers: usize,
        sink: EventSink<'env>,
    ) -> Self {
        let (sender, receiver) = mpsc::channel::<MediaJob>();
        let receiver = Arc::new(Mutex::new(receiver));

        let handles = (0..workers.max(1))
            .map(|id| {
                let receiver = Arc::clone(&receiver);
                scope.spawn(move || {
                    let mut outcomes = Vec::new();
                    loop {
                        // Hold the lock only while waiting for the next job
                        let next = match receiver.lock() {
                            Ok(rx) => rx.recv(),
                            Err(_) => break,
                        };
                        let job = match next {
                            Ok(job) => job,
                            Err(_) => break,
                        };

                        debug!(worker = id, url = %job.url, "downloading media");
                        let status = match fetcher.download_to(&job.url, &job.dest) {
                            Ok(download) => MediaStatus::Downloaded {
                                bytes: download.bytes,
                                sha256: download.sha256,
                            },
                            Err(e) => MediaStatus::Failed {
                                error: e.to_string(),
                            },
                        };
                        let outcome = MediaOutcome::new(job, status);
                        sink(CrawlEvent::MediaFinished(&outcome));
                        outcomes.push(outcome);
                    }
                    outcomes
                })
            })
            .collect();

        Self {
            sender: Some(sender),
            workers: handles,
            scheduled: HashSet::new(),
            immediate: Vec::new(),
        }
    }

    /// Queue a download unless its target already exists or is already queued
    pub fn submit(&mut self, job: MediaJob) {
        if job.dest.exists() || !self.scheduled.insert(job.dest.clone()) {
            debug!(path = %job.dest.display(), "media already present, skipping");
            self.immediate.push(MediaOutcome::new(job, MediaStatus::Skipped));
            return;
        }

        let Some(sender) = &self.sender else {
            return;
        };
        if let Err(mpsc::SendError(job)) = sender.send(job) {
            self.immediate.push(MediaOutcome::new(
                job,
                MediaStatus::Failed {
                    error: "download pool is not running".to_string(),
                },
            ));
        }
    }

    /// Number of jobs handed to workers so far
    pub fn scheduled_count(&self) -> usize {
        self.scheduled.len()
    }

    /// Close the queue, wait for all workers and return every outcome sorted by path
    pub fn finish(mut self) -> Vec<MediaOutcome> {
        drop(self.sender.take());

        let mut outcomes = std::mem::take(&mut self.immediate);
        for handle in self.workers.drain(..) {
            match handle.join() {
                Ok(done) => outcomes.extend(done),
                Err(_) => error!("media worker panicked; its results are lost"),
            }
        }

        outcomes.sort_by(|a, b| a.path.cmp(&b.path));
        outcomes
    }
}
