use std::path::Path;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::crawl::CrawlService;
use crate::error::CrawlError;
use crate::interval::IntervalConfig;
use crate::models::FormatOptions;
use crate::seen::SeenIds;
use crate::traits::{CharacterResolver, RecordStore, RollQuery, RollTranscriber};

/// Configuration for the scheduler loop.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub interval: IntervalConfig,
    /// Lowest ID the remote site hands out.
    pub first_id: u64,
    /// Stop after this many cycles; `None` runs until a fatal error or cancellation.
    pub max_cycles: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: IntervalConfig::default(),
            first_id: 1,
            max_cycles: None,
        }
    }
}

impl SchedulerConfig {
    pub fn with_interval(mut self, interval: IntervalConfig) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_first_id(mut self, first_id: u64) -> Self {
        self.first_id = first_id;
        self
    }

    pub fn with_max_cycles(mut self, max_cycles: u64) -> Self {
        self.max_cycles = Some(max_cycles);
        self
    }
}

/// Events emitted by the scheduler for monitoring/logging.
#[derive(Debug, Clone)]
pub enum SchedulerEvent<'a> {
    Started {
        next_id: u64,
        seen: usize,
    },
    CycleStarted {
        cycle: u64,
        id: u64,
    },
    NotPublished {
        id: u64,
    },
    Defect {
        id: u64,
        error: &'a str,
    },
    Persisted {
        id: u64,
        character: &'a str,
        rows: usize,
        path: &'a Path,
    },
    Waiting {
        delay: Duration,
    },
    Fatal {
        id: u64,
        error: &'a str,
    },
    Stopped {
        cycles: u64,
    },
}

/// Trait for receiving scheduler events (decoupled logging).
pub trait SchedulerReporter: Send + Sync {
    fn report(&self, event: SchedulerEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that uses the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSchedulerReporter;

impl SchedulerReporter for TracingSchedulerReporter {
    fn report(&self, event: SchedulerEvent<'_>) {
        match event {
            SchedulerEvent::Started { next_id, seen } => {
                tracing::info!(%next_id, %seen, "Scheduler started");
            }
            SchedulerEvent::CycleStarted { cycle, id } => {
                tracing::info!(%cycle, %id, "Crawling");
            }
            SchedulerEvent::NotPublished { id } => {
                tracing::info!(%id, "Roll not published yet");
            }
            SchedulerEvent::Defect { id, error } => {
                tracing::warn!(%id, %error, "Page did not match the expected template");
            }
            SchedulerEvent::Persisted {
                id,
                character,
                rows,
                path,
            } => {
                tracing::info!(%id, %character, %rows, path = %path.display(), "Rolls appended");
            }
            SchedulerEvent::Waiting { delay } => {
                tracing::debug!(delay_ms = %delay.as_millis(), "Waiting for next cycle");
            }
            SchedulerEvent::Fatal { id, error } => {
                tracing::error!(%id, %error, "Crawl failed");
            }
            SchedulerEvent::Stopped { cycles } => {
                tracing::info!(%cycles, "Scheduler stopped");
            }
        }
    }
}

/// Totals of a scheduler run that ended without a fatal error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub persisted: u64,
    pub rows: usize,
}

/// Repeatedly crawls the lowest missing ID and appends the results.
pub struct Scheduler<Q, R, T, S>
where
    Q: RollQuery,
    R: CharacterResolver,
    T: RollTranscriber,
    S: RecordStore,
{
    crawler: CrawlService<Q, R, T>,
    store: S,
    format: FormatOptions,
    config: SchedulerConfig,
}

impl<Q, R, T, S> Scheduler<Q, R, T, S>
where
    Q: RollQuery,
    R: CharacterResolver,
    T: RollTranscriber,
    S: RecordStore,
{
    pub fn new(
        crawler: CrawlService<Q, R, T>,
        store: S,
        format: FormatOptions,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            crawler,
            store,
            format,
            config,
        }
    }

    /// Run cycles until cancellation, the cycle limit, or a fatal error.
    ///
    /// `NotFound` and `ParseDefect` are reported and the same ID is retried
    /// after the next wait. A target that does not advance after a
    /// successful cycle is a [`CrawlError::Stall`].
    pub async fn run<SR: SchedulerReporter>(
        &self,
        seen: &mut SeenIds,
        cancel_token: CancellationToken,
        reporter: &SR,
    ) -> Result<RunSummary, CrawlError> {
        let mut summary = RunSummary::default();
        let mut previous: Option<u64> = None;

        reporter.report(SchedulerEvent::Started {
            next_id: seen.lowest_missing(self.config.first_id),
            seen: seen.len(),
        });

        loop {
            if cancel_token.is_cancelled() {
                break;
            }

            let target = seen.lowest_missing(self.config.first_id);
            if previous == Some(target) {
                let err = CrawlError::Stall(target);
                reporter.report(SchedulerEvent::Fatal {
                    id: target,
                    error: &err.to_string(),
                });
                return Err(err);
            }

            summary.cycles += 1;
            reporter.report(SchedulerEvent::CycleStarted {
                cycle: summary.cycles,
                id: target,
            });

            match self.crawler.crawl(target, &self.format, seen).await {
                Ok(output) => {
                    let path = match self.store.append(&output).await {
                        Ok(path) => path,
                        Err(e) => {
                            reporter.report(SchedulerEvent::Fatal {
                                id: target,
                                error: &e.to_string(),
                            });
                            return Err(e);
                        }
                    };
                    reporter.report(SchedulerEvent::Persisted {
                        id: target,
                        character: &output.display_name,
                        rows: output.rows,
                        path: &path,
                    });
                    summary.persisted += 1;
                    summary.rows += output.rows;
                    previous = Some(target);
                }
                Err(CrawlError::NotFound(id)) => {
                    reporter.report(SchedulerEvent::NotPublished { id });
                }
                Err(e) if !e.is_fatal() => {
                    reporter.report(SchedulerEvent::Defect {
                        id: target,
                        error: &e.to_string(),
                    });
                }
                Err(e) => {
                    reporter.report(SchedulerEvent::Fatal {
                        id: target,
                        error: &e.to_string(),
                    });
                    return Err(e);
                }
            }

            if self
                .config
                .max_cycles
                .is_some_and(|max| summary.cycles >= max)
            {
                break;
            }

            let delay = self.config.interval.next_delay();
            reporter.report(SchedulerEvent::Waiting { delay });
            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = cancel_token.cancelled() => break,
            }
        }

        reporter.report(SchedulerEvent::Stopped {
            cycles: summary.cycles,
        });

        Ok(summary)
    }
}
