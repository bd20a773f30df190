use log::{debug, info};

use crate::generator::{Dot, PointGenerator};

pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// Anything that can receive generated dots.
pub trait DotSink {
    fn paint(&mut self, dot: &Dot);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub generated: usize,
    pub total: usize,
}

impl Progress {
    /// Normalised progress in `[0, 1]`. An empty run counts as finished.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.generated as f64 / self.total as f64
        }
    }

    pub fn remaining(&self) -> usize {
        self.total - self.generated
    }

    pub fn is_complete(&self) -> bool {
        self.generated == self.total
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Generating,
    Complete,
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub progress: Progress,
    /// Dots produced by this tick.
    pub painted: usize,
    /// True on the single tick that finished the run.
    pub completed: bool,
}

pub struct BatchScheduler {
    progress: Progress,
    chunk_size: usize,
    state: RunState,
}

impl BatchScheduler {
    pub fn new(total: usize, chunk_size: usize) -> Self {
        Self {
            progress: Progress { generated: 0, total },
            chunk_size: chunk_size.max(1),
            state: RunState::Idle,
        }
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn done(&self) -> bool {
        matches!(self.state, RunState::Complete | RunState::Aborted)
    }

    pub fn remaining(&self) -> usize {
        self.progress.remaining()
    }

    /// Number of ticks a full run takes.
    pub fn ticks_required(&self) -> usize {
        match self.progress.total {
            0 => 1,
            total => (total - 1) / self.chunk_size + 1,
        }
    }

    /// Generates at most one chunk into `sink`. Returns `None` once the run is
    /// complete or aborted; the completing tick is reported exactly once.
    pub fn advance<S>(&mut self, generator: &mut PointGenerator, sink: &mut S) -> Option<Tick>
    where
        S: DotSink + ?Sized,
    {
        match self.state {
            RunState::Complete | RunState::Aborted => return None,
            RunState::Idle => {
                info!("Generating {} dots", self.progress.total);
                self.state = RunState::Generating;
            }
            RunState::Generating => {}
        }

        let start = self.progress.generated;
        let end = self.progress.total.min(start.saturating_add(self.chunk_size));

        for index in start..end {
            sink.paint(&generator.generate(index));
        }

        self.progress.generated = end;

        debug!(
            "Generated {} of {} dots ({:.1}%)",
            end,
            self.progress.total,
            self.progress.fraction() * 100.0
        );

        let completed = self.progress.is_complete();

        if completed {
            info!("Generation complete");
            self.state = RunState::Complete;
        }

        Some(Tick {
            progress: self.progress,
            painted: end - start,
            completed,
        })
    }

    /// Stops further chunks. Whatever was painted stays painted.
    pub fn abort(&mut self) -> bool {
        match self.state {
            RunState::Idle | RunState::Generating => {
                info!(
                    "Generation aborted at {} of {} dots",
                    self.progress.generated, self.progress.total
                );
                self.state = RunState::Aborted;
                true
            }
            _ => false,
        }
    }

    pub fn reset(&mut self) {
        self.progress.generated = 0;
        self.state = RunState::Idle;
    }
}
