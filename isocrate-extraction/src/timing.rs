//! Wall clock timing of extraction phases

use std::fmt;
use std::time::{Duration, Instant};

/// Stages of an extraction whose duration is logged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// One full `IsosurfaceExtractor::extract` call, marching through tree build
    Extraction,
    /// Median split build of the triangle tree
    TreeBuild,
}

impl Phase {
    /// Whole extractions report at INFO, sub-phases at DEBUG
    pub fn level(self) -> log::Level {
        match self {
            Phase::Extraction => log::Level::Info,
            Phase::TreeBuild => log::Level::Debug,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Extraction => f.write_str("Isosurface extraction"),
            Phase::TreeBuild => f.write_str("Triangle tree build"),
        }
    }
}

/// Times one [`Phase`] and logs the elapsed time when dropped
#[must_use = "the phase is only timed while the timer is alive"]
#[derive(Debug)]
pub struct PhaseTimer {
    phase: Phase,
    start: Instant,
}

impl PhaseTimer {
    pub fn start(phase: Phase) -> Self {
        log::trace!("{} started", phase);
        Self {
            phase,
            start: Instant::now(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for PhaseTimer {
    fn drop(&mut self) {
        let level = self.phase.level();
        if log::log_enabled!(level) {
            log::log!(level, "{} finished in {:.3?}", self.phase, self.elapsed());
        }
    }
}
