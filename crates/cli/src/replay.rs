//! Offline replay of recorded observation streams.
//!
//! Input is JSON lines, one record per processed frame:
//!
//! ```text
//! {"t": 0.0, "class": 0, "confidence": 0.91}
//! {"t": 0.2, "class": null, "confidence": 0.0}
//! ```
//!
//! `t` is seconds since the start of the recording and must not decrease.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use std::time::Duration;
use tracing::info;
use washstep_core::{Observation, StepCatalog, StepStatus, TrackerConfig, TrackerEvent};
use washstep_progress::{CompletionEstimator, ManualClock, StepTracker};

/// One recorded frame.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplayRecord {
    /// Seconds since the start of the recording
    pub t: f64,
    /// Predicted class, negative or null for none
    #[serde(default)]
    pub class: Option<i64>,
    /// Model confidence
    #[serde(default)]
    pub confidence: f32,
}

/// What gets printed per frame.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ReplayLine<'a> {
    Status {
        t: f64,
        status: &'a StepStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        remaining_secs: Option<f64>,
    },
    Event {
        t: f64,
        event: &'a TrackerEvent,
    },
}

/// Output switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayOptions {
    /// Print transition events
    pub events: bool,
    /// Print the estimated remaining time with each status
    pub estimate: bool,
}

/// Totals for a finished replay.
#[derive(Debug, Clone)]
pub struct ReplaySummary {
    /// Frames processed
    pub frames: usize,
    /// Status after the last frame
    pub final_status: Option<StepStatus>,
}

/// Replay `input` through a fresh tracker and write one JSON line per frame.
pub fn run<R: BufRead, W: Write>(
    input: R,
    mut output: W,
    catalog: StepCatalog,
    config: TrackerConfig,
    options: ReplayOptions,
) -> Result<ReplaySummary> {
    let clock = ManualClock::new();
    let mut tracker = StepTracker::with_clock(catalog, config, clock.clone());
    let estimator = CompletionEstimator;

    let mut frames = 0;
    let mut last_t = 0.0_f64;
    let mut final_status = None;

    for (number, line) in input.lines().enumerate() {
        let line_no = number + 1;
        let line = line.with_context(|| format!("failed to read line {}", line_no))?;
        if line.trim().is_empty() {
            continue;
        }

        let record: ReplayRecord = serde_json::from_str(&line)
            .with_context(|| format!("invalid record on line {}", line_no))?;
        if !record.t.is_finite() || record.t < 0.0 {
            bail!("line {}: timestamp must be a non-negative number", line_no);
        }
        if record.t < last_t {
            bail!(
                "line {}: timestamp {} goes backwards (previous {})",
                line_no,
                record.t,
                last_t
            );
        }
        let Some(offset) = Duration::try_from_secs_f64(record.t)
            .ok()
            .filter(|offset| u64::try_from(offset.as_nanos()).is_ok())
        else {
            bail!("line {}: timestamp {} out of range", line_no, record.t);
        };
        last_t = record.t;
        clock.set(offset);

        let status = tracker.observe(Observation::from_signed(record.class, record.confidence));
        frames += 1;

        let events = tracker.take_events();
        if options.events {
            for event in &events {
                write_line(&mut output, &ReplayLine::Event { t: record.t, event })?;
            }
        }

        let remaining_secs = options
            .estimate
            .then(|| estimator.remaining(&tracker).as_secs_f64());
        write_line(
            &mut output,
            &ReplayLine::Status {
                t: record.t,
                status: &status,
                remaining_secs,
            },
        )?;
        final_status = Some(status);
    }

    info!("Replayed {} frames", frames);
    Ok(ReplaySummary {
        frames,
        final_status,
    })
}

fn write_line<W: Write>(output: &mut W, line: &ReplayLine<'_>) -> Result<()> {
    serde_json::to_writer(&mut *output, line)?;
    writeln!(output)?;
    Ok(())
}
