use indicatif::{ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;
use ugm::engine::progress::{Phase, Progress, ProgressCallback};

const SPINNER_TICK_MS: u64 = 80;
const CANDIDATES_MESSAGE: &str = "Validating candidates";
const DONE_MESSAGE: &str = "✓ Done";

/// Workflow phases in the order the mutation workflow runs them.
const PHASE_ORDER: [Phase; 4] = [
    Phase::ResolvingScaffold,
    Phase::Scoring,
    Phase::SelectingPositions,
    Phase::Sampling,
];

/// `"[2/4] Scoring"` style label for a workflow phase.
pub fn phase_label(phase: Phase) -> String {
    let step = PHASE_ORDER
        .iter()
        .position(|&p| p == phase)
        .map_or(0, |i| i + 1);
    format!("[{}/{}] {}", step, PHASE_ORDER.len(), phase.name())
}

/// Renders mutation progress on stderr.
///
/// Each phase gets a spinner with its step label. When the sampler announces how many
/// candidates it will validate, the spinner turns into a bar that advances once per
/// accepted candidate.
#[derive(Clone)]
pub struct CliProgressHandler {
    bar: Arc<Mutex<ProgressBar>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    /// A handler that never draws, for `--quiet` runs.
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), target)
            .with_style(Self::spinner_style())
            .with_message("Waiting for the workflow...");
        bar.finish_and_clear();
        Self {
            bar: Arc::new(Mutex::new(bar)),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let bar = Arc::clone(&self.bar);

        Box::new(move |event: Progress| {
            let Ok(bar) = bar.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };
            Self::apply(&bar, event);
        })
    }

    fn apply(bar: &ProgressBar, event: Progress) {
        match event {
            Progress::PhaseStart { phase } => {
                bar.reset();
                bar.set_length(0);
                bar.set_style(Self::spinner_style());
                bar.set_message(phase_label(phase));
                bar.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
            }
            Progress::PhaseFinish => {
                bar.disable_steady_tick();
                bar.finish_with_message(DONE_MESSAGE);
            }
            Progress::TaskStart { total_steps } => {
                bar.disable_steady_tick();
                bar.reset();
                bar.set_style(Self::bar_style());
                bar.set_length(total_steps);
                bar.set_position(0);
                bar.set_message(CANDIDATES_MESSAGE);
            }
            Progress::TaskIncrement => bar.inc(1),
            Progress::TaskFinish => {
                if let Some(total) = bar.length() {
                    bar.set_position(total);
                }
                bar.finish();
            }
            Progress::Message(msg) if bar.is_finished() => bar.set_message(msg),
            Progress::Message(msg) => bar.println(format!("  {}", msg)),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<24} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .with_key("eta", |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
            })
            .progress_chars("##-")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}
