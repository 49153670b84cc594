use std::fmt;

/// The stages of a mutation request, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    ResolvingScaffold,
    Scoring,
    SelectingPositions,
    Sampling,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::ResolvingScaffold => "Resolving Scaffold",
            Phase::Scoring => "Scoring",
            Phase::SelectingPositions => "Selecting Positions",
            Phase::Sampling => "Sampling",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    PhaseStart { phase: Phase },
    PhaseFinish,

    /// One step per candidate sequence that will be validated.
    TaskStart { total_steps: u64 },
    TaskIncrement,
    TaskFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Forwards progress events to an optional callback; silent without one.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    /// Runs `f` between a `PhaseStart` and a `PhaseFinish` for `phase`.
    ///
    /// `PhaseFinish` is only sent when `f` succeeds; a failed phase ends the request.
    pub fn phase<T, E>(&self, phase: Phase, f: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        self.report(Progress::PhaseStart { phase });
        let value = f()?;
        self.report(Progress::PhaseFinish);
        Ok(value)
    }
}
