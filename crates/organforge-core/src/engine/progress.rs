/// Events emitted by the pipeline for front ends that render progress.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    TaskStart { total_steps: u64 },
    TaskIncrement,
    TaskFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Forwards [`Progress`] events to an optional callback.
///
/// A reporter without a callback discards every event, so library callers that do not
/// care about progress can pass [`ProgressReporter::new`].
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

    /// Runs `work` between a `PhaseStart` and a `PhaseFinish` event.
    ///
    /// `PhaseFinish` is only reported when `work` succeeds.
    pub fn phase<T, E>(
        &self,
        name: &'static str,
        work: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        self.report(Progress::PhaseStart { name });
        let output = work()?;
        self.report(Progress::PhaseFinish);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recording_reporter<'a>(events: Arc<Mutex<Vec<Progress>>>) -> ProgressReporter<'a> {
        ProgressReporter::with_callback(Box::new(move |event| {
            events.lock().unwrap().push(event);
        }))
    }

    #[test]
    fn reporter_without_callback_ignores_events() {
        let reporter = ProgressReporter::new();
        reporter.report(Progress::Message("ignored".to_string()));
    }

    #[test]
    fn phase_wraps_successful_work_in_start_and_finish() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let reporter = recording_reporter(events.clone());

        let value: Result<u32, ()> = reporter.phase("Scaling", || Ok(7));
        assert_eq!(value, Ok(7));
        assert_eq!(
            *events.lock().unwrap(),
            vec![
                Progress::PhaseStart { name: "Scaling" },
                Progress::PhaseFinish
            ]
        );
    }

    #[test]
    fn phase_does_not_finish_when_work_fails() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let reporter = recording_reporter(events.clone());

        let value: Result<(), &str> = reporter.phase("Tessellation", || Err("boom"));
        assert_eq!(value, Err("boom"));
        assert_eq!(
            *events.lock().unwrap(),
            vec![Progress::PhaseStart {
                name: "Tessellation"
            }]
        );
    }
}
