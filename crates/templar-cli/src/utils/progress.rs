use indicatif::{ProgressBar, ProgressState, ProgressStyle};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use templar::engine::progress::{CandidateOutcome, Progress, ProgressCallback};

#[derive(Default)]
struct PassTally {
    name: &'static str,
    evaluated: u64,
    accepted: u64,
}

struct BarState {
    pb: ProgressBar,
    pass: PassTally,
}

/// Shows one bar over the mutations of a run; library progress events update
/// its message with the pass currently being evaluated.
#[derive(Clone)]
pub struct CliProgressHandler {
    state: Arc<Mutex<BarState>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let pb = ProgressBar::new(0)
            .with_style(Self::bar_style())
            .with_message("Initializing...");
        pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        pb.finish_and_clear();

        Self {
            state: Arc::new(Mutex::new(BarState {
                pb,
                pass: PassTally::default(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BarState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn start(&self, total_mutations: u64) {
        let state = self.lock();
        state.pb.reset();
        state.pb.set_length(total_mutations);
        state.pb.set_position(0);
        state.pb.set_message("Searching templates");
    }

    pub fn mutation_finished(&self) {
        self.lock().pb.inc(1);
    }

    pub fn finish(&self) {
        self.lock().pb.finish_with_message("✓ Done");
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let state = Arc::clone(&self.state);

        Box::new(move |progress: Progress| {
            let mut guard = state.lock().unwrap_or_else(PoisonError::into_inner);
            let BarState { pb, pass } = &mut *guard;

            match progress {
                Progress::PassStart { name, .. } => {
                    *pass = PassTally {
                        name,
                        ..PassTally::default()
                    };
                    pb.set_message(name.to_string());
                }
                Progress::CandidateFinished { outcome, .. } => {
                    pass.evaluated += 1;
                    if matches!(outcome, CandidateOutcome::Accepted { .. }) {
                        pass.accepted += 1;
                    }
                    pb.set_message(format!(
                        "{} ({} evaluated, {} accepted)",
                        pass.name, pass.evaluated, pass.accepted
                    ));
                }
                Progress::PassFinish => {}
                Progress::Message(msg) => {
                    pb.println(format!("  {}", msg));
                }
            }
        })
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<45} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .with_key(
                "eta",
                |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                    let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
                },
            )
            .progress_chars("##-")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use templar::engine::template::RejectionReason;

    #[test]
    fn handler_initializes_in_a_clean_state() {
        let handler = CliProgressHandler::new();
        let state = handler.lock();
        assert_eq!(state.pb.length(), Some(0));
        assert!(state.pb.is_finished());
    }

    #[test]
    fn mutations_drive_the_bar_position() {
        let handler = CliProgressHandler::new();
        handler.start(3);
        handler.mutation_finished();
        handler.mutation_finished();
        {
            let state = handler.lock();
            assert_eq!(state.pb.length(), Some(3));
            assert_eq!(state.pb.position(), 2);
        }
        handler.finish();
        assert_eq!(handler.lock().pb.message(), "✓ Done");
    }

    #[test]
    fn candidate_events_update_the_message() {
        let handler = CliProgressHandler::new();
        handler.start(1);
        let callback = handler.get_callback();

        callback(Progress::PassStart {
            name: "Interface templates",
            total_candidates: 4,
        });
        assert_eq!(handler.lock().pb.message(), "Interface templates");

        callback(Progress::CandidateFinished {
            structure_id: "1ABC".to_string(),
            outcome: CandidateOutcome::Accepted { score: 1.9 },
        });
        callback(Progress::CandidateFinished {
            structure_id: "2XYZ".to_string(),
            outcome: CandidateOutcome::Rejected(RejectionReason::NoPartnerContact),
        });
        assert_eq!(
            handler.lock().pb.message(),
            "Interface templates (2 evaluated, 1 accepted)"
        );

        callback(Progress::PassStart {
            name: "Interface refinement",
            total_candidates: 1,
        });
        assert_eq!(handler.lock().pass.evaluated, 0);
    }

    #[test]
    fn callback_is_thread_safe() {
        let handler = CliProgressHandler::new();
        handler.start(2);
        let callback = handler.get_callback();

        thread::spawn(move || {
            callback(Progress::PassStart {
                name: "Core templates",
                total_candidates: 1,
            });
            callback(Progress::CandidateFinished {
                structure_id: "1ABC".to_string(),
                outcome: CandidateOutcome::Failed("Structure '1ABC' is not available".to_string()),
            });
            callback(Progress::PassFinish);
        })
        .join()
        .unwrap();

        let state = handler.lock();
        assert_eq!(state.pass.evaluated, 1);
        assert_eq!(state.pass.accepted, 0);
        assert_eq!(state.pb.message(), "Core templates (1 evaluated, 0 accepted)");
    }
}
