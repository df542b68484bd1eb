use super::template::RejectionReason;

#[derive(Debug, Clone, PartialEq)]
pub enum CandidateOutcome {
    Accepted { score: f64 },
    Rejected(RejectionReason),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    PassStart {
        name: &'static str,
        total_candidates: u64,
    },
    CandidateFinished {
        structure_id: String,
        outcome: CandidateOutcome,
    },
    PassFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

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
}
