use chrono::{Local, NaiveDate};

/// Acting user assumed by scheduled imports.
pub const ADMINISTRATOR: &str = "Administrator";

/// Execution context for an import run.
///
/// Carries the already-authenticated actor and the run date instead of
/// relying on process-wide state. The run date doubles as the due date of
/// every imported document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportContext {
    pub actor: String,
    pub run_date: NaiveDate,
}

impl ImportContext {
    pub fn new(actor: impl Into<String>, run_date: NaiveDate) -> Self {
        Self {
            actor: actor.into(),
            run_date,
        }
    }

    /// Administrator context dated today (local time).
    pub fn administrator() -> Self {
        Self::new(ADMINISTRATOR, Local::now().date_naive())
    }
}
