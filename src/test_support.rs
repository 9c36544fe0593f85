//! Shared fixtures for unit tests.

use crate::analysis::domain::{Confidence, Judgement, Severity};
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

/// Clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Creates a clock frozen at the given UTC wall time.
    pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Self {
        Self(
            Utc.with_ymd_and_hms(year, month, day, hour, minute, second)
                .single()
                .expect("valid fixed clock instant"),
        )
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Builds an actionable judgement with fixed wording.
pub fn judgement(severity: Severity, confidence: f64) -> Judgement {
    Judgement {
        severity,
        is_actionable: true,
        summary: "Database connection pool exhausted".to_owned(),
        root_cause: "Connections are not returned after timeouts".to_owned(),
        recommended_action: "Release connections in the timeout handler".to_owned(),
        confidence: Confidence::new(confidence).expect("valid confidence"),
    }
}
