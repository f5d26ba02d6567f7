//! Alerts over degradation history: a component that keeps falling back
//! warns, one that never comes back is critical.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use super::tracker::DegradationTracker;

/// Alert severity level, shared with metric alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Warning,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DegradationAlert {
    pub level: AlertLevel,
    pub component: String,
    pub message: String,
}

const REPEAT_WINDOW_HOURS: i64 = 1;
const REPEAT_LIMIT: usize = 3;
const STUCK_HOURS: i64 = 24;

/// At most one alert per component; a stuck component outranks a flapping one.
pub fn evaluate_alerts(tracker: &DegradationTracker) -> Vec<DegradationAlert> {
    let now = Utc::now();
    tracker
        .components()
        .filter_map(|component| {
            if let Some(open_for) = tracker.degraded_for(component, now) {
                if open_for > Duration::hours(STUCK_HOURS) {
                    return Some(DegradationAlert {
                        level: AlertLevel::Critical,
                        component: component.to_string(),
                        message: format!(
                            "{component} degraded for {}h without recovering",
                            open_for.num_hours()
                        ),
                    });
                }
            }
            let repeats =
                tracker.started_within(component, Duration::hours(REPEAT_WINDOW_HOURS), now);
            (repeats > REPEAT_LIMIT).then(|| DegradationAlert {
                level: AlertLevel::Warning,
                component: component.to_string(),
                message: format!("{component} degraded {repeats} times in the last hour"),
            })
        })
        .collect()
}
