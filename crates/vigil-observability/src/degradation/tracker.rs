//! Per-component degradation episodes: when a component fell back, why,
//! what it fell back to, and when it came back.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::tracing_setup::events;

/// Episodes kept per component once closed ones start piling up.
const EPISODES_PER_COMPONENT: usize = 64;

/// One stretch of time a component spent in a reduced mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegradationEpisode {
    pub component: String,
    pub cause: String,
    pub fallback: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl DegradationEpisode {
    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct DegradationTracker {
    by_component: BTreeMap<String, VecDeque<DegradationEpisode>>,
}

impl DegradationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an episode for `component`. Returns false when one is already open.
    pub fn enter(&mut self, component: &str, cause: &str, fallback: &str) -> bool {
        self.enter_at(component, cause, fallback, Utc::now())
    }

    pub fn enter_at(
        &mut self,
        component: &str,
        cause: &str,
        fallback: &str,
        at: DateTime<Utc>,
    ) -> bool {
        let episodes = self.by_component.entry(component.to_string()).or_default();
        if episodes.back().is_some_and(DegradationEpisode::is_open) {
            return false;
        }
        events::degradation_triggered(component, cause, fallback);
        episodes.push_back(DegradationEpisode {
            component: component.to_string(),
            cause: cause.to_string(),
            fallback: fallback.to_string(),
            started_at: at,
            ended_at: None,
        });
        while episodes.len() > EPISODES_PER_COMPONENT {
            episodes.pop_front();
        }
        true
    }

    /// Close the open episode of `component`, if any.
    pub fn recover(&mut self, component: &str) -> bool {
        let Some(open) = self
            .by_component
            .get_mut(component)
            .and_then(|eps| eps.back_mut())
            .filter(|ep| ep.is_open())
        else {
            return false;
        };
        let now = Utc::now();
        open.ended_at = Some(now);
        events::component_recovered(component, (now - open.started_at).num_seconds());
        true
    }

    pub fn is_degraded(&self, component: &str) -> bool {
        self.open_episode(component).is_some()
    }

    pub fn open_episode(&self, component: &str) -> Option<&DegradationEpisode> {
        self.by_component
            .get(component)
            .and_then(|eps| eps.back())
            .filter(|ep| ep.is_open())
    }

    pub fn active(&self) -> Vec<&DegradationEpisode> {
        self.by_component
            .keys()
            .filter_map(|c| self.open_episode(c))
            .collect()
    }

    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.by_component.keys().map(String::as_str)
    }

    pub fn episodes(&self, component: &str) -> impl Iterator<Item = &DegradationEpisode> {
        self.by_component.get(component).into_iter().flatten()
    }

    /// Episodes of `component` that started within `window` before `now`.
    pub fn started_within(&self, component: &str, window: Duration, now: DateTime<Utc>) -> usize {
        let cutoff = now - window;
        self.episodes(component)
            .filter(|ep| ep.started_at > cutoff)
            .count()
    }

    /// Time since the open episode of `component` started.
    pub fn degraded_for(&self, component: &str, now: DateTime<Utc>) -> Option<Duration> {
        self.open_episode(component).map(|ep| now - ep.started_at)
    }
}
