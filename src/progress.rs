use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::{KeyValueStore, StoreError};

pub const PROGRESS_STORAGE_KEY: &str = "apush_progress";
const MAX_MASTERY: u8 = 100;

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("stored progress is corrupt: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodProgress {
    #[serde(default)]
    pub completed: bool,
    /// Percent, 0..=100.
    #[serde(default)]
    pub mastery: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    #[serde(default)]
    pub periods: BTreeMap<u8, PeriodProgress>,
    #[serde(default)]
    pub practice_questions: u32,
    #[serde(default)]
    pub study_minutes: u32,
    #[serde(default)]
    pub last_studied_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressSummary {
    pub completed_periods: usize,
    pub practice_questions: u32,
    pub study_hours: u32,
    pub overall_mastery: u8,
}

impl Progress {
    pub fn load<S: KeyValueStore>(store: &S) -> Result<Self, ProgressError> {
        match store.get(PROGRESS_STORAGE_KEY)? {
            Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
            _ => Ok(Self::default()),
        }
    }

    pub fn save<S: KeyValueStore>(&self, store: &mut S) -> Result<(), ProgressError> {
        let raw = serde_json::to_string(self)?;
        store.set(PROGRESS_STORAGE_KEY, &raw)?;
        Ok(())
    }

    pub fn record_practice(&mut self, questions: u32) {
        self.practice_questions = self.practice_questions.saturating_add(questions);
        self.touch();
    }

    pub fn add_study_minutes(&mut self, minutes: u32) {
        self.study_minutes = self.study_minutes.saturating_add(minutes);
        self.touch();
    }

    pub fn mark_completed(&mut self, period: u8) {
        self.periods.entry(period).or_default().completed = true;
        self.touch();
    }

    pub fn set_mastery(&mut self, period: u8, percent: u8) {
        self.periods.entry(period).or_default().mastery = percent.min(MAX_MASTERY);
        self.touch();
    }

    fn touch(&mut self) {
        self.last_studied_at = Some(Utc::now());
    }

    pub fn overall_mastery(&self) -> u8 {
        if self.periods.is_empty() {
            return 0;
        }
        let total: u32 = self.periods.values().map(|p| u32::from(p.mastery)).sum();
        (total as f64 / self.periods.len() as f64).round() as u8
    }

    pub fn summary(&self) -> ProgressSummary {
        ProgressSummary {
            completed_periods: self.periods.values().filter(|p| p.completed).count(),
            practice_questions: self.practice_questions,
            study_hours: (self.study_minutes as f64 / 60.0).round() as u32,
            overall_mastery: self.overall_mastery(),
        }
    }
}
