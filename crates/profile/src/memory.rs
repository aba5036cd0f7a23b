use crate::error::Result;
use crate::fingerprint::{AccessibilityFingerprint, RewriteStyle};
use crate::store::FingerprintStore;
use sense_taxonomy::Modality;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

/// What happened to a proposed substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Accepted,
    Rejected,
    Unresolved,
}

/// One append-only memory entry. Never mutated after write; later records
/// supersede earlier ones when views are materialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub user_id: String,
    pub timestamp_ms: u64,
    pub surface: String,
    pub modality: Modality,
    pub outcome: Outcome,
    /// Sensitivity shift this record implies, recorded for audit.
    pub fingerprint_delta: BTreeMap<Modality, f32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Sensitivity raise per rejected substitution of a modality.
    pub rejection_bias: f32,

    /// How many recent records the materialized view considers.
    pub history_window: usize,

    /// Learning rate for rewrite-style preference nudges.
    pub style_learning_rate: f32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            rejection_bias: 0.05,
            history_window: 50,
            style_learning_rate: 0.05,
        }
    }
}

/// Append-only agentic memory keyed by user id.
///
/// Appends serialize per user and timestamps are bumped monotonically so the
/// history never interleaves or goes backwards, even across concurrent
/// requests for the same user.
pub struct AgenticMemory {
    store: Arc<dyn FingerprintStore>,
    config: MemoryConfig,
    clocks: Mutex<HashMap<String, Arc<Mutex<u64>>>>,
}

impl AgenticMemory {
    #[must_use]
    pub fn new(store: Arc<dyn FingerprintStore>, config: MemoryConfig) -> Self {
        Self {
            store,
            config,
            clocks: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn store(&self) -> Arc<dyn FingerprintStore> {
        Arc::clone(&self.store)
    }

    /// Stored base fingerprint, or the default profile for an unknown user.
    pub async fn base_fingerprint(&self, user_id: &str) -> Result<AccessibilityFingerprint> {
        Ok(self.store.load(user_id).await?.unwrap_or_default())
    }

    /// Materialized view: the base fingerprint with sensitivities raised by
    /// recent rejections. Strictly raises a modality's sensitivity once that
    /// modality has at least one rejected substitution in the window.
    pub async fn effective_fingerprint(&self, user_id: &str) -> Result<AccessibilityFingerprint> {
        let mut fingerprint = self.base_fingerprint(user_id).await?;
        let history = self.store.history(user_id).await?;

        let window_start = history.len().saturating_sub(self.config.history_window);
        let mut rejections: BTreeMap<Modality, u32> = BTreeMap::new();
        for record in &history[window_start..] {
            if record.outcome == Outcome::Rejected {
                *rejections.entry(record.modality).or_insert(0) += 1;
            }
        }

        for (modality, count) in rejections {
            let base = fingerprint.sensitivity(modality);
            let raised = (base + self.config.rejection_bias * count as f32).clamp(0.0, 1.0);
            fingerprint.sensitivity.insert(modality, raised);
            log::debug!(
                "Effective sensitivity for {modality} raised {base:.3} -> {raised:.3} ({count} rejections)"
            );
        }
        Ok(fingerprint)
    }

    /// Append one record for a finalized decision. Called once per decision.
    pub async fn record_decision(
        &self,
        user_id: &str,
        surface: &str,
        modality: Modality,
        outcome: Outcome,
    ) -> Result<MemoryRecord> {
        let mut delta = BTreeMap::new();
        if outcome == Outcome::Rejected {
            delta.insert(modality, self.config.rejection_bias);
        }

        let clock = self.user_clock(user_id).await;
        let mut last = clock.lock().await;
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64);
        let timestamp_ms = now.max(*last + 1);
        *last = timestamp_ms;

        let record = MemoryRecord {
            user_id: user_id.to_string(),
            timestamp_ms,
            surface: surface.to_string(),
            modality,
            outcome,
            fingerprint_delta: delta,
        };
        self.store.append(&record).await?;
        Ok(record)
    }

    /// Ingest explicit user feedback: appends the record and nudges the
    /// stored rewrite-style preference.
    pub async fn record_feedback(
        &self,
        user_id: &str,
        surface: &str,
        modality: Modality,
        outcome: Outcome,
    ) -> Result<AccessibilityFingerprint> {
        self.record_decision(user_id, surface, modality, outcome)
            .await?;

        let mut fingerprint = self.base_fingerprint(user_id).await?;
        let style = match outcome {
            Outcome::Accepted => Some(RewriteStyle::Gentle),
            Outcome::Rejected => Some(RewriteStyle::Full),
            Outcome::Unresolved => None,
        };
        if let Some(style) = style {
            fingerprint
                .style
                .nudge(style, self.config.style_learning_rate);
            self.store.save(user_id, &fingerprint).await?;
        }
        Ok(fingerprint)
    }

    async fn user_clock(&self, user_id: &str) -> Arc<Mutex<u64>> {
        let mut clocks = self.clocks.lock().await;
        Arc::clone(
            clocks
                .entry(user_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(0))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;

    fn memory() -> AgenticMemory {
        AgenticMemory::new(Arc::new(MemoryStore::new()), MemoryConfig::default())
    }

    #[tokio::test]
    async fn unknown_user_gets_default_fingerprint() {
        let memory = memory();
        let fingerprint = memory.effective_fingerprint("nobody").await.unwrap();
        assert_eq!(fingerprint, AccessibilityFingerprint::default());
    }

    #[tokio::test]
    async fn rejections_raise_effective_sensitivity() {
        let memory = memory();
        let mut base = AccessibilityFingerprint::default();
        base.sensitivity.insert(Modality::Auditory, 0.4);
        memory.store().save("ada", &base).await.unwrap();

        for _ in 0..3 {
            memory
                .record_decision("ada", "ringing", Modality::Auditory, Outcome::Rejected)
                .await
                .unwrap();
        }

        let effective = memory.effective_fingerprint("ada").await.unwrap();
        assert!(effective.sensitivity(Modality::Auditory) > 0.4);
        // base value on disk is untouched
        let stored = memory.store().load("ada").await.unwrap().unwrap();
        assert_eq!(stored.sensitivity(Modality::Auditory), 0.4);
    }

    #[tokio::test]
    async fn accepted_decisions_leave_sensitivity_alone() {
        let memory = memory();
        memory
            .record_decision("ada", "glistening", Modality::Visual, Outcome::Accepted)
            .await
            .unwrap();
        let effective = memory.effective_fingerprint("ada").await.unwrap();
        assert_eq!(effective.sensitivity(Modality::Visual), 0.0);
    }

    #[tokio::test]
    async fn timestamps_are_strictly_monotonic_per_user() {
        let memory = memory();
        let a = memory
            .record_decision("ada", "x", Modality::Visual, Outcome::Accepted)
            .await
            .unwrap();
        let b = memory
            .record_decision("ada", "y", Modality::Visual, Outcome::Accepted)
            .await
            .unwrap();
        assert!(b.timestamp_ms > a.timestamp_ms);
    }

    #[tokio::test]
    async fn feedback_nudges_stored_style() {
        let memory = memory();
        memory
            .record_feedback("ada", "glistening", Modality::Visual, Outcome::Accepted)
            .await
            .unwrap();
        let stored = memory.store().load("ada").await.unwrap().unwrap();
        assert!(stored.style.gentle > 0.33);
    }
}
