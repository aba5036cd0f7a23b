use sense_detect::SensoryExpression;
use serde::Serialize;

/// Why a substitution was chosen.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Justification {
    /// A substitution path through the STG.
    Path { concepts: Vec<String>, cost: f32 },

    /// A retrieved culturally-grounded candidate.
    Retrieval { provenance: Vec<String>, score: f32 },

    /// Neither source produced anything usable.
    Unresolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    Replaced,
    NoChange,
}

/// Finalized decision for one span.
///
/// A `Replaced` decision always carries a non-`Unresolved` justification;
/// the constructors are the enforcement point, so a decision with neither
/// justification source can never reach output with a replacement attached.
#[derive(Debug, Clone, Serialize)]
pub struct RewriteDecision {
    pub expression: SensoryExpression,
    pub replacement: Option<String>,
    pub justification: Justification,
    pub verdict: Verdict,

    /// Selection confidence; orders the rewriter's least-confident-first
    /// fallback.
    pub confidence: f32,
}

impl RewriteDecision {
    /// A decision to replace the span. `justification` must name a real
    /// source.
    #[must_use]
    pub fn replaced(
        expression: SensoryExpression,
        replacement: String,
        justification: Justification,
        confidence: f32,
    ) -> Self {
        debug_assert!(
            !matches!(justification, Justification::Unresolved),
            "a replacement requires a justification source"
        );
        Self {
            expression,
            replacement: Some(replacement),
            justification,
            verdict: Verdict::Replaced,
            confidence,
        }
    }

    /// A span left unmodified because no justification source produced a
    /// usable substitution. Not a failure.
    #[must_use]
    pub fn unresolved(expression: SensoryExpression) -> Self {
        Self {
            expression,
            replacement: None,
            justification: Justification::Unresolved,
            verdict: Verdict::NoChange,
            confidence: 0.0,
        }
    }

    /// Revert to no-change (rewriter fallback). The original justification
    /// is kept for audit.
    pub fn revert(&mut self) {
        self.verdict = Verdict::NoChange;
        self.replacement = None;
    }

    #[must_use]
    pub fn is_unresolved(&self) -> bool {
        matches!(self.justification, Justification::Unresolved)
    }
}
