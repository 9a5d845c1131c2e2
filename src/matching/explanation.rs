//! Per-agent explanations of the matching rounds.
//!
//! The runner reports every decision to an [`ExplanationRecorder`]. The
//! recorder decides what to keep: nothing ([`NoExplanation`]), structured
//! decisions ([`TraceRecorder`]), or localized text
//! ([`TextExplanationRecorder`]).

use crate::language::Language;
use std::collections::BTreeMap;

/// One item claimed by one agent in one round.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClaimDecision {
    /// 1-based round number.
    pub round: usize,

    /// Name of the claimed item.
    pub item: String,

    /// The agent's normalized valuation of the item.
    pub value: f64,

    /// Adjusted weight the matching used for this claim.
    pub weight: f64,

    /// Weight of the best item the agent could have claimed this round.
    pub best_available: f64,
}

impl ClaimDecision {
    /// Weight given up relative to the best available item.
    pub fn lost(&self) -> f64 {
        (self.best_available - self.weight).max(0.0)
    }
}

/// Sink for matching decisions.
pub trait ExplanationRecorder {
    /// Called once per claim, in agent tie-break order within a round.
    fn record_claim(&mut self, agent: &str, decision: &ClaimDecision);

    /// Called when an agent's lost weight is moved onto `item`.
    fn record_compensation(&mut self, _agent: &str, _round: usize, _item: &str, _amount: f64) {}

    /// Called once per agent after the last round.
    fn record_final(&mut self, _agent: &str, _bundle: &[&str], _utility: f64) {}
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExplanation;

impl ExplanationRecorder for NoExplanation {
    fn record_claim(&mut self, _agent: &str, _decision: &ClaimDecision) {}
}

/// Keeps the structured decisions of every agent.
#[derive(Debug, Clone, Default)]
pub struct TraceRecorder {
    traces: BTreeMap<String, Vec<ClaimDecision>>,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn traces(&self) -> &BTreeMap<String, Vec<ClaimDecision>> {
        &self.traces
    }

    pub fn into_traces(self) -> BTreeMap<String, Vec<ClaimDecision>> {
        self.traces
    }
}

impl ExplanationRecorder for TraceRecorder {
    fn record_claim(&mut self, agent: &str, decision: &ClaimDecision) {
        self.traces
            .entry(agent.to_string())
            .or_default()
            .push(decision.clone());
    }
}

/// Writes one localized line per event for every agent.
#[derive(Debug, Clone)]
pub struct TextExplanationRecorder {
    language: Language,
    lines: BTreeMap<String, Vec<String>>,
}

impl TextExplanationRecorder {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            lines: BTreeMap::new(),
        }
    }

    pub fn lines(&self, agent: &str) -> &[String] {
        self.lines.get(agent).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Agent name to its full explanation, one event per line.
    pub fn explanations(&self) -> BTreeMap<String, String> {
        self.lines
            .iter()
            .map(|(agent, lines)| (agent.clone(), lines.join("\n")))
            .collect()
    }

    fn push(&mut self, agent: &str, line: String) {
        self.lines.entry(agent.to_string()).or_default().push(line);
    }
}

impl ExplanationRecorder for TextExplanationRecorder {
    fn record_claim(&mut self, agent: &str, d: &ClaimDecision) {
        let line = match self.language {
            Language::Hebrew => format!(
                "סיבוב {}: קיבלת את הקורס {} (ערך {}).",
                d.round, d.item, d.value
            ),
            Language::English => format!(
                "Round {}: you received course {} (value {}).",
                d.round, d.item, d.value
            ),
        };
        self.push(agent, line);
    }

    fn record_compensation(&mut self, agent: &str, _round: usize, item: &str, amount: f64) {
        let line = match self.language {
            Language::Hebrew => format!(
                "הפסדת {amount} לעומת הקורס הטוב ביותר שהיה זמין. ההפרש נוסף לערך של הקורס {item}."
            ),
            Language::English => format!(
                "You lost {amount} compared to the best course still available. \
                 The difference was added to your value for {item}."
            ),
        };
        self.push(agent, line);
    }

    fn record_final(&mut self, agent: &str, bundle: &[&str], utility: f64) {
        let items = bundle.join(", ");
        let line = match self.language {
            Language::Hebrew => format!("הסל הסופי שלך: {items} (ערך כולל {utility})."),
            Language::English => format!("Your final bundle: {items} (total value {utility})."),
        };
        self.push(agent, line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decision(round: usize, weight: f64, best: f64) -> ClaimDecision {
        ClaimDecision {
            round,
            item: "c1".into(),
            value: 161.0,
            weight,
            best_available: best,
        }
    }

    #[test]
    fn test_lost() {
        assert_eq!(decision(1, 161.0, 420.0).lost(), 259.0);
        assert_eq!(decision(1, 161.0, 161.0).lost(), 0.0);
    }

    #[test]
    fn test_trace_recorder() {
        let mut rec = TraceRecorder::new();
        rec.record_claim("s1", &decision(1, 161.0, 161.0));
        rec.record_claim("s1", &decision(2, 85.0, 85.0));
        rec.record_claim("s2", &decision(1, 161.0, 161.0));
        assert_eq!(rec.traces()["s1"].len(), 2);
        assert_eq!(rec.into_traces()["s2"][0].round, 1);
    }

    #[test]
    fn test_text_recorder_english() {
        let mut rec = TextExplanationRecorder::new(Language::English);
        rec.record_claim("s1", &decision(1, 161.0, 161.0));
        rec.record_compensation("s1", 1, "c3", 12.5);
        rec.record_final("s1", &["c1", "c3"], 581.0);
        assert_eq!(rec.lines("s1").len(), 3);
        assert_eq!(rec.lines("s1")[0], "Round 1: you received course c1 (value 161).");
        assert!(rec.explanations()["s1"].contains("total value 581"));
        assert!(rec.lines("nobody").is_empty());
    }

    #[test]
    fn test_text_recorder_hebrew() {
        let mut rec = TextExplanationRecorder::new(Language::Hebrew);
        rec.record_claim("s1", &decision(3, 161.0, 161.0));
        assert!(rec.lines("s1")[0].starts_with("סיבוב 3"));
    }

    #[test]
    fn test_no_explanation_is_silent() {
        let mut rec = NoExplanation;
        rec.record_claim("s1", &decision(1, 1.0, 1.0));
        rec.record_final("s1", &[], 0.0);
    }
}
