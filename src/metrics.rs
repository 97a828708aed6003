use crate::lifecycle::LifecycleEvent;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};

/// Result of one page-break query: how many elements matched, how many were
/// flagged, and how many of those actually needed their style rewritten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BreakSetMetrics {
    pub matched: usize,
    pub marked: usize,
    pub changed: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageBreakSummary {
    pub blocks: BreakSetMetrics,
    pub rows: BreakSetMetrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelOutcome {
    pub char_count: usize,
    pub enlarged: bool,
    pub changed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    PageBreaks(PageBreakSummary),
    Label(LabelOutcome),
}

/// A handler that faulted during dispatch. The fault is reported here and the
/// remaining handlers and events still run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerFailure {
    pub event: LifecycleEvent,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct PrepareReport {
    pub page_breaks: PageBreakSummary,
    pub label: Option<LabelOutcome>,
    pub events: Vec<LifecycleEvent>,
    pub failures: Vec<HandlerFailure>,
    pub elapsed_ms: f64,
    pub output_sha256: String,
}

impl PrepareReport {
    pub(crate) fn record(&mut self, outcome: PassOutcome) {
        match outcome {
            PassOutcome::PageBreaks(summary) => self.page_breaks = summary,
            PassOutcome::Label(label) => self.label = Some(label),
        }
    }

    pub fn to_json(&self) -> Value {
        let set = |m: &BreakSetMetrics| {
            json!({ "matched": m.matched, "marked": m.marked, "changed": m.changed })
        };
        let label = match &self.label {
            Some(label) => json!({
                "char_count": label.char_count,
                "enlarged": label.enlarged,
                "changed": label.changed,
            }),
            None => Value::Null,
        };
        let events: Vec<&str> = self.events.iter().map(|e| e.as_str()).collect();
        let failures: Vec<Value> = self
            .failures
            .iter()
            .map(|f| json!({ "event": f.event.as_str(), "message": f.message }))
            .collect();
        json!({
            "blocks": set(&self.page_breaks.blocks),
            "rows": set(&self.page_breaks.rows),
            "label": label,
            "events": events,
            "failures": failures,
            "elapsed_ms": self.elapsed_ms,
            "output_sha256": self.output_sha256,
        })
    }
}

pub(crate) fn sha256_hex(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest.iter() {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}
