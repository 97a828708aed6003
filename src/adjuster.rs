use crate::debug::DebugLogger;
use crate::document::{Document, text_char_count, validate_selector};
use crate::error::PrintPrepError;
use crate::lifecycle::{EventHost, LifecycleEvent};
use crate::metrics::{BreakSetMetrics, LabelOutcome, PageBreakSummary, PrepareReport, sha256_hex};
use crate::policy::{DEFAULT_BREAK_EVERY, LabelRule, break_positions, page_break_patch};
use crate::style::apply_style_patch;
use crate::types::Px;
use rayon::prelude::*;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

pub const DEFAULT_BLOCK_SELECTOR: &str = ".block";
pub const DEFAULT_ROW_SELECTOR: &str = ".table-section tbody tr";
pub const DEFAULT_LABEL_SELECTOR: &str = ".agent-name";

#[derive(Debug, Clone, PartialEq)]
pub struct AdjusterConfig {
    pub block_selector: String,
    pub row_selector: String,
    pub label_selector: String,
    pub break_every: usize,
    pub label_rule: LabelRule,
}

impl Default for AdjusterConfig {
    fn default() -> Self {
        Self {
            block_selector: DEFAULT_BLOCK_SELECTOR.to_string(),
            row_selector: DEFAULT_ROW_SELECTOR.to_string(),
            label_selector: DEFAULT_LABEL_SELECTOR.to_string(),
            break_every: DEFAULT_BREAK_EVERY,
            label_rule: LabelRule::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PreparedHtml {
    pub html: String,
    pub report: PrepareReport,
}

#[derive(Clone)]
pub struct LayoutAdjuster {
    config: AdjusterConfig,
    debug: Option<Arc<DebugLogger>>,
}

impl Default for LayoutAdjuster {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutAdjuster {
    pub fn new() -> Self {
        Self {
            config: AdjusterConfig::default(),
            debug: None,
        }
    }

    pub fn builder() -> LayoutAdjusterBuilder {
        LayoutAdjusterBuilder::new()
    }

    pub fn config(&self) -> &AdjusterConfig {
        &self.config
    }

    pub(crate) fn debug_logger(&self) -> Option<Arc<DebugLogger>> {
        self.debug.clone()
    }

    /// Flags every `break_every`-th block and every `break_every`-th table-body
    /// row with `page-break-after: always`. The two queries are counted
    /// independently, each over its own flattened result set.
    pub fn apply_page_breaks(&self, document: &Document) -> Result<PageBreakSummary, PrintPrepError> {
        let blocks = self.mark_breaks(document, &self.config.block_selector, "blocks")?;
        let rows = self.mark_breaks(document, &self.config.row_selector, "rows")?;
        Ok(PageBreakSummary { blocks, rows })
    }

    fn mark_breaks(
        &self,
        document: &Document,
        selector: &str,
        set_name: &str,
    ) -> Result<BreakSetMetrics, PrintPrepError> {
        let nodes = document.select_all(selector)?;
        let patch = page_break_patch();
        let mut metrics = BreakSetMetrics {
            matched: nodes.len(),
            ..BreakSetMetrics::default()
        };
        for index in break_positions(nodes.len(), self.config.break_every) {
            metrics.marked += 1;
            if apply_style_patch(&nodes[index], &patch)? {
                metrics.changed += 1;
            }
        }
        if let Some(logger) = &self.debug {
            logger.log(
                "adjust.page_breaks",
                json!({
                    "set": set_name,
                    "selector": selector,
                    "every": self.config.break_every,
                    "matched": metrics.matched,
                    "marked": metrics.marked,
                    "changed": metrics.changed,
                }),
            );
            logger.increment(&format!("page_breaks.{set_name}.marked"), metrics.marked as u64);
        }
        Ok(metrics)
    }

    /// Enlarges the name label when its text runs past the configured
    /// threshold. Labels at or under the threshold keep their current style.
    pub fn adjust_name_label_font_size(
        &self,
        document: &Document,
    ) -> Result<LabelOutcome, PrintPrepError> {
        let selector = &self.config.label_selector;
        let label = document
            .select_first(selector)?
            .ok_or_else(|| PrintPrepError::LabelNotFound(selector.clone()))?;
        let char_count = text_char_count(&label);
        let outcome = match self.config.label_rule.patch_for(char_count) {
            Some(patch) => LabelOutcome {
                char_count,
                enlarged: true,
                changed: apply_style_patch(&label, &patch)?,
            },
            None => LabelOutcome {
                char_count,
                enlarged: false,
                changed: false,
            },
        };
        if let Some(logger) = &self.debug {
            logger.log(
                "adjust.label",
                json!({
                    "selector": selector,
                    "char_count": outcome.char_count,
                    "threshold": self.config.label_rule.threshold,
                    "enlarged": outcome.enlarged,
                    "changed": outcome.changed,
                }),
            );
            logger.increment("label.passes", 1);
        }
        Ok(outcome)
    }

    /// Parses `html`, replays content-ready, load and `resize_events` resizes
    /// through the standard event host, and serializes the result.
    ///
    /// A faulting handler does not abort preparation: the fault lands in
    /// `PrepareReport::failures` and the adjustments that did apply are kept.
    pub fn prepare(&self, html: &str, resize_events: usize) -> PreparedHtml {
        self.prepare_document(None, html, resize_events)
    }

    /// Prepares independent documents in parallel. Results keep input order
    /// and debug records carry the input index as `doc_id`.
    pub fn prepare_batch<S>(&self, inputs: &[S], resize_events: usize) -> Vec<PreparedHtml>
    where
        S: AsRef<str> + Sync,
    {
        inputs
            .par_iter()
            .enumerate()
            .map(|(idx, html)| self.prepare_document(Some(idx), html.as_ref(), resize_events))
            .collect()
    }

    fn prepare_document(
        &self,
        doc_id: Option<usize>,
        html: &str,
        resize_events: usize,
    ) -> PreparedHtml {
        let started = Instant::now();
        let adjuster = LayoutAdjuster {
            config: self.config.clone(),
            debug: self
                .debug
                .as_ref()
                .map(|logger| Arc::new(logger.for_document(doc_id))),
        };
        let document = Document::parse(html);
        let host = EventHost::standard(adjuster.clone());
        let mut report = PrepareReport::default();

        let events = [LifecycleEvent::ContentReady, LifecycleEvent::Load]
            .into_iter()
            .chain(std::iter::repeat(LifecycleEvent::Resize).take(resize_events));
        for event in events {
            let dispatch = host.dispatch(event, &document);
            for outcome in dispatch.outcomes {
                report.record(outcome);
            }
            report.failures.extend(dispatch.failures);
            report.events.push(event);
        }

        let html = document.to_html();
        report.output_sha256 = sha256_hex(html.as_bytes());
        report.elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        if let Some(logger) = &adjuster.debug {
            logger.log(
                "prepare.done",
                json!({
                    "events": report.events.len(),
                    "failures": report.failures.len(),
                    "bytes": html.len(),
                    "ms": report.elapsed_ms,
                    "sha256": report.output_sha256,
                }),
            );
            logger.emit_summary("prepare");
            logger.flush();
        }
        PreparedHtml { html, report }
    }
}

#[derive(Clone)]
pub struct LayoutAdjusterBuilder {
    config: AdjusterConfig,
    debug_path: Option<PathBuf>,
}

impl Default for LayoutAdjusterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutAdjusterBuilder {
    pub fn new() -> Self {
        Self {
            config: AdjusterConfig::default(),
            debug_path: None,
        }
    }

    pub fn block_selector(mut self, selector: impl Into<String>) -> Self {
        self.config.block_selector = selector.into();
        self
    }

    pub fn row_selector(mut self, selector: impl Into<String>) -> Self {
        self.config.row_selector = selector.into();
        self
    }

    pub fn label_selector(mut self, selector: impl Into<String>) -> Self {
        self.config.label_selector = selector.into();
        self
    }

    pub fn break_every(mut self, every: usize) -> Self {
        self.config.break_every = every;
        self
    }

    pub fn label_threshold(mut self, threshold: usize) -> Self {
        self.config.label_rule.threshold = threshold;
        self
    }

    pub fn label_font_size(mut self, value: Px) -> Self {
        self.config.label_rule.font_size = value;
        self
    }

    pub fn label_line_height(mut self, value: Px) -> Self {
        self.config.label_rule.line_height = value;
        self
    }

    pub fn label_max_height(mut self, value: Px) -> Self {
        self.config.label_rule.max_height = value;
        self
    }

    pub fn label_rule(mut self, rule: LabelRule) -> Self {
        self.config.label_rule = rule;
        self
    }

    // JSONL trace of every pass; the file is truncated on build.
    pub fn debug_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.debug_path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<LayoutAdjuster, PrintPrepError> {
        let config = self.config;
        if config.break_every == 0 {
            return Err(PrintPrepError::InvalidConfiguration(
                "break_every must be at least 1".to_string(),
            ));
        }
        for selector in [
            &config.block_selector,
            &config.row_selector,
            &config.label_selector,
        ] {
            validate_selector(selector)?;
        }
        let rule = &config.label_rule;
        for (name, value) in [
            ("font_size", rule.font_size),
            ("line_height", rule.line_height),
            ("max_height", rule.max_height),
        ] {
            if value.is_negative() {
                return Err(PrintPrepError::InvalidConfiguration(format!(
                    "label {name} must not be negative"
                )));
            }
        }
        let debug = match self.debug_path {
            Some(path) => Some(Arc::new(DebugLogger::new(path)?)),
            None => None,
        };
        Ok(LayoutAdjuster { config, debug })
    }
}
