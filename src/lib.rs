mod adjuster;
mod debug;
mod document;
mod error;
mod lifecycle;
mod metrics;
mod policy;
#[cfg(feature = "python")]
mod python;
mod style;
mod types;

pub use adjuster::{
    AdjusterConfig, DEFAULT_BLOCK_SELECTOR, DEFAULT_LABEL_SELECTOR, DEFAULT_ROW_SELECTOR,
    LayoutAdjuster, LayoutAdjusterBuilder, PreparedHtml,
};
pub use document::{Document, text_char_count};
pub use error::PrintPrepError;
pub use lifecycle::{Dispatch, EventHost, Handler, LifecycleEvent};
pub use metrics::{
    BreakSetMetrics, HandlerFailure, LabelOutcome, PageBreakSummary, PassOutcome, PrepareReport,
};
pub use policy::{
    DEFAULT_BREAK_EVERY, LabelRule, PAGE_BREAK_AFTER, PAGE_BREAK_ALWAYS, break_positions,
    breaks_after, page_break_patch,
};
pub use style::{
    Declaration, InlineStyle, StylePatch, apply_style_patch, inline_style, style_property,
};
pub use types::Px;

/// Prepares `html` for print with the default rules: content-ready, load,
/// then `resize_events` resizes. Handler faults are listed in the report.
pub fn prepare_html(html: &str, resize_events: usize) -> PreparedHtml {
    LayoutAdjuster::new().prepare(html, resize_events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_prepare_matches_reference_scenario() {
        let mut html = String::from(r#"<h1 class="agent-name">SupportAgentXYZAB</h1>"#);
        for idx in 1..=12 {
            html.push_str(&format!(r#"<section class="block" id="b{idx}"></section>"#));
        }
        let prepared = prepare_html(&html, 0);
        assert!(prepared.report.failures.is_empty());
        let document = Document::parse(&prepared.html);
        let flagged: Vec<usize> = (1..=12)
            .filter(|idx| {
                let node = document
                    .select_first(&format!("#b{idx}"))
                    .expect("select")
                    .expect("node");
                style_property(&node, PAGE_BREAK_AFTER).expect("read").as_deref()
                    == Some(PAGE_BREAK_ALWAYS)
            })
            .collect();
        assert_eq!(flagged, vec![5, 10]);
    }

    #[test]
    fn errors_render_readable_messages() {
        assert_eq!(
            PrintPrepError::LabelNotFound(".agent-name".to_string()).to_string(),
            "name label not found for selector .agent-name"
        );
        let io = PrintPrepError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(std::error::Error::source(&io).is_some());
    }
}
