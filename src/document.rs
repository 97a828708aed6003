use crate::error::PrintPrepError;
use kuchiki::traits::TendrilSink;
use kuchiki::{NodeRef, Selectors};
use unicode_segmentation::UnicodeSegmentation;

/// A parsed HTML document whose element styles the adjuster mutates in place.
pub struct Document {
    root: NodeRef,
}

impl Document {
    pub fn parse(html: &str) -> Self {
        Self {
            root: kuchiki::parse_html().one(html),
        }
    }

    /// All elements matching `selector`, in document order.
    pub fn select_all(&self, selector: &str) -> Result<Vec<NodeRef>, PrintPrepError> {
        let matches = self
            .root
            .select(selector)
            .map_err(|_| PrintPrepError::InvalidSelector(selector.to_string()))?;
        Ok(matches.map(|element| element.as_node().clone()).collect())
    }

    pub fn select_first(&self, selector: &str) -> Result<Option<NodeRef>, PrintPrepError> {
        let mut matches = self
            .root
            .select(selector)
            .map_err(|_| PrintPrepError::InvalidSelector(selector.to_string()))?;
        Ok(matches.next().map(|element| element.as_node().clone()))
    }

    pub fn to_html(&self) -> String {
        self.root.to_string()
    }
}

pub fn validate_selector(selector: &str) -> Result<(), PrintPrepError> {
    Selectors::compile(selector)
        .map(|_| ())
        .map_err(|_| PrintPrepError::InvalidSelector(selector.to_string()))
}

/// Displayed characters (extended grapheme clusters) of a node's text
/// content, whitespace included.
pub fn text_char_count(node: &NodeRef) -> usize {
    node.text_contents().graphemes(true).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_all_preserves_document_order() {
        let doc = Document::parse(
            r#"<div class="block" id="a"></div><p><span class="block" id="b"></span></p><div class="block" id="c"></div>"#,
        );
        let ids: Vec<String> = doc
            .select_all(".block")
            .expect("select")
            .iter()
            .filter_map(|node| {
                node.as_element()
                    .and_then(|el| el.attributes.borrow().get("id").map(str::to_string))
            })
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn invalid_selector_is_reported() {
        let doc = Document::parse("<div></div>");
        match doc.select_all("div[") {
            Err(PrintPrepError::InvalidSelector(sel)) => assert_eq!(sel, "div["),
            other => panic!("expected invalid selector, got {:?}", other.map(|v| v.len())),
        }
        assert!(validate_selector("..nope").is_err());
        assert!(validate_selector(".table-section tbody tr").is_ok());
    }

    #[test]
    fn select_first_returns_none_without_match() {
        let doc = Document::parse("<div></div>");
        assert!(doc.select_first(".agent-name").expect("select").is_none());
    }

    #[test]
    fn char_count_counts_characters_not_bytes() {
        let doc = Document::parse(r#"<div class="agent-name">Nguyễn Văn</div>"#);
        let label = doc
            .select_first(".agent-name")
            .expect("select")
            .expect("label");
        assert_eq!(text_char_count(&label), 10);
        assert!("Nguyễn Văn".len() > 10);
    }

    #[test]
    fn char_count_treats_combining_sequences_as_one_character() {
        let decomposed = "Nguye\u{302}\u{303}n Va\u{306}n Tua\u{302}\u{301}n";
        assert_eq!(decomposed.chars().count(), 20);
        let doc = Document::parse(&format!(r#"<div class="agent-name">{decomposed}</div>"#));
        let label = doc
            .select_first(".agent-name")
            .expect("select")
            .expect("label");
        assert_eq!(text_char_count(&label), 15);

        let family = "A\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}";
        let doc = Document::parse(&format!(r#"<div class="agent-name">{family}</div>"#));
        let label = doc
            .select_first(".agent-name")
            .expect("select")
            .expect("label");
        assert_eq!(text_char_count(&label), 2);
    }

    #[test]
    fn serialization_reflects_mutations() {
        let doc = Document::parse(r#"<div class="block">x</div>"#);
        let node = doc.select_first(".block").expect("select").expect("node");
        if let Some(el) = node.as_element() {
            el.attributes
                .borrow_mut()
                .insert("style", "page-break-after: always".to_string());
        }
        assert!(doc.to_html().contains(r#"style="page-break-after: always""#));
    }
}
