use crate::style::StylePatch;
use crate::types::Px;

pub const PAGE_BREAK_AFTER: &str = "page-break-after";
pub const PAGE_BREAK_ALWAYS: &str = "always";
pub const DEFAULT_BREAK_EVERY: usize = 5;

/// True when the element at `index` (zero-based) closes a group of `every`.
pub fn breaks_after(index: usize, every: usize) -> bool {
    every > 0 && (index + 1) % every == 0
}

/// Zero-based indices in a set of `count` elements that force a page break.
pub fn break_positions(count: usize, every: usize) -> impl Iterator<Item = usize> {
    (0..count).filter(move |&index| breaks_after(index, every))
}

pub fn page_break_patch() -> StylePatch {
    StylePatch::new().with(PAGE_BREAK_AFTER, PAGE_BREAK_ALWAYS)
}

/// One-directional enlargement of the name label: labels longer than
/// `threshold` characters get the fixed font-size/line-height/max-height
/// triple, shorter labels are never touched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelRule {
    pub threshold: usize,
    pub font_size: Px,
    pub line_height: Px,
    pub max_height: Px,
}

impl Default for LabelRule {
    fn default() -> Self {
        Self {
            threshold: 16,
            font_size: Px::from_i32(42),
            line_height: Px::from_i32(47),
            max_height: Px::from_i32(94),
        }
    }
}

impl LabelRule {
    pub fn exceeds(&self, char_count: usize) -> bool {
        char_count > self.threshold
    }

    pub fn patch_for(&self, char_count: usize) -> Option<StylePatch> {
        if !self.exceeds(char_count) {
            return None;
        }
        Some(
            StylePatch::new()
                .with("font-size", self.font_size.to_css())
                .with("line-height", self.line_height.to_css())
                .with("max-height", self.max_height.to_css()),
        )
    }
}
