use printfit::{
    Document, LayoutAdjuster, LifecycleEvent, PAGE_BREAK_AFTER, Px, prepare_html, style_property,
};

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Shortlisted properties</title></head>
<body>
  <header><div class="agent-name">Maximilian Alexander</div></header>
  <main>
    <div class="block" id="p1">Property 1</div>
    <div class="block" id="p2">Property 2</div>
    <div class="block" id="p3">Property 3</div>
    <div class="block" id="p4">Property 4</div>
    <div class="block" id="p5">Property 5</div>
    <div class="block" id="p6">Property 6</div>
  </main>
  <div class="table-section">
    <table>
      <thead><tr><th>Address</th></tr></thead>
      <tbody>
        <tr id="t1"><td>1</td></tr><tr id="t2"><td>2</td></tr><tr id="t3"><td>3</td></tr>
        <tr id="t4"><td>4</td></tr><tr id="t5"><td>5</td></tr><tr id="t6"><td>6</td></tr>
      </tbody>
    </table>
  </div>
</body>
</html>"#;

fn prop(document: &Document, selector: &str, name: &str) -> Option<String> {
    let node = document
        .select_first(selector)
        .expect("select")
        .expect("node present");
    style_property(&node, name).expect("style readable")
}

#[test]
fn template_is_paginated_and_label_enlarged() {
    let prepared = prepare_html(TEMPLATE, 3);
    let document = Document::parse(&prepared.html);

    assert_eq!(prop(&document, "#p5", PAGE_BREAK_AFTER).as_deref(), Some("always"));
    assert_eq!(prop(&document, "#p6", PAGE_BREAK_AFTER), None);
    assert_eq!(prop(&document, "#t5", PAGE_BREAK_AFTER).as_deref(), Some("always"));
    assert_eq!(prop(&document, "#t4", PAGE_BREAK_AFTER), None);

    assert_eq!(prop(&document, ".agent-name", "font-size").as_deref(), Some("42px"));
    assert_eq!(prop(&document, ".agent-name", "line-height").as_deref(), Some("47px"));
    assert_eq!(prop(&document, ".agent-name", "max-height").as_deref(), Some("94px"));

    assert_eq!(prepared.report.events.len(), 5);
    assert_eq!(prepared.report.events[4], LifecycleEvent::Resize);
    assert_eq!(prepared.report.output_sha256.len(), 64);
}

#[test]
fn preparing_twice_is_stable() {
    let first = prepare_html(TEMPLATE, 0);
    let second = prepare_html(&first.html, 0);
    assert_eq!(first.html, second.html);
    assert_eq!(first.report.output_sha256, second.report.output_sha256);
    assert_eq!(second.report.page_breaks.blocks.changed, 0);
    assert_eq!(second.report.page_breaks.rows.changed, 0);
    assert_eq!(second.report.label.map(|l| l.changed), Some(false));
}

#[test]
fn custom_rules_flow_through_prepare() {
    let adjuster = LayoutAdjuster::builder()
        .break_every(2)
        .label_threshold(40)
        .label_max_height(Px::from_f32(60.5))
        .build()
        .expect("build");
    let prepared = adjuster.prepare(TEMPLATE, 0);
    let document = Document::parse(&prepared.html);

    assert_eq!(prepared.report.page_breaks.blocks.marked, 3);
    assert_eq!(prepared.report.page_breaks.rows.marked, 3);
    assert_eq!(prop(&document, "#p2", PAGE_BREAK_AFTER).as_deref(), Some("always"));
    assert_eq!(prop(&document, ".agent-name", "font-size"), None);
}

#[test]
fn template_without_label_still_gets_page_breaks() {
    let html = TEMPLATE.replace("agent-name", "agent");
    let prepared = prepare_html(&html, 2);
    let document = Document::parse(&prepared.html);

    assert_eq!(prop(&document, "#p5", PAGE_BREAK_AFTER).as_deref(), Some("always"));
    assert_eq!(prop(&document, "#t5", PAGE_BREAK_AFTER).as_deref(), Some("always"));
    assert_eq!(prepared.report.label, None);
    assert_eq!(prepared.report.events.len(), 4);
    assert_eq!(prepared.report.failures.len(), 3);
    assert!(
        prepared
            .report
            .failures
            .iter()
            .all(|f| f.message == "name label not found for selector .agent-name")
    );
    assert_eq!(prepared.report.to_json()["failures"][0]["event"], "load");
}

#[test]
fn clamped_label_keeps_prefixed_declarations() {
    let html = TEMPLATE.replace(
        r#"<div class="agent-name">"#,
        r#"<div class="agent-name" style="display: -webkit-box; -webkit-box-orient: vertical; -webkit-line-clamp: 2">"#,
    );
    let prepared = prepare_html(&html, 1);
    let document = Document::parse(&prepared.html);

    assert_eq!(prop(&document, ".agent-name", "-webkit-box-orient").as_deref(), Some("vertical"));
    assert_eq!(prop(&document, ".agent-name", "-webkit-line-clamp").as_deref(), Some("2"));
    assert_eq!(prop(&document, ".agent-name", "font-size").as_deref(), Some("42px"));
    assert!(!prepared.html.contains("; box-orient"));
}
