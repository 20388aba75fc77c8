use super::*;
use crate::xml::parse;

fn project_src(src: &str) -> ProjectedNode {
    let doc = parse(src.as_bytes()).unwrap();
    project(&doc.root, &ProjectOptions::default()).unwrap()
}

#[test]
fn test_labels_and_nesting() {
    let tree = project_src("<root><a><a1/></a><b/></root>");
    assert_eq!(tree.labels_preorder(), vec!["root", "a", "a1", "b"]);
    assert_eq!(tree.children.len(), 2);
    assert_eq!(tree.children[0].children.len(), 1);
}

#[test]
fn test_attribute_summary_keeps_declaration_order() {
    let tree = project_src(r#"<e b="2" a="1"/>"#);
    assert_eq!(tree.attribute_summary, r#"b="2", a="1""#);
}

#[test]
fn test_attribute_summary_escapes_quotes() {
    let tree = project_src(r#"<e say='he said "hi" &amp; left'/>"#);
    assert_eq!(
        tree.attribute_summary,
        r#"say="he said &quot;hi&quot; &amp; left""#
    );
}

#[test]
fn test_no_attributes_gives_empty_summary() {
    assert_eq!(project_src("<e/>").attribute_summary, "");
}

#[test]
fn test_entity_decoded_inline_text() {
    let tree = project_src("<a>&lt;hello&gt;</a>");
    assert_eq!(tree.inline_text, "<hello>");
}

#[test]
fn test_last_text_child_wins() {
    let tree = project_src("<a>first<b/>second</a>");
    assert_eq!(tree.inline_text, "second");
    assert_eq!(tree.children.len(), 1);
}

#[test]
fn test_comments_are_not_projected() {
    let tree = project_src("<a><!-- note --><b/><!-- more --></a>");
    assert_eq!(tree.children.len(), 1);
    assert_eq!(tree.inline_text, "");
    assert_eq!(tree.node_count(), 2);
}

#[test]
fn test_depth_guard() {
    let src = format!("{}{}", "<n>".repeat(10), "</n>".repeat(10));
    let doc = parse(src.as_bytes()).unwrap();

    let ok = project(&doc.root, &ProjectOptions { max_depth: 10 });
    assert!(ok.is_ok());

    let err = project(&doc.root, &ProjectOptions { max_depth: 9 }).unwrap_err();
    assert_eq!(err.limit, 9);
    assert_eq!(err.label, "n");
    assert!(err.to_string().contains("too deeply nested"));
}

#[test]
fn test_default_guard_trips_before_stack_exhaustion() {
    let depth = DEFAULT_MAX_DEPTH + 50;
    let src = format!("{}{}", "<n>".repeat(depth), "</n>".repeat(depth));
    let doc = parse(src.as_bytes()).unwrap();

    let err = project(&doc.root, &ProjectOptions::default()).unwrap_err();
    assert_eq!(err.limit, DEFAULT_MAX_DEPTH);
}

#[test]
fn test_projection_is_pure() {
    let doc = parse(br#"<r x="1"><a>t</a><b y="2"/></r>"#).unwrap();
    let options = ProjectOptions::default();
    assert_eq!(
        project(&doc.root, &options).unwrap(),
        project(&doc.root, &options).unwrap()
    );
}
