use ci_yaml::frontend::read_stream;
use ci_yaml::{Options, SourceBody, SourceNode, parse};

/// `script: &a0 [&a1 [ ... [x, x, ...] ... ]]` with an anchor on every level,
/// followed by an alias to the innermost list.
fn nested_anchors_yaml(levels: usize, width: usize) -> String {
    let mut yaml = String::from("language: ruby\nscript: ");
    for level in 0..levels {
        yaml.push_str(&format!("&a{level} ["));
    }
    yaml.push_str(&vec!["x"; width].join(", "));
    yaml.push_str(&"]".repeat(levels));
    yaml.push_str(&format!("\ninner: *a{}\n", levels - 1));
    yaml
}

fn root_of(stream: &SourceNode) -> &SourceNode {
    match stream.first_document().map(|d| &d.body) {
        Some(SourceBody::Document(Some(root))) => root,
        other => panic!("no document root: {other:?}"),
    }
}

#[test]
fn nested_anchors_are_not_copied() {
    let levels = 200;
    let yaml = nested_anchors_yaml(levels, 5_000);
    let stream = read_stream(&yaml, &Options::default()).unwrap();
    let root = root_of(&stream);

    let mut list = &root.children()[3];
    for _ in 1..levels {
        list = &list.children()[0];
    }
    assert_eq!(list.children().len(), 5_000);

    let alias = &root.children()[5];
    let shared = alias.resolved().shared_children().unwrap();
    assert!(std::rc::Rc::ptr_eq(shared, list.shared_children().unwrap()));
}

#[test]
fn nested_anchor_lists_are_pruned_from_stages() {
    let yaml = nested_anchors_yaml(50, 1_000);
    let root = parse(&yaml).unwrap();
    assert_eq!(root.language(), Some("ruby"));
    assert_eq!(root.stage("script").map(|s| s.len()), Some(0));
    assert_eq!(
        root.nested_warnings(),
        [
            r#"unexpected key "inner", dropping"#,
            "unexpected sequence, expected a scalar",
        ]
    );
}
