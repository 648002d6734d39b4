use ci_yaml::nodes::{FieldSpec, MappingSchema, NodeType, SequenceSchema};
use ci_yaml::{Adapter, Node, Options, SourceNode, Visit, parse, parse_source};
use indoc::indoc;

static PROVIDER: MappingSchema = MappingSchema {
    name: "provider",
    fields: &[
        FieldSpec::new(&["provider"], "provider"),
        FieldSpec::new(&["api_key", "token"], "api_key"),
        FieldSpec::new(&["app"], "app"),
        FieldSpec::new(&["on"], "on").of(NodeType::Sequence(&BRANCHES)),
    ],
    required_together: &[&["provider", "api_key"]],
};

static BRANCHES: SequenceSchema = SequenceSchema {
    name: "branches",
    element: None,
    parent: Some(&ci_yaml::nodes::SEQUENCE),
};

/// A list whose elements are lists of the same type.
static NESTED: SequenceSchema = SequenceSchema {
    name: "nested",
    element: Some(NodeType::Sequence(&NESTED)),
    parent: None,
};

fn s(text: &str) -> SourceNode {
    SourceNode::scalar(text)
}

fn build(ty: NodeType, source: &SourceNode, options: &Options) -> Node {
    let mut node = Node::new(ty);
    Adapter::new(options).accept(&mut node, source);
    node.deep_verify();
    node
}

#[test]
fn required_together_group() {
    let source = SourceNode::mapping([(s("provider"), s("heroku")), (s("app"), s("demo"))]);
    let node = build(NodeType::Mapping(&PROVIDER), &source, &Options::default());
    assert_eq!(
        node.errors(),
        [r#""api_key" required together with "provider""#]
    );

    let source = SourceNode::mapping([(s("provider"), s("heroku")), (s("token"), s("xyz"))]);
    let node = build(NodeType::Mapping(&PROVIDER), &source, &Options::default());
    assert!(node.errors().is_empty());
    let mapping = node.as_mapping().expect("mapping");
    assert_eq!(mapping.get("api_key").and_then(Node::as_str), Some("xyz"));

    let source = SourceNode::mapping([(s("app"), s("demo"))]);
    let node = build(NodeType::Mapping(&PROVIDER), &source, &Options::default());
    assert!(node.errors().is_empty());
}

#[test]
fn nested_warnings_carry_paths() {
    let source = SourceNode::mapping([
        (s("app"), s("demo")),
        (
            s("on"),
            SourceNode::sequence(vec![s("main"), SourceNode::mapping([(s("x"), s("y"))])]),
        ),
        (s("colour"), s("blue")),
    ]);
    let node = build(NodeType::Mapping(&PROVIDER), &source, &Options::default());
    assert_eq!(
        node.nested_warnings_with_path(),
        [
            (vec![], r#"unexpected key "colour", dropping"#.to_owned()),
            (
                vec!["on".to_owned()],
                "unexpected mapping, expected a scalar".to_owned()
            ),
        ]
    );
    let on = node.as_mapping().and_then(|m| m.get("on")).and_then(Node::as_sequence);
    assert_eq!(on.map(|s| s.strings()), Some(vec!["main"]));
}

#[test]
fn keys_lose_their_symbol_marker() {
    let source = SourceNode::mapping([(s(":app"), s("demo"))]);
    let node = build(NodeType::Mapping(&PROVIDER), &source, &Options::default());
    let mapping = node.as_mapping().expect("mapping");
    assert_eq!(mapping.get("app").and_then(Node::as_str), Some("demo"));
    assert_eq!(mapping.source_key("app"), Some("app"));
}

#[test]
fn unrepresentable_keys_are_skipped() {
    let source = SourceNode::mapping([
        (s("1").with_tag("tag:yaml.org,2002:int"), s("one")),
        (SourceNode::sequence(vec![s("a")]), s("two")),
        (s("app"), s("demo")),
    ]);
    let node = build(NodeType::Mapping(&PROVIDER), &source, &Options::default());
    assert_eq!(
        node.warnings(),
        [
            r#"unexpected key "1", expected a string, dropping"#,
            "unexpected key sequence, expected a string, dropping",
        ]
    );
    assert_eq!(node.as_mapping().map(|m| m.len()), Some(1));
}

#[test]
fn depth_limit_prunes_instead_of_recursing() {
    let mut source = s("leaf");
    for _ in 0..10 {
        source = SourceNode::sequence(vec![source]);
    }
    let options = ci_yaml::options! { max_depth: 4 };
    let node = build(NodeType::Sequence(&NESTED), &source, &options);
    assert!(node.errors().is_empty());
    let warnings = node.nested_warnings();
    assert!(
        warnings.iter().any(|w| w == "nesting deeper than 4 levels"),
        "{warnings:?}"
    );
}

#[test]
fn node_limit_prunes_excess_nodes() {
    let items = (0..10).map(|i| s(&format!("cmd{i}"))).collect();
    let source = SourceNode::sequence(items);
    let options = ci_yaml::options! { max_nodes: 3 };
    let node = build(NodeType::Sequence(&BRANCHES), &source, &options);
    let sequence = node.as_sequence().expect("sequence");
    assert_eq!(sequence.strings(), ["cmd0", "cmd1"]);
    assert_eq!(sequence.warnings().len(), 8);
    assert!(sequence.warnings().iter().all(|w| w == "document has more than 3 nodes"));
}

#[test]
fn unknown_alias_is_pruned() {
    let source = SourceNode::document(Some(SourceNode::mapping([
        (s("language"), s("ruby")),
        (s("ruby"), SourceNode::alias(7, None)),
    ])));
    let root = parse_source(&source);
    assert_eq!(root.ruby(), None);
    assert_eq!(root.nested_warnings(), ["alias references unknown anchor #7"]);
}

#[test]
fn mapping_tags() {
    let source = SourceNode::mapping([
        (s("language"), s("ruby")),
        (
            s("script"),
            SourceNode::mapping([(s("rake"), s("")), (s("rspec"), s(""))]).with_tag("!!set"),
        ),
        (
            s("install"),
            SourceNode::mapping([(s("a"), s("b"))]).with_tag("!!weird"),
        ),
        (
            s("after_script"),
            SourceNode::sequence(vec![s("x")]).with_tag("!odd"),
        ),
    ]);
    let root = parse_source(&source);
    assert_eq!(root.stage("script").map(|s| s.strings()), Some(vec!["rake", "rspec"]));
    assert!(root.stage("install").is_none());
    assert!(root.stage("after_script").is_none());
    assert_eq!(
        root.nested_warnings(),
        [
            r#"unexpected tag "!!weird" for mapping"#,
            r#"unexpected tag "!odd" for sequence"#,
        ]
    );
}

#[test]
fn stream_contributes_its_first_document() {
    let first = SourceNode::document(Some(SourceNode::mapping([(s("language"), s("go"))])));
    let second = SourceNode::document(Some(SourceNode::mapping([(s("language"), s("c"))])));
    let root = parse_source(&SourceNode::stream(vec![first, second]));
    assert_eq!(root.language(), Some("go"));
}

#[test]
fn root_must_be_a_mapping() -> anyhow::Result<()> {
    let root = parse("just some text\n")?;
    assert!(root.is_empty());
    assert_eq!(
        root.nested_warnings(),
        [
            r#"unexpected str scalar "just some text", expected a mapping"#,
            r#"missing key "language""#,
        ]
    );
    Ok(())
}

#[test]
fn structural_mismatches_become_warnings() -> anyhow::Result<()> {
    let root = parse(indoc! {"
        language: [ruby]
        script:
          nested: mapping
    "})?;
    assert_eq!(root.language(), None);
    assert_eq!(root.stage("script").map(|s| s.len()), Some(0));
    assert_eq!(
        root.nested_warnings(),
        [
            "unexpected sequence, expected a scalar",
            r#"missing key "language""#,
            "unexpected mapping, expected a scalar",
        ]
    );
    Ok(())
}

#[test]
fn root_warnings_are_deduplicated() -> anyhow::Result<()> {
    let root = parse(indoc! {"
        language: ruby
        colour: blue
        colour: green
    "})?;
    assert_eq!(root.nested_warnings(), [r#"unexpected key "colour", dropping"#]);
    assert_eq!(root.warnings().len(), 1);
    Ok(())
}

#[test]
fn deep_verify_is_idempotent() -> anyhow::Result<()> {
    let mut root = parse(indoc! {"
        rvm: [1, 2]
        colour: blue
        script: [rake, {a: b}]
    "})?;
    let before = root.nested_warnings();
    let tree = serde_json::to_value(&root)?;
    root.deep_verify();
    assert_eq!(root.nested_warnings(), before);
    assert_eq!(serde_json::to_value(&root)?, tree);
    Ok(())
}

#[test]
fn many_unknown_keys_keep_first_occurrence_order() -> anyhow::Result<()> {
    let mut yaml = String::from("language: ruby\n");
    for i in 0..20_000 {
        yaml.push_str(&format!("k{i}: 1\n"));
    }
    yaml.push_str("k7: again\n");
    let root = parse(&yaml)?;
    let warnings = root.nested_warnings();
    assert_eq!(warnings.len(), 20_000);
    assert_eq!(warnings[0], r#"unexpected key "k0", dropping"#);
    assert_eq!(warnings[19_999], r#"unexpected key "k19999", dropping"#);
    assert_eq!(root.nested_warnings_with_path().len(), 20_000);
    Ok(())
}

#[test]
fn warnings_point_back_into_the_input() -> anyhow::Result<()> {
    let root = parse(indoc! {"
        language: ruby
        bogus_field: 1
        script:
          - rake
          - [nested]
    "})?;
    let warnings = root.located_warnings();
    assert_eq!(warnings.len(), 2, "{warnings:?}");

    assert!(warnings[0].path.is_empty());
    assert_eq!(warnings[0].message, r#"unexpected key "bogus_field", dropping"#);
    assert_eq!(warnings[0].location.line(), 2);
    assert_eq!(warnings[0].location.column(), 1);
    assert_eq!(
        warnings[0].to_string(),
        r#"unexpected key "bogus_field", dropping at line 2, column 1"#
    );

    assert_eq!(warnings[1].path, ["script"]);
    assert_eq!(warnings[1].message, "unexpected sequence, expected a scalar");
    assert_eq!(warnings[1].location.line(), 5);
    assert!(
        warnings[1]
            .to_string()
            .starts_with("script: unexpected sequence, expected a scalar at line 5"),
        "{}",
        warnings[1]
    );
    Ok(())
}

#[test]
fn hand_built_trees_have_no_locations() {
    let s = SourceNode::scalar;
    let root = parse_source(&SourceNode::mapping([(s("language"), s("ruby")), (s("x"), s("1"))]));
    let warnings = root.located_warnings();
    assert_eq!(warnings.len(), 1);
    assert!(!warnings[0].location.is_known());
    assert_eq!(warnings[0].to_string(), r#"unexpected key "x", dropping"#);
}
