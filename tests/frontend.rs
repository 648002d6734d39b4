use ci_yaml::budget::{BudgetBreach, check_yaml_budget};
use ci_yaml::frontend::read_stream;
use ci_yaml::{Error, Options, SourceBody, SourceKind, parse, parse_with_options};
use indoc::indoc;

#[test]
fn syntax_errors_fail_the_parse() {
    let err = parse("language: [ruby\n").unwrap_err();
    assert!(matches!(err, Error::Message { .. }), "{err:?}");
    assert!(err.location().is_some());
}

#[test]
fn document_budget_is_enforced() {
    let options = ci_yaml::options! {
        budget: Some(ci_yaml::budget! { max_documents: 1 }),
    };
    let err = parse_with_options("language: ruby\n---\nlanguage: go\n", options).unwrap_err();
    assert!(
        matches!(err, Error::Budget { breach: BudgetBreach::Documents { documents: 2 }, .. }),
        "{err:?}"
    );
    assert!(err.to_string().starts_with("YAML budget breached"), "{err}");
}

#[test]
fn budget_can_be_disabled() -> anyhow::Result<()> {
    let options = ci_yaml::options! { budget: None };
    let yaml = "a: &x [1]\nb: *x\nc: *x\n";
    parse_with_options(yaml, options)?;

    let report = check_yaml_budget(yaml, &ci_yaml::budget! { max_aliases: 1 })?;
    assert!(matches!(report.breached, Some(BudgetBreach::Aliases { aliases: 2 })));
    Ok(())
}

#[test]
fn source_tree_records_tags_and_locations() -> anyhow::Result<()> {
    let stream = read_stream(
        indoc! {"
            language: ruby
            script: !!set
              ? rake
        "},
        &Options::default(),
    )?;
    assert_eq!(stream.kind(), SourceKind::Stream);
    let document = stream.first_document().expect("document");
    assert_eq!(document.kind(), SourceKind::Document);
    let SourceBody::Document(Some(root)) = &document.body else {
        anyhow::bail!("empty document");
    };
    let script = &root.children()[3];
    assert_eq!(script.kind(), SourceKind::Mapping);
    assert!(script.tag().is_some_and(|t| t.ends_with("set")), "{:?}", script.tag());
    assert!(script.location.is_known());
    assert_eq!(root.children()[0].location.line(), 1);

    let root = parse("language: ruby\nscript: !!set\n  ? rake\n  ? rspec\n")?;
    assert_eq!(
        root.stage("script").map(|s| s.strings()),
        Some(vec!["rake", "rspec"])
    );
    Ok(())
}

#[test]
fn error_display_includes_location() {
    let err = parse("a: 'unterminated\n").unwrap_err();
    let text = err.to_string();
    assert!(text.contains("line "), "{text}");
}
