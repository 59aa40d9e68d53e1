use anyhow::Result;

use crate::{CliTest, stderr, stdout, write_basic_project};

#[test]
fn check_passes_on_valid_project() -> Result<()> {
    let test = CliTest::new()?;
    write_basic_project(&test, &["en", "es"])?;
    test.write_file(
        "translations/es.json",
        r#"{
  "title": {"string": "Bienvenido"},
  "cars": {"string": "{count, plural, one {{count} coche} other {{count} coches}}"},
  "steps": {"0": {"string": "uno"}, "1": {"string": "dos"}},
  "prompt": {
    "full": {"string": "Haz clic {here}."},
    "here": {"string": "aqui"}
  }
}
"#,
    )?;

    let output = test.run(&["check"])?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("es  7/8 translated"));
    assert!(text.contains("Catalogs and payloads are valid"));
    assert!(!test.file_exists("dist/es.json"));
    Ok(())
}

#[test]
fn check_reports_variable_spacing_warning() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        ".locsyncrc.json",
        r#"{"locales": ["en", "es"], "sourceLocale": "en", "messagesRoot": "./messages", "exchangeRoot": "./translations"}"#,
    )?;
    test.write_file("messages/en.json", r#"{"items": "{count} items"}"#)?;
    test.write_file(
        "translations/es.json",
        r#"{"items": {"string": "{count}articulos"}}"#,
    )?;

    let output = test.run(&["check"])?;
    // Warnings do not abort, but they do fail the command.
    assert_eq!(output.status.code(), Some(1));
    let text = stdout(&output);
    assert!(text.contains("variable-spacing"));
    assert!(text.contains("es:items"));
    assert!(text.contains("1 warning emitted"));
    Ok(())
}

#[test]
fn check_fails_on_arity_mismatch() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        ".locsyncrc.json",
        r#"{"locales": ["en", "es"], "sourceLocale": "en", "messagesRoot": "./messages", "exchangeRoot": "./translations"}"#,
    )?;
    test.write_file("messages/en.json", r#"{"cars": "{count} car | {count} cars"}"#)?;
    // A single-form translation against a two-form source.
    test.write_file(
        "translations/es.json",
        r#"{"cars": {"string": "{count} coches"}}"#,
    )?;

    let output = test.run(&["check"])?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Pluralization mismatch"));
    Ok(())
}

#[test]
fn check_fails_on_malformed_component_block() -> Result<()> {
    let test = CliTest::new()?;
    write_basic_project(&test, &["en"])?;
    test.write_file(
        "components/Broken.vue",
        "<template/>\n<i18n>\n{\"en\": {}}\n",
    )?;

    let output = test.run(&["check"])?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("missing closing"));
    Ok(())
}

#[test]
fn check_fails_on_unknown_payload_locale_category_set() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        ".locsyncrc.json",
        r#"{"locales": ["en", "es"], "sourceLocale": "en", "messagesRoot": "./messages", "exchangeRoot": "./translations", "localeOverrides": {"es": {"pluralCategories": ["one", "two", "other"]}}}"#,
    )?;
    test.write_file("messages/en.json", r#"{"cars": "{count} car | {count} cars"}"#)?;
    test.write_file(
        "translations/es.json",
        r#"{"cars": {"string": "{count, plural, one {{count} c} other {{count} cs}}"}}"#,
    )?;

    let output = test.run(&["check"])?;
    // The override pins three categories; the payload only carries two.
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("do not match"));
    Ok(())
}
