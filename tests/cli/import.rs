use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use crate::{CliTest, stderr, stdout, write_basic_project};

fn write_spanish_payload(test: &CliTest) -> Result<()> {
    test.write_file(
        "translations/es.json",
        r#"{
  "title": {"string": "Bienvenido"},
  "cars": {"string": "{count, plural, one {{count} coche} other {{count} coches}}"},
  "steps": {
    "0": {"string": "uno"},
    "1": {"string": "dos"}
  },
  "prompt": {
    "full": {"string": "Haz clic {here}."},
    "here": {"string": "aqui"}
  },
  "components": {
    "Greeting": {
      "greeting": {"string": "Hola"}
    }
  }
}
"#,
    )
}

#[test]
fn import_writes_locale_file_and_component_block() -> Result<()> {
    let test = CliTest::new()?;
    write_basic_project(&test, &["en", "es"])?;
    write_spanish_payload(&test)?;

    let output = test.run(&["import"])?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("es  8/8 translated"));
    assert!(text.contains("Wrote 1 locale file(s) and 1 component file(s)"));

    // The locale artifact mirrors the source shape, components removed,
    // the link marker copied verbatim.
    let es: Value = serde_json::from_str(&test.read_file("dist/es.json")?)?;
    assert_eq!(
        es,
        json!({
            "title": "Bienvenido",
            "cars": "{count} coche | {count} coches",
            "steps": ["uno", "dos"],
            "prompt": {"full": "Haz clic {here}.", "here": "aqui"},
            "alias": "@:title"
        })
    );

    // The component block now carries both locales, alphabetically.
    let component = test.read_file("components/Greeting.vue")?;
    assert!(component.starts_with("<template>"));
    let body_start = component.find("<i18n>").unwrap() + "<i18n>".len();
    let body_end = component.find("</i18n>").unwrap();
    let block: Value = serde_json::from_str(component[body_start..body_end].trim())?;
    assert_eq!(
        block,
        json!({
            "en": {"greeting": "Hello"},
            "es": {"greeting": "Hola"}
        })
    );
    let en_at = component.find("\"en\"").unwrap();
    let es_at = component.find("\"es\"").unwrap();
    assert!(en_at < es_at);
    Ok(())
}

#[test]
fn import_clears_partially_translated_groups() -> Result<()> {
    let test = CliTest::new()?;
    write_basic_project(&test, &["en", "es"])?;
    // "steps" is missing one element, "prompt.full" is untranslated and
    // the link target "title" is empty.
    test.write_file(
        "translations/es.json",
        r#"{
  "title": {"string": ""},
  "cars": {"string": "{count, plural, one {{count} coche} other {{count} coches}}"},
  "steps": {
    "0": {"string": ""},
    "1": {"string": "dos"}
  },
  "prompt": {
    "here": {"string": "aqui"}
  }
}
"#,
    )?;

    let output = test.run(&["import"])?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let es: Value = serde_json::from_str(&test.read_file("dist/es.json")?)?;
    // Neither the array, nor any part of the interpolation group, nor the
    // link, nor the empty title survive.
    assert_eq!(es, json!({"cars": "{count} coche | {count} coches"}));
    Ok(())
}

#[test]
fn import_dry_run_writes_nothing() -> Result<()> {
    let test = CliTest::new()?;
    write_basic_project(&test, &["en", "es"])?;
    write_spanish_payload(&test)?;

    let output = test.run(&["import", "--dry-run"])?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Would write"));
    assert!(!test.file_exists("dist/es.json"));
    Ok(())
}

#[test]
fn import_fails_without_payload() -> Result<()> {
    let test = CliTest::new()?;
    write_basic_project(&test, &["en", "fr"])?;

    let output = test.run(&["import"])?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("No exchange payload for locale \"fr\""));
    assert!(!test.file_exists("dist/fr.json"));
    Ok(())
}

#[test]
fn import_fails_on_variable_mismatch_without_writing() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        ".locsyncrc.json",
        r#"{"locales": ["en", "es"], "sourceLocale": "en", "messagesRoot": "./messages", "exchangeRoot": "./translations", "outputRoot": "./dist"}"#,
    )?;
    test.write_file("messages/en.json", r#"{"items": "{count} items"}"#)?;
    test.write_file(
        "translations/es.json",
        r#"{"items": {"string": "{count} de {n}"}}"#,
    )?;

    let output = test.run(&["import"])?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Variable mismatch"));
    assert!(!test.file_exists("dist/es.json"));
    Ok(())
}

#[test]
fn import_accepts_multi_category_locale() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        ".locsyncrc.json",
        r#"{"locales": ["en", "ru"], "sourceLocale": "en", "messagesRoot": "./messages", "exchangeRoot": "./translations", "outputRoot": "./dist"}"#,
    )?;
    test.write_file("messages/en.json", r#"{"cars": "{count} car | {count} cars"}"#)?;
    test.write_file(
        "translations/ru.json",
        r#"{"cars": {"string": "{count, plural, one {{count} car-ru} few {{count} cars-ru} many {{count} cars-ru} other {{count} cars-ru}}"}}"#,
    )?;

    let output = test.run(&["import"])?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let ru: Value = serde_json::from_str(&test.read_file("dist/ru.json")?)?;
    assert_eq!(
        ru,
        json!({"cars": "{count} car-ru | {count} cars-ru | {count} cars-ru | {count} cars-ru"})
    );
    Ok(())
}

#[test]
fn import_rejects_payload_with_wrong_categories() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        ".locsyncrc.json",
        r#"{"locales": ["en", "ja"], "sourceLocale": "en", "messagesRoot": "./messages", "exchangeRoot": "./translations", "outputRoot": "./dist"}"#,
    )?;
    test.write_file("messages/en.json", r#"{"cars": "{count} car | {count} cars"}"#)?;
    // An untranslated fetch: the platform echoed the English wrapper back
    // for a locale that only has "other".
    test.write_file(
        "translations/ja.json",
        r#"{"cars": {"string": "{count, plural, one {{count} car} other {{count} cars}}"}}"#,
    )?;

    let output = test.run(&["import"])?;
    assert_eq!(output.status.code(), Some(2));
    let err = stderr(&output);
    assert!(err.contains("do not match"));
    assert!(err.contains("untranslated"));
    Ok(())
}
