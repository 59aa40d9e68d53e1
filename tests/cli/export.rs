use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use crate::{CliTest, stdout, write_basic_project};

#[test]
fn export_builds_the_exchange_payload() -> Result<()> {
    let test = CliTest::new()?;
    write_basic_project(&test, &["en", "es"])?;

    let output = test.run(&["export"])?;
    assert!(output.status.success(), "stderr: {}", crate::stderr(&output));
    assert!(stdout(&output).contains("Exported 7 messages"));

    let payload: Value = serde_json::from_str(&test.read_file("translations/en.json")?)?;
    assert_eq!(
        payload,
        json!({
            "title": {
                "string": "Welcome",
                "developer_comment": "Shown on the landing page"
            },
            "cars": {
                "string": "{count, plural, one {{count} car} other {{count} cars}}"
            },
            "steps": {
                "0": {"string": "one"},
                "1": {"string": "two"}
            },
            "prompt": {
                "full": {
                    "string": "Click {here}.",
                    "developer_comment": "The {here} fragment is a separately translated string: \"here\""
                },
                "here": {
                    "string": "here",
                    "developer_comment": "This text is inserted into richer formatting at the {here} position. The combined text reads: \"Click here.\""
                }
            },
            "components": {
                "Greeting": {
                    "greeting": {"string": "Hello"}
                }
            }
        })
    );
    Ok(())
}

#[test]
fn export_inline_comment_wins_over_named() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        ".locsyncrc.json",
        r#"{"locales": ["en"], "sourceLocale": "en", "messagesRoot": "./messages", "exchangeRoot": "./translations"}"#,
    )?;
    test.write_file(
        "messages/en.json",
        r#"// title: From the top block
{
  // Right above the key
  "title": "Welcome"
}
"#,
    )?;

    let output = test.run(&["export"])?;
    assert!(output.status.success(), "stderr: {}", crate::stderr(&output));

    let payload: Value = serde_json::from_str(&test.read_file("translations/en.json")?)?;
    assert_eq!(
        payload["title"]["developer_comment"],
        json!("Right above the key")
    );
    Ok(())
}

#[test]
fn export_fails_on_dangling_link() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        ".locsyncrc.json",
        r#"{"locales": ["en"], "sourceLocale": "en", "messagesRoot": "./messages", "exchangeRoot": "./translations"}"#,
    )?;
    test.write_file("messages/en.json", r#"{"a": "@:missing.key"}"#)?;

    let output = test.run(&["export"])?;
    assert_eq!(output.status.code(), Some(2));
    assert!(crate::stderr(&output).contains("does not exist"));
    assert!(!test.file_exists("translations/en.json"));
    Ok(())
}

#[test]
fn export_fails_on_unbalanced_braces() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        ".locsyncrc.json",
        r#"{"locales": ["en"], "sourceLocale": "en", "messagesRoot": "./messages", "exchangeRoot": "./translations"}"#,
    )?;
    test.write_file("messages/en.json", r#"{"a": "open { brace"}"#)?;

    let output = test.run(&["export"])?;
    assert_eq!(output.status.code(), Some(2));
    assert!(crate::stderr(&output).contains("stray brace"));
    Ok(())
}

#[test]
fn export_fails_on_missing_catalog() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        ".locsyncrc.json",
        r#"{"locales": ["en"], "sourceLocale": "en"}"#,
    )?;

    let output = test.run(&["export"])?;
    assert_eq!(output.status.code(), Some(2));
    assert!(crate::stderr(&output).contains("does not exist"));
    Ok(())
}
