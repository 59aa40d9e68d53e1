use anyhow::Result;

use crate::{CliTest, stderr, stdout};

#[test]
fn init_creates_config_file() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.run(&["init"])?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Created .locsyncrc.json"));

    let config: serde_json::Value = serde_json::from_str(&test.read_file(".locsyncrc.json")?)?;
    assert_eq!(config["sourceLocale"], "en");
    Ok(())
}

#[test]
fn init_refuses_to_overwrite() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".locsyncrc.json", "{}")?;

    let output = test.run(&["init"])?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("already exists"));
    Ok(())
}
