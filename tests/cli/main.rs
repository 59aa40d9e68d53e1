use std::{
    fs,
    path::PathBuf,
    process::{Command, Output},
};

use anyhow::{Context, Ok, Result};
use tempfile::TempDir;

mod check;
mod export;
mod import;
mod init;

pub struct CliTest {
    _temp_dir: TempDir,
    project_dir: PathBuf,
}

impl CliTest {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().canonicalize()?;
        Ok(Self {
            _temp_dir: temp_dir,
            project_dir,
        })
    }

    pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
        let file_path = self.project_dir.join(path);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        fs::write(&file_path, content)
            .with_context(|| format!("Failed to write file: {}", file_path.display()))?;
        Ok(())
    }

    pub fn read_file(&self, path: &str) -> Result<String> {
        let file_path = self.project_dir.join(path);
        fs::read_to_string(&file_path)
            .with_context(|| format!("Failed to read file: {}", file_path.display()))
    }

    pub fn file_exists(&self, path: &str) -> bool {
        self.project_dir.join(path).exists()
    }

    pub fn run(&self, args: &[&str]) -> Result<Output> {
        Command::new(env!("CARGO_BIN_EXE_locsync"))
            .args(args)
            .current_dir(&self.project_dir)
            .output()
            .context("Failed to run the locsync binary")
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// A small but complete project: catalog with a comment, a plural, an
/// array, an interpolation group and a link, plus one component file.
pub fn write_basic_project(test: &CliTest, locales: &[&str]) -> Result<()> {
    let locales_json = locales
        .iter()
        .map(|code| format!("\"{}\"", code))
        .collect::<Vec<_>>()
        .join(", ");
    test.write_file(
        ".locsyncrc.json",
        &format!(
            r#"{{
  "locales": [{}],
  "sourceLocale": "en",
  "messagesRoot": "./messages",
  "componentsRoot": "./components",
  "exchangeRoot": "./translations",
  "outputRoot": "./dist"
}}
"#,
            locales_json
        ),
    )?;

    test.write_file(
        "messages/en.json",
        r#"// title: Shown on the landing page
{
  "title": "Welcome",
  "cars": "{count} car | {count} cars",
  "steps": ["one", "two"],
  "prompt": {
    "full": "Click {here}.",
    "here": "here"
  },
  "alias": "@:title"
}
"#,
    )?;

    test.write_file(
        "components/Greeting.vue",
        "<template>\n  <p>{{ t(\"greeting\") }}</p>\n</template>\n\n<i18n>\n{\n  \"en\": {\n    \"greeting\": \"Hello\"\n  }\n}\n</i18n>\n",
    )?;

    Ok(())
}
