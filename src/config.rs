//! Loading application configuration (assistant prompts + report output) from TOML.
//!
//! Everything has a sensible default so the server runs with zero config.

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub reports: ReportConfig,
}

/// Prompts used by the assistant and the report narrative.
/// Override them in TOML if you need to tune tone/structure.
#[derive(Clone, Debug, Deserialize)]
pub struct Prompts {
  pub chat_system: String,
  pub report_intro_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      chat_system: "You are a study assistant for students preparing with practice quizzes. \
        Answer concisely and stay on the subject matter."
        .into(),
      report_intro_template: "This report provides detailed insights into {student_name}'s \
        performance by topic, subtopic, and learning fundamentals."
        .into(),
    }
  }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ReportConfig {
  #[serde(default = "default_output_dir")]
  pub output_dir: String,
}

impl Default for ReportConfig {
  fn default() -> Self {
    Self { output_dir: default_output_dir() }
  }
}

fn default_output_dir() -> String {
  "./reports".into()
}

/// Attempt to load `AppConfig` from QUIZ_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_app_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("QUIZ_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AppConfig>(&s) {
      Ok(cfg) => {
        info!(target: "adaptiq_backend", %path, "Loaded app config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "adaptiq_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "adaptiq_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_cover_every_field() {
    let cfg = AppConfig::default();
    assert_eq!(cfg.reports.output_dir, "./reports");
    assert!(cfg.prompts.chat_system.contains("study assistant"));
    assert!(cfg.prompts.report_intro_template.contains("{student_name}"));
  }

  #[test]
  fn partial_toml_parses_with_defaults() {
    let cfg: AppConfig = toml::from_str(
      r#"
      [reports]
      output_dir = "/tmp/quiz-reports"
      "#,
    )
    .unwrap();
    assert_eq!(cfg.reports.output_dir, "/tmp/quiz-reports");
    assert!(cfg.prompts.chat_system.contains("study assistant"));
  }

  #[test]
  fn full_toml_overrides_prompts() {
    let cfg: AppConfig = toml::from_str(
      r#"
      [prompts]
      chat_system = "custom system"
      report_intro_template = "Report for {student_name}."
      "#,
    )
    .unwrap();
    assert_eq!(cfg.prompts.chat_system, "custom system");
    assert_eq!(cfg.prompts.report_intro_template, "Report for {student_name}.");
  }
}
