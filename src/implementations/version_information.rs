use tracing::warn;

use crate::structures::{Error, VersionInformation};
use crate::traits::VersionParser;

impl VersionInformation {
  /// Parses `{"game_version", "resource_version", "found_new_app", "force_install", "app_url"}`.
  pub fn from_document(document: &str) -> Result<Self, Error> {
    let parsed_json = json::parse(document)?;
    let game_version = parsed_json["game_version"].as_str()
      .ok_or_else(|| Error::VersionParse("\"game_version\" is missing".to_string()))?;
    let resource_version = parsed_json["resource_version"].as_i32()
      .ok_or_else(|| Error::VersionParse(format!("Cannot parse \"{}\" as i32", parsed_json["resource_version"].dump())))?;
    Ok(Self {
      game_version: game_version.to_string(),
      resource_version,
      found_new_app: parsed_json["found_new_app"].as_bool().unwrap_or(false),
      force_install: parsed_json["force_install"].as_bool().unwrap_or(false),
      app_url: parsed_json["app_url"].as_str().unwrap_or("").to_string(),
    })
  }
}

impl VersionParser for VersionInformation {
  fn parse(&mut self, content: &str) -> bool {
    match Self::from_document(content) {
      Ok(parsed) => {
        *self = parsed;
        true
      },
      Err(e) => {
        warn!("Couldn't parse version response: {}", e);
        false
      }
    }
  }

  fn game_version(&self) -> &str {
    &self.game_version
  }

  fn resource_version(&self) -> i32 {
    self.resource_version
  }

  fn found_new_app(&self) -> bool {
    self.found_new_app
  }

  fn force_install(&self) -> bool {
    self.force_install
  }

  fn app_url(&self) -> &str {
    &self.app_url
  }
}
