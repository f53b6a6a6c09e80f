/// Default `VersionParser`, reads the version endpoint's JSON answer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VersionInformation {
  pub game_version: String,
  pub resource_version: i32,
  pub found_new_app: bool,
  pub force_install: bool,
  pub app_url: String,
}
