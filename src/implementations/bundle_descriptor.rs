use json::JsonValue;

use crate::structures::{BundleDescriptor, Error};

impl BundleDescriptor {
  /// Content without tags is plain built-in content and is always kept in sync.
  pub fn is_pure_builtin(&self) -> bool {
    self.tags.is_empty()
  }

  pub fn has_tag<S: AsRef<str>>(&self, tags: &[S]) -> bool {
    tags.iter().any(|tag| self.tags.iter().any(|own| own == tag.as_ref()))
  }

  pub(crate) fn from_json(value: &JsonValue) -> Result<Self, Error> {
    if !value.is_object() {
      return Err(Error::ManifestParse(format!("bundle entry is not an object: {}", value.dump())));
    }
    let name = required_str(value, "name")?;
    let tags = match &value["tags"] {
      JsonValue::Null => Vec::new(),
      JsonValue::Array(members) => members.iter()
        .map(|tag| tag.as_str().map(str::to_owned).ok_or_else(|| Error::ManifestParse(format!("bundle \"{}\" has a tag that is not a string", name))))
        .collect::<Result<Vec<String>, Error>>()?,
      other => return Err(Error::ManifestParse(format!("bundle \"{}\" has invalid tags: {}", name, other.dump()))),
    };
    Ok(Self {
      hash: required_str(value, "hash")?,
      crc: value["crc"].as_str().unwrap_or_default().to_owned(),
      size: value["size"].as_u64().ok_or_else(|| Error::ManifestParse(format!("bundle \"{}\" has no valid \"size\"", name)))?,
      version: value["version"].as_i32().ok_or_else(|| Error::ManifestParse(format!("bundle \"{}\" has no valid \"version\"", name)))?,
      is_builtin: optional_bool(value, "is_builtin", &name)?,
      is_encrypted: optional_bool(value, "is_encrypted", &name)?,
      is_raw_file: optional_bool(value, "is_raw_file", &name)?,
      tags,
      name,
    })
  }

  pub(crate) fn to_json(&self) -> JsonValue {
    let mut value = JsonValue::new_object();
    value["name"] = self.name.as_str().into();
    value["hash"] = self.hash.as_str().into();
    value["crc"] = self.crc.as_str().into();
    value["size"] = self.size.into();
    value["version"] = self.version.into();
    value["is_builtin"] = self.is_builtin.into();
    value["is_encrypted"] = self.is_encrypted.into();
    value["is_raw_file"] = self.is_raw_file.into();
    value["tags"] = JsonValue::Array(self.tags.iter().map(|tag| tag.as_str().into()).collect());
    value
  }
}

fn required_str(value: &JsonValue, key: &str) -> Result<String, Error> {
  match value[key].as_str() {
    Some(text) if !text.is_empty() => Ok(text.to_owned()),
    _ => Err(Error::ManifestParse(format!("bundle entry is missing \"{}\": {}", key, value.dump()))),
  }
}

fn optional_bool(value: &JsonValue, key: &str, name: &str) -> Result<bool, Error> {
  match &value[key] {
    JsonValue::Null => Ok(false),
    JsonValue::Boolean(flag) => Ok(*flag),
    other => Err(Error::ManifestParse(format!("bundle \"{}\" has a non boolean \"{}\": {}", name, key, other.dump()))),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn descriptor(tags: &[&str]) -> BundleDescriptor {
    BundleDescriptor {
      name: "ui/login".to_string(),
      hash: "5D41402ABC4B2A76".to_string(),
      crc: "9F86D081".to_string(),
      size: 1024,
      version: 3,
      is_builtin: false,
      is_encrypted: true,
      is_raw_file: false,
      tags: tags.iter().map(|tag| tag.to_string()).collect(),
    }
  }

  #[test]
  fn untagged_bundles_are_pure_builtin() {
    assert!(descriptor(&[]).is_pure_builtin());
    assert!(!descriptor(&["dlc1"]).is_pure_builtin());
  }

  #[test]
  fn has_tag_needs_an_intersection() {
    let bundle = descriptor(&["dlc1", "hd"]);
    assert!(bundle.has_tag(&["hd"]));
    assert!(!bundle.has_tag(&["dlc2"]));
    assert!(!bundle.has_tag::<&str>(&[]));
  }

  #[test]
  fn missing_flags_default_to_false() {
    let value = json::parse(r#"{"name":"a","hash":"h1","size":10,"version":1}"#).unwrap();
    let bundle = BundleDescriptor::from_json(&value).unwrap();
    assert!(!bundle.is_builtin);
    assert!(!bundle.is_encrypted);
    assert!(bundle.tags.is_empty());
    assert_eq!(bundle.crc, "");
  }

  #[test]
  fn missing_hash_is_a_parse_error() {
    let value = json::parse(r#"{"name":"a","size":10,"version":1}"#).unwrap();
    assert!(matches!(BundleDescriptor::from_json(&value), Err(Error::ManifestParse(_))));
  }

  #[test]
  fn negative_size_is_a_parse_error() {
    let value = json::parse(r#"{"name":"a","hash":"h1","size":-4,"version":1}"#).unwrap();
    assert!(matches!(BundleDescriptor::from_json(&value), Err(Error::ManifestParse(_))));
  }
}
