//! Maven POM parsing.
//!
//! Only the `patchesHash` property is read; everything else in the manifest
//! is ignored.

use serde::Deserialize;

use super::types::RegistryError;
use crate::consts::PATCHES_HASH_PROPERTY;

#[derive(Debug, Deserialize)]
struct Project {
  #[serde(default)]
  properties: Option<Properties>,
}

#[derive(Debug, Deserialize)]
struct Properties {
  #[serde(rename = "patchesHash", default)]
  patches_hash: Option<String>,
}

/// Extract the trimmed patches fingerprint embedded in a POM document.
pub fn patches_hash(pom: &str, version: &str) -> Result<String, RegistryError> {
  let what = || format!("manifest for {}", version);

  let project: Project = quick_xml::de::from_str(pom).map_err(|e| RegistryError::malformed(what(), e.to_string()))?;

  let hash = project
    .properties
    .and_then(|p| p.patches_hash)
    .map(|h| h.trim().to_string())
    .unwrap_or_default();

  if hash.is_empty() {
    return Err(RegistryError::malformed(
      what(),
      format!("missing <{}> property", PATCHES_HASH_PROPERTY),
    ));
  }
  Ok(hash)
}

#[cfg(test)]
mod tests {
  use super::*;

  const POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <modelVersion>4.0.0</modelVersion>
  <groupId>com.expensify.react-native</groupId>
  <artifactId>react-android</artifactId>
  <version>0.75.1-3</version>
  <packaging>aar</packaging>
  <properties>
    <patchesHash>
      9f2c1e7d
    </patchesHash>
  </properties>
  <dependencies>
    <dependency>
      <groupId>com.facebook.yoga</groupId>
      <artifactId>proguard-annotations</artifactId>
      <version>1.19.0</version>
    </dependency>
  </dependencies>
</project>"#;

  #[test]
  fn extracts_trimmed_hash() {
    assert_eq!(patches_hash(POM, "0.75.1-3").unwrap(), "9f2c1e7d");
  }

  #[test]
  fn missing_properties_is_malformed() {
    let pom = "<project><modelVersion>4.0.0</modelVersion></project>";

    let err = patches_hash(pom, "0.75.1-3").unwrap_err();

    assert!(matches!(err, RegistryError::MalformedResponse { .. }));
    assert!(err.to_string().contains("patchesHash"));
  }

  #[test]
  fn missing_hash_property_is_malformed() {
    let pom = "<project><properties><other>1</other></properties></project>";

    assert!(matches!(
      patches_hash(pom, "0.75.1-3"),
      Err(RegistryError::MalformedResponse { .. })
    ));
  }

  #[test]
  fn non_xml_body_is_malformed() {
    assert!(matches!(
      patches_hash("{\"message\":\"Not Found\"}", "0.75.1-3"),
      Err(RegistryError::MalformedResponse { .. })
    ));
  }
}
