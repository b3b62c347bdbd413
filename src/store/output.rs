//! OutputStore: write-only JSON artifacts of a run.
//!
//! Customization payloads, clone responses and run reports are written as
//! pretty-printed JSON. Nothing reads them back.
//!
//! ## Configuration
//!
//! Set `OPSRAMP_OUTPUT_URL`:
//!
//! ```text
//! # Local directory (default: file://output)
//! OPSRAMP_OUTPUT_URL=file:///var/lib/opsramp-cloner
//!
//! # S3 / MinIO
//! OPSRAMP_OUTPUT_URL=s3://my-bucket?region=us-east-1&prefix=opsramp
//!
//! # Disable artifacts
//! OPSRAMP_OUTPUT_URL=none
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use object_store::{path::Path, ObjectStore};
use serde::Serialize;

/// Artifact families, each under its own key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Customizations,
    CloneResponse,
    Report,
}

impl ArtifactKind {
    fn dir(self) -> &'static str {
        match self {
            ArtifactKind::Customizations => "customizations",
            ArtifactKind::CloneResponse => "clones",
            ArtifactKind::Report => "reports",
        }
    }
}

pub enum OutputStore {
    /// Artifacts are dropped.
    Disabled,

    Object {
        store: Arc<dyn ObjectStore>,
        prefix: String,
    },
}

impl OutputStore {
    /// Build a store from an output URL. `none` or an empty string disables
    /// artifacts.
    pub fn from_url(url: &str) -> Result<Self> {
        let url = url.trim();
        if url.is_empty() || url.eq_ignore_ascii_case("none") {
            return Ok(OutputStore::Disabled);
        }

        let (store, prefix) = build_object_store(url)?;
        tracing::info!(url = %url, "OutputStore: writing artifacts");
        Ok(OutputStore::Object {
            store: Arc::from(store),
            prefix,
        })
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, OutputStore::Object { .. })
    }

    /// Write `value` as `<kind>/<slug(name)>[-<slug(id)>].json`. Returns the
    /// key written, or `None` when artifacts are disabled.
    ///
    /// `id` keeps templates whose names share a slug (or repeat in one
    /// batch) from overwriting each other.
    pub async fn save_json<T: Serialize>(
        &self,
        kind: ArtifactKind,
        name: &str,
        id: Option<&str>,
        value: &T,
    ) -> Result<Option<String>> {
        let OutputStore::Object { store, prefix } = self else {
            return Ok(None);
        };

        let json = serde_json::to_vec_pretty(value).context("failed to serialize artifact")?;
        let key = artifact_key(prefix, kind, name, id);

        store
            .put(&Path::from(key.clone()), json.into())
            .await
            .with_context(|| format!("failed to write artifact {}", key))?;

        tracing::debug!(key = %key, "artifact written");
        Ok(Some(key))
    }
}

/// Lower-case the name and replace every run of non-alphanumerics with `_`.
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "unnamed".to_string()
    } else {
        trimmed.to_string()
    }
}

fn artifact_key(prefix: &str, kind: ArtifactKind, name: &str, id: Option<&str>) -> String {
    let stem = match id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => format!("{}-{}", slug(name), slug(id)),
        None => slug(name),
    };
    let file = format!("{}/{}.json", kind.dir(), stem);
    if prefix.is_empty() {
        file
    } else {
        format!("{}/{}", prefix.trim_end_matches('/'), file)
    }
}

/// Parse an output URL and return an `(ObjectStore impl, prefix)` pair.
fn build_object_store(url: &str) -> Result<(Box<dyn ObjectStore>, String)> {
    if let Some(path) = url.strip_prefix("file://") {
        std::fs::create_dir_all(path)
            .with_context(|| format!("failed to create output directory {}", path))?;
        let store = object_store::local::LocalFileSystem::new_with_prefix(path)
            .context("failed to create local file system object store")?;
        return Ok((Box::new(store), String::new()));
    }

    if let Some(without_scheme) = url.strip_prefix("s3://") {
        let bucket = without_scheme.split('?').next().unwrap_or(without_scheme);

        // Custom endpoint for MinIO
        let endpoint = parse_query_param(url, "endpoint");
        let region = parse_query_param(url, "region").unwrap_or_else(|| "us-east-1".to_string());
        let prefix = parse_query_param(url, "prefix").unwrap_or_else(|| "opsramp-cloner".to_string());

        let mut builder = object_store::aws::AmazonS3Builder::new()
            .with_bucket_name(bucket)
            .with_region(&region);

        if let Some(ep) = endpoint {
            builder = builder.with_endpoint(&ep).with_allow_http(true);
        }

        // Credentials from env: AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY
        if let Ok(key) = std::env::var("AWS_ACCESS_KEY_ID") {
            if let Ok(secret) = std::env::var("AWS_SECRET_ACCESS_KEY") {
                builder = builder.with_access_key_id(key).with_secret_access_key(secret);
            }
        }

        let store = builder.build().context("failed to build S3 object store")?;
        return Ok((Box::new(store), prefix));
    }

    anyhow::bail!("unsupported OPSRAMP_OUTPUT_URL scheme: {}", url)
}

fn parse_query_param(url: &str, key: &str) -> Option<String> {
    let query = url.split('?').nth(1)?;
    for part in query.split('&') {
        let mut kv = part.splitn(2, '=');
        if kv.next() == Some(key) {
            return kv.next().map(|v| urlencoding::decode(v).unwrap_or_default().into_owned());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_slug_normalizes_names() {
        assert_eq!(slug("Alletra Storage - Array"), "alletra_storage_array");
        assert_eq!(slug("  CPU/Memory (v2) "), "cpu_memory_v2");
        assert_eq!(slug("***"), "unnamed");
    }

    #[test]
    fn test_artifact_key_layout() {
        assert_eq!(
            artifact_key("", ArtifactKind::Customizations, "Disk Health", Some("c-17")),
            "customizations/disk_health-c_17.json"
        );
        assert_eq!(
            artifact_key("runs/", ArtifactKind::Report, "abc", None),
            "runs/reports/abc.json"
        );
        assert_eq!(
            artifact_key("", ArtifactKind::CloneResponse, "Disk", Some("  ")),
            "clones/disk.json"
        );
    }

    #[test]
    fn test_names_sharing_a_slug_get_distinct_keys() {
        let a = artifact_key("", ArtifactKind::Customizations, "Disk Health", Some("c-1"));
        let b = artifact_key("", ArtifactKind::Customizations, "Disk-Health", Some("c-2"));
        assert_eq!(slug("Disk Health"), slug("Disk-Health"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_parse_query_param_decodes_values() {
        let url = "s3://bucket?region=eu-west-1&endpoint=http%3A%2F%2Fminio%3A9000";
        assert_eq!(parse_query_param(url, "region").as_deref(), Some("eu-west-1"));
        assert_eq!(
            parse_query_param(url, "endpoint").as_deref(),
            Some("http://minio:9000")
        );
        assert_eq!(parse_query_param(url, "prefix"), None);
    }

    #[test]
    fn test_disabled_and_unknown_schemes() {
        assert!(!OutputStore::from_url("none").unwrap().is_enabled());
        assert!(!OutputStore::from_url("").unwrap().is_enabled());
        assert!(OutputStore::from_url("ftp://nope").is_err());
    }

    #[tokio::test]
    async fn test_disabled_store_skips_writes() {
        let store = OutputStore::Disabled;
        let key = store
            .save_json(ArtifactKind::Report, "run", None, &json!({"ok": true}))
            .await
            .unwrap();
        assert!(key.is_none());
    }

    #[tokio::test]
    async fn test_local_store_writes_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("file://{}", dir.path().join("out").display());
        let store = OutputStore::from_url(&url).unwrap();

        let key = store
            .save_json(
                ArtifactKind::Customizations,
                "Disk Health",
                Some("c-1"),
                &json!({"name": "Disk Health", "monitors": []}),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(key, "customizations/disk_health-c_1.json");

        let text = std::fs::read_to_string(dir.path().join("out").join(&key)).unwrap();
        assert!(text.contains("\n"), "expected pretty-printed JSON");

        let loaded: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(loaded["name"], "Disk Health");
    }
}
