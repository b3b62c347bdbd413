use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::auth::Credentials;
use crate::errors::OpsRampError;

/// Process-wide settings. Per-POD credentials are read separately through
/// [`pod`] so that single-POD commands do not require both sets.
#[derive(Debug, Clone)]
pub struct Config {
    /// File with one template name per line.
    pub template_file: PathBuf,
    /// Where JSON artifacts go: `file://<dir>`, `s3://<bucket>?...`, or `none`.
    pub output_url: String,
    pub request_timeout: Duration,
    /// Accept self-signed POD certificates.
    pub insecure_tls: bool,
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    Ok(Config {
        template_file: std::env::var("OPSRAMP_TEMPLATE_FILE")
            .unwrap_or_else(|_| "template_names.txt".into())
            .into(),
        output_url: std::env::var("OPSRAMP_OUTPUT_URL")
            .unwrap_or_else(|_| "file://output".into()),
        request_timeout: Duration::from_secs(
            std::env::var("OPSRAMP_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        ),
        insecure_tls: std::env::var("OPSRAMP_INSECURE_TLS")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false),
    })
}

/// Tenant identifiers configured for a POD.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenantIds {
    pub client_id: String,
    pub partner_id: String,
}

impl TenantIds {
    /// The tenant id used in API paths: the client id when set, otherwise
    /// the partner id.
    pub fn effective(&self) -> Option<&str> {
        [self.client_id.as_str(), self.partner_id.as_str()]
            .into_iter()
            .map(str::trim)
            .find(|id| !id.is_empty())
    }
}

/// Everything needed to talk to one POD.
#[derive(Debug, Clone)]
pub struct PodConfig {
    pub number: u8,
    pub credentials: Credentials,
    pub tenant: TenantIds,
}

impl PodConfig {
    pub fn tenant_id(&self) -> Result<&str, OpsRampError> {
        self.tenant.effective().ok_or_else(|| {
            OpsRampError::Config(format!(
                "POD{n}_CLIENT_ID or POD{n}_PARTNER_ID must be set",
                n = self.number
            ))
        })
    }
}

/// Read `POD{n}_*` variables from the process environment.
pub fn pod(number: u8) -> Result<PodConfig, OpsRampError> {
    pod_from(number, |key| std::env::var(key).ok())
}

/// Build a [`PodConfig`] from an arbitrary variable source. Every missing
/// credential variable is listed in the error.
pub fn pod_from(
    number: u8,
    get: impl Fn(&str) -> Option<String>,
) -> Result<PodConfig, OpsRampError> {
    let prefix = format!("POD{}", number);
    let read = |suffix: &str| {
        get(&format!("{}_{}", prefix, suffix))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let base_url = read("BASE_URL");
    let client_key = read("CLIENT_KEY");
    let client_secret = read("CLIENT_SECRET");

    let (Some(base_url), Some(client_key), Some(client_secret)) =
        (base_url.clone(), client_key.clone(), client_secret.clone())
    else {
        let missing: Vec<String> = [
            ("BASE_URL", base_url.is_none()),
            ("CLIENT_KEY", client_key.is_none()),
            ("CLIENT_SECRET", client_secret.is_none()),
        ]
        .into_iter()
        .filter(|(_, absent)| *absent)
        .map(|(suffix, _)| format!("{}_{}", prefix, suffix))
        .collect();
        return Err(OpsRampError::Config(format!(
            "missing required environment variables: {}",
            missing.join(", ")
        )));
    };

    Ok(PodConfig {
        number,
        credentials: Credentials::new(base_url, client_key, client_secret),
        tenant: TenantIds {
            client_id: read("CLIENT_ID").unwrap_or_default(),
            partner_id: read("PARTNER_ID").unwrap_or_default(),
        },
    })
}

/// Load template names from a file: one per line, blank lines and `#`
/// comments ignored.
pub fn load_template_names(path: &Path) -> anyhow::Result<Vec<String>> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        anyhow::anyhow!(
            "template names file {} could not be read ({}); add one template name per line",
            path.display(),
            e
        )
    })?;

    let names = parse_template_names(&contents);
    if names.is_empty() {
        anyhow::bail!("no template names found in {}", path.display());
    }
    Ok(names)
}

pub fn parse_template_names(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_pod_from_reads_prefixed_variables() {
        let vars = env(&[
            ("POD2_BASE_URL", "https://pod2.example.com/"),
            ("POD2_CLIENT_KEY", "key"),
            ("POD2_CLIENT_SECRET", "secret"),
            ("POD2_CLIENT_ID", "client-2"),
        ]);
        let pod = pod_from(2, |k| vars.get(k).cloned()).unwrap();
        assert_eq!(pod.number, 2);
        assert_eq!(pod.credentials.base_url, "https://pod2.example.com");
        assert_eq!(pod.credentials.client_id, "key");
        assert_eq!(pod.tenant_id().unwrap(), "client-2");
    }

    #[test]
    fn test_pod_from_lists_every_missing_variable() {
        let vars = env(&[("POD1_CLIENT_KEY", "key")]);
        let err = pod_from(1, |k| vars.get(k).cloned()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("POD1_BASE_URL"), "{}", msg);
        assert!(msg.contains("POD1_CLIENT_SECRET"), "{}", msg);
        assert!(!msg.contains("POD1_CLIENT_KEY"), "{}", msg);
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let vars = env(&[
            ("POD1_BASE_URL", "   "),
            ("POD1_CLIENT_KEY", "key"),
            ("POD1_CLIENT_SECRET", "secret"),
        ]);
        assert!(pod_from(1, |k| vars.get(k).cloned()).is_err());
    }

    #[test]
    fn test_tenant_id_falls_back_to_partner_id() {
        let ids = TenantIds {
            client_id: String::new(),
            partner_id: "partner-9".into(),
        };
        assert_eq!(ids.effective(), Some("partner-9"));

        let ids = TenantIds {
            client_id: "client-1".into(),
            partner_id: "partner-9".into(),
        };
        assert_eq!(ids.effective(), Some("client-1"));

        assert_eq!(TenantIds::default().effective(), None);
    }

    #[test]
    fn test_parse_template_names_skips_comments_and_blanks() {
        let names = parse_template_names(
            "# templates to copy\n\nAlletra Storage\n  HPE Array  \n#disabled\n",
        );
        assert_eq!(names, vec!["Alletra Storage", "HPE Array"]);
    }

    #[test]
    fn test_load_template_names_rejects_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("names.txt");
        std::fs::write(&path, "# nothing yet\n").unwrap();
        assert!(load_template_names(&path).is_err());

        std::fs::write(&path, "One\nTwo\n").unwrap();
        assert_eq!(load_template_names(&path).unwrap(), vec!["One", "Two"]);
    }
}
