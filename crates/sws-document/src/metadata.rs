//! Workspace extension block stored in the notebook metadata.
//!
//! The structured window list in this block is the authoritative source for
//! restoration; the per-window cells are a human-readable rendering only.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::{DocumentError, Result};

/// Format version written by this exporter.
pub const FORMAT_VERSION: &str = "1.0";

/// Highest major format version this reader understands.
pub const SUPPORTED_MAJOR_VERSION: u32 = 1;

/// The `workspace_export` metadata block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub format_version: String,
    pub export_date: DateTime<Utc>,
    pub total_windows: usize,
    /// Structured window records, kept as raw JSON until parse time.
    #[serde(default)]
    pub windows: Vec<Value>,
    #[serde(default)]
    pub window_types: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// SHA-256 over the canonical JSON of `windows`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugInfo>,
}

impl ExportMetadata {
    /// Decode the raw extension value and reject versions we cannot read.
    pub fn from_value(value: &Value) -> Result<Self> {
        let metadata: ExportMetadata =
            serde_json::from_value(value.clone()).map_err(|e| DocumentError::Malformed {
                reason: format!("unreadable {} block: {e}", crate::notebook::EXTENSION_KEY),
            })?;
        metadata.check_version()?;
        Ok(metadata)
    }

    fn check_version(&self) -> Result<()> {
        let major = self
            .format_version
            .split('.')
            .next()
            .and_then(|m| m.trim().parse::<u32>().ok())
            .ok_or_else(|| DocumentError::Malformed {
                reason: format!("invalid format version '{}'", self.format_version),
            })?;
        if major > SUPPORTED_MAJOR_VERSION {
            return Err(DocumentError::UnsupportedVersion {
                found: self.format_version.clone(),
                max_supported: format!("{SUPPORTED_MAJOR_VERSION}.x"),
            });
        }
        Ok(())
    }
}

/// Optional diagnostics attached to an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugInfo {
    pub timestamp: DateTime<Utc>,
    pub total_windows: usize,
    pub per_kind: BTreeMap<String, usize>,
    /// Resident memory of the exporting process, when the platform reports it.
    pub memory_bytes: Option<u64>,
    pub app_version: String,
    pub device_class: String,
}

/// Hex SHA-256 of the canonical encoding of a structured window list.
///
/// `serde_json` maps keep keys sorted, so equal window lists always hash equal.
pub fn fingerprint(windows: &[Value]) -> Result<String> {
    let bytes = serde_json::to_vec(windows).map_err(|e| DocumentError::Serialization {
        source: Box::new(e),
    })?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

/// Best-effort resident-set size of the current process.
pub fn resident_memory_bytes() -> Option<u64> {
    #[cfg(target_os = "linux")]
    {
        let status = std::fs::read_to_string("/proc/self/status").ok()?;
        vm_rss_bytes(&status)
    }

    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

/// `VmRSS` from a `/proc/<pid>/status` listing. The kernel reports it in kB.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn vm_rss_bytes(status: &str) -> Option<u64> {
    let line = status.lines().find_map(|l| l.strip_prefix("VmRSS:"))?;
    let mut fields = line.split_whitespace();
    let kib: u64 = fields.next()?.parse().ok()?;
    match fields.next() {
        Some("kB") | None => kib.checked_mul(1024),
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_vm_rss_is_read_from_status_in_kib() {
        let status = "Name:\tsws\nVmPeak:\t  900 kB\nVmRSS:\t   12345 kB\nThreads:\t4\n";
        assert_eq!(vm_rss_bytes(status), Some(12345 * 1024));
        assert_eq!(vm_rss_bytes("Name:\tsws\n"), None);
        assert_eq!(vm_rss_bytes("VmRSS:\t12 MB\n"), None);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_resident_memory_is_reported_on_linux() {
        assert!(resident_memory_bytes().is_some_and(|bytes| bytes > 0));
    }

    fn metadata_with_version(version: &str) -> Value {
        json!({
            "format_version": version,
            "export_date": "2026-01-01T00:00:00Z",
            "total_windows": 0,
            "windows": [],
        })
    }

    #[test]
    fn test_accepts_current_and_minor_versions() {
        assert!(ExportMetadata::from_value(&metadata_with_version("1.0")).is_ok());
        assert!(ExportMetadata::from_value(&metadata_with_version("1.7")).is_ok());
    }

    #[test]
    fn test_rejects_newer_major_version() {
        let err = ExportMetadata::from_value(&metadata_with_version("2.0")).unwrap_err();
        assert!(matches!(err, DocumentError::UnsupportedVersion { .. }));
    }

    #[test]
    fn test_rejects_garbage_version() {
        let err = ExportMetadata::from_value(&metadata_with_version("latest")).unwrap_err();
        assert!(matches!(err, DocumentError::Malformed { .. }));
    }

    #[test]
    fn test_fingerprint_ignores_key_order() {
        let a = vec![json!({"id": 1, "kind": "chart"})];
        let b: Vec<Value> = vec![serde_json::from_str(r#"{"kind": "chart", "id": 1}"#).unwrap()];
        assert_eq!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
        assert_ne!(fingerprint(&a).unwrap(), fingerprint(&[]).unwrap());
    }
}
