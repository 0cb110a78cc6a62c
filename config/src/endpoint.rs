use serde::{
    Deserialize,
    Serialize,
};
use std::path::{
    Path,
    PathBuf,
};
use vrm_report::UnitMeta;

/// Folder name used for endpoints configured without a BVMS name.
const DEFAULT_BVMS: &str = "BVMS";

/// One VRM reachable through a BVMS.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default)]
    pub bvms: String,
    #[serde(default)]
    pub vrm: String,
    pub ip: String,
}

impl EndpointConfig {
    pub fn unit(&self) -> UnitMeta {
        UnitMeta {
            bvms: self.bvms.clone(),
            vrm: self.vrm.clone(),
            ip: self.ip.clone(),
        }
    }

    pub fn label(&self) -> String {
        self.unit().label()
    }

    /// `<data_dir>/<bvms>/<vrm or ip>`, with both path segments reduced to safe characters.
    pub fn document_dir(&self, data_dir: &Path) -> PathBuf {
        let bvms = if self.bvms.is_empty() { DEFAULT_BVMS } else { &self.bvms };
        let unit = if self.vrm.is_empty() { &self.ip } else { &self.vrm };
        data_dir.join(safe_name(bvms)).join(safe_name(unit))
    }
}

/// Replaces every run of characters outside `[A-Za-z0-9._-]` with a single `_`.
pub fn safe_name(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_run = false;
    for c in s.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn safe_names() {
        assert_eq!(safe_name("VRM 1"), "VRM_1");
        assert_eq!(safe_name("a/../b"), "a_.._b");
        assert_eq!(safe_name("Señal  ¿x?"), "Se_al_x_");
        assert_eq!(safe_name("172.25.0.15"), "172.25.0.15");
    }

    #[test]
    fn document_dir_falls_back_to_ip() {
        let endpoint = EndpointConfig {
            bvms: String::new(),
            vrm: String::new(),
            ip: "172.25.0.15".to_string(),
        };
        assert_eq!(
            endpoint.document_dir(Path::new("/data")),
            Path::new("/data").join("BVMS").join("172.25.0.15")
        );
        assert_eq!(endpoint.label(), "/172.25.0.15");
    }
}
