//! Loads `governance.toml` and overlays it on compiled-in defaults,
//! following `vtcode-config`'s layered-merge loader idiom (recursive
//! table merge, overlay wins per field — here applied at the typed-struct
//! level via `BaseConstraints::merged_with`).

use crate::base_constraints::{BaseConstraints, BaseConstraintsOverlay};
use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GovernanceFileConfig {
    #[serde(default)]
    pub base_constraints: BaseConstraintsOverlay,
}

/// Load `governance.toml` from `path` if it exists, overlaying it onto
/// compiled-in defaults. A missing file is not an error — it just means
/// "use the defaults", matching the teacher's tolerant config-loading
/// posture for optional layers.
pub fn load_base_constraints(path: &Path) -> ConfigResult<BaseConstraints> {
    if !path.exists() {
        return Ok(BaseConstraints::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed: GovernanceFileConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(BaseConstraints::default().merged_with(parsed.base_constraints))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn missing_file_yields_defaults() {
        let defaults = BaseConstraints::default();
        let loaded = load_base_constraints(Path::new("/nonexistent/governance.toml")).unwrap();
        assert_eq!(loaded, defaults);
    }

    #[test]
    fn overlay_replaces_only_specified_fields() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [base_constraints]
            prohibited_tools = ["nuke"]
            require_audit_log = false
            "#
        )
        .unwrap();

        let loaded = load_base_constraints(file.path()).unwrap();
        assert_eq!(loaded.prohibited_tools, vec!["nuke".to_string()]);
        assert!(!loaded.require_audit_log);
        // Untouched fields keep their compiled-in default.
        assert_eq!(loaded.audit_retention_days, BaseConstraints::default().audit_retention_days);
    }
}
