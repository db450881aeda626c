//! Toolchain gate: accept or reject a detected LLVM version.
//!
//! Bounds are inclusive and compared at their own precision, so a detected
//! `14.0.6` satisfies `max = "14"`.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, instrument};

use docconf_shared::{DocConfError, Result, ToolVersion, ToolVersionRange};

use crate::bundle::ConfigBundle;

/// Matches the version line printed by `llc --version` / `opt --version`.
static LLVM_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)LLVM version\s+(\d+(?:\.\d+)*)").expect("LLVM version regex")
});

/// Whether `detected` lies within the inclusive range.
pub fn in_range(range: &ToolVersionRange, detected: &ToolVersion) -> bool {
    let low = detected.truncated(range.min.components().len());
    let high = detected.truncated(range.max.components().len());
    range.min <= low && high <= range.max
}

/// Fail with `ToolchainVersionOutOfRange` when `detected` is outside the range.
#[instrument(skip(range), fields(min = %range.min, max = %range.max))]
pub fn check_toolchain(range: &ToolVersionRange, detected: &ToolVersion) -> Result<()> {
    if in_range(range, detected) {
        debug!("toolchain version accepted");
        return Ok(());
    }

    Err(DocConfError::ToolchainVersionOutOfRange {
        detected: detected.to_string(),
        min: range.min.to_string(),
        max: range.max.to_string(),
    })
}

/// Extract the version from `llc --version` style output.
pub fn parse_llvm_version_output(output: &str) -> Option<ToolVersion> {
    let caps = LLVM_VERSION_RE.captures(output)?;
    ToolVersion::parse(&caps[1]).ok()
}

/// Run `<tool> --version` and parse the LLVM version it reports.
#[instrument]
pub fn detect_llvm_version(tool: &Path) -> Result<ToolVersion> {
    let output = std::process::Command::new(tool)
        .arg("--version")
        .output()
        .map_err(|e| DocConfError::io(tool, e))?;

    if !output.status.success() {
        return Err(DocConfError::validation(format!(
            "{} --version exited with status {}",
            tool.display(),
            output.status.code().unwrap_or(-1)
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let version = parse_llvm_version_output(&stdout).ok_or_else(|| {
        DocConfError::parse(format!(
            "no 'LLVM version' line in {} --version output",
            tool.display()
        ))
    })?;

    info!(%version, "detected LLVM version");
    Ok(version)
}

impl ConfigBundle {
    /// Gate the build on the bundle's LLVM range.
    pub fn check_toolchain(&self, detected: &ToolVersion) -> Result<()> {
        check_toolchain(self.tool_version_range(), detected)
    }
}
