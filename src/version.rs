//! Version information shown in the title bar and logged at startup.
//!
//! Git provenance is captured by `build.rs` when the binary is built.

use std::fmt;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const RELEASE_DATE: &str = "2025-10-08";

/// `"Image Crop Studio v1.1.0 (2025-10-08)"`
pub fn banner() -> String {
    format!("Image Crop Studio v{VERSION} ({RELEASE_DATE})")
}

/// How the build relates to the base branch (`master`, else `main`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionType {
    Stable,
    Development,
    Outdated,
    Custom,
    Unknown,
}

impl fmt::Display for VersionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VersionType::Stable => "stable",
            VersionType::Development => "development",
            VersionType::Outdated => "outdated",
            VersionType::Custom => "custom",
            VersionType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BuildInfo {
    pub commit: Option<String>,
    pub branch: Option<String>,
    pub dirty: bool,
    pub base: Option<String>,
    pub ahead: u32,
    pub behind: u32,
}

impl BuildInfo {
    /// Provenance of the running binary.
    pub fn current() -> Self {
        Self::from_env(
            env!("ICS_GIT_COMMIT"),
            env!("ICS_GIT_BRANCH"),
            env!("ICS_GIT_DIRTY"),
            env!("ICS_GIT_BASE"),
            env!("ICS_GIT_AHEAD"),
            env!("ICS_GIT_BEHIND"),
        )
    }

    fn from_env(commit: &str, branch: &str, dirty: &str, base: &str, ahead: &str, behind: &str) -> Self {
        let present = |value: &str| (!value.is_empty()).then(|| value.to_string());
        Self {
            commit: present(commit),
            branch: present(branch),
            dirty: dirty == "true",
            base: present(base),
            ahead: ahead.parse().unwrap_or(0),
            behind: behind.parse().unwrap_or(0),
        }
    }

    pub fn short_commit(&self) -> Option<&str> {
        self.commit.as_deref().map(|c| c.get(..7).unwrap_or(c))
    }

    pub fn version_type(&self) -> VersionType {
        let Some(base) = &self.base else {
            return VersionType::Unknown;
        };
        if self.branch.as_ref() == Some(base) {
            return VersionType::Stable;
        }
        match (self.ahead, self.behind) {
            (0, 0) => VersionType::Stable,
            (_, 0) => VersionType::Development,
            (0, _) => VersionType::Outdated,
            _ => VersionType::Custom,
        }
    }

    /// Where the build stands against the base branch, if there is one.
    pub fn status(&self) -> Option<String> {
        let base = self.base.as_ref()?;
        let status = if self.branch.as_ref() == Some(base) {
            format!("on {base}")
        } else {
            match (self.ahead, self.behind) {
                (0, 0) => format!("in sync with {base}"),
                (ahead, 0) => format!("{ahead} commits ahead of {base}"),
                (0, behind) => format!("{behind} commits behind {base}"),
                (ahead, behind) => format!("{ahead} commits ahead, {behind} commits behind {base}"),
            }
        };
        Some(status)
    }
}

/// One line for the startup log, e.g.
/// `v1.1.0 (development) branch crop-fix @ 1a2b3c4 (modified), 2 commits ahead of main`.
impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{VERSION} ({})", self.version_type())?;
        if let Some(branch) = &self.branch {
            write!(f, " branch {branch}")?;
        }
        if let Some(commit) = self.short_commit() {
            write!(f, " @ {commit}")?;
            if self.dirty {
                f.write_str(" (modified)")?;
            }
        }
        if let Some(status) = self.status() {
            write!(f, ", {status}")?;
        }
        Ok(())
    }
}
