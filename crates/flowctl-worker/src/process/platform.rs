//! Platform-specific process tree listing.
//!
//! Linux `pstree -p` prints `sudo(6279)---558_1497.sh(6282)---sleep(6354)`.
//! macOS `pstree -sp` prints `-+= 6279 sudo -+- 6282 558_1497.sh --- 6354 sleep`,
//! each pid following a three-character connector and a space.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

static LINUX_PID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d+)\)").expect("linux pstree regex is valid"));

static MAC_PID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-+=]{3} (\d+)").expect("mac pstree regex is valid"));

/// Host operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Other,
}

impl Platform {
    /// The platform this binary was built for.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else {
            Self::Other
        }
    }

    /// Command listing the process tree rooted at `pid`.
    pub fn tree_command(&self, pid: i32) -> String {
        match self {
            Self::MacOs => format!("pstree -sp {pid}"),
            Self::Linux | Self::Other => format!("pstree -p {pid}"),
        }
    }

    /// Extract pids from tree output, in the order printed.
    pub fn parse_tree(&self, output: &str) -> Vec<i32> {
        let regex = match self {
            Self::MacOs => &*MAC_PID,
            Self::Linux | Self::Other => &*LINUX_PID,
        };
        regex
            .captures_iter(output)
            .filter_map(|c| c.get(1))
            .filter_map(|m| m.as_str().parse().ok())
            .collect()
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linux" => Ok(Self::Linux),
            "macos" | "mac" | "darwin" => Ok(Self::MacOs),
            "other" => Ok(Self::Other),
            other => Err(format!("unknown platform '{other}' (expected linux, macos or other)")),
        }
    }
}
