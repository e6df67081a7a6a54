//! Target platform descriptor.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Build configuration passed to the native build tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildType {
    #[default]
    Debug,
    Release,
}

impl BuildType {
    /// The value the build tool expects (`-DCMAKE_BUILD_TYPE=`, `--config`, `-C`).
    pub fn as_tool_config(&self) -> &'static str {
        match self {
            BuildType::Debug => "Debug",
            BuildType::Release => "Release",
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_tool_config())
    }
}

/// Target platform: os, compiler, arch, and build type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    /// Operating system name (e.g. "linux", "macos", "windows")
    pub os: String,

    /// Compiler family (e.g. "gcc", "clang", "msvc")
    pub compiler: String,

    /// CPU architecture (e.g. "x86_64", "aarch64")
    pub arch: String,

    /// Build configuration
    pub build_type: BuildType,
}

impl Platform {
    /// Describe the host platform with the given build type.
    pub fn host(build_type: BuildType) -> Self {
        let os = std::env::consts::OS.to_string();
        let compiler = match os.as_str() {
            "windows" => "msvc",
            "macos" => "clang",
            _ => "gcc",
        }
        .to_string();

        Platform {
            os,
            compiler,
            arch: std::env::consts::ARCH.to_string(),
            build_type,
        }
    }

    /// Generator the configure step should request, if any.
    ///
    /// On Windows the build tool's default (Visual Studio) is left alone;
    /// elsewhere Unix Makefiles keep the command line deterministic.
    pub fn generator(&self) -> Option<&'static str> {
        if self.os == "windows" {
            None
        } else {
            Some("Unix Makefiles")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_type_tool_config() {
        assert_eq!(BuildType::Debug.as_tool_config(), "Debug");
        assert_eq!(BuildType::Release.as_tool_config(), "Release");
    }

    #[test]
    fn test_host_platform() {
        let platform = Platform::host(BuildType::Release);
        assert!(!platform.os.is_empty());
        assert!(!platform.arch.is_empty());
        assert_eq!(platform.build_type, BuildType::Release);
    }

    #[test]
    fn test_generator_selection() {
        let linux = Platform {
            os: "linux".to_string(),
            compiler: "gcc".to_string(),
            arch: "x86_64".to_string(),
            build_type: BuildType::Debug,
        };
        assert_eq!(linux.generator(), Some("Unix Makefiles"));

        let windows = Platform {
            os: "windows".to_string(),
            compiler: "msvc".to_string(),
            arch: "x86_64".to_string(),
            build_type: BuildType::Debug,
        };
        assert_eq!(windows.generator(), None);
    }
}
