//! The structured description of an STM32 firmware project.
//!
//! This is the renderer's sole input: an immutable record of source file
//! sets, defines, include paths, MCU flags, linker script, tool locations,
//! and custom make rules. The renderer is a pure function of this record;
//! the same description always renders to byte-identical text.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Language of the final link step.
///
/// Selects the compiler driver used for linking: `C` links with `$(CC)`,
/// `Cxx` with `$(CXX)`. Compilation of individual translation units is
/// driven by file extension, not by this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    /// Link with the C compiler driver.
    #[serde(rename = "C")]
    C,
    /// Link with the C++ compiler driver.
    #[serde(rename = "C++")]
    Cxx,
}

impl Default for Language {
    fn default() -> Self {
        Language::C
    }
}

/// Host operating system family the generated Makefile will run under.
///
/// Only the `clean` rule's shell command differs between families. This is
/// an explicit input rather than ambient process state so that rendering
/// stays a pure function and can be exercised for either family on any
/// development machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostPlatform {
    /// Unix-like hosts (`rm -fR`).
    Unix,
    /// Windows hosts (`cmd /c rd /s /q`).
    Windows,
}

impl HostPlatform {
    /// The platform family of the machine this process runs on.
    pub fn current() -> Self {
        if cfg!(windows) {
            HostPlatform::Windows
        } else {
            HostPlatform::Unix
        }
    }
}

impl Default for HostPlatform {
    fn default() -> Self {
        HostPlatform::current()
    }
}

/// Locations of the external tools the generated Makefile invokes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ToolPaths {
    /// Directory of an ARM cross-toolchain installation. When present,
    /// non-empty, and not `"."`, it is injected as a `GCC_PATH` override;
    /// otherwise the tools are resolved through `PATH`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arm_toolchain_path: Option<PathBuf>,
    /// Path to the OpenOCD binary. When absent the bare command name
    /// `openocd` is used, relying on `PATH`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openocd_path: Option<PathBuf>,
}

/// An extra named target appended to the generated Makefile.
///
/// Rules render in the order given; a later rule may name an earlier one in
/// `depends_on`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CustomRule {
    /// Target name (`command:` in the rendered rule).
    pub command: String,
    /// Shell line executed by the target, tab-indented in the output.
    pub rule: String,
    /// Optional prerequisite list; rendered empty when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<String>,
}

/// Complete description of a firmware project, as consumed by the renderer.
///
/// List fields are treated as sets: the renderer deduplicates and sorts
/// them ordinally before formatting, so input order and repeated entries
/// never show up in the output. A source path must not appear in more than
/// one of the three language sets; that precondition is the caller's to
/// uphold (see [`crate::validate`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectDescription {
    /// Output binary base name.
    pub target: String,
    /// Language of the final link step.
    pub language: Language,
    /// Optimization level character, rendered after a `-O` prefix.
    pub optimization: char,
    /// C source files.
    pub c_sources: Vec<String>,
    /// C++ source files.
    pub cxx_sources: Vec<String>,
    /// Assembly source files.
    pub asm_sources: Vec<String>,
    /// Preprocessor symbols for C compilation, rendered with `-D`.
    pub c_defs: Vec<String>,
    /// Preprocessor symbols for C++ compilation, rendered with `-D`.
    pub cxx_defs: Vec<String>,
    /// Include directories shared by C and C++ compilation, rendered with `-I`.
    pub c_includes: Vec<String>,
    /// Extra C compiler flags, appended verbatim.
    pub c_flags: Vec<String>,
    /// Extra C++ compiler flags, appended verbatim.
    pub cxx_flags: Vec<String>,
    /// Extra assembler flags, appended verbatim.
    pub asm_flags: Vec<String>,
    /// Extra linker flags, appended verbatim.
    pub ld_flags: Vec<String>,
    /// Library names, rendered with `-l`.
    pub libs: Vec<String>,
    /// Library search directories, rendered with `-L`.
    pub lib_dirs: Vec<String>,
    /// Linker script path; referenced unconditionally.
    pub ld_script: String,
    /// MCU core name, conditionally prefixed with `-mcpu=`. Empty = absent.
    pub cpu: String,
    /// FPU name, conditionally prefixed with `-mfpu=`. Empty = absent.
    pub fpu: String,
    /// Float ABI, conditionally prefixed with `-mfloat-abi=`. Empty = absent.
    pub float_abi: String,
    /// OpenOCD target name, interpolated into the erase rule's mass-erase
    /// command (e.g. `stm32f4x`).
    pub target_mcu: String,
    /// External tool locations.
    pub tools: ToolPaths,
    /// Extra named targets, rendered in order after the fixed rules.
    pub custom_rules: Vec<CustomRule>,
    /// Host platform family the Makefile's `clean` rule targets.
    pub host: HostPlatform,
}

impl Default for ProjectDescription {
    fn default() -> Self {
        Self {
            target: String::new(),
            language: Language::C,
            optimization: 'g',
            c_sources: Vec::new(),
            cxx_sources: Vec::new(),
            asm_sources: Vec::new(),
            c_defs: Vec::new(),
            cxx_defs: Vec::new(),
            c_includes: Vec::new(),
            c_flags: Vec::new(),
            cxx_flags: Vec::new(),
            asm_flags: Vec::new(),
            ld_flags: Vec::new(),
            libs: Vec::new(),
            lib_dirs: Vec::new(),
            ld_script: String::new(),
            cpu: String::new(),
            fpu: String::new(),
            float_abi: String::new(),
            target_mcu: String::new(),
            tools: ToolPaths::default(),
            custom_rules: Vec::new(),
            host: HostPlatform::default(),
        }
    }
}

/// Convert a filesystem path to forward-slash form for embedding in
/// Makefile text. `make` accepts forward slashes on every host, including
/// Windows, so all emitted paths are normalized this way.
pub fn posix_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
