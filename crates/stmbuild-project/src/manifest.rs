//! `stmbuild.toml` manifest parsing.
//!
//! The manifest is the on-disk form of a [`ProjectDescription`]: it names
//! the target, partitions the source files by language, and collects the
//! flags, defines, include paths, and tool locations the generated
//! Makefile needs. [`ProjectManifest::find_and_load`] discovers it by
//! walking up from the invocation directory, so commands work from any
//! subdirectory of a project.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::description::{
    CustomRule, HostPlatform, Language, ProjectDescription, ToolPaths,
};
use crate::error::{ProjectError, Result};

/// Name of the manifest file at the project root.
pub const MANIFEST_NAME: &str = "stmbuild.toml";

/// The top-level manifest structure for an stmbuild project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectManifest {
    /// Project metadata (required).
    pub project: ProjectSection,
    /// Source file lists, partitioned by language.
    #[serde(default)]
    pub sources: SourcesSection,
    /// Preprocessor defines.
    #[serde(default)]
    pub defines: DefinesSection,
    /// Include directories.
    #[serde(default)]
    pub includes: IncludesSection,
    /// Extra compiler flags.
    #[serde(default)]
    pub flags: FlagsSection,
    /// Linker configuration.
    #[serde(default)]
    pub linker: LinkerSection,
    /// MCU characteristics.
    #[serde(default)]
    pub mcu: McuSection,
    /// External tool locations.
    #[serde(default)]
    pub tools: ToolPaths,
    /// Extra named make targets, rendered in order.
    #[serde(default)]
    pub rules: Vec<CustomRule>,
}

/// Project metadata section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectSection {
    /// Output binary base name (required).
    pub name: String,
    /// Link-step language. Defaults to C.
    #[serde(default)]
    pub language: Language,
    /// Optimization level character, e.g. `"g"`, `"2"`, `"s"`.
    #[serde(default = "default_optimization")]
    pub optimization: String,
    /// OpenOCD target name used by the erase rule (e.g. `stm32f4x`).
    #[serde(default)]
    pub target_mcu: String,
}

fn default_optimization() -> String {
    "g".to_string()
}

/// Source file lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcesSection {
    /// C source files.
    #[serde(default)]
    pub c: Vec<String>,
    /// C++ source files.
    #[serde(default)]
    pub cxx: Vec<String>,
    /// Assembly source files.
    #[serde(default)]
    pub asm: Vec<String>,
}

/// Preprocessor defines, without the `-D` prefix.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefinesSection {
    /// Defines for C compilation.
    #[serde(default)]
    pub c: Vec<String>,
    /// Defines for C++ compilation.
    #[serde(default)]
    pub cxx: Vec<String>,
}

/// Include directories, without the `-I` prefix.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludesSection {
    /// Directories shared by C and C++ compilation.
    #[serde(default)]
    pub dirs: Vec<String>,
}

/// Extra compiler flags, appended verbatim.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlagsSection {
    /// C compiler flags.
    #[serde(default)]
    pub c: Vec<String>,
    /// C++ compiler flags.
    #[serde(default)]
    pub cxx: Vec<String>,
    /// Assembler flags.
    #[serde(default)]
    pub asm: Vec<String>,
}

/// Linker configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LinkerSection {
    /// Linker script path.
    #[serde(default)]
    pub script: String,
    /// Library names, without the `-l` prefix.
    #[serde(default)]
    pub libs: Vec<String>,
    /// Library search directories, without the `-L` prefix.
    #[serde(default)]
    pub lib_dirs: Vec<String>,
    /// Extra linker flags, appended verbatim.
    #[serde(default)]
    pub flags: Vec<String>,
}

/// MCU characteristics fed to the `-m` flag family.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct McuSection {
    /// Core name (e.g. `cortex-m4`), with or without the `-mcpu=` prefix.
    #[serde(default)]
    pub cpu: String,
    /// FPU name (e.g. `fpv4-sp-d16`), with or without the `-mfpu=` prefix.
    #[serde(default)]
    pub fpu: String,
    /// Float ABI (e.g. `hard`), with or without the `-mfloat-abi=` prefix.
    #[serde(default)]
    pub float_abi: String,
}

impl ProjectManifest {
    /// Parse a manifest from TOML text.
    pub fn parse(toml_str: &str) -> Result<Self> {
        let manifest: ProjectManifest = toml::from_str(toml_str)?;
        Ok(manifest)
    }

    /// Load a manifest from a file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ProjectError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Walk up from `start_dir` looking for `stmbuild.toml`.
    ///
    /// Returns the manifest together with the directory containing it, or
    /// `None` when no ancestor holds one.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = Some(start_dir);
        while let Some(d) = dir {
            let candidate = d.join(MANIFEST_NAME);
            if candidate.exists() {
                let manifest = Self::load(&candidate)?;
                return Ok(Some((manifest, d.to_path_buf())));
            }
            dir = d.parent();
        }
        Ok(None)
    }

    /// Serialize the manifest to pretty TOML.
    pub fn to_toml(&self) -> Result<String> {
        let toml_str = toml::to_string_pretty(self)?;
        Ok(toml_str)
    }

    /// Build the renderer's input record from this manifest.
    ///
    /// `host` selects the platform family for the generated `clean` rule;
    /// pass [`HostPlatform::current()`] for the machine running the build.
    pub fn to_project(&self, host: HostPlatform) -> Result<ProjectDescription> {
        let mut chars = self.project.optimization.chars();
        let optimization = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => {
                return Err(ProjectError::InvalidField {
                    field: "project.optimization".into(),
                    detail: format!(
                        "expected a single optimization level character, got {:?}",
                        self.project.optimization
                    ),
                })
            }
        };

        Ok(ProjectDescription {
            target: self.project.name.clone(),
            language: self.project.language,
            optimization,
            c_sources: self.sources.c.clone(),
            cxx_sources: self.sources.cxx.clone(),
            asm_sources: self.sources.asm.clone(),
            c_defs: self.defines.c.clone(),
            cxx_defs: self.defines.cxx.clone(),
            c_includes: self.includes.dirs.clone(),
            c_flags: self.flags.c.clone(),
            cxx_flags: self.flags.cxx.clone(),
            asm_flags: self.flags.asm.clone(),
            ld_flags: self.linker.flags.clone(),
            libs: self.linker.libs.clone(),
            lib_dirs: self.linker.lib_dirs.clone(),
            ld_script: self.linker.script.clone(),
            cpu: self.mcu.cpu.clone(),
            fpu: self.mcu.fpu.clone(),
            float_abi: self.mcu.float_abi.clone(),
            target_mcu: self.project.target_mcu.clone(),
            tools: self.tools.clone(),
            custom_rules: self.rules.clone(),
            host,
        })
    }

    /// A starter manifest for a new project, as written by `stmbuild init`.
    pub fn starter(name: &str) -> Self {
        ProjectManifest {
            project: ProjectSection {
                name: name.to_string(),
                language: Language::C,
                optimization: "g".to_string(),
                target_mcu: "stm32f4x".to_string(),
            },
            mcu: McuSection {
                cpu: "cortex-m4".to_string(),
                fpu: "fpv4-sp-d16".to_string(),
                float_abi: "hard".to_string(),
            },
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r#"
[project]
name = "engine-firmware"
language = "C++"
optimization = "2"
target-mcu = "stm32f4x"

[sources]
c = ["Src/main.c", "Src/gpio.c"]
cxx = ["Src/app.cpp"]
asm = ["startup_stm32f407xx.s"]

[defines]
c = ["USE_HAL_DRIVER", "STM32F407xx"]
cxx = ["USE_HAL_DRIVER"]

[includes]
dirs = ["Inc", "Drivers/CMSIS/Include"]

[linker]
script = "STM32F407VGTx_FLASH.ld"
libs = ["c", "m", "nosys"]
lib-dirs = ["lib"]
flags = ["-specs=nano.specs"]

[mcu]
cpu = "cortex-m4"
fpu = "fpv4-sp-d16"
float-abi = "hard"

[tools]
arm-toolchain-path = "/opt/gcc-arm/bin"

[[rules]]
command = "size-report"
rule = "arm-none-eabi-size build/engine-firmware.elf"
depends-on = "all"
"#;

    #[test]
    fn parses_full_manifest() {
        let manifest = ProjectManifest::parse(EXAMPLE).unwrap();
        assert_eq!(manifest.project.name, "engine-firmware");
        assert_eq!(manifest.project.language, Language::Cxx);
        assert_eq!(manifest.sources.c.len(), 2);
        assert_eq!(manifest.linker.libs, vec!["c", "m", "nosys"]);
        assert_eq!(manifest.rules.len(), 1);
        assert_eq!(manifest.rules[0].depends_on.as_deref(), Some("all"));
    }

    #[test]
    fn to_project_maps_fields() {
        let manifest = ProjectManifest::parse(EXAMPLE).unwrap();
        let project = manifest.to_project(HostPlatform::Unix).unwrap();
        assert_eq!(project.target, "engine-firmware");
        assert_eq!(project.optimization, '2');
        assert_eq!(project.cxx_sources, vec!["Src/app.cpp"]);
        assert_eq!(project.ld_script, "STM32F407VGTx_FLASH.ld");
        assert_eq!(
            project.tools.arm_toolchain_path.as_deref(),
            Some(std::path::Path::new("/opt/gcc-arm/bin"))
        );
        assert_eq!(project.host, HostPlatform::Unix);
    }

    #[test]
    fn rejects_multi_char_optimization() {
        let manifest = ProjectManifest::parse(
            "[project]\nname = \"fw\"\noptimization = \"fast\"\n",
        )
        .unwrap();
        let err = manifest.to_project(HostPlatform::Unix).unwrap_err();
        assert!(matches!(err, ProjectError::InvalidField { .. }));
    }

    #[test]
    fn minimal_manifest_uses_defaults() {
        let manifest = ProjectManifest::parse("[project]\nname = \"fw\"\n").unwrap();
        let project = manifest.to_project(HostPlatform::Unix).unwrap();
        assert_eq!(project.language, Language::C);
        assert_eq!(project.optimization, 'g');
        assert!(project.c_sources.is_empty());
        assert!(project.tools.arm_toolchain_path.is_none());
    }

    #[test]
    fn find_and_load_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("Src/Drivers");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(
            dir.path().join(MANIFEST_NAME),
            "[project]\nname = \"fw\"\n",
        )
        .unwrap();

        let (manifest, root) = ProjectManifest::find_and_load(&nested)
            .unwrap()
            .expect("manifest should be discovered from a subdirectory");
        assert_eq!(manifest.project.name, "fw");
        assert_eq!(root, dir.path());
    }

    #[test]
    fn starter_round_trips() {
        let starter = ProjectManifest::starter("demo");
        let text = starter.to_toml().unwrap();
        let parsed = ProjectManifest::parse(&text).unwrap();
        assert_eq!(parsed.project.name, "demo");
        assert_eq!(parsed.mcu.cpu, "cortex-m4");
    }
}
