//! Makefile rendering for STM32 firmware projects.
//!
//! [`render`] is a pure function from a
//! [`ProjectDescription`](stmbuild_project::ProjectDescription) to the full
//! text of a gcc-based Makefile: source lists, MCU flags, pattern rules,
//! link/hex/bin rules, flash/erase/clean targets, custom rules, and a
//! trailing include of compiler-generated `.d` files for incremental
//! rebuilds. It performs no I/O and never fails; a malformed description
//! renders to a syntactically valid Makefile whose problems surface when
//! `make` runs it. Identical input renders to byte-identical output.

pub mod format;

use stmbuild_project::{HostPlatform, Language, ProjectDescription};

use crate::format::{
    custom_rules_block, gcc_path_line, multi_line_list, openocd_command, prefix_when_none_exists,
    single_line_list,
};

/// File name the generated build description is written under, and the
/// name the generated pattern rules list as a prerequisite so objects
/// rebuild when the build description changes.
pub const MAKEFILE_NAME: &str = "STM32Make.make";

/// Render the complete Makefile text for a project.
pub fn render(project: &ProjectDescription) -> String {
    let link_driver = match project.language {
        Language::C => "CC",
        Language::Cxx => "CXX",
    };
    let clean_command = match project.host {
        HostPlatform::Windows => "cmd /c rd /s /q",
        HostPlatform::Unix => "-rm -fR",
    };
    let openocd = openocd_command(&project.tools);

    format!(
        "##########################################################################################################################
# File automatically-generated by stmbuild
##########################################################################################################################

# ------------------------------------------------
# Generic Makefile (based on gcc)
#
# ChangeLog :
#\t2017-02-10 - Several enhancements + project update mode
#   2015-07-22 - first version
# ------------------------------------------------

######################################
# target
######################################
TARGET = {target}


######################################
# building variables
######################################
# debug build?
DEBUG = 1
# optimization
OPT = -O{optimization}


#######################################
# paths
#######################################
# Build path
BUILD_DIR = build

######################################
# source
######################################
# C sources
C_SOURCES =  \\
{c_sources}

CPP_SOURCES = \\
{cpp_sources}

# ASM sources
ASM_SOURCES =  \\
{asm_sources}


#######################################
# binaries
#######################################
PREFIX = arm-none-eabi-
POSTFIX = \"
# The gcc compiler bin path can be either defined in make command via GCC_PATH variable (> make GCC_PATH=xxx)
# either it can be added to the PATH environment variable.
{gcc_path}
ifdef GCC_PATH
CXX = $(GCC_PATH)/$(PREFIX)g++$(POSTFIX)
CC = $(GCC_PATH)/$(PREFIX)gcc$(POSTFIX)
AS = $(GCC_PATH)/$(PREFIX)gcc$(POSTFIX) -x assembler-with-cpp
CP = $(GCC_PATH)/$(PREFIX)objcopy$(POSTFIX)
SZ = $(GCC_PATH)/$(PREFIX)size$(POSTFIX)
else
CXX = $(PREFIX)g++
CC = $(PREFIX)gcc
AS = $(PREFIX)gcc -x assembler-with-cpp
CP = $(PREFIX)objcopy
SZ = $(PREFIX)size
endif
HEX = $(CP) -O ihex
BIN = $(CP) -O binary -S

#######################################
# CFLAGS
#######################################
# cpu
CPU = {cpu}

# fpu
FPU = {fpu}

# float-abi
FLOAT-ABI = {float_abi}

# mcu
MCU = $(CPU) -mthumb $(FPU) $(FLOAT-ABI)

# macros for gcc
# AS defines
AS_DEFS =\x20

# C defines
C_DEFS =  \\
{c_defs}

# CXX defines
CXX_DEFS =  \\
{cxx_defs}

# AS includes
AS_INCLUDES = \\

# C includes
C_INCLUDES =  \\
{c_includes}


# compile gcc flags
ASFLAGS = $(MCU) $(AS_DEFS) $(AS_INCLUDES) $(OPT) -Wall -fdata-sections -ffunction-sections

CFLAGS = $(MCU) $(C_DEFS) $(C_INCLUDES) $(OPT) -Wall -fdata-sections -ffunction-sections

CXXFLAGS = $(MCU) $(CXX_DEFS) $(C_INCLUDES) $(OPT) -Wall -fdata-sections -ffunction-sections -feliminate-unused-debug-types

ifeq ($(DEBUG), 1)
CFLAGS += -g -gdwarf -ggdb
CXXFLAGS += -g -gdwarf -ggdb
endif

# Add additional flags
CFLAGS += {c_flags}
ASFLAGS += {asm_flags}
CXXFLAGS += {cxx_flags}

# Generate dependency information
CFLAGS += -MMD -MP -MF\"$(@:%.o=%.d)\"
CXXFLAGS += -MMD -MP -MF\"$(@:%.o=%.d)\"

#######################################
# LDFLAGS
#######################################
# link script
LDSCRIPT = {ld_script}

# libraries
LIBS = {libs}
LIBDIR = \\
{lib_dirs}

# Additional LD Flags from config file
ADDITIONALLDFLAGS = {ld_flags}

LDFLAGS = $(MCU) $(ADDITIONALLDFLAGS) -T$(LDSCRIPT) $(LIBDIR) $(LIBS) -Wl,-Map=$(BUILD_DIR)/$(TARGET).map,--cref -Wl,--gc-sections

# default action: build all
all: $(BUILD_DIR)/$(TARGET).elf $(BUILD_DIR)/$(TARGET).hex $(BUILD_DIR)/$(TARGET).bin


#######################################
# build the application
#######################################
# list of cpp program objects
OBJECTS = $(addprefix $(BUILD_DIR)/,$(notdir $(CPP_SOURCES:.cpp=.o)))
vpath %.cpp $(sort $(dir $(CPP_SOURCES)))

# list of C objects
OBJECTS += $(addprefix $(BUILD_DIR)/,$(notdir $(C_SOURCES:.c=.o)))
vpath %.c $(sort $(dir $(C_SOURCES)))
# list of ASM program objects
OBJECTS += $(addprefix $(BUILD_DIR)/,$(notdir $(ASM_SOURCES:.s=.o)))
vpath %.s $(sort $(dir $(ASM_SOURCES)))

$(BUILD_DIR)/%.o: %.cpp {makefile_name} | $(BUILD_DIR)\x20
\t$(CXX) -c $(CXXFLAGS) -Wa,-a,-ad,-alms=$(BUILD_DIR)/$(notdir $(<:.cpp=.lst)) $< -o $@

$(BUILD_DIR)/%.o: %.cxx {makefile_name} | $(BUILD_DIR)\x20
\t$(CXX) -c $(CXXFLAGS) -Wa,-a,-ad,-alms=$(BUILD_DIR)/$(notdir $(<:.cxx=.lst)) $< -o $@

$(BUILD_DIR)/%.o: %.c {makefile_name} | $(BUILD_DIR)\x20
\t$(CC) -c $(CFLAGS) -Wa,-a,-ad,-alms=$(BUILD_DIR)/$(notdir $(<:.c=.lst)) $< -o $@

$(BUILD_DIR)/%.o: %.s {makefile_name} | $(BUILD_DIR)
\t$(AS) -c $(CFLAGS) $< -o $@

$(BUILD_DIR)/$(TARGET).elf: $(OBJECTS) {makefile_name}
\t$({link_driver}) $(OBJECTS) $(LDFLAGS) -o $@
\t$(SZ) $@

$(BUILD_DIR)/%.hex: $(BUILD_DIR)/%.elf | $(BUILD_DIR)
\t$(HEX) $< $@

$(BUILD_DIR)/%.bin: $(BUILD_DIR)/%.elf | $(BUILD_DIR)
\t$(BIN) $< $@

$(BUILD_DIR):
\tmkdir $@

#######################################
# flash
#######################################
flash: $(BUILD_DIR)/$(TARGET).elf
\t{openocd} -f ./openocd.cfg -c \"program $(BUILD_DIR)/$(TARGET).elf verify reset exit\"

#######################################
# erase
#######################################
erase: $(BUILD_DIR)/$(TARGET).elf
\t{openocd} -f ./openocd.cfg -c \"init; reset halt; {target_mcu} mass_erase 0; exit\"

#######################################
# clean up
#######################################
clean:
\t{clean_command} $(BUILD_DIR)

#######################################
# custom makefile rules
#######################################

{custom_rules}
\t
#######################################
# dependencies
#######################################
-include $(wildcard $(BUILD_DIR)/*.d)

# *** EOF ***",
        target = project.target,
        optimization = project.optimization,
        c_sources = multi_line_list(&project.c_sources, ""),
        cpp_sources = multi_line_list(&project.cxx_sources, ""),
        asm_sources = multi_line_list(&project.asm_sources, ""),
        gcc_path = gcc_path_line(&project.tools),
        cpu = prefix_when_none_exists(&project.cpu, "-mcpu="),
        fpu = prefix_when_none_exists(&project.fpu, "-mfpu="),
        float_abi = prefix_when_none_exists(&project.float_abi, "-mfloat-abi="),
        c_defs = multi_line_list(&project.c_defs, "-D"),
        cxx_defs = multi_line_list(&project.cxx_defs, "-D"),
        c_includes = multi_line_list(&project.c_includes, "-I"),
        c_flags = single_line_list(&project.c_flags, ""),
        asm_flags = single_line_list(&project.asm_flags, ""),
        cxx_flags = single_line_list(&project.cxx_flags, ""),
        ld_script = project.ld_script,
        libs = single_line_list(&project.libs, "-l"),
        lib_dirs = multi_line_list(&project.lib_dirs, "-L"),
        ld_flags = single_line_list(&project.ld_flags, ""),
        makefile_name = MAKEFILE_NAME,
        link_driver = link_driver,
        openocd = openocd,
        target_mcu = project.target_mcu,
        clean_command = clean_command,
        custom_rules = custom_rules_block(&project.custom_rules),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use stmbuild_project::{CustomRule, ToolPaths};

    fn sample() -> ProjectDescription {
        ProjectDescription {
            target: "firmware".into(),
            language: Language::C,
            optimization: 'g',
            c_sources: vec!["Src/main.c".into(), "Src/gpio.c".into()],
            cxx_sources: vec!["Src/app.cpp".into()],
            asm_sources: vec!["startup_stm32f407xx.s".into()],
            c_defs: vec!["USE_HAL_DRIVER".into(), "STM32F407xx".into()],
            c_includes: vec!["Inc".into(), "Drivers/CMSIS/Include".into()],
            ld_script: "STM32F407VGTx_FLASH.ld".into(),
            cpu: "cortex-m4".into(),
            fpu: "fpv4-sp-d16".into(),
            float_abi: "hard".into(),
            target_mcu: "stm32f4x".into(),
            host: HostPlatform::Unix,
            ..Default::default()
        }
    }

    #[test]
    fn render_is_deterministic() {
        let project = sample();
        assert_eq!(render(&project), render(&project));
    }

    #[test]
    fn list_rendering_ignores_input_order_and_duplicates() {
        let a = sample();
        let mut b = sample();
        b.c_defs = vec![
            "STM32F407xx".into(),
            "USE_HAL_DRIVER".into(),
            "USE_HAL_DRIVER".into(),
        ];
        b.c_sources.reverse();
        assert_eq!(render(&a), render(&b));
    }

    #[test]
    fn sources_are_sorted_into_their_blocks() {
        let text = render(&sample());
        assert!(text.contains("C_SOURCES =  \\\nSrc/gpio.c \\\nSrc/main.c\n"));
        assert!(text.contains("ASM_SOURCES =  \\\nstartup_stm32f407xx.s\n"));
        assert!(text.contains("C_DEFS =  \\\n-DSTM32F407xx \\\n-DUSE_HAL_DRIVER\n"));
        assert!(text.contains("C_INCLUDES =  \\\n-IDrivers/CMSIS/Include \\\n-IInc\n"));
    }

    #[test]
    fn optimization_level_renders_after_the_o_prefix() {
        let text = render(&sample());
        assert!(text.contains("OPT = -Og\n"));

        let mut level_two = sample();
        level_two.optimization = '2';
        let text = render(&level_two);
        assert!(text.contains("OPT = -O2\n"));
        assert!(!text.contains("OPT = -2\n"));
    }

    #[test]
    fn mcu_flags_are_prefixed_once() {
        let text = render(&sample());
        assert!(text.contains("CPU = -mcpu=cortex-m4\n"));
        assert!(text.contains("FPU = -mfpu=fpv4-sp-d16\n"));
        assert!(text.contains("FLOAT-ABI = -mfloat-abi=hard\n"));

        let mut prefixed = sample();
        prefixed.cpu = "-mcpu=cortex-m4".into();
        assert!(render(&prefixed).contains("CPU = -mcpu=cortex-m4\n"));
    }

    #[test]
    fn empty_mcu_flags_render_empty() {
        let mut project = sample();
        project.fpu = String::new();
        let text = render(&project);
        assert!(text.contains("FPU = \n"));
    }

    #[test]
    fn link_rule_follows_language() {
        let c_text = render(&sample());
        assert!(c_text.contains("\t$(CC) $(OBJECTS) $(LDFLAGS) -o $@\n"));
        assert!(!c_text.contains("\t$(CXX) $(OBJECTS) $(LDFLAGS) -o $@\n"));

        let mut cxx = sample();
        cxx.language = Language::Cxx;
        let cxx_text = render(&cxx);
        assert!(cxx_text.contains("\t$(CXX) $(OBJECTS) $(LDFLAGS) -o $@\n"));
    }

    #[test]
    fn clean_rule_follows_host_platform() {
        let unix = render(&sample());
        assert!(unix.contains("clean:\n\t-rm -fR $(BUILD_DIR)\n"));

        let mut windows = sample();
        windows.host = HostPlatform::Windows;
        let win_text = render(&windows);
        assert!(win_text.contains("clean:\n\tcmd /c rd /s /q $(BUILD_DIR)\n"));
    }

    #[test]
    fn gcc_path_injection_toggles() {
        let without = render(&sample());
        assert_eq!(without.matches("GCC_PATH=\"").count(), 0);

        let mut with = sample();
        with.tools = ToolPaths {
            arm_toolchain_path: Some(PathBuf::from("/opt/gcc-arm/bin")),
            ..Default::default()
        };
        let text = render(&with);
        assert_eq!(text.matches("GCC_PATH=\"").count(), 1);
        assert!(text.contains("GCC_PATH=\"/opt/gcc-arm/bin\nifdef GCC_PATH\n"));

        let mut dot = sample();
        dot.tools.arm_toolchain_path = Some(PathBuf::from("."));
        assert_eq!(render(&dot).matches("GCC_PATH=\"").count(), 0);
    }

    #[test]
    fn flash_and_erase_use_configured_openocd() {
        let bare = render(&sample());
        assert!(bare.contains("\topenocd -f ./openocd.cfg -c \"program $(BUILD_DIR)/$(TARGET).elf verify reset exit\"\n"));
        assert!(bare.contains(
            "\topenocd -f ./openocd.cfg -c \"init; reset halt; stm32f4x mass_erase 0; exit\"\n"
        ));

        let mut with = sample();
        with.tools.openocd_path = Some(PathBuf::from("C:\\openocd\\bin\\openocd.exe"));
        let text = render(&with);
        assert!(text.contains("\t\"C:/openocd/bin/openocd.exe\" -f ./openocd.cfg -c \"program"));
    }

    #[test]
    fn custom_rules_render_in_declaration_order() {
        let mut project = sample();
        project.custom_rules = vec![
            CustomRule {
                command: "foo".into(),
                rule: "echo foo".into(),
                depends_on: None,
            },
            CustomRule {
                command: "bar".into(),
                rule: "echo bar".into(),
                depends_on: Some("foo".into()),
            },
        ];
        let text = render(&project);
        let foo_pos = text.find("foo: \n\techo foo").unwrap();
        let bar_pos = text.find("bar: foo\n\techo bar").unwrap();
        assert!(foo_pos < bar_pos);
    }

    #[test]
    fn dependency_tracking_is_configured() {
        let text = render(&sample());
        assert!(text.contains("CFLAGS += -MMD -MP -MF\"$(@:%.o=%.d)\"\n"));
        assert!(text.contains("CXXFLAGS += -MMD -MP -MF\"$(@:%.o=%.d)\"\n"));
        assert!(text.contains("-include $(wildcard $(BUILD_DIR)/*.d)\n"));
        assert!(text.ends_with("# *** EOF ***"));
    }

    #[test]
    fn sections_appear_in_fixed_order() {
        let text = render(&sample());
        let positions = [
            text.find("TARGET = ").unwrap(),
            text.find("C_SOURCES =").unwrap(),
            text.find("PREFIX = arm-none-eabi-").unwrap(),
            text.find("CPU = ").unwrap(),
            text.find("LDFLAGS = ").unwrap(),
            text.find("all: $(BUILD_DIR)").unwrap(),
            text.find("flash: ").unwrap(),
            text.find("erase: ").unwrap(),
            text.find("clean:").unwrap(),
            text.find("-include $(wildcard").unwrap(),
        ];
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn pattern_rules_depend_on_the_generated_makefile() {
        let text = render(&sample());
        assert!(text.contains("$(BUILD_DIR)/%.o: %.c STM32Make.make | $(BUILD_DIR) \n"));
        assert!(text.contains("$(BUILD_DIR)/%.o: %.s STM32Make.make | $(BUILD_DIR)\n"));
        assert!(text.contains("$(BUILD_DIR)/$(TARGET).elf: $(OBJECTS) STM32Make.make\n"));
    }
}
