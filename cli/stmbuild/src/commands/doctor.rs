//! `stmbuild doctor` — toolchain diagnostics.

use std::path::Path;
use std::process::Command;

use anyhow::Result;

use stmbuild_project::{posix_path, ProjectManifest};

/// Print toolchain diagnostic information.
pub fn run(cwd: &Path) -> Result<()> {
    println!("=== stmbuild doctor ===");
    println!();

    println!("stmbuild version: {}", env!("CARGO_PKG_VERSION"));
    println!();

    let manifest = ProjectManifest::find_and_load(cwd)?;

    println!("--- Build Tools ---");
    let gcc = manifest
        .as_ref()
        .and_then(|(m, _)| m.tools.arm_toolchain_path.as_ref())
        .map(|dir| format!("{}/arm-none-eabi-gcc", posix_path(dir)))
        .unwrap_or_else(|| "arm-none-eabi-gcc".to_string());
    print_tool_status(&gcc, &["--version"]);
    print_tool_status("make", &["--version"]);
    let openocd = manifest
        .as_ref()
        .and_then(|(m, _)| m.tools.openocd_path.as_ref())
        .map(|p| posix_path(p))
        .unwrap_or_else(|| "openocd".to_string());
    print_tool_status(&openocd, &["--version"]);
    println!();

    println!("--- Project Status ---");
    match manifest {
        Some((manifest, dir)) => {
            println!("  stmbuild.toml: found at {}", dir.display());
            println!("  Project:       {}", manifest.project.name);
            println!("  Target MCU:    {}", manifest.project.target_mcu);
            println!(
                "  Sources:       {} C, {} C++, {} ASM",
                manifest.sources.c.len(),
                manifest.sources.cxx.len(),
                manifest.sources.asm.len()
            );
        }
        None => {
            println!("  stmbuild.toml: not found");
        }
    }

    Ok(())
}

fn print_tool_status(tool: &str, args: &[&str]) {
    match Command::new(tool).args(args).output() {
        Ok(output) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let first_line = stdout.lines().next().unwrap_or("(no version output)");
            println!("  {tool}: {first_line}");
        }
        Ok(_) => println!("  {tool}: found but returned an error"),
        Err(_) => println!("  {tool}: not found"),
    }
}
