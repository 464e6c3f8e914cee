//! String-formatting helpers for Makefile rendering.
//!
//! All list helpers normalize their input the same way: duplicates are
//! removed and the remainder is sorted ordinally (byte-wise ascending).
//! That normalization is part of the output contract — callers cannot rely
//! on declaration order surviving into the rendered text.

use stmbuild_project::{posix_path, CustomRule, ToolPaths};

/// Format a set of strings as a backslash-continued multi-line list.
///
/// Entries are deduplicated and sorted; each renders on its own line as
/// `{prefix}{entry}`, with ` \` appended to every line except the last.
/// Every line, including the last, ends with a newline. Empty input
/// renders as the empty string.
pub fn multi_line_list(items: &[String], prefix: &str) -> String {
    let sorted = dedup_sort(items);
    let mut output = String::new();
    for (i, entry) in sorted.iter().enumerate() {
        output.push_str(prefix);
        output.push_str(entry);
        if i < sorted.len() - 1 {
            output.push_str(" \\");
        }
        output.push('\n');
    }
    output
}

/// Format a set of strings as a single line.
///
/// Same dedup + sort as [`multi_line_list`]; each entry renders as
/// `{prefix}{entry} ` with a trailing space after every entry, including
/// the last. Empty input renders as the empty string.
pub fn single_line_list(items: &[String], prefix: &str) -> String {
    let sorted = dedup_sort(items);
    let mut output = String::new();
    for entry in &sorted {
        output.push_str(prefix);
        output.push_str(entry);
        output.push(' ');
    }
    output
}

/// Prepend `prefix` to `input` unless it is already present.
///
/// Empty input renders as the empty string; input that already contains
/// the prefix substring is returned unchanged, so a user-supplied
/// `-mcpu=cortex-m4` is not prefixed a second time.
pub fn prefix_when_none_exists(input: &str, prefix: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    if input.contains(prefix) {
        return input.to_string();
    }
    format!("{prefix}{input}")
}

/// The `GCC_PATH` override line for the binaries section.
///
/// Empty when no toolchain path is configured, or when it is empty or the
/// current-directory marker `"."`. Otherwise renders as
/// `GCC_PATH="{posix-path}` — deliberately without a closing quote: the
/// template's `POSTFIX = "` variable supplies it through `$(POSTFIX)`
/// expansion in the tool definitions that consume `$(GCC_PATH)`.
pub fn gcc_path_line(tools: &ToolPaths) -> String {
    match &tools.arm_toolchain_path {
        Some(path) if !path.as_os_str().is_empty() && path.as_os_str() != "." => {
            format!("GCC_PATH=\"{}", posix_path(path))
        }
        _ => String::new(),
    }
}

/// The command that invokes the flashing utility.
///
/// A configured OpenOCD path renders double-quoted in forward-slash form;
/// otherwise the bare command name is used and resolution is left to the
/// shell's search path.
pub fn openocd_command(tools: &ToolPaths) -> String {
    match &tools.openocd_path {
        Some(path) if !path.as_os_str().is_empty() => {
            format!("\"{}\"", posix_path(path))
        }
        _ => "openocd".to_string(),
    }
}

/// Render the custom rule blocks, in input order.
///
/// Each rule renders as a banner comment, a `{command}: {depends_on}`
/// target line (empty prerequisite list when `depends_on` is absent), and
/// a tab-indented rule line. Order is semantic: later rules may name
/// earlier ones as prerequisites.
pub fn custom_rules_block(rules: &[CustomRule]) -> String {
    let mut output = String::new();
    for rule in rules {
        let depends_on = rule.depends_on.as_deref().unwrap_or("");
        output.push_str("\n\n");
        output.push_str(&format!(
            "\n#######################################\n# {command}\n#######################################\n{command}: {depends_on}\n\t{rule}\n      ",
            command = rule.command,
            depends_on = depends_on,
            rule = rule.rule,
        ));
    }
    output
}

fn dedup_sort(items: &[String]) -> Vec<&str> {
    let mut sorted: Vec<&str> = items.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.dedup();
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn multi_line_list_sorts_and_dedups() {
        let out = multi_line_list(&strings(&["B", "A", "A"]), "-D");
        assert_eq!(out, "-DA \\\n-DB\n");

        // Input order and duplicates never show in the output.
        let same = multi_line_list(&strings(&["A", "B"]), "-D");
        assert_eq!(out, same);
    }

    #[test]
    fn multi_line_list_single_entry_has_no_continuation() {
        assert_eq!(multi_line_list(&strings(&["Src/main.c"]), ""), "Src/main.c\n");
    }

    #[test]
    fn multi_line_list_empty_is_empty() {
        assert_eq!(multi_line_list(&[], "-I"), "");
    }

    #[test]
    fn single_line_list_trailing_space_per_entry() {
        let out = single_line_list(&strings(&["m", "c", "c"]), "-l");
        assert_eq!(out, "-lc -lm ");
        assert_eq!(single_line_list(&[], "-l"), "");
    }

    #[test]
    fn prefix_is_not_duplicated() {
        assert_eq!(
            prefix_when_none_exists("-mcpu=cortex-m4", "-mcpu="),
            "-mcpu=cortex-m4"
        );
        assert_eq!(
            prefix_when_none_exists("cortex-m4", "-mcpu="),
            "-mcpu=cortex-m4"
        );
        assert_eq!(prefix_when_none_exists("", "-mcpu="), "");
    }

    #[test]
    fn gcc_path_line_toggles() {
        assert_eq!(gcc_path_line(&ToolPaths::default()), "");
        assert_eq!(
            gcc_path_line(&ToolPaths {
                arm_toolchain_path: Some(PathBuf::from(".")),
                ..Default::default()
            }),
            ""
        );
        assert_eq!(
            gcc_path_line(&ToolPaths {
                arm_toolchain_path: Some(PathBuf::from("")),
                ..Default::default()
            }),
            ""
        );
        // The fragment is intentionally unterminated; POSTFIX closes it.
        assert_eq!(
            gcc_path_line(&ToolPaths {
                arm_toolchain_path: Some(PathBuf::from("C:\\tools\\gcc-arm\\bin")),
                ..Default::default()
            }),
            "GCC_PATH=\"C:/tools/gcc-arm/bin"
        );
    }

    #[test]
    fn openocd_command_quotes_configured_path() {
        assert_eq!(openocd_command(&ToolPaths::default()), "openocd");
        assert_eq!(
            openocd_command(&ToolPaths {
                openocd_path: Some(PathBuf::from("C:\\tools\\openocd\\bin\\openocd.exe")),
                ..Default::default()
            }),
            "\"C:/tools/openocd/bin/openocd.exe\""
        );
    }

    #[test]
    fn custom_rules_render_in_order() {
        let rules = vec![
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
        let out = custom_rules_block(&rules);
        let foo_pos = out.find("foo: \n").unwrap();
        let bar_pos = out.find("bar: foo\n").unwrap();
        assert!(foo_pos < bar_pos);
        assert!(out.contains("\techo foo\n"));
        assert!(out.contains("\techo bar\n"));
    }

    #[test]
    fn no_custom_rules_render_empty() {
        assert_eq!(custom_rules_block(&[]), "");
    }
}
