/*
 * info.rs
 * Copyright (c) 2025 Posit, PBC
 */

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version banner: one tab-separated line for the bridge and one for the
/// embedded compiler.
pub fn info() -> String {
    format!(
        "sass-bridge\t{}\t(Wrapper)\t[Rust]\nsass-bridge compiler\t{}\t(Sass Compiler)\t[Rust]",
        VERSION, VERSION
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_lines() {
        let banner = info();
        let lines: Vec<&str> = banner.lines().collect();
        assert_eq!(lines.len(), 2);
        let wrapper: Vec<&str> = lines[0].split('\t').collect();
        assert_eq!(wrapper, vec!["sass-bridge", VERSION, "(Wrapper)", "[Rust]"]);
        assert!(lines[1].starts_with("sass-bridge compiler\t"));
        assert!(lines[1].ends_with("\t(Sass Compiler)\t[Rust]"));
    }
}
