//! Platform facts the validators depend on
//!
//! The deny-list is seeded from the running system rather than from a fixed
//! `C:\Windows`: `SystemRoot` and `windir` name the actual system root on
//! machines installed elsewhere.

/// Environment variables that name the Windows system root
const SYSTEM_ROOT_VARS: &[&str] = &["SystemRoot", "windir"];

/// System-root subdirectories assets must never come from
const SYSTEM_SUBDIRS: &[&str] = &["System32", "SysWOW64", "Sysnative"];

/// Returns the current platform name
pub fn platform_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "macos") {
        "macos"
    } else if cfg!(target_os = "linux") {
        "linux"
    } else {
        "unknown"
    }
}

/// Split `C:\rest` (or `C:/rest`) into the drive letter and the remainder.
pub fn split_drive(path: &str) -> Option<(char, &str)> {
    let mut chars = path.chars();
    let letter = chars.next().filter(char::is_ascii_alphabetic)?;
    let rest = chars.as_str();
    let rest = rest.strip_prefix(":\\").or_else(|| rest.strip_prefix(":/"))?;
    Some((letter, rest))
}

/// Whether `path` starts with a drive letter and root separator.
pub fn is_drive_rooted(path: &str) -> bool {
    split_drive(path).is_some()
}

/// System roots named by the environment, deduplicated case-insensitively.
fn system_roots() -> Vec<String> {
    collect_roots(SYSTEM_ROOT_VARS.iter().filter_map(|var| std::env::var(var).ok()))
}

fn collect_roots(values: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut roots: Vec<String> = Vec::new();
    for value in values {
        let root = value.trim().trim_end_matches(['\\', '/']).to_string();
        if !is_drive_rooted(&format!("{root}\\")) {
            continue;
        }
        if !roots.iter().any(|r| r.eq_ignore_ascii_case(&root)) {
            roots.push(root);
        }
    }
    roots
}

/// Restricted directories under every discovered system root.
pub fn system_directories() -> Vec<String> {
    directories_under(&system_roots())
}

fn directories_under(roots: &[String]) -> Vec<String> {
    roots
        .iter()
        .flat_map(|root| SYSTEM_SUBDIRS.iter().map(move |sub| format!("{root}\\{sub}")))
        .collect()
}
