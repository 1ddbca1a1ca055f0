//! Allow-list grammar for asset paths
//!
//! Accepted shape, ASCII case-insensitive:
//!
//! ```text
//! path      = drive ":\" *(directory "\") file "." extension
//! directory = edge / edge *inner edge
//! file      = edge *inner
//! edge      = ALPHA / DIGIT / "_" / "(" / ")" / "[" / "]" / "!" / "+" / "-"
//! inner     = edge / "." / " "
//! ```
//!
//! The scanner walks the input once, so matching is linear in its length
//! whatever an attacker puts in it.

fn is_edge_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'(' | b')' | b'[' | b']' | b'!' | b'+' | b'-')
}

fn is_inner_char(b: u8) -> bool {
    is_edge_char(b) || b == b'.' || b == b' '
}

fn is_directory_segment(segment: &[u8]) -> bool {
    match segment {
        [] => false,
        [only] => is_edge_char(*only),
        [first, middle @ .., last] => {
            is_edge_char(*first) && is_edge_char(*last) && middle.iter().all(|&b| is_inner_char(b))
        }
    }
}

fn is_file_stem(stem: &[u8]) -> bool {
    match stem.split_first() {
        Some((first, rest)) => is_edge_char(*first) && rest.iter().all(|&b| is_inner_char(b)),
        None => false,
    }
}

/// Whether `path` is a drive-rooted Windows path to a `.<extension>` file
/// built only from allow-listed characters.
pub fn matches_asset_path(path: &str, extension: &str) -> bool {
    let bytes = path.as_bytes();
    if bytes.len() < 3 || !bytes[0].is_ascii_alphabetic() || bytes[1] != b':' || bytes[2] != b'\\' {
        return false;
    }
    let rest = &bytes[3..];

    let file = match rest.iter().rposition(|&b| b == b'\\') {
        Some(split) => {
            if !rest[..split].split(|&b| b == b'\\').all(is_directory_segment) {
                return false;
            }
            &rest[split + 1..]
        }
        None => rest,
    };

    let suffix_len = extension.len() + 1;
    if file.len() <= suffix_len {
        return false;
    }
    let (stem, suffix) = file.split_at(file.len() - suffix_len);
    suffix[0] == b'.' && suffix[1..].eq_ignore_ascii_case(extension.as_bytes()) && is_file_stem(stem)
}
