//! Boundary line classification.
//!
//! All predicates take raw line bytes because body lines may carry binary
//! data. Leading and trailing ASCII whitespace (including a CR left over
//! from LF splitting) is ignored when comparing against a token.

use rand::Rng;

/// Prefix of generated boundary tokens.
pub const BOUNDARY_PREFIX: &str = "Part_";

/// Whether `byte` belongs to the conservative RFC 2046 boundary alphabet.
const fn is_boundary_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
        || matches!(
            byte,
            b'\'' | b'(' | b')' | b'+' | b',' | b'-' | b'.' | b'/' | b':' | b'=' | b'?' | b' ' | b'_'
        )
}

/// Whether a line looks like any boundary line: `--` followed by one or
/// more boundary characters.
#[must_use]
pub fn is_boundary_line(line: impl AsRef<[u8]>) -> bool {
    let line = trim_line_end(line.as_ref());
    line.strip_prefix(b"--")
        .is_some_and(|rest| !rest.is_empty() && rest.iter().copied().all(is_boundary_char))
}

/// Whether the trimmed line equals `--token`.
#[must_use]
pub fn is_middle_boundary(line: impl AsRef<[u8]>, token: &str) -> bool {
    line.as_ref()
        .trim_ascii()
        .strip_prefix(b"--")
        .is_some_and(|rest| rest == token.as_bytes())
}

/// Whether the trimmed line equals `--token--`.
#[must_use]
pub fn is_last_boundary(line: impl AsRef<[u8]>, token: &str) -> bool {
    line.as_ref()
        .trim_ascii()
        .strip_prefix(b"--")
        .and_then(|rest| rest.strip_suffix(b"--"))
        .is_some_and(|rest| rest == token.as_bytes())
}

/// Whether any line of a message looks like a boundary line.
#[must_use]
pub fn any_boundary<L: AsRef<[u8]>>(lines: &[L]) -> bool {
    lines.iter().any(is_boundary_line)
}

/// Generates a boundary token: a fixed prefix and two independent random
/// components, e.g. `Part_12_5f0e3c1a9b7d2e46.c81f07a3d5e9b264`.
#[must_use]
pub fn generate_boundary() -> String {
    let mut rng = rand::thread_rng();
    format!(
        "{BOUNDARY_PREFIX}{}_{:016x}.{:016x}",
        rng.gen_range(10..=15),
        rng.r#gen::<u64>(),
        rng.r#gen::<u64>()
    )
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let end = line
        .iter()
        .rposition(|&b| b != b'\r' && b != b'\n')
        .map_or(0, |i| i + 1);
    &line[..end]
}
