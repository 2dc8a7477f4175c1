/// Longest banner kept, in characters.
pub const MAX_BANNER_CHARS: usize = 80;

/// Best-effort conversion of raw banner bytes into one printable line.
///
/// Invalid UTF-8 and control characters are dropped, only the first line is
/// kept and it is cut to [`MAX_BANNER_CHARS`]. Returns `None` when nothing
/// printable is left.
pub fn decode(bytes: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(bytes);
    let printable: String = text
        .chars()
        .filter(|c| (' '..='~').contains(c) || *c == '\n')
        .collect();

    let first_line = printable.trim().lines().next()?;
    let banner: String = first_line.chars().take(MAX_BANNER_CHARS).collect();

    (!banner.is_empty()).then_some(banner)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
