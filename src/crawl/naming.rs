//! Output file naming
//!
//! Every saved artifact is named after the last path segment of its URL.
//! Pages get a `.txt` suffix, media get `.img` / `.video` appended to the
//! segment as-is (so `logo.png` is stored as `logo.png.img`).

/// Name used when the URL ends in `/`
const INDEX_NAME: &str = "index";

/// Build the output file name for `url` with `extension` appended.
///
/// The extension is appended verbatim and should include its leading dot.
pub fn file_name_for(url: &str, extension: &str) -> String {
    let last_segment = match url.rfind('/') {
        Some(idx) => &url[idx + 1..],
        None => url,
    };

    let base = if last_segment.is_empty() {
        INDEX_NAME.to_string()
    } else {
        sanitize(last_segment)
    };

    format!("{}{}", base, extension)
}

/// Replace characters that are not allowed in file names on common platforms
fn sanitize(segment: &str) -> String {
    segment
        .chars()
        .map(|c| match c {
            '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
