/// Name used when the response carries no usable `Content-Disposition`.
pub const DEFAULT_DOWNLOAD_NAME: &str = "processed_file";

/// Extract the value following `filename=`. A quoted value runs to its
/// closing quote; an unquoted one to the next `;` or the end of the header.
/// Returns `None` when the parameter is absent or empty.
pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    const KEY: &str = "filename=";
    // ASCII lowercasing keeps byte offsets aligned with `header`.
    let lowered = header.to_ascii_lowercase();
    let start = lowered.find(KEY)? + KEY.len();
    let rest = header[start..].trim_start();
    let value = match rest.strip_prefix('"') {
        Some(quoted) => match quoted.find('"') {
            Some(end) => &quoted[..end],
            None => until_delimiter(quoted),
        },
        None => until_delimiter(rest),
    }
    .trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn until_delimiter(value: &str) -> &str {
    value.split(';').next().unwrap_or(value)
}

/// Header bytes as text: UTF-8 when valid, otherwise Windows-1252, the
/// Latin-1 superset servers fall back to for non-ASCII file names.
pub fn decode_header_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => encoding_rs::WINDOWS_1252
            .decode_without_bom_handling(bytes)
            .0
            .into_owned(),
    }
}

/// Derived download name for a response; never fails.
pub fn download_filename(header: Option<&str>) -> String {
    header
        .and_then(filename_from_content_disposition)
        .unwrap_or_else(|| DEFAULT_DOWNLOAD_NAME.to_string())
}
