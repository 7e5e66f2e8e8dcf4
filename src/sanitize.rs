//! Upload filename sanitizing.

use std::path::Path;

use unicode_normalization::UnicodeNormalization as _;

/// Reduce a client-supplied filename to a safe, ASCII-only base name.
///
/// Directory components are dropped and accented letters are folded to ASCII (`é` -> `e`).
/// Whitespace becomes `_`, anything left outside `[A-Za-z0-9._-]` is removed, and
/// leading/trailing `.`/`_` are stripped. The result may be empty.
pub fn secure_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let folded: String = base.nfkd().filter(char::is_ascii).collect();
    let joined = folded.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    kept.trim_matches(['.', '_']).to_string()
}

/// Name under which the `index`-th upload is stored.
///
/// Falls back to `<fallback_stem>_<index>` when nothing of the original stem survives
/// sanitizing (e.g. a fully non-Latin name), keeping the extension so the file still passes
/// extension filtering.
pub fn upload_filename(index: usize, original: &str, fallback_stem: &str) -> String {
    let base = original.rsplit(['/', '\\']).next().unwrap_or_default();
    let path = Path::new(base);
    let stem = path
        .file_stem()
        .map(|s| secure_filename(&s.to_string_lossy()))
        .unwrap_or_default();

    if !stem.is_empty() {
        let clean = secure_filename(base);
        if !clean.is_empty() {
            return clean;
        }
    }

    let ext = path
        .extension()
        .map(|e| secure_filename(&e.to_string_lossy()))
        .unwrap_or_default();
    if ext.is_empty() {
        format!("{fallback_stem}_{index:04}")
    } else {
        format!("{fallback_stem}_{index:04}.{ext}")
    }
}
