use rowmap_core::Result;

/// Scans `text` for `{open}...{close}` tokens, replacing each token's
/// content with whatever `handler` returns. Everything outside a token
/// passes through untouched. An unterminated token passes through
/// literally.
pub(crate) fn parse_tokens(
    open: &str,
    close: &str,
    text: &str,
    handler: &mut dyn FnMut(&str) -> Result<String>,
) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(open) {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + open.len()..];

        match after_open.find(close) {
            Some(end) => {
                out.push_str(&handler(&after_open[..end])?);
                rest = &after_open[end + close.len()..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    Ok(out)
}

/// Returns `true` when `text` contains at least one complete
/// `{open}...{close}` token.
pub(crate) fn contains_token(open: &str, close: &str, text: &str) -> bool {
    match text.find(open) {
        Some(start) => text[start + open.len()..].contains(close),
        None => false,
    }
}
