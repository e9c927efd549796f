//! Content fingerprints for change detection.
//!
//! A fingerprint is a cheap derived value used to decide whether a resolved
//! item list differs from the last committed one. Only the texts participate,
//! joined with a separator: generated anchors follow the text, and an equal
//! text sequence is treated as an unchanged list.

/// Separator between item texts.
const SEPARATOR: &str = "|";

/// Compute the fingerprint of an ordered sequence of item texts.
pub fn fingerprint<I, S>(texts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (i, text) in texts.into_iter().enumerate() {
        if i > 0 {
            out.push_str(SEPARATOR);
        }
        out.push_str(text.as_ref());
    }
    out
}
