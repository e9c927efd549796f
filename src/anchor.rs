//! Anchor identity generation for headings.
//!
//! Anchors are the wire contract between the live editing surface and the
//! static rendering surface: both sides compute them independently from the
//! heading text alone, so the algorithm must produce identical bytes in every
//! environment. That rules out library hash functions with unspecified
//! internals; the hash below is a fixed 31-multiplier polynomial over Unicode
//! code points with two's-complement 32-bit wraparound.

use ulid::Ulid;

/// Prefix applied to every generated anchor.
pub const ANCHOR_PREFIX: &str = "h3-";

/// Maximum number of hex digits kept from the hash.
const ANCHOR_HEX_LEN: usize = 8;

/// Generate a stable anchor identifier for a heading text.
///
/// For non-blank text the result is deterministic: the same text always
/// produces the same anchor, on any surface. Blank text gets a random
/// suffix instead, purely to avoid empty anchors colliding with each other.
///
/// Collisions between two distinct headings are possible (the anchor keeps at
/// most 8 hex digits of a 32-bit hash) and are not detected or disambiguated.
///
/// # Example
///
/// ```
/// use section_toc::anchor::generate_anchor_id;
///
/// let a = generate_anchor_id("Getting Started");
/// let b = generate_anchor_id("Getting Started");
/// assert_eq!(a, b);
/// assert!(a.starts_with("h3-"));
/// ```
pub fn generate_anchor_id(text: &str) -> String {
    if text.trim().is_empty() {
        return format!("{ANCHOR_PREFIX}{}", random_suffix());
    }

    let mut acc: i32 = 0;
    for c in text.chars() {
        acc = acc.wrapping_mul(31).wrapping_add(c as i32);
    }

    let hex = format!("{:x}", acc.unsigned_abs());
    let len = hex.len().min(ANCHOR_HEX_LEN);
    format!("{ANCHOR_PREFIX}{}", &hex[..len])
}

/// Reuse an explicitly assigned anchor, falling back to generation.
///
/// An anchor already present on a heading is authoritative and is never
/// recomputed; generation only covers headings that lack one.
pub fn anchor_or_generate(anchor: Option<&str>, text: &str) -> String {
    match anchor {
        Some(a) if !a.is_empty() => a.to_string(),
        _ => generate_anchor_id(text),
    }
}

/// Eight random lowercase characters for blank-text fallback anchors.
fn random_suffix() -> String {
    let ulid = Ulid::new().to_string().to_ascii_lowercase();
    // The low 16 characters of a ULID are the random payload.
    ulid[ulid.len() - ANCHOR_HEX_LEN..].to_string()
}
