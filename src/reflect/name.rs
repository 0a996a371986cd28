//! Thin wrapper over [`crate::reader::read_name_record`] giving the decoded
//! fields their reflection-domain names.

use anyhow::Result;

#[derive(Debug, Clone, Default)]
pub struct Name {
    pub exported: bool,
    pub has_tag: bool,
    pub text: String,
}

pub(crate) fn read(rodata: &[u8], offset: i32) -> Result<Name> {
    let (exported, has_tag, text) = crate::reader::read_name_record(rodata, offset)?;
    Ok(Name {
        exported,
        has_tag,
        text,
    })
}

/// Strips a single leading `*`, the compiler's marker for the canonical
/// pointer form of a named type (`rtype.tflag&ExtraStar` / `String()`'s own
/// leading-star strip).
pub fn strip_leading_star(s: &str) -> &str {
    s.strip_prefix('*').unwrap_or(s)
}

/// `nameOff`/`typeOff` fields across the type graph use `0` (not `-1`) as
/// the "absent" sentinel, matching the subject runtime's moduledata offset
/// resolution.
pub fn valid_offset(off: i32) -> Option<i32> {
    if off > 0 {
        Some(off)
    } else {
        None
    }
}
