use std::io::Cursor;

use anyhow::{anyhow, Result};

use crate::reader::LeRead;

use super::layout::METHOD_RECORD_SIZE;

/// The optional 16-byte trailer placed after a variant trailer for every
/// named type carrying methods or a package path.
#[derive(Debug, Clone)]
pub struct UncommonTrailer {
    pub pkg_path_off: i32,
    pub mcount: u16,
    pub xcount: u16,
    pub moff: u32,
}

/// One concrete-type method record: 4 `i32` fields, 16 bytes total.
#[derive(Debug, Clone)]
pub struct Method {
    pub name_off: i32,
    pub mtyp_off: i32,
    pub ifn_text_off: i32,
    pub tfn_text_off: i32,
}

pub(crate) fn parse(rodata: &[u8], offset: usize) -> Result<UncommonTrailer> {
    let bytes = rodata
        .get(offset..offset + 16)
        .ok_or_else(|| anyhow!("uncommon trailer at {offset:#x} out of bounds"))?;
    let mut cur = Cursor::new(bytes);
    let pkg_path_off = cur.read_i32()?;
    let mcount = cur.read_u16()?;
    let xcount = cur.read_u16()?;
    let moff = cur.read_u32()?;
    // trailing 4 bytes are compiler padding, not read.
    Ok(UncommonTrailer {
        pkg_path_off,
        mcount,
        xcount,
        moff,
    })
}

/// Reads method record `i` out of the method array starting at `methods_offset`.
pub(crate) fn read_method(rodata: &[u8], methods_offset: usize, i: usize) -> Result<Method> {
    let start = methods_offset + i * METHOD_RECORD_SIZE;
    let bytes = rodata
        .get(start..start + METHOD_RECORD_SIZE)
        .ok_or_else(|| anyhow!("method record {i} at {start:#x} out of bounds"))?;
    let mut cur = Cursor::new(bytes);
    Ok(Method {
        name_off: cur.read_i32()?,
        mtyp_off: cur.read_i32()?,
        ifn_text_off: cur.read_i32()?,
        tfn_text_off: cur.read_i32()?,
    })
}
