use std::io::Cursor;

use anyhow::{anyhow, Result};

use crate::reader::LeRead;

use super::header::RtypeHeader;
use super::layout::HEADER_SIZE;

#[derive(Debug, Clone)]
pub struct ArrayTrailer {
    pub elem_offset: Option<i32>,
    pub slice_offset: Option<i32>,
    pub len: u64,
}

pub(crate) fn parse(rodata: &[u8], rodata_addr: u64, header: &RtypeHeader) -> Result<ArrayTrailer> {
    let start: usize = header.offset as usize + HEADER_SIZE;
    let mut cur = Cursor::new(
        rodata
            .get(start..)
            .ok_or_else(|| anyhow!("array trailer at {:#x} out of bounds", header.offset))?,
    );
    let elem_offset = cur.read_rebased(rodata_addr)?;
    let slice_offset = cur.read_rebased(rodata_addr)?;
    let len = cur.read_u64()?;
    Ok(ArrayTrailer {
        elem_offset,
        slice_offset,
        len,
    })
}
