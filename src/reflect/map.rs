use std::io::Cursor;

use anyhow::{anyhow, Result};

use crate::reader::LeRead;

use super::header::RtypeHeader;
use super::layout::HEADER_SIZE;

#[derive(Debug, Clone)]
pub struct MapTrailer {
    pub key_offset: Option<i32>,
    pub elem_offset: Option<i32>,
    pub bucket_offset: Option<i32>,
    pub hasher_addr: u64,
    pub key_size: u8,
    pub value_size: u8,
    pub bucket_size: u16,
    pub flags: u32,
}

pub(crate) fn parse(rodata: &[u8], rodata_addr: u64, header: &RtypeHeader) -> Result<MapTrailer> {
    let start: usize = header.offset as usize + HEADER_SIZE;
    let mut cur = Cursor::new(
        rodata
            .get(start..)
            .ok_or_else(|| anyhow!("map trailer at {:#x} out of bounds", header.offset))?,
    );
    let key_offset = cur.read_rebased(rodata_addr)?;
    let elem_offset = cur.read_rebased(rodata_addr)?;
    let bucket_offset = cur.read_rebased(rodata_addr)?;
    let hasher_addr = cur.read_u64()?;
    let key_size = cur.read_u8()?;
    let value_size = cur.read_u8()?;
    let bucket_size = cur.read_u16()?;
    let flags = cur.read_u32()?;
    Ok(MapTrailer {
        key_offset,
        elem_offset,
        bucket_offset,
        hasher_addr,
        key_size,
        value_size,
        bucket_size,
        flags,
    })
}
