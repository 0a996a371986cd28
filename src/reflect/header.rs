use std::io::Cursor;

use anyhow::{anyhow, Result};

use crate::reader::LeRead;

use super::kind::Kind;
use super::layout::{self, TFLAG_EXTRA_STAR, TFLAG_NAMED, TFLAG_UNCOMMON};

/// The 48-byte common header every kind's trailer follows.
#[derive(Debug, Clone)]
pub struct RtypeHeader {
    /// Offset into `rodata` where this header starts.
    pub offset: i32,
    pub size: u64,
    pub ptrdata: u64,
    pub hash: u32,
    pub tflag: u8,
    pub align: u8,
    pub field_align: u8,
    pub kind: Kind,
    pub equal_addr: u64,
    pub gcdata_addr: u64,
    pub name_off: i32,
    pub ptr_to_this: i32,
}

impl RtypeHeader {
    pub fn has_uncommon(&self) -> bool {
        self.tflag & TFLAG_UNCOMMON != 0
    }

    pub fn has_extra_star(&self) -> bool {
        self.tflag & TFLAG_EXTRA_STAR != 0
    }

    pub fn is_named(&self) -> bool {
        self.tflag & TFLAG_NAMED != 0
    }

    pub fn comparable(&self) -> bool {
        self.equal_addr != 0
    }
}

pub(crate) fn parse(rodata: &[u8], offset: i32) -> Result<RtypeHeader> {
    let start: usize = offset
        .try_into()
        .map_err(|_| anyhow!("negative type header offset {offset}"))?;
    let bytes = rodata
        .get(start..start + layout::HEADER_SIZE)
        .ok_or_else(|| anyhow!("type header at {offset:#x} out of bounds"))?;
    let mut cur = Cursor::new(bytes);

    let size = cur.read_u64()?;
    let ptrdata = cur.read_u64()?;
    let hash = cur.read_u32()?;
    let tflag = cur.read_u8()?;
    let align = cur.read_u8()?;
    let field_align = cur.read_u8()?;
    let kind_byte = cur.read_u8()?;
    let equal_addr = cur.read_u64()?;
    let gcdata_addr = cur.read_u64()?;
    let name_off = cur.read_i32()?;
    let ptr_to_this = cur.read_i32()?;

    let kind = Kind::from_byte(kind_byte)
        .map_err(|_| anyhow!("type header at {offset:#x} has unknown kind byte {kind_byte:#x}"))?;

    Ok(RtypeHeader {
        offset,
        size,
        ptrdata,
        hash,
        tflag,
        align,
        field_align,
        kind,
        equal_addr,
        gcdata_addr,
        name_off,
        ptr_to_this,
    })
}
