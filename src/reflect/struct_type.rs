use std::io::Cursor;

use anyhow::{anyhow, Result};

use crate::reader::LeRead;

use super::header::RtypeHeader;
use super::layout::{HEADER_SIZE, STRUCT_FIELD_RECORD_SIZE};

/// One struct field record, 24 bytes: `{name-addr(8), type-addr(8),
/// offsetEmbed(8)}`. Unlike every other name reference in the type graph,
/// `name-addr` is a virtual address, not a plain `rodata` offset, and must
/// be rebased before the name record can be read.
#[derive(Debug, Clone)]
pub struct StructField {
    pub name_offset: Option<i32>,
    pub type_offset: Option<i32>,
    pub offset_embed: u64,
}

impl StructField {
    pub fn byte_offset(&self) -> u64 {
        self.offset_embed >> 1
    }

    pub fn embedded(&self) -> bool {
        self.offset_embed & 1 != 0
    }
}

#[derive(Debug, Clone)]
pub struct StructTrailer {
    pub pkg_path_off: Option<i32>,
    pub fields: Vec<StructField>,
}

pub(crate) fn parse(rodata: &[u8], rodata_addr: u64, header: &RtypeHeader) -> Result<StructTrailer> {
    let start: usize = header.offset as usize + HEADER_SIZE;
    let mut cur = Cursor::new(
        rodata
            .get(start..)
            .ok_or_else(|| anyhow!("struct trailer at {:#x} out of bounds", header.offset))?,
    );
    let pkg_path_off = cur.read_rebased(rodata_addr)?;
    let data_offset = cur.read_rebased(rodata_addr)?;
    let len = cur.read_u64()?;
    let _cap = cur.read_u64()?;

    let mut fields = Vec::with_capacity(len as usize);
    if let Some(data_offset) = data_offset {
        let data_offset: usize = data_offset
            .try_into()
            .map_err(|_| anyhow!("negative struct field array offset"))?;
        for i in 0..len as usize {
            let rec_off = data_offset + i * STRUCT_FIELD_RECORD_SIZE;
            let bytes = rodata
                .get(rec_off..rec_off + STRUCT_FIELD_RECORD_SIZE)
                .ok_or_else(|| anyhow!("struct field {i} at {rec_off:#x} out of bounds"))?;
            let mut fcur = Cursor::new(bytes);
            let name_offset = fcur.read_rebased(rodata_addr)?;
            let type_offset = fcur.read_rebased(rodata_addr)?;
            let offset_embed = fcur.read_u64()?;
            fields.push(StructField {
                name_offset,
                type_offset,
                offset_embed,
            });
        }
    }

    Ok(StructTrailer {
        pkg_path_off,
        fields,
    })
}
