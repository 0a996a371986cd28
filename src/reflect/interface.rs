use std::io::Cursor;

use anyhow::{anyhow, Result};

use crate::reader::LeRead;

use super::header::RtypeHeader;
use super::layout::{HEADER_SIZE, IMETHOD_RECORD_SIZE};

/// An interface method record: 8 bytes, `{nameOff i32, typeOff i32}` — both
/// plain `rodata` offsets, distinct from the 16-byte concrete method record.
#[derive(Debug, Clone)]
pub struct InterfaceMethod {
    pub name_off: i32,
    pub type_off: i32,
}

#[derive(Debug, Clone)]
pub struct InterfaceTrailer {
    pub pkg_path_off: Option<i32>,
    pub methods: Vec<InterfaceMethod>,
}

pub(crate) fn parse(rodata: &[u8], rodata_addr: u64, header: &RtypeHeader) -> Result<InterfaceTrailer> {
    let start: usize = header.offset as usize + HEADER_SIZE;
    let mut cur = Cursor::new(
        rodata
            .get(start..)
            .ok_or_else(|| anyhow!("interface trailer at {:#x} out of bounds", header.offset))?,
    );
    let pkg_path_off = cur.read_rebased(rodata_addr)?;
    let data_offset = cur.read_rebased(rodata_addr)?;
    let len = cur.read_u64()?;
    let _cap = cur.read_u64()?;

    let mut methods = Vec::with_capacity(len as usize);
    if let Some(data_offset) = data_offset {
        let data_offset: usize = data_offset
            .try_into()
            .map_err(|_| anyhow!("negative interface method array offset"))?;
        for i in 0..len as usize {
            let rec_off = data_offset + i * IMETHOD_RECORD_SIZE;
            let bytes = rodata
                .get(rec_off..rec_off + IMETHOD_RECORD_SIZE)
                .ok_or_else(|| anyhow!("interface method {i} at {rec_off:#x} out of bounds"))?;
            let mut mcur = Cursor::new(bytes);
            methods.push(InterfaceMethod {
                name_off: mcur.read_i32()?,
                type_off: mcur.read_i32()?,
            });
        }
    }

    Ok(InterfaceTrailer {
        pkg_path_off,
        methods,
    })
}
