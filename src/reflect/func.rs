use std::io::Cursor;

use anyhow::{anyhow, Result};

use crate::reader::LeRead;

use super::header::RtypeHeader;
use super::layout::{FUNC_TYPE_SIZE, HEADER_SIZE, OUT_COUNT_MASK, OUT_COUNT_VARIADIC_BIT, UNCOMMON_SIZE};

#[derive(Debug, Clone)]
pub struct FuncTrailer {
    pub in_count: u16,
    pub out_count_raw: u16,
    /// `in_count` parameter type offsets followed by `out_count()` result
    /// type offsets, in declaration order.
    pub params: Vec<Option<i32>>,
}

impl FuncTrailer {
    pub fn out_count(&self) -> u16 {
        self.out_count_raw & OUT_COUNT_MASK
    }

    pub fn is_variadic(&self) -> bool {
        self.out_count_raw & OUT_COUNT_VARIADIC_BIT != 0
    }
}

pub(crate) fn parse(rodata: &[u8], rodata_addr: u64, header: &RtypeHeader) -> Result<FuncTrailer> {
    let base: usize = header.offset as usize + HEADER_SIZE;
    let mut cur = Cursor::new(
        rodata
            .get(base..)
            .ok_or_else(|| anyhow!("func trailer at {:#x} out of bounds", header.offset))?,
    );
    let in_count = cur.read_u16()?;
    let out_count_raw = cur.read_u16()?;
    let out_count = out_count_raw & OUT_COUNT_MASK;

    // Parameter/result addresses sit after the (optional) uncommon record,
    // not immediately after inCount/outCount — distinct arithmetic from the
    // method-array formula used for every other kind.
    let mut array_start = header.offset as usize + FUNC_TYPE_SIZE;
    if header.has_uncommon() {
        array_start += UNCOMMON_SIZE;
    }

    let total = usize::from(in_count) + usize::from(out_count);
    let mut params = Vec::with_capacity(total);
    let mut pcur = Cursor::new(
        rodata
            .get(array_start..)
            .ok_or_else(|| anyhow!("func param array at {array_start:#x} out of bounds"))?,
    );
    for _ in 0..total {
        params.push(pcur.read_rebased(rodata_addr)?);
    }

    Ok(FuncTrailer {
        in_count,
        out_count_raw,
        params,
    })
}
