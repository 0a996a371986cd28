//! Small little-endian primitive readers, in the same spirit as the
//! blanket `Read` extension traits IDA-database tooling uses to pull
//! fixed-width fields off a cursor: one method per width, no framework.

use std::io::Read;

use anyhow::Result;

pub trait LeRead: Read {
    fn read_u8(&mut self) -> Result<u8> {
        let mut b = [0u8; 1];
        self.read_exact(&mut b)?;
        Ok(b[0])
    }

    fn read_u16(&mut self) -> Result<u16> {
        let mut b = [0u8; 2];
        self.read_exact(&mut b)?;
        Ok(u16::from_le_bytes(b))
    }

    fn read_u32(&mut self) -> Result<u32> {
        let mut b = [0u8; 4];
        self.read_exact(&mut b)?;
        Ok(u32::from_le_bytes(b))
    }

    fn read_i32(&mut self) -> Result<i32> {
        Ok(self.read_u32()? as i32)
    }

    fn read_u64(&mut self) -> Result<u64> {
        let mut b = [0u8; 8];
        self.read_exact(&mut b)?;
        Ok(u64::from_le_bytes(b))
    }

    /// Reads a virtual address and rebases it against `rodata_addr`, yielding
    /// an offset into the rodata buffer. Returns `None` for a null address.
    fn read_rebased(&mut self, rodata_addr: u64) -> Result<Option<i32>> {
        let addr = self.read_u64()?;
        if addr == 0 {
            return Ok(None);
        }
        Ok(Some((addr.wrapping_sub(rodata_addr)) as i32))
    }
}

impl<R: Read + ?Sized> LeRead for R {}

/// Reads a name record (`flags`, `len`, UTF-8 bytes) at `offset` in `rodata`.
pub(crate) fn read_name_record(rodata: &[u8], offset: i32) -> anyhow::Result<(bool, bool, String)> {
    use anyhow::{anyhow, Context};
    let offset: usize = offset
        .try_into()
        .map_err(|_| anyhow!("negative name offset {offset}"))?;
    let flags = *rodata
        .get(offset)
        .ok_or_else(|| anyhow!("name record flag byte out of bounds at {offset:#x}"))?;
    let len = *rodata
        .get(offset + 1)
        .ok_or_else(|| anyhow!("name record length byte out of bounds at {offset:#x}"))?;
    let start = offset + 2;
    let end = start + usize::from(len);
    let bytes = rodata
        .get(start..end)
        .ok_or_else(|| anyhow!("name record body out of bounds at {offset:#x}"))?;
    let text = String::from_utf8(bytes.to_vec())
        .with_context(|| format!("name record at {offset:#x} is not valid UTF-8"))?;
    let exported = flags & 0b01 != 0;
    let has_tag = flags & 0b10 != 0;
    Ok((exported, has_tag, text))
}
