use anyhow::Result;

use super::header::RtypeHeader;
use super::pointer::PtrTrailer;

/// Slice's trailer is byte-for-byte identical to Ptr's (header + one 8-byte
/// elem address), and the ground-truth decoder's `Elem` for a Slice
/// literally calls into the pointer-type decoder to read it. Preserved here
/// as-is rather than given its own parallel implementation.
pub type SliceTrailer = PtrTrailer;

pub(crate) fn parse(rodata: &[u8], rodata_addr: u64, header: &RtypeHeader) -> Result<SliceTrailer> {
    super::pointer::parse(rodata, rodata_addr, header)
}
