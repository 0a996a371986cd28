//! Byte-layout constants for the common header and each kind's variant
//! trailer. The ground-truth decoder's own size constants are internally
//! inconsistent in a couple of places (its `toPtrType`/`toSliceType` read 54
//! bytes while the comments and the sizes used for uncommon-offset math
//! imply 56; likewise `arrayTypeSize`/`chanTypeSize`'s doc comments undercount
//! their own field sums). These constants use the field-sum values
//! throughout, not the inconsistent literals — see `DESIGN.md`.

/// Size of the common `rtype` header every kind starts with.
pub const HEADER_SIZE: usize = 48;

pub const ARRAY_TYPE_SIZE: usize = HEADER_SIZE + 8 + 8 + 8;
pub const CHAN_TYPE_SIZE: usize = HEADER_SIZE + 8 + 8;
pub const FUNC_TYPE_SIZE: usize = HEADER_SIZE + 2 + 2;
pub const INTERFACE_TYPE_SIZE: usize = HEADER_SIZE + 8 + 24;
pub const MAP_TYPE_SIZE: usize = HEADER_SIZE + 8 + 8 + 8 + 8 + 1 + 1 + 2 + 4;
pub const PTR_TYPE_SIZE: usize = HEADER_SIZE + 8;
pub const SLICE_TYPE_SIZE: usize = HEADER_SIZE + 8;
pub const STRUCT_TYPE_SIZE: usize = HEADER_SIZE + 8 + 24;
/// Kinds with no variant trailer at all (`Bool`, the numeric kinds, `String`, `UnsafePointer`).
pub const DEFAULT_TYPE_SIZE: usize = HEADER_SIZE;

pub const UNCOMMON_SIZE: usize = 16;
pub const METHOD_RECORD_SIZE: usize = 16;
pub const IMETHOD_RECORD_SIZE: usize = 8;
pub const STRUCT_FIELD_RECORD_SIZE: usize = 24;

/// `rtype.tflag` bit meanings.
pub const TFLAG_UNCOMMON: u8 = 1 << 0;
pub const TFLAG_EXTRA_STAR: u8 = 1 << 1;
pub const TFLAG_NAMED: u8 = 1 << 2;
pub const TFLAG_REGULAR_MEMORY: u8 = 1 << 3;

pub const KIND_MASK: u8 = 0x1f;

/// `funcType.outCount`'s high bit marks a variadic function.
pub const OUT_COUNT_VARIADIC_BIT: u16 = 0x8000;
pub const OUT_COUNT_MASK: u16 = 0x7fff;

use super::kind::Kind;

/// Byte size of a kind's variant trailer (header included), used for the
/// method-array address formula `offset + variant_trailer_size + moff`.
pub fn variant_trailer_size(kind: Kind) -> usize {
    match kind {
        Kind::Array => ARRAY_TYPE_SIZE,
        Kind::Chan => CHAN_TYPE_SIZE,
        Kind::Func => FUNC_TYPE_SIZE,
        Kind::Interface => INTERFACE_TYPE_SIZE,
        Kind::Map => MAP_TYPE_SIZE,
        Kind::Ptr => PTR_TYPE_SIZE,
        Kind::Slice => SLICE_TYPE_SIZE,
        Kind::Struct => STRUCT_TYPE_SIZE,
        _ => DEFAULT_TYPE_SIZE,
    }
}
