//! Opens a Mach-O image and exposes the handful of sections and the symbol
//! table the rest of the decoder needs. This is the only module that talks
//! to the `object` crate directly; everything above here works in terms of
//! byte slices and virtual addresses.

use object::{Object, ObjectSection, ObjectSymbol};

use crate::error::{Error, Result};

pub struct Container<'data> {
    file: object::File<'data>,
}

const REQUIRED_SECTIONS: &[&str] = &[
    "__text",
    "__rodata",
    "__typelink",
    "__gosymtab",
    "__gopclntab",
];

impl<'data> Container<'data> {
    #[tracing::instrument(skip_all)]
    pub fn parse(data: &'data [u8]) -> Result<Self> {
        let file = object::File::parse(data)?;
        for name in REQUIRED_SECTIONS {
            if file.section_by_name(name).is_none() {
                return Err(Error::MissingSection(leak_name(name)));
            }
        }
        Ok(Self { file })
    }

    /// Returns a required section's bytes and load-time base virtual address.
    pub fn section(&self, name: &'static str) -> Result<(&'data [u8], u64)> {
        let section = self
            .file
            .section_by_name(name)
            .ok_or(Error::MissingSection(name))?;
        let data = section
            .data()
            .map_err(|_| Error::BadImage(format!("section `{name}` has no data")))?;
        Ok((data, section.address()))
    }

    /// Segment name a section with the given address range belongs to, used
    /// by the symbol index to classify symbols (`__TEXT`, `__DATA`, `__DATA_CONST`, ...).
    pub fn segment_of_section_index(&self, index: object::SectionIndex) -> Option<String> {
        let section = self.file.section_by_index(index).ok()?;
        section.segment_name().ok().flatten().map(str::to_string)
    }

    pub fn section_name(&self, index: object::SectionIndex) -> Option<String> {
        let section = self.file.section_by_index(index).ok()?;
        section.name().ok().map(str::to_string)
    }

    pub fn symbols(&self) -> impl Iterator<Item = RawSymbolOwned> + '_ {
        self.file.symbols().filter_map(|sym| {
            let name = sym.name().ok()?.to_string();
            Some(RawSymbolOwned {
                name,
                address: sym.address(),
                section_index: sym.section().index(),
                is_stab: is_stab_kind(sym.kind()),
            })
        })
    }
}

/// One raw symbol table entry, before size/code derivation (see [`crate::symbol`]).
pub struct RawSymbolOwned {
    pub name: String,
    pub address: u64,
    pub section_index: Option<object::SectionIndex>,
    pub is_stab: bool,
}

/// Mach-O stabs are reported through `object`'s generic `SymbolKind`; the
/// ground-truth decoder instead tests the raw `n_type` byte against
/// `0xE0` (`kind & 0xE0 != 0`). The portable, format-agnostic `Object`/
/// `ObjectSymbol` traits this module uses (`object::File` over any
/// container format, not `object::read::macho::MachOFile` specifically)
/// don't expose that raw byte at all, so debugger/file symbols are
/// filtered by `SymbolKind` here instead; this is an approximation, not
/// the same test, and there is no raw `n_type` to fall back to without
/// giving up format-agnostic parsing.
fn is_stab_kind(kind: object::SymbolKind) -> bool {
    matches!(
        kind,
        object::SymbolKind::File | object::SymbolKind::Label | object::SymbolKind::Unknown
    )
}

fn leak_name(name: &str) -> &'static str {
    // Section names are drawn from a small fixed set (`REQUIRED_SECTIONS`);
    // interning them once keeps `Error::MissingSection` a plain `&'static str`.
    REQUIRED_SECTIONS
        .iter()
        .find(|n| **n == name)
        .copied()
        .unwrap_or("<unknown>")
}
