//! Address-sorted symbol table: derives each symbol's size from its
//! successor's address and a one-letter segment/section classification,
//! then exposes binary search by address for the disassembler's
//! symbol-lookup callback.

use crate::container::Container;

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub address: u64,
    pub size: u64,
    pub code: char,
}

/// Built once by [`crate::Image`]'s one-shot initialiser; immutable afterwards.
#[derive(Debug, Default)]
pub struct SymbolIndex {
    /// Sorted ascending by address; ties keep insertion order (stable sort).
    by_address: Vec<Symbol>,
}

impl SymbolIndex {
    #[tracing::instrument(skip_all)]
    pub(crate) fn build(container: &Container) -> Self {
        let mut addrs: Vec<u64> = Vec::new();
        let mut entries: Vec<(String, u64, Option<object::SectionIndex>)> = Vec::new();
        for sym in container.symbols() {
            if sym.is_stab {
                continue;
            }
            addrs.push(sym.address);
            entries.push((sym.name, sym.address, sym.section_index));
        }
        addrs.sort_unstable();

        let mut by_address: Vec<Symbol> = entries
            .into_iter()
            .map(|(name, address, section_index)| {
                // Equivalent to the ground truth's `sort.Search` for the
                // first address strictly greater than this symbol's.
                let next_index = addrs.partition_point(|&a| a <= address);
                let size = addrs
                    .get(next_index)
                    .map(|&next| next - address)
                    .unwrap_or(0);
                let code = classify(container, section_index);
                Symbol {
                    name,
                    address,
                    size,
                    code,
                }
            })
            .collect();
        by_address.sort_by_key(|s| s.address);

        Self { by_address }
    }

    /// Binary-searches for the last symbol whose `[address, address+size)`
    /// contains `addr`; returns `(name, symbol_base)` or `("", 0)`.
    pub fn lookup(&self, addr: u64) -> (&str, u64) {
        let i = self.by_address.partition_point(|s| s.address <= addr);
        if i == 0 {
            return ("", 0);
        }
        let s = &self.by_address[i - 1];
        if s.address != 0 && s.address <= addr && addr < s.address + s.size {
            (&s.name, s.address)
        } else {
            ("", 0)
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.by_address.iter()
    }
}

fn classify(container: &Container, section_index: Option<object::SectionIndex>) -> char {
    let Some(index) = section_index else {
        return 'U';
    };
    let Some(segment) = container.segment_of_section_index(index) else {
        return '?';
    };
    let section = container.section_name(index).unwrap_or_default();
    match (segment.as_str(), section.as_str()) {
        ("__TEXT", "__text") => 'T',
        ("__DATA", "__bss") | ("__DATA", "__noptrbss") => 'B',
        ("__TEXT", _) | ("__DATA_CONST", _) => 'R',
        ("__DATA", _) => 'D',
        _ => '?',
    }
}
