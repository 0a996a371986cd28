//! Decodes a Mach-O image produced by a Go toolchain: the compiler's runtime
//! type metadata (`__typelink`/`__rodata`), its function table
//! (`__gosymtab`/`__gopclntab`), and a static call graph stitched together
//! from direct `CALL` targets found while disassembling `__text`.
//!
//! [`Image`] is the single entry point. It holds the opened container and
//! lazily, one-shot-initialises everything derived from it (sections,
//! symbol index, function table, type catalogue) the first time any query
//! method is called; every later call sees the memoised state.

pub mod callgraph;
pub mod container;
pub mod disasm;
pub mod error;
pub mod pclntab;
pub mod reader;
pub mod reflect;
pub mod ssa;
pub mod symbol;

#[cfg(test)]
mod test;

use std::collections::HashMap;
use std::sync::OnceLock;

pub use error::{Error, Result};

const TEXT_SECTION: &str = "__text";
const RODATA_SECTION: &str = "__rodata";
const TYPELINK_SECTION: &str = "__typelink";
const GOSYMTAB_SECTION: &str = "__gosymtab";
const GOPCLNTAB_SECTION: &str = "__gopclntab";

struct State<'data> {
    text: &'data [u8],
    text_base: u64,
    typelink: &'data [u8],
    symbols: symbol::SymbolIndex,
    funcs: Vec<pclntab::FuncRecord>,
    catalogue: reflect::TypeCatalogue<'data>,
}

pub struct Image<'data> {
    container: container::Container<'data>,
    state: OnceLock<std::result::Result<State<'data>, String>>,
}

impl<'data> Image<'data> {
    #[tracing::instrument(skip_all)]
    pub fn open(data: &'data [u8]) -> Result<Self> {
        let container = container::Container::parse(data)?;
        Ok(Self {
            container,
            state: OnceLock::new(),
        })
    }

    fn state(&self) -> Result<&State<'data>> {
        let cached = self
            .state
            .get_or_init(|| Self::load(&self.container).map_err(|e| e.to_string()));
        cached.as_ref().map_err(|msg| Error::BadImage(msg.clone()))
    }

    #[tracing::instrument(skip_all)]
    fn load(container: &container::Container<'data>) -> Result<State<'data>> {
        let (text, text_base) = container.section(TEXT_SECTION)?;
        let (rodata, rodata_addr) = container.section(RODATA_SECTION)?;
        let (typelink, _) = container.section(TYPELINK_SECTION)?;
        let _ = container.section(GOSYMTAB_SECTION)?;
        let (pclntab_bytes, _) = container.section(GOPCLNTAB_SECTION)?;

        tracing::debug!("building symbol index");
        let symbols = symbol::SymbolIndex::build(container);

        tracing::debug!("decoding pc/line table");
        let funcs = pclntab::parse(pclntab_bytes, text_base)
            .map_err(|e| Error::DecodeError { offset: 0, what: e.to_string() })?;

        let catalogue = reflect::TypeCatalogue::new(rodata, rodata_addr);

        Ok(State {
            text,
            text_base,
            typelink,
            symbols,
            funcs,
            catalogue,
        })
    }

    /// All runtime types found in `__typelink`, in table order, with
    /// top-level pointer entries replaced by their `Elem`.
    pub fn types(&self) -> Result<Vec<reflect::Type<'_, 'data>>> {
        let state = self.state()?;
        state.catalogue.types_from_typelink(state.typelink)
    }

    /// All functions found in the PC/line-number table, in table order.
    pub fn funcs(&self) -> Result<&[pclntab::FuncRecord]> {
        Ok(&self.state()?.funcs)
    }

    pub fn symbols(&self) -> Result<&symbol::SymbolIndex> {
        Ok(&self.state()?.symbols)
    }

    /// Disassembles every function, resolving direct CALL targets against
    /// the function-entry map.
    pub fn disassemble_all(&self) -> Result<Vec<disasm::DisassembledFunc>> {
        let state = self.state()?;
        let entry_to_func: HashMap<u64, String> =
            state.funcs.iter().map(|f| (f.entry, f.name.clone())).collect();
        let disassembler =
            disasm::Disassembler::new().map_err(|e| Error::BadImage(e.to_string()))?;
        Ok(state
            .funcs
            .iter()
            .map(|f| disassembler.disassemble(f, state.text, state.text_base, &entry_to_func, &state.symbols))
            .collect())
    }

    pub fn call_graph(&self) -> Result<callgraph::CallGraph> {
        let funcs = self.disassemble_all()?;
        callgraph::build(&funcs)
    }

    /// Builds SSA function objects for every decoded function, deriving
    /// receiver-bearing signatures from the type catalogue.
    pub fn ssa_functions(&self) -> Result<Vec<ssa::Function>> {
        let state = self.state()?;
        let types = self.types()?;
        let builder = ssa::Builder::new(&types);
        Ok(state
            .funcs
            .iter()
            .map(|f| builder.build_function(&f.package, f.base_name(), &f.receiver))
            .collect())
    }
}
