//! A from-scratch reader for the compiler's PC/line-number table
//! (`__gopclntab`). The legacy `__gosymtab` companion section is part of
//! the section contract but carries no information modern images don't
//! already repeat in `__gopclntab`, so it is only required to be present,
//! never parsed.
//!
//! Only the function index and name table are decoded — enough to build
//! [`FuncRecord`]s. Source-line mapping (`pctab`/`pcfile`) is left as raw
//! offsets; nothing in this crate's public surface needs PC→line
//! translation, only PC→function.
//!
//! Supports the three pclntab header shapes used by all still-relevant Go
//! toolchains: 1.16 (`0xfffffffa`), 1.18 (`0xfffffff0`) and 1.20+
//! (`0xfffffff1`); the 1.18+ shapes add an explicit `textStart` field the
//! 1.16 one lacks. The legacy pre-1.16 `go12` table (`0xfffffffb`) is not
//! supported.

use std::io::Cursor;

use anyhow::{anyhow, ensure, Context, Result};

use crate::reader::LeRead;

const GO116_MAGIC: u32 = 0xffff_fffa;
const GO118_MAGIC: u32 = 0xffff_fff0;
const GO120_MAGIC: u32 = 0xffff_fff1;

#[derive(Debug, Clone)]
pub struct FuncRecord {
    pub entry: u64,
    pub end: u64,
    /// The compiler-mangled symbol name, e.g. `main.main` or `main.(*T).F`.
    pub name: String,
    pub package: String,
    /// `(*T)`, `(T)`, `*T`, `T`, or empty.
    pub receiver: String,
}

impl FuncRecord {
    pub fn base_name(&self) -> &str {
        match self.name.rfind('.') {
            Some(i) => &self.name[i + 1..],
            None => &self.name,
        }
    }
}

struct Header {
    has_text_start: bool,
    nfunc: u64,
    text_start: u64,
    funcname_offset: u64,
    pcln_offset: u64,
}

fn parse_header(data: &[u8]) -> Result<Header> {
    let mut cur = Cursor::new(data);
    let magic = cur.read_u32()?;
    let has_text_start = match magic {
        GO116_MAGIC => false,
        GO118_MAGIC | GO120_MAGIC => true,
        other => return Err(anyhow!("unsupported pclntab magic {other:#x}")),
    };
    let pad1 = cur.read_u8()?;
    let pad2 = cur.read_u8()?;
    ensure!(pad1 == 0 && pad2 == 0, "malformed pclntab header padding");
    let _min_lc = cur.read_u8()?;
    let ptr_size = cur.read_u8()?;
    ensure!(ptr_size == 8, "only 64-bit pclntab images are supported");

    let nfunc = cur.read_u64()?;
    let _nfiles = cur.read_u64()?;
    let text_start = if has_text_start { cur.read_u64()? } else { 0 };
    let funcname_offset = cur.read_u64()?;
    let _cu_offset = cur.read_u64()?;
    let _filetab_offset = cur.read_u64()?;
    let _pctab_offset = cur.read_u64()?;
    let pcln_offset = cur.read_u64()?;

    Ok(Header {
        has_text_start,
        nfunc,
        text_start,
        funcname_offset,
        pcln_offset,
    })
}

fn read_c_string(data: &[u8], offset: usize) -> Result<String> {
    let rest = data
        .get(offset..)
        .ok_or_else(|| anyhow!("function name offset {offset:#x} out of bounds"))?;
    let end = rest
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| anyhow!("function name at {offset:#x} is not NUL-terminated"))?;
    Ok(String::from_utf8(rest[..end].to_vec())
        .with_context(|| format!("function name at {offset:#x} is not valid UTF-8"))?)
}

/// Splits `main.(*T).F` into `("main", "(*T)", "F")`-shaped pieces, matching
/// the ground-truth symbol table's `PackageName`/`ReceiverName`/`BaseName`.
fn split_symbol_name(name: &str) -> (String, String) {
    let first = name.find('.');
    let last = name.rfind('.');
    match (first, last) {
        (Some(f), Some(l)) if f != l => {
            let package = name[..f].to_string();
            let receiver = name[f + 1..l].to_string();
            (package, receiver)
        }
        (Some(f), Some(_)) => (name[..f].to_string(), String::new()),
        _ => (String::new(), String::new()),
    }
}

/// Parses `pclntab` (`__gopclntab`) and returns function records in table
/// order (entry-PC ascending, matching the linker's layout).
#[tracing::instrument(skip_all)]
pub fn parse(pclntab: &[u8], text_addr: u64) -> Result<Vec<FuncRecord>> {
    let header = parse_header(pclntab)?;
    let text_start = if header.has_text_start {
        header.text_start
    } else {
        text_addr
    };

    let nfunc: usize = header
        .nfunc
        .try_into()
        .map_err(|_| anyhow!("pclntab reports an impossible function count"))?;
    let index_start: usize = header
        .pcln_offset
        .try_into()
        .map_err(|_| anyhow!("pclntab function index offset out of range"))?;

    // `nfunc` (entryOff, funcoff) pairs plus one sentinel entry giving the
    // end of the last function's range.
    let mut entry_offs = Vec::with_capacity(nfunc + 1);
    let mut func_offs = Vec::with_capacity(nfunc);
    let mut cur = Cursor::new(
        pclntab
            .get(index_start..)
            .ok_or_else(|| anyhow!("pclntab function index out of bounds"))?,
    );
    for i in 0..=nfunc {
        let entry_off = cur.read_u32()?;
        entry_offs.push(u64::from(entry_off));
        if i < nfunc {
            func_offs.push(cur.read_u32()?);
        } else {
            let _ = cur.read_u32()?;
        }
    }

    let mut funcs = Vec::with_capacity(nfunc);
    for i in 0..nfunc {
        // func records are addressed from the start of `pclntab`, not from
        // the index table, unlike the (entryOff, funcoff) pairs above.
        let rec_off: usize = func_offs[i]
            .try_into()
            .map_err(|_| anyhow!("func record offset out of range"))?;
        let mut rec = Cursor::new(
            pclntab
                .get(rec_off..)
                .ok_or_else(|| anyhow!("func record at {rec_off:#x} out of bounds"))?,
        );
        let entry_off = u64::from(rec.read_u32()?);
        let name_off = rec.read_i32()?;

        let entry = text_start + entry_off;
        let end = text_start + entry_offs[i + 1];

        let name = read_c_string(
            pclntab,
            usize::try_from(header.funcname_offset)
                .map_err(|_| anyhow!("funcname table offset out of range"))?
                + usize::try_from(name_off).map_err(|_| anyhow!("negative name offset"))?,
        )?;
        let (package, receiver) = split_symbol_name(&name);
        funcs.push(FuncRecord {
            entry,
            end,
            name,
            package,
            receiver,
        });
    }

    Ok(funcs)
}
