//! The type decoder and reflection façade: walks `__typelink` offsets into
//! `__rodata`, decodes the common header plus each kind's variant trailer,
//! and exposes a uniform [`Type`] handle over the result.
//!
//! Types are decoded lazily and memoised by `rodata` offset in
//! [`TypeCatalogue`]: the catalogue is a plain index-keyed table (`Vec<Node>`
//! plus an offset→index map), and a [`Type`] handle is just a borrow of the
//! catalogue plus an index, never a reference into another node — this is
//! what keeps cyclic type graphs (a struct holding a pointer to itself)
//! terminating on identity instead of recursing forever.

pub mod array;
pub mod chan;
pub mod func;
pub mod header;
pub mod interface;
pub mod kind;
pub mod layout;
pub mod map;
pub mod name;
pub mod pointer;
pub mod slice;
pub mod struct_type;
pub mod uncommon;

use std::cell::RefCell;
use std::collections::HashMap;

pub use kind::Kind;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
enum Trailer {
    None,
    Array(array::ArrayTrailer),
    Chan(chan::ChanTrailer),
    Func(func::FuncTrailer),
    Interface(interface::InterfaceTrailer),
    Map(map::MapTrailer),
    Ptr(pointer::PtrTrailer),
    Slice(slice::SliceTrailer),
    Struct(struct_type::StructTrailer),
}

struct Node {
    header: header::RtypeHeader,
    trailer: RefCell<Option<Trailer>>,
    uncommon: RefCell<Option<Option<uncommon::UncommonTrailer>>>,
}

/// Owns the decoded type graph for one image. Built once by [`crate::Image`]'s
/// one-shot initialiser and immutable (in the sense of never losing entries)
/// afterwards; interior mutability only grows the memo table.
pub struct TypeCatalogue<'data> {
    rodata: &'data [u8],
    rodata_addr: u64,
    nodes: RefCell<Vec<Node>>,
    by_offset: RefCell<HashMap<i32, usize>>,
}

fn decode_err(offset: i32, e: anyhow::Error) -> Error {
    Error::DecodeError {
        offset,
        what: e.to_string(),
    }
}

impl<'data> TypeCatalogue<'data> {
    pub fn new(rodata: &'data [u8], rodata_addr: u64) -> Self {
        Self {
            rodata,
            rodata_addr,
            nodes: RefCell::new(Vec::new()),
            by_offset: RefCell::new(HashMap::new()),
        }
    }

    fn get_or_insert(&self, offset: i32) -> Result<usize> {
        if let Some(&index) = self.by_offset.borrow().get(&offset) {
            return Ok(index);
        }
        let header = header::parse(self.rodata, offset).map_err(|e| decode_err(offset, e))?;
        let index = {
            let mut nodes = self.nodes.borrow_mut();
            let index = nodes.len();
            nodes.push(Node {
                header,
                trailer: RefCell::new(None),
                uncommon: RefCell::new(None),
            });
            index
        };
        self.by_offset.borrow_mut().insert(offset, index);
        Ok(index)
    }

    /// Resolves the type header at `offset`, memoised so repeated lookups of
    /// the same offset return the same node identity.
    pub fn type_at(&self, offset: i32) -> Result<Type<'_, 'data>> {
        let index = self.get_or_insert(offset)?;
        Ok(Type { cat: self, index })
    }

    /// Reads `__typelink` (a packed array of 32-bit `rodata` offsets) and
    /// resolves each entry, substituting a top-level `Ptr` entry with its
    /// `Elem` — the caller's contract is "types", not "pointers to types".
    pub fn types_from_typelink(&self, typelink: &[u8]) -> Result<Vec<Type<'_, 'data>>> {
        use crate::reader::LeRead;
        use std::io::Cursor;

        let mut out = Vec::with_capacity(typelink.len() / 4);
        let mut cur = Cursor::new(typelink);
        while (cur.position() as usize) < typelink.len() {
            let off = cur.read_i32().map_err(|e| decode_err(0, e.into()))?;
            let t = self.type_at(off)?;
            if t.kind() == Kind::Ptr {
                out.push(t.elem()?);
            } else {
                out.push(t);
            }
        }
        Ok(out)
    }
}

#[derive(Clone, Copy)]
pub struct Type<'cat, 'data> {
    cat: &'cat TypeCatalogue<'data>,
    index: usize,
}

impl<'cat, 'data> PartialEq for Type<'cat, 'data> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.cat, other.cat) && self.index == other.index
    }
}
impl<'cat, 'data> Eq for Type<'cat, 'data> {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    RecvOnly,
    SendOnly,
    BothDir,
}

impl ChanDir {
    fn from_raw(v: u64, offset: i32) -> Result<ChanDir> {
        match v {
            1 => Ok(ChanDir::RecvOnly),
            2 => Ok(ChanDir::SendOnly),
            3 => Ok(ChanDir::BothDir),
            other => Err(Error::DecodeError {
                offset,
                what: format!("invalid chan dir {other}"),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MethodInfo<'cat, 'data> {
    pub name: String,
    pub exported: bool,
    pub typ: Option<Type<'cat, 'data>>,
    pub index: usize,
}

#[derive(Debug, Clone)]
pub struct Field<'cat, 'data> {
    pub name: String,
    pub typ: Option<Type<'cat, 'data>>,
    pub offset: u64,
    pub embedded: bool,
}

impl<'cat, 'data> Type<'cat, 'data> {
    pub fn offset(&self) -> i32 {
        self.header().offset
    }

    fn header(&self) -> header::RtypeHeader {
        self.cat.nodes.borrow()[self.index].header.clone()
    }

    fn trailer(&self) -> Result<Trailer> {
        {
            let nodes = self.cat.nodes.borrow();
            if let Some(t) = nodes[self.index].trailer.borrow().as_ref() {
                return Ok(t.clone());
            }
        }
        let header = self.header();
        let parsed = match header.kind {
            Kind::Array => Trailer::Array(
                array::parse(self.cat.rodata, self.cat.rodata_addr, &header)
                    .map_err(|e| decode_err(header.offset, e))?,
            ),
            Kind::Chan => Trailer::Chan(
                chan::parse(self.cat.rodata, self.cat.rodata_addr, &header)
                    .map_err(|e| decode_err(header.offset, e))?,
            ),
            Kind::Func => Trailer::Func(
                func::parse(self.cat.rodata, self.cat.rodata_addr, &header)
                    .map_err(|e| decode_err(header.offset, e))?,
            ),
            Kind::Interface => Trailer::Interface(
                interface::parse(self.cat.rodata, self.cat.rodata_addr, &header)
                    .map_err(|e| decode_err(header.offset, e))?,
            ),
            Kind::Map => Trailer::Map(
                map::parse(self.cat.rodata, self.cat.rodata_addr, &header)
                    .map_err(|e| decode_err(header.offset, e))?,
            ),
            Kind::Ptr => Trailer::Ptr(
                pointer::parse(self.cat.rodata, self.cat.rodata_addr, &header)
                    .map_err(|e| decode_err(header.offset, e))?,
            ),
            Kind::Slice => Trailer::Slice(
                slice::parse(self.cat.rodata, self.cat.rodata_addr, &header)
                    .map_err(|e| decode_err(header.offset, e))?,
            ),
            Kind::Struct => Trailer::Struct(
                struct_type::parse(self.cat.rodata, self.cat.rodata_addr, &header)
                    .map_err(|e| decode_err(header.offset, e))?,
            ),
            _ => Trailer::None,
        };
        let nodes = self.cat.nodes.borrow();
        *nodes[self.index].trailer.borrow_mut() = Some(parsed.clone());
        Ok(parsed)
    }

    fn uncommon(&self) -> Result<Option<uncommon::UncommonTrailer>> {
        {
            let nodes = self.cat.nodes.borrow();
            if let Some(cached) = nodes[self.index].uncommon.borrow().as_ref() {
                return Ok(cached.clone());
            }
        }
        let header = self.header();
        let result = if header.has_uncommon() {
            let offset = header.offset as usize + layout::variant_trailer_size(header.kind);
            Some(
                uncommon::parse(self.cat.rodata, offset).map_err(|e| decode_err(header.offset, e))?,
            )
        } else {
            None
        };
        let nodes = self.cat.nodes.borrow();
        *nodes[self.index].uncommon.borrow_mut() = Some(result.clone());
        Ok(result)
    }

    pub fn kind(&self) -> Kind {
        self.header().kind
    }

    pub fn size(&self) -> u64 {
        self.header().size
    }

    pub fn align(&self) -> u8 {
        self.header().align
    }

    pub fn comparable(&self) -> bool {
        self.header().comparable()
    }

    pub fn string(&self) -> Result<String> {
        let header = self.header();
        match name::valid_offset(header.name_off) {
            Some(off) => {
                let n = name::read(self.cat.rodata, off).map_err(|e| decode_err(header.offset, e))?;
                Ok(name::strip_leading_star(&n.text).to_string())
            }
            None => Ok(String::new()),
        }
    }

    pub fn name(&self) -> Result<String> {
        let header = self.header();
        if !header.is_named() {
            return Ok(String::new());
        }
        let s = self.string()?;
        Ok(match s.rfind('.') {
            Some(i) => s[i + 1..].to_string(),
            None => s,
        })
    }

    pub fn pkg_path(&self) -> Result<String> {
        match self.uncommon()? {
            Some(u) => match name::valid_offset(u.pkg_path_off) {
                Some(off) => {
                    Ok(name::read(self.cat.rodata, off)
                        .map_err(|e| decode_err(self.offset(), e))?
                        .text)
                }
                None => Ok(String::new()),
            },
            None => Ok(String::new()),
        }
    }

    fn kind_mismatch(&self, expected: &'static str) -> Error {
        Error::KindMismatch {
            expected,
            actual: self.kind().name(),
        }
    }

    /// Defined for Array, Chan, Map, Ptr, Slice only.
    pub fn elem(&self) -> Result<Type<'cat, 'data>> {
        let off = match self.trailer()? {
            Trailer::Array(t) => t.elem_offset,
            Trailer::Chan(t) => t.elem_offset,
            Trailer::Map(t) => t.elem_offset,
            Trailer::Ptr(t) => t.elem_offset,
            Trailer::Slice(t) => t.elem_offset,
            _ => return Err(self.kind_mismatch("array|chan|map|ptr|slice")),
        };
        let off = off.ok_or_else(|| Error::DecodeError {
            offset: self.offset(),
            what: "missing elem address".into(),
        })?;
        self.cat.type_at(off)
    }

    pub fn key(&self) -> Result<Type<'cat, 'data>> {
        match self.trailer()? {
            Trailer::Map(t) => {
                let off = t.key_offset.ok_or_else(|| Error::DecodeError {
                    offset: self.offset(),
                    what: "missing map key address".into(),
                })?;
                self.cat.type_at(off)
            }
            _ => Err(self.kind_mismatch("map")),
        }
    }

    pub fn len(&self) -> Result<u64> {
        match self.trailer()? {
            Trailer::Array(t) => Ok(t.len),
            _ => Err(self.kind_mismatch("array")),
        }
    }

    pub fn chan_dir(&self) -> Result<ChanDir> {
        match self.trailer()? {
            Trailer::Chan(t) => ChanDir::from_raw(t.dir, self.offset()),
            _ => Err(self.kind_mismatch("chan")),
        }
    }

    pub fn num_in(&self) -> Result<usize> {
        match self.trailer()? {
            Trailer::Func(t) => Ok(t.in_count as usize),
            _ => Err(self.kind_mismatch("func")),
        }
    }

    pub fn num_out(&self) -> Result<usize> {
        match self.trailer()? {
            Trailer::Func(t) => Ok(t.out_count() as usize),
            _ => Err(self.kind_mismatch("func")),
        }
    }

    pub fn is_variadic(&self) -> Result<bool> {
        match self.trailer()? {
            Trailer::Func(t) => Ok(t.is_variadic()),
            _ => Err(self.kind_mismatch("func")),
        }
    }

    pub fn in_(&self, i: usize) -> Result<Type<'cat, 'data>> {
        let t = match self.trailer()? {
            Trailer::Func(t) => t,
            _ => return Err(self.kind_mismatch("func")),
        };
        if i >= t.in_count as usize {
            return Err(Error::IndexOutOfRange {
                op: "In",
                i,
                n: t.in_count as usize,
            });
        }
        let off = t.params[i].ok_or_else(|| Error::DecodeError {
            offset: self.offset(),
            what: "missing param type".into(),
        })?;
        self.cat.type_at(off)
    }

    pub fn out(&self, i: usize) -> Result<Type<'cat, 'data>> {
        let t = match self.trailer()? {
            Trailer::Func(t) => t,
            _ => return Err(self.kind_mismatch("func")),
        };
        let n = t.out_count() as usize;
        if i >= n {
            return Err(Error::IndexOutOfRange { op: "Out", i, n });
        }
        let off = t.params[t.in_count as usize + i].ok_or_else(|| Error::DecodeError {
            offset: self.offset(),
            what: "missing result type".into(),
        })?;
        self.cat.type_at(off)
    }

    pub fn num_field(&self) -> Result<usize> {
        match self.trailer()? {
            Trailer::Struct(t) => Ok(t.fields.len()),
            _ => Err(self.kind_mismatch("struct")),
        }
    }

    pub fn field(&self, i: usize) -> Result<Field<'cat, 'data>> {
        let t = match self.trailer()? {
            Trailer::Struct(t) => t,
            _ => return Err(self.kind_mismatch("struct")),
        };
        if i >= t.fields.len() {
            return Err(Error::IndexOutOfRange {
                op: "Field",
                i,
                n: t.fields.len(),
            });
        }
        let f = &t.fields[i];
        let name_off = f.name_offset.ok_or_else(|| Error::DecodeError {
            offset: self.offset(),
            what: "missing field name".into(),
        })?;
        let n = name::read(self.cat.rodata, name_off).map_err(|e| decode_err(self.offset(), e))?;
        // Unexported fields carry a present name but a null Type, matching
        // the struct-field invariant: only exported fields resolve a Type.
        let typ = if n.exported {
            match f.type_offset {
                Some(off) => Some(self.cat.type_at(off)?),
                None => None,
            }
        } else {
            None
        };
        Ok(Field {
            name: n.text,
            typ,
            offset: f.byte_offset(),
            embedded: f.embedded(),
        })
    }

    pub fn field_by_index(&self, index_path: &[usize]) -> Result<Field<'cat, 'data>> {
        if index_path.is_empty() {
            return Err(Error::BadArgument("FieldByIndex"));
        }
        let mut cur_type = *self;
        let mut result = None;
        for (depth, &i) in index_path.iter().enumerate() {
            let f = cur_type.field(i)?;
            if depth + 1 == index_path.len() {
                result = Some(f);
                break;
            }
            cur_type = f.typ.ok_or_else(|| Error::DecodeError {
                offset: cur_type.offset(),
                what: "embedded field has no type".into(),
            })?;
        }
        result.ok_or(Error::BadArgument("FieldByIndex"))
    }

    pub fn field_by_name(&self, name: &str) -> Result<Option<Field<'cat, 'data>>> {
        let n = self.num_field()?;
        for i in 0..n {
            let f = self.field(i)?;
            if f.name == name {
                return Ok(Some(f));
            }
        }
        Ok(None)
    }

    pub fn field_by_name_func(&self, pred: impl Fn(&str) -> bool) -> Result<Option<Field<'cat, 'data>>> {
        let n = self.num_field()?;
        for i in 0..n {
            let f = self.field(i)?;
            if pred(&f.name) {
                return Ok(Some(f));
            }
        }
        Ok(None)
    }

    pub fn num_method(&self) -> Result<usize> {
        if self.kind() == Kind::Interface {
            match self.trailer()? {
                Trailer::Interface(t) => Ok(t.methods.len()),
                _ => unreachable!(),
            }
        } else {
            match self.uncommon()? {
                Some(u) => Ok(u.xcount as usize),
                None => Ok(0),
            }
        }
    }

    pub fn method(&self, i: usize) -> Result<MethodInfo<'cat, 'data>> {
        if self.kind() == Kind::Interface {
            return self.interface_method(i);
        }
        let header = self.header();
        let u = self.uncommon()?.ok_or(Error::IndexOutOfRange {
            op: "Method",
            i,
            n: 0,
        })?;
        if i >= u.xcount as usize {
            return Err(Error::IndexOutOfRange {
                op: "Method",
                i,
                n: u.xcount as usize,
            });
        }
        let methods_offset =
            header.offset as usize + layout::variant_trailer_size(header.kind) + u.moff as usize;
        let m = uncommon::read_method(self.cat.rodata, methods_offset, i)
            .map_err(|e| decode_err(header.offset, e))?;
        let n = name::read(self.cat.rodata, m.name_off).map_err(|e| decode_err(header.offset, e))?;
        // Concrete-type methods only resolve a Type when exported; an
        // unexported entry still appears (it counts toward mcount) but with
        // no Type, unlike interface methods below, which always resolve.
        let typ = if n.exported && m.mtyp_off > 0 {
            Some(self.cat.type_at(m.mtyp_off)?)
        } else {
            None
        };
        Ok(MethodInfo {
            name: n.text,
            exported: n.exported,
            typ,
            index: i,
        })
    }

    fn interface_method(&self, i: usize) -> Result<MethodInfo<'cat, 'data>> {
        let t = match self.trailer()? {
            Trailer::Interface(t) => t,
            _ => unreachable!(),
        };
        if i >= t.methods.len() {
            return Err(Error::IndexOutOfRange {
                op: "Method",
                i,
                n: t.methods.len(),
            });
        }
        let m = &t.methods[i];
        let n = name::read(self.cat.rodata, m.name_off).map_err(|e| decode_err(self.offset(), e))?;
        let typ = match name::valid_offset(m.type_off) {
            Some(off) => Some(self.cat.type_at(off)?),
            None => None,
        };
        Ok(MethodInfo {
            name: n.text,
            exported: n.exported,
            typ,
            index: i,
        })
    }

    pub fn method_by_name(&self, name: &str) -> Result<Option<MethodInfo<'cat, 'data>>> {
        let n = self.num_method()?;
        for i in 0..n {
            let m = self.method(i)?;
            if m.name == name {
                return Ok(Some(m));
            }
        }
        Ok(None)
    }

    /// The compiler always lays out `ptrToThis` as a direct `rodata` offset,
    /// never a virtual address needing rebase (unlike `__typelink` entries,
    /// which are also direct offsets, and unlike the 8-byte addresses
    /// embedded in variant trailers, which are rebased virtual addresses).
    pub fn ptr_to(&self) -> Result<Type<'cat, 'data>> {
        let header = self.header();
        if header.ptr_to_this == 0 {
            return Err(Error::DecodeError {
                offset: header.offset,
                what: "no ptrToThis entry".into(),
            });
        }
        self.cat.type_at(header.ptr_to_this)
    }

    pub fn implements(&self, u: Option<Type<'cat, 'data>>) -> Result<bool> {
        let u = u.ok_or(Error::BadArgument("Implements"))?;
        if u.kind() != Kind::Interface {
            return Err(Error::BadArgument("Implements"));
        }
        Ok(false)
    }

    pub fn assignable_to(&self, _u: Type<'cat, 'data>) -> Result<bool> {
        Ok(false)
    }

    pub fn convertible_to(&self, _u: Type<'cat, 'data>) -> Result<bool> {
        Ok(false)
    }
}
