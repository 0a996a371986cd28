use rstest::{fixture, rstest};

use crate::callgraph;
use crate::disasm::DisassembledFunc;
use crate::pclntab;
use crate::reflect::{self, Kind, TypeCatalogue};
use crate::ssa::recv_type;
use crate::Error;

// -- reflect::kind / layout -------------------------------------------------

#[test]
fn kind_from_byte_masks_high_bits() {
    // A compiler could plausibly set bits above KIND_MASK (directIface etc
    // lived there in older toolchains); decoding must ignore them.
    assert_eq!(Kind::from_byte(0xa2).unwrap(), Kind::Int);
    assert_eq!(Kind::from_byte(0x02).unwrap(), Kind::Int);
    assert!(Kind::from_byte(0x1f).is_err());
}

#[test]
fn variant_trailer_sizes_match_field_sums() {
    use reflect::layout::*;
    assert_eq!(variant_trailer_size(Kind::Bool), HEADER_SIZE);
    assert_eq!(variant_trailer_size(Kind::Ptr), HEADER_SIZE + 8);
    assert_eq!(variant_trailer_size(Kind::Struct), HEADER_SIZE + 8 + 24);
}

#[test]
fn name_offset_zero_is_absent() {
    assert_eq!(reflect::name::valid_offset(0), None);
    assert_eq!(reflect::name::valid_offset(-1), None);
    assert_eq!(reflect::name::valid_offset(5), Some(5));
}

#[test]
fn leading_star_is_stripped_once() {
    assert_eq!(reflect::name::strip_leading_star("*int"), "int");
    assert_eq!(reflect::name::strip_leading_star("int"), "int");
}

// -- reflect type catalogue: a hand-built rodata image ----------------------

const RODATA_ADDR: u64 = 0x2000;

const INT_HDR: usize = 0;
const INT_NAME: usize = 48;
const PTR_HDR: usize = 64;
const PTR_NAME: usize = 112;
const PTR_TRAILER: usize = 128;
const FIELD_X_NAME: usize = 150;
const FIELD_Y_NAME: usize = 160;
const STRUCT_NAME: usize = 170;
const STRUCT_HDR: usize = 200;
const STRUCT_TRAILER: usize = 248;
const FIELD_ARRAY: usize = 300;

fn put_u8(buf: &mut [u8], at: usize, v: u8) {
    buf[at] = v;
}
fn put_u16(buf: &mut [u8], at: usize, v: u16) {
    buf[at..at + 2].copy_from_slice(&v.to_le_bytes());
}
fn put_u32(buf: &mut [u8], at: usize, v: u32) {
    buf[at..at + 4].copy_from_slice(&v.to_le_bytes());
}
fn put_i32(buf: &mut [u8], at: usize, v: i32) {
    buf[at..at + 4].copy_from_slice(&v.to_le_bytes());
}
fn put_u64(buf: &mut [u8], at: usize, v: u64) {
    buf[at..at + 8].copy_from_slice(&v.to_le_bytes());
}

#[allow(clippy::too_many_arguments)]
fn put_header(
    buf: &mut [u8],
    at: usize,
    size: u64,
    ptrdata: u64,
    tflag: u8,
    kind: u8,
    equal_addr: u64,
    name_off: i32,
    ptr_to_this: i32,
) {
    put_u64(buf, at, size);
    put_u64(buf, at + 8, ptrdata);
    put_u32(buf, at + 16, 0); // hash, unused by the facade
    put_u8(buf, at + 20, tflag);
    put_u8(buf, at + 21, 8); // align
    put_u8(buf, at + 22, 8); // field_align
    put_u8(buf, at + 23, kind);
    put_u64(buf, at + 24, equal_addr);
    put_u64(buf, at + 32, 0); // gcdata_addr
    put_i32(buf, at + 40, name_off);
    put_i32(buf, at + 44, ptr_to_this);
}

fn put_name(buf: &mut [u8], at: usize, exported: bool, text: &str) {
    put_u8(buf, at, exported as u8);
    put_u8(buf, at + 1, text.len() as u8);
    buf[at + 2..at + 2 + text.len()].copy_from_slice(text.as_bytes());
}

fn build_rodata() -> Vec<u8> {
    let mut buf = vec![0u8; 512];

    put_header(
        &mut buf,
        INT_HDR,
        8,
        0,
        reflect::layout::TFLAG_NAMED,
        Kind::Int as u8,
        1, // equal_addr != 0 -> comparable
        INT_NAME as i32,
        PTR_HDR as i32,
    );
    put_name(&mut buf, INT_NAME, true, "int");

    put_header(
        &mut buf,
        PTR_HDR,
        8,
        8,
        reflect::layout::TFLAG_NAMED,
        Kind::Ptr as u8,
        1,
        PTR_NAME as i32,
        0,
    );
    put_name(&mut buf, PTR_NAME, true, "*int");
    put_u64(&mut buf, PTR_TRAILER, RODATA_ADDR + INT_HDR as u64);

    put_name(&mut buf, FIELD_X_NAME, true, "X");
    put_name(&mut buf, FIELD_Y_NAME, false, "y");
    put_name(&mut buf, STRUCT_NAME, true, "S");

    put_header(
        &mut buf,
        STRUCT_HDR,
        16,
        8,
        reflect::layout::TFLAG_NAMED,
        Kind::Struct as u8,
        0, // not comparable
        STRUCT_NAME as i32,
        0,
    );
    put_u64(&mut buf, STRUCT_TRAILER, 0); // pkg_path_off: null
    put_u64(&mut buf, STRUCT_TRAILER + 8, RODATA_ADDR + FIELD_ARRAY as u64);
    put_u64(&mut buf, STRUCT_TRAILER + 16, 2); // len
    put_u64(&mut buf, STRUCT_TRAILER + 24, 2); // cap

    // field 0: X, exported, offset 0
    put_u64(&mut buf, FIELD_ARRAY, RODATA_ADDR + FIELD_X_NAME as u64);
    put_u64(&mut buf, FIELD_ARRAY + 8, RODATA_ADDR + INT_HDR as u64);
    put_u64(&mut buf, FIELD_ARRAY + 16, 0);
    // field 1: y, unexported, offset 8
    put_u64(&mut buf, FIELD_ARRAY + 24, RODATA_ADDR + FIELD_Y_NAME as u64);
    put_u64(&mut buf, FIELD_ARRAY + 32, RODATA_ADDR + INT_HDR as u64);
    put_u64(&mut buf, FIELD_ARRAY + 40, 16); // byte offset 8, not embedded

    buf
}

#[test]
fn decodes_named_int_type() {
    let rodata = build_rodata();
    let cat = TypeCatalogue::new(&rodata, RODATA_ADDR);
    let t = cat.type_at(INT_HDR as i32).unwrap();
    assert_eq!(t.kind(), Kind::Int);
    assert_eq!(t.size(), 8);
    assert_eq!(t.align(), 8);
    assert!(t.comparable());
    assert_eq!(t.string().unwrap(), "int");
    assert_eq!(t.name().unwrap(), "int");
    assert_eq!(t.pkg_path().unwrap(), "");
}

#[test]
fn type_at_memoises_by_offset() {
    let rodata = build_rodata();
    let cat = TypeCatalogue::new(&rodata, RODATA_ADDR);
    let a = cat.type_at(INT_HDR as i32).unwrap();
    let b = cat.type_at(INT_HDR as i32).unwrap();
    assert_eq!(a, b);
}

#[test]
fn ptr_elem_strips_leading_star_unconditionally() {
    let rodata = build_rodata();
    let cat = TypeCatalogue::new(&rodata, RODATA_ADDR);
    let ptr = cat.type_at(PTR_HDR as i32).unwrap();
    assert_eq!(ptr.kind(), Kind::Ptr);
    assert_eq!(ptr.string().unwrap(), "int");
    assert_eq!(ptr.name().unwrap(), "int");

    let elem = ptr.elem().unwrap();
    assert_eq!(elem.kind(), Kind::Int);
    assert_eq!(elem.string().unwrap(), "int");
}

#[test]
fn struct_fields_resolve_only_when_exported() {
    let rodata = build_rodata();
    let cat = TypeCatalogue::new(&rodata, RODATA_ADDR);
    let s = cat.type_at(STRUCT_HDR as i32).unwrap();
    assert_eq!(s.kind(), Kind::Struct);
    assert_eq!(s.name().unwrap(), "S");
    assert_eq!(s.num_field().unwrap(), 2);

    let x = s.field(0).unwrap();
    assert_eq!(x.name, "X");
    assert_eq!(x.offset, 0);
    assert!(!x.embedded);
    assert_eq!(x.typ.unwrap().string().unwrap(), "int");

    let y = s.field(1).unwrap();
    assert_eq!(y.name, "y");
    assert_eq!(y.offset, 8);
    assert!(y.typ.is_none(), "unexported field must not resolve a Type");

    assert!(s.field_by_name("X").unwrap().is_some());
    assert!(s.field_by_name("missing").unwrap().is_none());
}

// -- pclntab -----------------------------------------------------------------

fn build_pclntab() -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&0xffff_fff1u32.to_le_bytes()); // GO120 magic
    buf.push(0); // pad1
    buf.push(0); // pad2
    buf.push(1); // min_lc
    buf.push(8); // ptr_size
    buf.extend_from_slice(&2u64.to_le_bytes()); // nfunc
    buf.extend_from_slice(&0u64.to_le_bytes()); // nfiles
    buf.extend_from_slice(&0x1000u64.to_le_bytes()); // text_start
    let funcname_offset_pos = buf.len();
    buf.extend_from_slice(&0u64.to_le_bytes()); // funcname_offset, fixed up below
    buf.extend_from_slice(&0u64.to_le_bytes()); // cu_offset
    buf.extend_from_slice(&0u64.to_le_bytes()); // filetab_offset
    buf.extend_from_slice(&0u64.to_le_bytes()); // pctab_offset
    let pcln_offset_pos = buf.len();
    buf.extend_from_slice(&0u64.to_le_bytes()); // pcln_offset, fixed up below

    let pcln_offset = buf.len() as u64;
    buf[pcln_offset_pos..pcln_offset_pos + 8].copy_from_slice(&pcln_offset.to_le_bytes());

    let index_start = buf.len();
    buf.resize(index_start + 24, 0); // 3 (entryOff, funcOff) pairs

    let func_rec0 = buf.len() as u32;
    buf.extend_from_slice(&0u32.to_le_bytes()); // entry_off
    buf.extend_from_slice(&0i32.to_le_bytes()); // name_off, fixed up below
    let func_rec1 = buf.len() as u32;
    buf.extend_from_slice(&0x10u32.to_le_bytes());
    buf.extend_from_slice(&0i32.to_le_bytes());

    let mut idx = index_start;
    for (entry_off, func_off) in [(0u32, func_rec0), (0x10, func_rec1), (0x30, 0)] {
        buf[idx..idx + 4].copy_from_slice(&entry_off.to_le_bytes());
        buf[idx + 4..idx + 8].copy_from_slice(&func_off.to_le_bytes());
        idx += 8;
    }

    let funcname_offset = buf.len() as u64;
    buf[funcname_offset_pos..funcname_offset_pos + 8].copy_from_slice(&funcname_offset.to_le_bytes());
    let name0_off = 0u32;
    buf.extend_from_slice(b"main.main\0");
    let name1_off = buf.len() as u32 - funcname_offset as u32;
    buf.extend_from_slice(b"main.(*T).F\0");

    buf[func_rec0 as usize + 4..func_rec0 as usize + 8].copy_from_slice(&(name0_off as i32).to_le_bytes());
    buf[func_rec1 as usize + 4..func_rec1 as usize + 8].copy_from_slice(&(name1_off as i32).to_le_bytes());

    buf
}

#[test]
fn pclntab_decodes_function_table() {
    let buf = build_pclntab();
    let funcs = pclntab::parse(&buf, 0).unwrap();
    assert_eq!(funcs.len(), 2);

    assert_eq!(funcs[0].entry, 0x1000);
    assert_eq!(funcs[0].end, 0x1010);
    assert_eq!(funcs[0].name, "main.main");
    assert_eq!(funcs[0].package, "main");
    assert_eq!(funcs[0].receiver, "");
    assert_eq!(funcs[0].base_name(), "main");

    assert_eq!(funcs[1].entry, 0x1010);
    assert_eq!(funcs[1].end, 0x1030);
    assert_eq!(funcs[1].name, "main.(*T).F");
    assert_eq!(funcs[1].package, "main");
    assert_eq!(funcs[1].receiver, "(*T)");
    assert_eq!(funcs[1].base_name(), "F");
}

#[test]
fn pclntab_rejects_legacy_magic() {
    let mut buf = vec![0u8; 16];
    buf[0..4].copy_from_slice(&0xffff_fffbu32.to_le_bytes());
    assert!(pclntab::parse(&buf, 0).is_err());
}

// -- ssa ----------------------------------------------------------------

#[test]
fn recv_type_strips_parens_and_star() {
    assert_eq!(recv_type("(*T)"), ("T".to_string(), true));
    assert_eq!(recv_type("(T)"), ("T".to_string(), false));
    assert_eq!(recv_type("*T"), ("T".to_string(), true));
    assert_eq!(recv_type("T"), ("T".to_string(), false));
    assert_eq!(recv_type(""), ("".to_string(), false));
}

// -- callgraph ------------------------------------------------------------

fn func(name: &str, entry: u64, callees: Vec<u64>) -> DisassembledFunc {
    DisassembledFunc {
        entry,
        end: entry + 1,
        name: name.to_string(),
        instructions: Vec::new(),
        callees,
    }
}

#[test]
fn callgraph_roots_at_main_and_keeps_multi_edges() {
    let funcs = vec![
        func("main.main", 0x1000, vec![0x2000, 0x2000, 0x3000]),
        func("main.helper", 0x2000, vec![]),
        func("main.other", 0x3000, vec![0x9999]), // dangling, not in the function set
    ];
    let graph = callgraph::build(&funcs).unwrap();
    assert_eq!(graph.root, 0x1000);
    assert_eq!(graph.nodes.len(), 3);

    let callees: Vec<u64> = graph.callees_of(0x1000).collect();
    assert_eq!(callees, vec![0x2000, 0x2000, 0x3000]);
    assert!(graph.callees_of(0x3000).next().is_none());
}

#[test]
fn callgraph_requires_main_main() {
    let funcs = vec![func("main.helper", 0x2000, vec![])];
    let err = callgraph::build(&funcs).unwrap_err();
    assert!(matches!(err, Error::NoEntryPoint));
}

// -- reflect: one hand-built fixture per remaining kind ---------------------
//
// Each fixture assembles a minimal `rodata` image for a single variant
// trailer and returns `(buffer, header_offset)`; the `#[rstest]` below just
// decodes the header at that offset and checks the fields the trailer
// parser is responsible for.

#[fixture]
fn array_rodata() -> (Vec<u8>, i32) {
    let mut buf = vec![0u8; 200];
    put_header(&mut buf, 0, 8, 0, 0, Kind::Int as u8, 1, 0, 0);
    let array_hdr = 64;
    put_header(&mut buf, array_hdr, 24, 8, 0, Kind::Array as u8, 0, 0, 0);
    let trailer = array_hdr + reflect::layout::HEADER_SIZE;
    put_u64(&mut buf, trailer, RODATA_ADDR); // elem_offset -> Int at 0
    put_u64(&mut buf, trailer + 8, 0); // slice_offset: absent
    put_u64(&mut buf, trailer + 16, 3); // len
    (buf, array_hdr as i32)
}

#[rstest]
fn array_trailer_decodes_elem_and_len(array_rodata: (Vec<u8>, i32)) {
    let (rodata, offset) = array_rodata;
    let cat = TypeCatalogue::new(&rodata, RODATA_ADDR);
    let t = cat.type_at(offset).unwrap();
    assert_eq!(t.kind(), Kind::Array);
    assert_eq!(t.len().unwrap(), 3);
    assert_eq!(t.elem().unwrap().kind(), Kind::Int);
}

#[fixture]
fn chan_rodata() -> (Vec<u8>, i32) {
    let mut buf = vec![0u8; 200];
    put_header(&mut buf, 0, 8, 0, 0, Kind::Int as u8, 1, 0, 0);
    let chan_hdr = 64;
    put_header(&mut buf, chan_hdr, 8, 8, 0, Kind::Chan as u8, 0, 0, 0);
    let trailer = chan_hdr + reflect::layout::HEADER_SIZE;
    put_u64(&mut buf, trailer, RODATA_ADDR); // elem_offset -> Int at 0
    put_u64(&mut buf, trailer + 8, 3); // dir: BothDir
    (buf, chan_hdr as i32)
}

#[rstest]
fn chan_trailer_decodes_elem_and_dir(chan_rodata: (Vec<u8>, i32)) {
    let (rodata, offset) = chan_rodata;
    let cat = TypeCatalogue::new(&rodata, RODATA_ADDR);
    let t = cat.type_at(offset).unwrap();
    assert_eq!(t.kind(), Kind::Chan);
    assert_eq!(t.chan_dir().unwrap(), reflect::ChanDir::BothDir);
    assert_eq!(t.elem().unwrap().kind(), Kind::Int);
}

#[fixture]
fn map_rodata() -> (Vec<u8>, i32) {
    let mut buf = vec![0u8; 300];
    put_header(&mut buf, 0, 8, 0, 0, Kind::Int as u8, 1, 0, 0); // key type
    put_header(&mut buf, 64, 16, 8, 0, Kind::String as u8, 1, 0, 0); // elem type
    let map_hdr = 150;
    put_header(&mut buf, map_hdr, 8, 8, 0, Kind::Map as u8, 0, 0, 0);
    let trailer = map_hdr + reflect::layout::HEADER_SIZE;
    put_u64(&mut buf, trailer, RODATA_ADDR); // key_offset -> Int at 0
    put_u64(&mut buf, trailer + 8, RODATA_ADDR + 64); // elem_offset -> String at 64
    put_u64(&mut buf, trailer + 16, 0); // bucket_offset: absent
    put_u64(&mut buf, trailer + 24, 0); // hasher_addr
    put_u8(&mut buf, trailer + 32, 8); // key_size
    put_u8(&mut buf, trailer + 33, 16); // value_size
    put_u16(&mut buf, trailer + 34, 208); // bucket_size
    put_u32(&mut buf, trailer + 36, 0); // flags
    (buf, map_hdr as i32)
}

#[rstest]
fn map_trailer_decodes_key_and_elem(map_rodata: (Vec<u8>, i32)) {
    let (rodata, offset) = map_rodata;
    let cat = TypeCatalogue::new(&rodata, RODATA_ADDR);
    let t = cat.type_at(offset).unwrap();
    assert_eq!(t.kind(), Kind::Map);
    assert_eq!(t.key().unwrap().kind(), Kind::Int);
    assert_eq!(t.elem().unwrap().kind(), Kind::String);
}

#[fixture]
fn interface_rodata() -> (Vec<u8>, i32) {
    let mut buf = vec![0u8; 600];
    let method_type_hdr = 500; // nonzero: 0 would collide with the absent-typeOff sentinel
    put_header(&mut buf, method_type_hdr, 8, 0, 0, Kind::Int as u8, 1, 0, 0);
    put_name(&mut buf, 200, true, "Foo");
    let iface_hdr = 300;
    put_header(&mut buf, iface_hdr, 16, 8, 0, Kind::Interface as u8, 0, 0, 0);
    let trailer = iface_hdr + reflect::layout::HEADER_SIZE;
    put_u64(&mut buf, trailer, 0); // pkg_path_off: absent
    put_u64(&mut buf, trailer + 8, RODATA_ADDR + 400); // data_offset -> method array
    put_u64(&mut buf, trailer + 16, 1); // len
    put_u64(&mut buf, trailer + 24, 1); // cap
    put_i32(&mut buf, 400, 200); // name_off (direct rodata offset, not VA)
    put_i32(&mut buf, 404, method_type_hdr as i32); // type_off (direct rodata offset)
    (buf, iface_hdr as i32)
}

#[rstest]
fn interface_trailer_decodes_method_table(interface_rodata: (Vec<u8>, i32)) {
    let (rodata, offset) = interface_rodata;
    let cat = TypeCatalogue::new(&rodata, RODATA_ADDR);
    let t = cat.type_at(offset).unwrap();
    assert_eq!(t.kind(), Kind::Interface);
    assert_eq!(t.num_method().unwrap(), 1);
    let m = t.method(0).unwrap();
    assert_eq!(m.name, "Foo");
    assert!(m.exported);
    assert_eq!(m.typ.unwrap().kind(), Kind::Int);
}

#[fixture]
fn slice_rodata() -> (Vec<u8>, i32) {
    let mut buf = vec![0u8; 200];
    put_header(&mut buf, 0, 8, 0, reflect::layout::TFLAG_NAMED, Kind::Int as u8, 1, 48, 0);
    put_name(&mut buf, 48, true, "int");
    let slice_hdr = 64;
    put_header(
        &mut buf,
        slice_hdr,
        24,
        8,
        reflect::layout::TFLAG_NAMED,
        Kind::Slice as u8,
        0,
        150,
        0,
    );
    put_name(&mut buf, 150, true, "[]int");
    let trailer = slice_hdr + reflect::layout::HEADER_SIZE;
    put_u64(&mut buf, trailer, RODATA_ADDR); // elem_offset -> Int at 0
    (buf, slice_hdr as i32)
}

#[rstest]
fn slice_trailer_delegates_to_pointer_decoder(slice_rodata: (Vec<u8>, i32)) {
    let (rodata, offset) = slice_rodata;
    let cat = TypeCatalogue::new(&rodata, RODATA_ADDR);
    let t = cat.type_at(offset).unwrap();
    assert_eq!(t.kind(), Kind::Slice);
    assert_eq!(t.string().unwrap(), "[]int");
    let elem = t.elem().unwrap();
    assert_eq!(elem.kind(), Kind::Int);
    assert_eq!(elem.string().unwrap(), "int");
}

// func's parameter/result array sits after an optional uncommon trailer, a
// different address formula from every other kind's method array; both
// branches get their own fixture.

#[fixture]
fn func_rodata_no_uncommon() -> (Vec<u8>, i32) {
    let mut buf = vec![0u8; 300];
    put_header(&mut buf, 0, 8, 0, 0, Kind::Int as u8, 1, 0, 0);
    let func_hdr = 200;
    put_header(
        &mut buf,
        func_hdr,
        8,
        8,
        reflect::layout::TFLAG_NAMED,
        Kind::Func as u8,
        0,
        0,
        0,
    );
    let counts = func_hdr + reflect::layout::HEADER_SIZE;
    put_u16(&mut buf, counts, 1); // in_count
    put_u16(&mut buf, counts + 2, 1); // out_count_raw
    let params = func_hdr + reflect::layout::FUNC_TYPE_SIZE;
    put_u64(&mut buf, params, RODATA_ADDR); // in[0] -> Int
    put_u64(&mut buf, params + 8, RODATA_ADDR); // out[0] -> Int
    (buf, func_hdr as i32)
}

#[rstest]
fn func_trailer_reads_params_right_after_counts_without_uncommon(
    func_rodata_no_uncommon: (Vec<u8>, i32),
) {
    let (rodata, offset) = func_rodata_no_uncommon;
    let cat = TypeCatalogue::new(&rodata, RODATA_ADDR);
    let t = cat.type_at(offset).unwrap();
    assert_eq!(t.kind(), Kind::Func);
    assert_eq!(t.num_in().unwrap(), 1);
    assert_eq!(t.num_out().unwrap(), 1);
    assert!(!t.is_variadic().unwrap());
    assert_eq!(t.in_(0).unwrap().kind(), Kind::Int);
    assert_eq!(t.out(0).unwrap().kind(), Kind::Int);
}

#[fixture]
fn func_rodata_with_uncommon() -> (Vec<u8>, i32) {
    let mut buf = vec![0u8; 300];
    put_header(&mut buf, 0, 8, 0, 0, Kind::Int as u8, 1, 0, 0);
    let func_hdr = 200;
    put_header(
        &mut buf,
        func_hdr,
        8,
        8,
        reflect::layout::TFLAG_NAMED | reflect::layout::TFLAG_UNCOMMON,
        Kind::Func as u8,
        0,
        0,
        0,
    );
    let counts = func_hdr + reflect::layout::HEADER_SIZE;
    put_u16(&mut buf, counts, 1); // in_count
    put_u16(&mut buf, counts + 2, 0); // out_count_raw

    let uncommon = func_hdr + reflect::layout::variant_trailer_size(Kind::Func);
    put_i32(&mut buf, uncommon, 0); // pkg_path_off
    put_u16(&mut buf, uncommon + 4, 0); // mcount
    put_u16(&mut buf, uncommon + 6, 0); // xcount
    put_u32(&mut buf, uncommon + 8, 0); // moff

    // The param array sits past the uncommon trailer too, not right after
    // in_count/out_count as in the no-uncommon fixture above.
    let params = func_hdr + reflect::layout::FUNC_TYPE_SIZE + reflect::layout::UNCOMMON_SIZE;
    put_u64(&mut buf, params, RODATA_ADDR); // in[0] -> Int
    (buf, func_hdr as i32)
}

#[rstest]
fn func_trailer_skips_uncommon_trailer_before_params(func_rodata_with_uncommon: (Vec<u8>, i32)) {
    let (rodata, offset) = func_rodata_with_uncommon;
    let cat = TypeCatalogue::new(&rodata, RODATA_ADDR);
    let t = cat.type_at(offset).unwrap();
    assert_eq!(t.kind(), Kind::Func);
    assert_eq!(t.num_in().unwrap(), 1);
    assert_eq!(t.in_(0).unwrap().kind(), Kind::Int);
    assert_eq!(t.num_method().unwrap(), 0);
}
