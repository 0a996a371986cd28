//! Translates a decoded function record plus the type catalogue into a
//! signature-bearing function object: receiver parsing, method-set lookup,
//! and recursive translation of the receiver method's parameter/result
//! types into a small local [`SigType`] tree.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::reflect::{Kind, Type};

/// A structural mirror of a decoded [`Type`], recursively translated so the
/// SSA layer doesn't hand out catalogue-borrowed handles to its callers.
#[derive(Debug, Clone, PartialEq)]
pub enum SigType {
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,
    UnsafePointer,
    Ptr(Box<SigType>),
    Slice(Box<SigType>),
    Array(Box<SigType>, u64),
    Chan(Box<SigType>),
    Map(Box<SigType>, Box<SigType>),
    Struct { name: String, fields: Vec<(String, SigType)> },
    Interface { name: String, methods: Vec<String> },
    Func { params: Vec<SigType>, results: Vec<SigType>, variadic: bool },
    /// A cycle back to a type already under translation; only its name
    /// survives, breaking the recursion.
    Recursive(String),
    Opaque(String),
}

#[derive(Debug, Clone, Default)]
pub struct Signature {
    pub receiver: Option<SigType>,
    pub params: Vec<SigType>,
    pub results: Vec<SigType>,
    pub variadic: bool,
}

#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub package: String,
    pub signature: Signature,
}

/// Strips balanced parentheses, then an optional leading `*`, returning the
/// bare receiver type name and whether it was a pointer receiver.
/// `(*T)` -> `("T", true)`, `(T)` -> `("T", false)`, `*T` -> `("T", true)`,
/// `T` -> `("T", false)`, `""` -> `("", false)`.
pub fn recv_type(receiver: &str) -> (String, bool) {
    let inner = receiver
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(receiver);
    match inner.strip_prefix('*') {
        Some(rest) => (rest.to_string(), true),
        None => (inner.to_string(), false),
    }
}

/// Package-keyed registry of named types, built once per image from the
/// decoded type catalogue and reused for every function's signature
/// synthesis.
pub struct Builder<'cat, 'data> {
    by_qualified_name: HashMap<String, Type<'cat, 'data>>,
    translate_cache: RefCell<HashMap<String, SigType>>,
}

impl<'cat, 'data> Builder<'cat, 'data> {
    pub fn new(types: &[Type<'cat, 'data>]) -> Self {
        let mut by_qualified_name = HashMap::new();
        for t in types {
            if let (Ok(pkg), Ok(name)) = (t.pkg_path(), t.name()) {
                if !name.is_empty() {
                    by_qualified_name.insert(format!("{pkg}.{name}"), *t);
                }
            }
        }
        Self {
            by_qualified_name,
            translate_cache: RefCell::new(HashMap::new()),
        }
    }

    /// Builds a [`Function`] for one decoded PC/line-table record.
    pub fn build_function(&self, package: &str, base_name: &str, receiver: &str) -> Function {
        let signature = self.function_signature(package, base_name, receiver);
        Function {
            name: base_name.to_string(),
            package: package.to_string(),
            signature,
        }
    }

    fn function_signature(&self, package: &str, base_name: &str, receiver: &str) -> Signature {
        let (recv_name, is_ptr) = recv_type(receiver);
        if recv_name.is_empty() {
            return Signature::default();
        }

        let Some(&recv_type_handle) = self.by_qualified_name.get(&format!("{package}.{recv_name}")) else {
            return Signature::default();
        };

        let promoted = if is_ptr {
            match recv_type_handle.ptr_to() {
                Ok(p) => p,
                Err(_) => return Signature::default(),
            }
        } else {
            recv_type_handle
        };

        let Ok(Some(method)) = promoted.method_by_name(base_name) else {
            return Signature::default();
        };
        let Some(method_type) = method.typ else {
            return Signature::default();
        };
        if method_type.kind() != Kind::Func {
            return Signature::default();
        }

        let params = (0..method_type.num_in().unwrap_or(0))
            .filter_map(|i| method_type.in_(i).ok())
            .map(|t| self.translate(t))
            .collect();
        let results = (0..method_type.num_out().unwrap_or(0))
            .filter_map(|i| method_type.out(i).ok())
            .map(|t| self.translate(t))
            .collect();

        Signature {
            receiver: Some(self.translate(promoted)),
            params,
            results,
            variadic: method_type.is_variadic().unwrap_or(false),
        }
    }

    fn translate(&self, t: Type<'cat, 'data>) -> SigType {
        let key = t.string().unwrap_or_default();
        if !key.is_empty() {
            if let Some(cached) = self.translate_cache.borrow().get(&key) {
                return cached.clone();
            }
            // Insert a placeholder before recursing so a self-referential
            // struct/pointer terminates instead of looping forever.
            self.translate_cache
                .borrow_mut()
                .insert(key.clone(), SigType::Recursive(key.clone()));
        }

        let result = match t.kind() {
            Kind::Bool => SigType::Bool,
            Kind::Int => SigType::Int,
            Kind::Int8 => SigType::Int8,
            Kind::Int16 => SigType::Int16,
            Kind::Int32 => SigType::Int32,
            Kind::Int64 => SigType::Int64,
            Kind::Uint => SigType::Uint,
            Kind::Uint8 => SigType::Uint8,
            Kind::Uint16 => SigType::Uint16,
            Kind::Uint32 => SigType::Uint32,
            Kind::Uint64 => SigType::Uint64,
            Kind::Uintptr => SigType::Uintptr,
            Kind::Float32 => SigType::Float32,
            Kind::Float64 => SigType::Float64,
            Kind::Complex64 => SigType::Complex64,
            Kind::Complex128 => SigType::Complex128,
            Kind::String => SigType::String,
            Kind::UnsafePointer => SigType::UnsafePointer,
            Kind::Ptr => match t.elem() {
                Ok(elem) => SigType::Ptr(Box::new(self.translate(elem))),
                Err(_) => SigType::Opaque("ptr".into()),
            },
            Kind::Slice => match t.elem() {
                Ok(elem) => SigType::Slice(Box::new(self.translate(elem))),
                Err(_) => SigType::Opaque("slice".into()),
            },
            Kind::Array => match t.elem() {
                Ok(elem) => SigType::Array(Box::new(self.translate(elem)), t.len().unwrap_or(0)),
                Err(_) => SigType::Opaque("array".into()),
            },
            Kind::Chan => match t.elem() {
                Ok(elem) => SigType::Chan(Box::new(self.translate(elem))),
                Err(_) => SigType::Opaque("chan".into()),
            },
            Kind::Map => match (t.key(), t.elem()) {
                (Ok(k), Ok(v)) => SigType::Map(Box::new(self.translate(k)), Box::new(self.translate(v))),
                _ => SigType::Opaque("map".into()),
            },
            Kind::Struct => {
                let name = t.name().unwrap_or_default();
                let n = t.num_field().unwrap_or(0);
                let mut fields = Vec::with_capacity(n);
                for i in 0..n {
                    if let Ok(f) = t.field(i) {
                        let field_type = f.typ.map(|ft| self.translate(ft)).unwrap_or(SigType::Opaque("unexported".into()));
                        fields.push((f.name, field_type));
                    }
                }
                SigType::Struct { name, fields }
            }
            Kind::Interface => {
                let name = t.name().unwrap_or_default();
                let n = t.num_method().unwrap_or(0);
                let methods = (0..n)
                    .filter_map(|i| t.method(i).ok())
                    .map(|m| m.name)
                    .collect();
                SigType::Interface { name, methods }
            }
            Kind::Func => {
                let params = (0..t.num_in().unwrap_or(0))
                    .filter_map(|i| t.in_(i).ok())
                    .map(|p| self.translate(p))
                    .collect();
                let results = (0..t.num_out().unwrap_or(0))
                    .filter_map(|i| t.out(i).ok())
                    .map(|p| self.translate(p))
                    .collect();
                SigType::Func {
                    params,
                    results,
                    variadic: t.is_variadic().unwrap_or(false),
                }
            }
            Kind::Invalid => SigType::Opaque("invalid".into()),
        };

        if !key.is_empty() {
            self.translate_cache.borrow_mut().insert(key, result.clone());
        }
        result
    }
}
