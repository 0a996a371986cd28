//! Assembles disassembled functions and their decoded direct callees into a
//! rooted graph, the entry function (`main.main`) at the root.

use std::collections::HashMap;

use crate::disasm::DisassembledFunc;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct Node {
    pub entry: u64,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub from: u64,
    pub to: u64,
}

/// A rooted call graph. Multi-edges between the same pair of functions are
/// permitted and preserved, not deduplicated.
#[derive(Debug, Clone)]
pub struct CallGraph {
    pub root: u64,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl CallGraph {
    pub fn node(&self, entry: u64) -> Option<&Node> {
        self.nodes.iter().find(|n| n.entry == entry)
    }

    pub fn callees_of(&self, entry: u64) -> impl Iterator<Item = u64> + '_ {
        self.edges.iter().filter(move |e| e.from == entry).map(|e| e.to)
    }
}

#[tracing::instrument(skip_all)]
pub fn build(functions: &[DisassembledFunc]) -> Result<CallGraph> {
    let entry_func = functions
        .iter()
        .find(|f| f.name == "main.main")
        .ok_or(Error::NoEntryPoint)?;

    let by_entry: HashMap<u64, &DisassembledFunc> = functions.iter().map(|f| (f.entry, f)).collect();

    let mut nodes = Vec::with_capacity(functions.len());
    let mut edges = Vec::new();
    for f in functions {
        nodes.push(Node {
            entry: f.entry,
            name: f.name.clone(),
        });
        for &callee in &f.callees {
            if by_entry.contains_key(&callee) {
                edges.push(Edge {
                    from: f.entry,
                    to: callee,
                });
            }
        }
    }

    Ok(CallGraph {
        root: entry_func.entry,
        nodes,
        edges,
    })
}
