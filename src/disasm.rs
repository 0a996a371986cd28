//! Per-function x86-64 disassembly and direct-call extraction, using the
//! `zydis` crate's decoder. Only relative `CALL`/`CALLF` ("LCALL" in the
//! ground-truth decoder's naming) instructions are followed into the
//! function-address map; everything else (register/memory-operand calls,
//! unresolved targets) is dropped silently — this crate only ever
//! approximates the call graph, by design.

use anyhow::Context;
use zydis::{Decoder, Mnemonic, OperandKind};

use crate::pclntab::FuncRecord;
use crate::symbol::SymbolIndex;

#[derive(Debug, Clone)]
pub struct Instruction {
    pub pc: u64,
    pub length: u8,
    /// Plain-text disassembly (Intel syntax) with a resolved-symbol comment
    /// appended for instructions that reference a known address, mirroring
    /// the ground-truth decoder's `GoSyntax` formatting.
    pub text: String,
    /// Present when this instruction is a direct relative CALL whose target
    /// landed inside the function-address map.
    pub call_target: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct DisassembledFunc {
    pub entry: u64,
    pub end: u64,
    pub name: String,
    pub instructions: Vec<Instruction>,
    /// Entry PCs of every function reached by a direct CALL in this function.
    pub callees: Vec<u64>,
}

pub struct Disassembler {
    decoder: Decoder,
}

impl Disassembler {
    pub fn new() -> anyhow::Result<Self> {
        let decoder = Decoder::new64().context("failed to construct x86-64 decoder")?;
        Ok(Self { decoder })
    }

    /// Disassembles `func` out of `text` (the `__text` section bytes,
    /// `text_base` its load address), resolving direct CALL targets against
    /// `entry_to_func` and symbol names against `symbols`.
    #[tracing::instrument(skip_all, fields(func = %func.name))]
    pub fn disassemble(
        &self,
        func: &FuncRecord,
        text: &[u8],
        text_base: u64,
        entry_to_func: &std::collections::HashMap<u64, String>,
        symbols: &SymbolIndex,
    ) -> DisassembledFunc {
        let mut instructions = Vec::new();
        let mut callees = Vec::new();

        let start = (func.entry - text_base) as usize;
        let stop = (func.end - text_base) as usize;
        let Some(mem) = text.get(start..stop.min(text.len())) else {
            tracing::debug!(func = %func.name, "function range outside __text, skipping disassembly");
            return DisassembledFunc {
                entry: func.entry,
                end: func.end,
                name: func.name.clone(),
                instructions,
                callees,
            };
        };

        let mut pos = 0usize;
        let mut pc = func.entry;
        loop {
            if pos >= mem.len() {
                break;
            }
            let decoded = match self.decoder.decode_first::<zydis::VisibleOperands>(&mem[pos..]) {
                Ok(Some(insn)) => insn,
                Ok(None) | Err(_) => {
                    tracing::debug!(func = %func.name, offset = pos, "decode failed, truncating disassembly");
                    break;
                }
            };
            let length = decoded.length;

            let is_call = matches!(decoded.mnemonic, Mnemonic::CALL | Mnemonic::CALLF);
            let mut call_target = None;
            if is_call {
                if let Some(op) = decoded.operands.first() {
                    if let OperandKind::Imm(imm) = &op.kind {
                        if imm.is_relative {
                            let rel = imm.value as i64;
                            let target = (pc as i64 + rel + i64::from(length)) as u64;
                            if entry_to_func.contains_key(&target) {
                                call_target = Some(target);
                                callees.push(target);
                            }
                        }
                    }
                }
            }

            // GoSyntax-style text: mnemonic plus, for calls we could
            // resolve, the callee's symbol name via the lookup callback.
            let mut text_out = format!("{:?}", decoded.mnemonic).to_lowercase();
            if let Some(target) = call_target {
                let (sym, _) = symbols.lookup(target);
                let label = entry_to_func.get(&target).map(String::as_str).unwrap_or(sym);
                text_out.push_str(&format!(" {target:#x} ; {label}"));
            }

            instructions.push(Instruction {
                pc,
                length,
                text: text_out,
                call_target,
            });

            pos += usize::from(length);
            pc += u64::from(length);
        }

        DisassembledFunc {
            entry: func.entry,
            end: func.end,
            name: func.name.clone(),
            instructions,
            callees,
        }
    }
}
