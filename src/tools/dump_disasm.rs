use anyhow::Result;
use gomacho::Image;

pub fn dump_disasm(image: &Image) -> Result<()> {
    for func in image.disassemble_all()? {
        println!("{} ({:#x}..{:#x})", func.name, func.entry, func.end);
        for insn in &func.instructions {
            println!("  {:#010x}: {}", insn.pc, insn.text);
        }
    }
    Ok(())
}
