use anyhow::Result;
use gomacho::Image;

pub fn dump_funcs(image: &Image) -> Result<()> {
    for f in image.funcs()? {
        println!("{:#010x}..{:#010x} {}", f.entry, f.end, f.name);
    }
    Ok(())
}
