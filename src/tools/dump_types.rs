use anyhow::Result;
use gomacho::Image;

pub fn dump_types(image: &Image) -> Result<()> {
    for t in image.types()? {
        let name = t.string().unwrap_or_default();
        println!("{:#010x} {:<10} {}", t.offset(), format!("{:?}", t.kind()), name);
    }
    Ok(())
}
