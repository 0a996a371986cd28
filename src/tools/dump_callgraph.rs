use anyhow::Result;
use gomacho::Image;

pub fn dump_callgraph(image: &Image) -> Result<()> {
    let graph = image.call_graph()?;
    println!("root: {:#x}", graph.root);
    for node in &graph.nodes {
        let callees: Vec<String> = graph
            .callees_of(node.entry)
            .filter_map(|to| graph.node(to).map(|n| n.name.clone()))
            .collect();
        if callees.is_empty() {
            continue;
        }
        println!("{} ({:#x})", node.name, node.entry);
        for callee in callees {
            println!("  -> {callee}");
        }
    }
    Ok(())
}
