use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pagecraft_compiler_html::{compile_to_html, CompileOptions};
use pagecraft_model::{Node, NodeId, Tree};

fn build_page(sections: usize, items: usize) -> Tree {
    let mut tree = Tree::with_root(Node::canvas("ROOT", "ContainerBlock"));

    for s in 0..sections {
        let section_id = NodeId::new(format!("section-{}", s));
        let mut section = Node::canvas(section_id.clone(), "ContainerBlock");
        section.parent_id = Some(NodeId::root());

        for i in 0..items {
            let item_id = NodeId::new(format!("item-{}-{}", s, i));
            let mut item = Node::new(item_id.clone(), "TextBlock")
                .with_prop("text", format!("Item {} of section {}", i, s));
            item.parent_id = Some(section_id.clone());
            section.children.push(item_id);
            tree.insert_unchecked(item);
        }

        tree.insert_unchecked(section);
        if let Some(root) = tree.node_mut_unchecked("ROOT") {
            root.children.push(section_id);
        }
    }

    tree
}

fn render_small_page(c: &mut Criterion) {
    let tree = build_page(3, 5);
    let options = CompileOptions::default();

    c.bench_function("render_small_page", |b| {
        b.iter(|| compile_to_html(black_box(&tree), &options))
    });
}

fn render_large_page(c: &mut Criterion) {
    let tree = build_page(50, 40);
    let options = CompileOptions::default();

    c.bench_function("render_large_page", |b| {
        b.iter(|| compile_to_html(black_box(&tree), &options))
    });
}

criterion_group!(benches, render_small_page, render_large_page);
criterion_main!(benches);
