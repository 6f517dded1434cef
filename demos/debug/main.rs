//! Karst debug runner — builds a unit-cube solid, extracts one face and
//! prints the surviving topology with the classification of every touched
//! sub-shape.
//!
//! Usage:
//! ```text
//! cargo run --example debug
//! RUST_LOG=karst=trace cargo run --example debug
//! ```

use karst::{ExtractError, Extractor, Shape, TopologyStore};
use nalgebra::Point3;

fn main() -> Result<(), ExtractError> {
    // Default: WARN for everything, DEBUG for karst.
    // Override with RUST_LOG env var (e.g. RUST_LOG=karst=trace).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("karst=debug".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mut store = TopologyStore::new();
    let (solid, top_face) = build_cube(&mut store);
    println!(
        "input: solid with {} sub-shapes",
        store.sub_shapes(solid).len()
    );

    let mut extractor = Extractor::new();
    extractor.set_shape(solid);
    extractor.set_shapes_to_remove(vec![top_face]);
    extractor.perform(&mut store)?;

    match extractor.result() {
        Some(result) => println!(
            "result: {} ({}closed) with {} direct children",
            store.kind(result).name(),
            if store.is_closed(result) { "" } else { "not " },
            store.children(result).len()
        ),
        None => println!("result: nothing survives"),
    }

    print_group(&store, "removed", extractor.removed());
    print_group(&store, "modified", extractor.modified());
    print_group(&store, "new", extractor.new_shapes());
    Ok(())
}

fn print_group(store: &TopologyStore, label: &str, shapes: &[Shape]) {
    println!("{label}: {}", shapes.len());
    for &shape in shapes {
        println!("  - {}", store.kind(shape).name());
    }
}

/// A unit cube; returns the solid and its top face.
fn build_cube(store: &mut TopologyStore) -> (Shape, Shape) {
    let corners = [
        (0.0, 0.0, 0.0),
        (1.0, 0.0, 0.0),
        (1.0, 1.0, 0.0),
        (0.0, 1.0, 0.0),
        (0.0, 0.0, 1.0),
        (1.0, 0.0, 1.0),
        (1.0, 1.0, 1.0),
        (0.0, 1.0, 1.0),
    ];
    let vs: Vec<Shape> = corners
        .iter()
        .map(|&(x, y, z)| store.add_vertex(Point3::new(x, y, z)))
        .collect();

    let be: Vec<Shape> = (0..4).map(|i| store.add_edge(vs[i], vs[(i + 1) % 4])).collect();
    let te: Vec<Shape> = (0..4)
        .map(|i| store.add_edge(vs[4 + i], vs[4 + (i + 1) % 4]))
        .collect();
    let ve: Vec<Shape> = (0..4).map(|i| store.add_edge(vs[i], vs[4 + i])).collect();

    let w_bottom = store.add_wire(be.clone(), true);
    let w_top = store.add_wire(te.clone(), true);
    let f_bottom = store.add_face(w_bottom, vec![]);
    let f_top = store.add_face(w_top, vec![]);

    let mut faces = vec![f_bottom, f_top];
    for i in 0..4 {
        let w = store.add_wire(
            vec![be[i], ve[(i + 1) % 4], te[i].reversed(), ve[i].reversed()],
            true,
        );
        faces.push(store.add_face(w, vec![]));
    }

    let shell = store.add_shell(faces, true);
    let solid = store.add_solid(shell, vec![]);
    (solid, f_top)
}
