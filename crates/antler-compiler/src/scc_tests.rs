use indexmap::IndexMap;

use crate::scc::{SccFinder, is_cycle};

fn graph(edges: &[(&str, &[&str])]) -> IndexMap<String, Vec<String>> {
    edges
        .iter()
        .map(|(from, to)| (from.to_string(), to.iter().map(|t| t.to_string()).collect()))
        .collect()
}

#[test]
fn components_come_out_leaves_first() {
    let edges = graph(&[
        ("a", &["b"]),
        ("b", &["a"]),
        ("c", &["a"]),
        ("d", &["d"]),
        ("e", &["missing"]),
    ]);

    let sccs = SccFinder::find(&edges);

    assert_eq!(sccs, vec![vec!["b", "a"], vec!["c"], vec!["d"], vec!["e"]]);
    let cycles: Vec<bool> = sccs.iter().map(|scc| is_cycle(&edges, scc)).collect();
    assert_eq!(cycles, vec![true, false, true, false]);
}

#[test]
fn dependencies_precede_dependents() {
    let edges = graph(&[("main", &["lib", "vocab"]), ("lib", &["vocab"]), ("vocab", &[])]);

    let order: Vec<String> = SccFinder::find(&edges).into_iter().flatten().collect();

    assert_eq!(order, vec!["vocab", "lib", "main"]);
}
