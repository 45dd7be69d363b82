//! Integration tests for layered transitive closure.

use depscope::{
    ClosureDirection, MATCH_ALL, NodeFactory, NodeId, NodeKind, SelectionCriteria,
    TransitiveClosure,
};
use rstest::{fixture, rstest};

/// `a.A.a -> b.B.b -> c.C.c`, each member in its own type and package.
#[fixture]
fn chain() -> NodeFactory {
    let mut factory = NodeFactory::new();
    let a = factory.create_member("a.A.a");
    let b = factory.create_member("b.B.b");
    let c = factory.create_member("c.C.c");
    factory.add_dependency(a, b);
    factory.add_dependency(b, c);
    factory
}

fn criteria(patterns: &[&str]) -> SelectionCriteria {
    patterns
        .iter()
        .fold(SelectionCriteria::builder(), |b, p| b.include(*p))
        .build()
        .expect("valid patterns")
}

fn names(closure: &TransitiveClosure<'_>, layer: usize) -> Vec<String> {
    closure
        .layer(layer)
        .expect("layer exists")
        .iter()
        .map(|&id| name(closure.factory(), id))
        .collect()
}

fn name(factory: &NodeFactory, id: NodeId) -> String {
    factory.node(id).expect("live node").name().to_string()
}

fn member_names(factory: &NodeFactory) -> Vec<String> {
    factory.members().map(|id| name(factory, id)).collect()
}

// === Outbound ===

#[rstest]
#[case::seed_only(0, 1, &["a.A.a"])]
#[case::one_layer(1, 2, &["a.A.a", "b.B.b"])]
#[case::two_layers(2, 3, &["a.A.a", "b.B.b", "c.C.c"])]
#[case::three_layers(3, 3, &["a.A.a", "b.B.b", "c.C.c"])]
#[case::four_layers(4, 3, &["a.A.a", "b.B.b", "c.C.c"])]
fn outbound_layers(
    chain: NodeFactory,
    #[case] requested: usize,
    #[case] expected_layers: usize,
    #[case] expected_members: &[&str],
) {
    let mut closure = TransitiveClosure::over_all(
        &chain,
        &criteria(&["/a.A.a/"]),
        SelectionCriteria::empty(),
        ClosureDirection::Outbound,
    );

    for _ in 0..requested {
        closure.compute_next_layer();
    }

    assert_eq!(closure.layer_count(), expected_layers);
    assert_eq!(member_names(closure.factory()), expected_members);
    assert_eq!(closure.factory().count_of(NodeKind::Package), expected_members.len());
    assert_eq!(closure.factory().count_of(NodeKind::Type), expected_members.len());
}

#[rstest]
fn each_layer_holds_one_generation(chain: NodeFactory) {
    let mut closure = TransitiveClosure::over_all(
        &chain,
        &criteria(&["/a.A.a/"]),
        SelectionCriteria::empty(),
        ClosureDirection::Outbound,
    );

    closure.compute_all_layers();

    assert_eq!(names(&closure, 0), vec!["a.A.a"]);
    assert_eq!(names(&closure, 1), vec!["b.B.b"]);
    assert_eq!(names(&closure, 2), vec!["c.C.c"]);
    assert!(closure.layer(3).is_none());
}

#[rstest]
fn edges_appear_as_layers_are_computed(chain: NodeFactory) {
    let mut closure = TransitiveClosure::over_all(
        &chain,
        &criteria(&["/a.A.a/"]),
        SelectionCriteria::empty(),
        ClosureDirection::Outbound,
    );
    let a = closure.layer(0).expect("seed")[0];
    assert_eq!(closure.factory().outbound_count(a), 0);

    closure.compute_next_layer();
    let b = closure.layer(1).expect("layer 1")[0];
    assert_eq!(closure.factory().outbound_count(a), 1);
    assert_eq!(closure.factory().outbound_count(b), 0);

    closure.compute_next_layer();
    assert_eq!(closure.factory().outbound_count(b), 1);
}

// === Inbound ===

#[rstest]
#[case::seed_only(0, 1, &["c.C.c"])]
#[case::one_layer(1, 2, &["b.B.b", "c.C.c"])]
#[case::two_layers(2, 3, &["a.A.a", "b.B.b", "c.C.c"])]
#[case::four_layers(4, 3, &["a.A.a", "b.B.b", "c.C.c"])]
fn inbound_layers(
    chain: NodeFactory,
    #[case] requested: usize,
    #[case] expected_layers: usize,
    #[case] expected_members: &[&str],
) {
    let mut closure = TransitiveClosure::over_all(
        &chain,
        &criteria(&["/c.C.c/"]),
        SelectionCriteria::empty(),
        ClosureDirection::Inbound,
    );

    assert_eq!(closure.compute_layers(requested), expected_layers - 1);

    assert_eq!(closure.layer_count(), expected_layers);
    assert_eq!(member_names(closure.factory()), expected_members);
}

#[rstest]
fn inbound_edges_keep_dependency_direction(chain: NodeFactory) {
    let mut closure = TransitiveClosure::over_all(
        &chain,
        &criteria(&["/c.C.c/"]),
        SelectionCriteria::empty(),
        ClosureDirection::Inbound,
    );
    closure.compute_all_layers();
    let factory = closure.factory();

    let a = factory.lookup(NodeKind::Member, "a.A.a").expect("a");
    let b = factory.lookup(NodeKind::Member, "b.B.b").expect("b");
    let c = factory.lookup(NodeKind::Member, "c.C.c").expect("c");
    assert!(factory.has_dependency(a, b));
    assert!(factory.has_dependency(b, c));
    assert_eq!(factory.edge_count(), 2);
}

// === Stop criteria ===

#[rstest]
fn stop_node_bounds_the_closure(chain: NodeFactory) {
    let mut closure = TransitiveClosure::over_all(
        &chain,
        &criteria(&["/a.A.a/"]),
        criteria(&["/^b\\.B\\.b$/"]),
        ClosureDirection::Outbound,
    );

    closure.compute_all_layers();

    assert_eq!(closure.layer_count(), 2);
    assert_eq!(names(&closure, 0), vec!["a.A.a"]);
    assert_eq!(names(&closure, 1), vec!["b.B.b"]);
    assert!(closure.factory().lookup(NodeKind::Member, "c.C.c").is_none());
    assert!(closure.factory().lookup(NodeKind::Package, "c").is_none());
}

#[rstest]
fn match_all_stop_shows_direct_neighbours_only(chain: NodeFactory) {
    let mut closure = TransitiveClosure::over_all(
        &chain,
        &criteria(&["/a.A.a/"]),
        criteria(&[MATCH_ALL]),
        ClosureDirection::Outbound,
    );

    assert_eq!(closure.compute_all_layers(), 0);

    assert_eq!(closure.layer_count(), 1);
    assert_eq!(member_names(closure.factory()), vec!["a.A.a", "b.B.b"]);
    let a = closure.layer(0).expect("seed")[0];
    let b = closure
        .factory()
        .lookup(NodeKind::Member, "b.B.b")
        .expect("b recorded");
    assert!(closure.factory().has_dependency(a, b));
}

// === Provenance and independence ===

#[test]
fn closure_preserves_confirmation() {
    let mut factory = NodeFactory::new();
    let a = factory.create_confirmed(NodeKind::Type, "a.A");
    let b = factory.create_type("b.B");
    factory.add_dependency(a, b);

    let mut closure = TransitiveClosure::new(
        &factory,
        [a],
        &criteria(&[MATCH_ALL]),
        SelectionCriteria::empty(),
        ClosureDirection::Outbound,
    );
    closure.compute_all_layers();
    let derived = closure.into_factory();

    let a = derived.lookup(NodeKind::Type, "a.A").expect("a");
    let b = derived.lookup(NodeKind::Type, "b.B").expect("b");
    assert!(derived.node(a).expect("a").is_confirmed());
    assert!(!derived.node(b).expect("b").is_confirmed());
}

#[rstest]
fn derived_graph_is_independent(chain: NodeFactory) {
    let mut closure = TransitiveClosure::over_all(
        &chain,
        &criteria(&["/a.A.a/"]),
        SelectionCriteria::empty(),
        ClosureDirection::Outbound,
    );
    closure.compute_all_layers();
    let mut derived = closure.into_factory();

    let b = derived.lookup(NodeKind::Member, "b.B.b").expect("b");
    derived.delete_node(b);

    assert!(chain.lookup(NodeKind::Member, "b.B.b").is_some());
    assert_eq!(chain.edge_count(), 2);
}

#[test]
fn diamond_nodes_land_in_first_layer_reached() {
    let mut factory = NodeFactory::new();
    let top = factory.create_type("d.Top");
    let left = factory.create_type("d.Left");
    let right = factory.create_type("d.Right");
    let bottom = factory.create_type("d.Bottom");
    factory.add_dependency(top, left);
    factory.add_dependency(top, right);
    factory.add_dependency(left, bottom);
    factory.add_dependency(right, bottom);
    factory.add_dependency(top, bottom);

    let mut closure = TransitiveClosure::new(
        &factory,
        [top],
        &criteria(&["Top"]),
        SelectionCriteria::empty(),
        ClosureDirection::Outbound,
    );
    closure.compute_all_layers();

    assert_eq!(closure.layer_count(), 2);
    let mut first: Vec<String> = names(&closure, 1);
    first.sort();
    assert_eq!(first, vec!["d.Bottom", "d.Left", "d.Right"]);
    assert_eq!(closure.factory().edge_count(), 5);
}
