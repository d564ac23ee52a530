use rstest::rstest;

use outliner::domain::{
    Document, DomainError, NodeId, NodeRecord, RootFallback, TreeArena, TreeBuilder,
};
use outliner::tree_traits::TreeNodeConvert;
use outliner::util::testing;

fn flat(id: NodeId, parent_id: Option<NodeId>, order: i32) -> NodeRecord {
    NodeRecord {
        parent_id,
        order,
        ..NodeRecord::new(id, format!("n{id}"))
    }
}

fn preorder(tree: &TreeArena<Document>) -> Vec<NodeId> {
    tree.iter().map(|(_, n)| n.id).collect()
}

// ============================================================
// Nested records
// ============================================================

#[test]
fn given_nested_json_when_building_then_preserves_child_order_and_payload() {
    testing::init_test_setup();
    let json = r#"{
        "id": 1, "title": "Handbook", "groupId": 7,
        "children": [
            {"id": 3, "title": "Intro", "content": "hello", "parentId": 1, "order": 0},
            {"id": 2, "title": "Usage", "parentId": 1, "order": 1,
             "children": [{"id": 4, "title": "CLI", "parentId": 2, "isPublic": true}]}
        ]
    }"#;
    let root: NodeRecord = serde_json::from_str(json).unwrap();

    let (tree, count) = TreeBuilder::new().build(&root).unwrap();

    assert_eq!(count, 4);
    assert_eq!(preorder(&tree), vec![1, 3, 2, 4]);
    let intro = tree.get_node(tree.find(3).unwrap()).unwrap();
    assert_eq!(intro.data.content, "hello");
    let cli = tree.get_node(tree.find(4).unwrap()).unwrap();
    assert!(cli.data.is_public);
    assert_eq!(tree.height(), 3);
}

#[test]
fn given_nested_records_when_building_with_current_then_exactly_one_node_is_current() {
    let root = NodeRecord::new(1, "r")
        .with_child(NodeRecord::new(2, "a").with_child(NodeRecord::new(3, "b")));

    let (tree, _) = TreeBuilder::new().build_with_current(&root, 3).unwrap();

    let current: Vec<NodeId> = tree
        .iter()
        .filter(|(_, n)| n.is_current)
        .map(|(_, n)| n.id)
        .collect();
    assert_eq!(current, vec![3]);
    assert_eq!(tree.depth(tree.current().unwrap()).unwrap(), 2);
}

#[test]
fn given_absent_current_when_building_then_reports_not_found() {
    let root = NodeRecord::new(1, "r").with_child(NodeRecord::new(2, "a"));

    let result = TreeBuilder::new().build_with_current(&root, 42);

    assert_eq!(result.unwrap_err(), DomainError::NodeNotFound(42));
}

#[test]
fn given_repeated_id_in_nested_records_when_building_then_reports_duplicate() {
    let root = NodeRecord::new(1, "r")
        .with_child(NodeRecord::new(2, "a"))
        .with_child(NodeRecord::new(2, "again"));

    let result = TreeBuilder::new().build(&root);

    assert_eq!(result.unwrap_err(), DomainError::DuplicateId(2));
}

#[rstest]
#[case::strict(RootFallback::Strict, false)]
#[case::first_record(RootFallback::FirstRecord, true)]
fn given_nested_root_with_parent_when_building_then_follows_fallback(
    #[case] fallback: RootFallback,
    #[case] accepted: bool,
) {
    let root = NodeRecord {
        parent_id: Some(99),
        ..NodeRecord::new(5, "detached")
    };

    let result = TreeBuilder::new().with_root_fallback(fallback).build(&root);

    if accepted {
        let (tree, count) = result.unwrap();
        assert_eq!(count, 1);
        assert_eq!(tree.get_node(tree.root().unwrap()).unwrap().parent, None);
    } else {
        assert_eq!(result.unwrap_err(), DomainError::NoRoot { count: 1 });
    }
}

// ============================================================
// Flat records
// ============================================================

#[test]
fn given_shuffled_flat_records_when_building_then_orders_siblings_by_order() {
    let records = vec![
        flat(4, Some(2), 0),
        flat(3, Some(1), 1),
        flat(1, None, 0),
        flat(2, Some(1), 0),
        flat(5, Some(2), 1),
    ];

    let trees = TreeBuilder::new().build_from_flat(&records).unwrap();

    assert_eq!(trees.len(), 1);
    let (tree, count) = &trees[0];
    assert_eq!(*count, 5);
    assert_eq!(preorder(tree), vec![1, 2, 4, 5, 3]);
}

#[test]
fn given_equal_order_when_building_flat_then_keeps_input_order() {
    let records = vec![
        flat(1, None, 0),
        flat(9, Some(1), 0),
        flat(3, Some(1), 0),
        flat(6, Some(1), 0),
    ];

    let trees = TreeBuilder::new().build_from_flat(&records).unwrap();

    assert_eq!(preorder(&trees[0].0), vec![1, 9, 3, 6]);
}

#[test]
fn given_flat_records_with_two_roots_when_building_then_returns_tree_per_root() {
    let records = vec![
        flat(1, None, 0),
        flat(2, Some(1), 0),
        flat(10, None, 1),
        flat(11, Some(10), 0),
        flat(12, Some(10), 1),
    ];

    let trees = TreeBuilder::new().build_from_flat(&records).unwrap();

    let shapes: Vec<(Vec<NodeId>, usize)> = trees
        .iter()
        .map(|(tree, count)| (preorder(tree), *count))
        .collect();
    assert_eq!(shapes, vec![(vec![1, 2], 2), (vec![10, 11, 12], 3)]);
}

#[test]
fn given_flat_records_with_nested_children_when_building_then_ignores_nesting() {
    let parent = flat(2, Some(1), 0).with_child(NodeRecord::new(77, "nested only"));
    let records = vec![flat(1, None, 0), parent];

    let trees = TreeBuilder::new().build_from_flat(&records).unwrap();

    assert_eq!(preorder(&trees[0].0), vec![1, 2]);
}

#[rstest]
#[case::empty(vec![], DomainError::EmptyInput)]
#[case::duplicate(vec![flat(1, None, 0), flat(2, Some(1), 0), flat(2, Some(1), 1)], DomainError::DuplicateId(2))]
#[case::orphan(vec![flat(1, None, 0), flat(2, Some(50), 0)], DomainError::OrphanRecord { id: 2, parent_id: 50 })]
#[case::no_root(vec![flat(1, Some(2), 0), flat(2, Some(1), 0)], DomainError::NoRoot { count: 2 })]
fn given_malformed_flat_records_when_building_then_rejects(
    #[case] records: Vec<NodeRecord>,
    #[case] expected: DomainError,
) {
    let result = TreeBuilder::new().build_from_flat(&records);

    assert_eq!(result.unwrap_err(), expected);
}

#[test]
fn given_detached_cycle_when_building_flat_then_reports_cycle() {
    // 1 is a proper root; 2 and 3 point at each other and are never reached
    let records = vec![flat(1, None, 0), flat(2, Some(3), 0), flat(3, Some(2), 0)];

    let result = TreeBuilder::new().build_from_flat(&records);

    assert!(matches!(result, Err(DomainError::CycleDetected(_))));
}

#[test]
fn given_no_unparented_record_when_falling_back_then_first_record_roots_the_tree() {
    testing::init_test_setup();
    let records = vec![flat(1, Some(100), 0), flat(2, Some(1), 0), flat(3, Some(1), 1)];

    let trees = TreeBuilder::new()
        .with_root_fallback(RootFallback::FirstRecord)
        .build_from_flat(&records)
        .unwrap();

    assert_eq!(trees.len(), 1);
    assert_eq!(preorder(&trees[0].0), vec![1, 2, 3]);
    assert_eq!(trees[0].1, 3);
}

#[test]
fn given_built_tree_when_rendering_then_shows_titles_and_ids() {
    let records = vec![flat(1, None, 0), flat(2, Some(1), 0)];
    let trees = TreeBuilder::new().build_from_flat(&records).unwrap();

    let rendered = trees[0].0.to_tree_string().to_string();

    assert!(rendered.contains("n1 [1]"));
    assert!(rendered.contains("n2 [2]"));
}
