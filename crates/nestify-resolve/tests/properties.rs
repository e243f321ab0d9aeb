//! Property checks for filter expansion and area indexing

use std::collections::BTreeSet;

use nestify_resolve::{index_areas, resolve_layers, Expansion, FilterSpec};
use nestify_tree::{ParamMap, TreeKeys, TreeNode, Value};
use proptest::prelude::*;
use serde_json::json;

fn filter_spec(cardinalities: &[u64]) -> Value {
    let mut dimensions = ParamMap::new();
    let mut suffixes = ParamMap::new();
    for (i, n) in cardinalities.iter().enumerate() {
        dimensions.insert(format!("d{}", i), json!(n));
        suffixes.insert(format!("d{}", i), json!(format!("x{}_", i)));
    }
    json!({"dimensions": dimensions, "suffixes": suffixes})
}

proptest! {
    #[test]
    fn suffix_count_is_product_of_cardinalities(cards in prop::collection::vec(1u64..4, 0..4)) {
        let spec = FilterSpec::from_value("l", &filter_spec(&cards)).unwrap();
        let suffixes = spec.suffixes().unwrap();
        let expected: u64 = cards.iter().filter(|n| **n > 1).product();
        prop_assert_eq!(suffixes.len() as u64, expected);

        let distinct: BTreeSet<_> = suffixes.iter().collect();
        prop_assert_eq!(distinct.len(), suffixes.len());
    }

    #[test]
    fn areas_partition_layers(
        layers in prop::collection::vec((0usize..3, 1u64..4), 1..6),
    ) {
        let mut children = ParamMap::new();
        for (i, (area, replicas)) in layers.iter().enumerate() {
            children.insert(
                format!("layer{}", i),
                json!({
                    "name": format!("layer{}", i),
                    "params": {"area": format!("area{}", area), "filters": filter_spec(&[*replicas])}
                }),
            );
        }
        let keys = TreeKeys::default();
        let tree = TreeNode::from_value(
            &json!({
                "params": {"size": 3, "visSize": 1.0, "edge_wrap": false, "elements": []},
                "children": children
            }),
            &keys,
        )
        .unwrap();

        let resolved = resolve_layers(&tree, &keys, Expansion::Expanded).unwrap();
        let areas = index_areas(&resolved).unwrap();

        let listed: Vec<&String> = areas.values().flatten().collect();
        let distinct: BTreeSet<&String> = listed.iter().copied().collect();
        prop_assert_eq!(distinct.len(), listed.len());
        prop_assert_eq!(distinct, resolved.keys().collect::<BTreeSet<_>>());
    }
}
