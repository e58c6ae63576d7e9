use proptest::prelude::*;
use splay_cache::splay_tree::SplayTree;
use std::collections::BTreeMap;

#[derive(Clone, Debug)]
enum Op {
    Insert(u16, u32),
    Find(u16),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..64u16, any::<u32>()).prop_map(|(key, value)| Op::Insert(key, value)),
        (0..64u16).prop_map(Op::Find),
    ]
}

proptest! {
    #[test]
    fn prop_invariants_hold(ops in prop::collection::vec(op_strategy(), 0..200)) {
        let mut tree = SplayTree::new();
        let mut expected: BTreeMap<u16, u32> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    prop_assert_eq!(tree.insert(key, value), expected.insert(key, value));
                }
                Op::Find(key) => {
                    let found = tree.find(&key).cloned();
                    prop_assert_eq!(found, expected.get(&key).cloned());
                    if found.is_some() {
                        prop_assert_eq!(tree.root_key(), Some(&key));
                        prop_assert_eq!(tree.depth(&key), Some(0));
                    }
                }
            }
            prop_assert_eq!(tree.len(), expected.len());
            prop_assert!(tree.is_valid());
        }
    }
}
