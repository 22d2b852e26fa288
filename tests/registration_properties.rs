// tests/registration_properties.rs

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use proptest::prelude::*;

use pomwatch::fs::mock::MockFileSystem;
use pomwatch::watch::{classify, register_tree, DryRunBackend, WatchSet};

const NAMES: &[&str] = &["src", "main", "java", "target", "lib", "docs"];

/// Random relative directory paths, each 1..=5 components deep, drawn from a
/// small alphabet so that `target` shows up at every level.
fn tree_strategy() -> impl Strategy<Value = Vec<Vec<usize>>> {
    proptest::collection::vec(
        proptest::collection::vec(0..NAMES.len(), 1..=5),
        0..25,
    )
}

fn to_path(root: &Path, components: &[usize]) -> PathBuf {
    components
        .iter()
        .fold(root.to_path_buf(), |p, &i| p.join(NAMES[i]))
}

/// Every prefix of every generated path, minus anything at or below a
/// `target` component.
fn expected_dirs(root: &Path, dirs: &[Vec<usize>]) -> BTreeSet<PathBuf> {
    let mut expected = BTreeSet::new();
    expected.insert(root.to_path_buf());
    for components in dirs {
        for len in 1..=components.len() {
            let prefix = &components[..len];
            if prefix.iter().any(|&i| NAMES[i] == "target") {
                break;
            }
            expected.insert(to_path(root, prefix));
        }
    }
    expected
}

proptest! {
    #[test]
    fn registered_set_equals_reachable_non_excluded(dirs in tree_strategy()) {
        let root = Path::new("/w");
        let fs = MockFileSystem::new();
        fs.add_dir(root);
        for components in &dirs {
            fs.add_dir(to_path(root, components));
        }

        let mut set = WatchSet::new();
        let mut backend = DryRunBackend;
        let registration = register_tree(&fs, &mut backend, &mut set, root, 64);

        let registered: BTreeSet<PathBuf> = set.dirs().into_iter().collect();
        prop_assert_eq!(&registered, &expected_dirs(root, &dirs));
        prop_assert_eq!(registration.handles.len(), registered.len());

        // A second walk adds nothing.
        let again = register_tree(&fs, &mut backend, &mut set, root, 64);
        prop_assert!(again.handles.is_empty());
        prop_assert_eq!(set.len(), registered.len());
    }

    #[test]
    fn classify_returns_closest_descriptor(
        depth in 1usize..8,
        descriptor_levels in proptest::collection::btree_set(0usize..8, 0..4),
    ) {
        // /w/d1/d2/.../d{depth}/File, descriptors at the chosen levels
        // (level 0 = /w).
        let fs = MockFileSystem::new();
        let mut dirs = vec![PathBuf::from("/w")];
        for level in 1..=depth {
            let next = dirs[level - 1].join(format!("d{level}"));
            dirs.push(next);
        }
        let file = dirs[depth].join("File");
        fs.add_file(&file);

        let levels: Vec<usize> = descriptor_levels.into_iter().filter(|&l| l <= depth).collect();
        for &level in &levels {
            fs.add_file(dirs[level].join("pom.xml"));
        }

        let expected = levels.iter().max().map(|&l| dirs[l].clone());
        prop_assert_eq!(classify(&fs, &file, false), expected);
    }
}
