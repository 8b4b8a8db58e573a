//! The dependency resolver (component D): a generic topological fix-point
//! over any unresolved-name -> resolved-name map, parameterized by a
//! resolve-one function (spec §4.D).

use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::error::{Result, SlvError};

/// Drains `unresolved` into `available` by repeatedly resolving every entry
/// whose dependencies are already available, until nothing is left or a
/// pass makes no progress.
///
/// `available` and `unresolved` must not share any keys; this is an
/// invariant of the callers (constant resolution, type resolution, package
/// resolution all build disjoint available/unresolved sets), not something
/// this function needs to check on the hot path.
pub fn resolve_dependencies<U, T>(
    available: &IndexMap<String, T>,
    unresolved: &IndexMap<String, U>,
    dependencies: impl Fn(&str, &U) -> BTreeSet<String>,
    resolve_one: impl Fn(&str, &U, &IndexMap<String, T>) -> Result<T>,
) -> Result<IndexMap<String, T>>
where
    T: Clone,
{
    let mut merged: IndexMap<String, T> = available.clone();
    let mut remaining: IndexMap<String, &U> = unresolved.iter().map(|(k, v)| (k.clone(), v)).collect();
    let mut resolved: IndexMap<String, T> = IndexMap::new();

    while !remaining.is_empty() {
        let mut progressed_names = Vec::new();
        for (name, item) in &remaining {
            let deps = dependencies(name, item);
            if deps.iter().all(|d| merged.contains_key(d)) {
                let value = resolve_one(name, item, &merged)?;
                merged.insert(name.clone(), value.clone());
                resolved.insert(name.clone(), value);
                progressed_names.push(name.clone());
            }
        }
        if progressed_names.is_empty() {
            let stuck: BTreeSet<String> = remaining.keys().cloned().collect();
            log::debug!("dependency fix-point stalled with {} names remaining", stuck.len());
            return Err(SlvError::UnresolvedDependencies(stuck));
        }
        log::debug!(
            "dependency fix-point resolved {} names, {} remaining",
            progressed_names.len(),
            remaining.len() - progressed_names.len()
        );
        for name in progressed_names {
            log::trace!("resolved `{name}`");
            remaining.shift_remove(&name);
        }
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_in_dependency_order_regardless_of_input_order() {
        let available: IndexMap<String, i64> = IndexMap::new();
        let mut unresolved: IndexMap<String, Vec<String>> = IndexMap::new();
        unresolved.insert("c".to_string(), vec!["b".to_string()]);
        unresolved.insert("b".to_string(), vec!["a".to_string()]);
        unresolved.insert("a".to_string(), vec![]);

        let resolved = resolve_dependencies(
            &available,
            &unresolved,
            |_, deps| deps.iter().cloned().collect(),
            |name, _, available| {
                let base = if name == "a" { 1 } else { available.values().sum::<i64>() + 1 };
                Ok(base)
            },
        )
        .unwrap();

        assert_eq!(resolved.len(), 3);
        assert_eq!(resolved["a"], 1);
    }

    #[test]
    fn stalled_fix_point_names_both_culprits() {
        let available: IndexMap<String, i64> = IndexMap::new();
        let mut unresolved: IndexMap<String, Vec<String>> = IndexMap::new();
        unresolved.insert("x".to_string(), vec!["y".to_string()]);
        unresolved.insert("y".to_string(), vec!["x".to_string()]);

        let err = resolve_dependencies(
            &available,
            &unresolved,
            |_, deps| deps.iter().cloned().collect(),
            |_, _, _| Ok(0i64),
        )
        .unwrap_err();

        match err {
            SlvError::UnresolvedDependencies(names) => {
                assert_eq!(names, ["x", "y"].into_iter().map(String::from).collect());
            }
            other => panic!("expected UnresolvedDependencies, got {other:?}"),
        }
    }
}
