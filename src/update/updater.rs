use std::collections::HashSet;
use std::hash::Hash;

type FieldUpdater<T, U> = Box<dyn Fn(&mut T, &U) + Send + Sync>;
type PostUpdateHook<T> = Box<dyn Fn(&mut T) + Send + Sync>;

/// Partial-update pipeline for one entity kind.
///
/// Built once per kind from explicitly registered closures and applied in
/// three stages: scalar setters, set-valued collection updaters, then
/// post-update hooks.
pub struct Updater<T, U> {
    scalar_updaters: Vec<FieldUpdater<T, U>>,
    collection_updaters: Vec<FieldUpdater<T, U>>,
    post_update_hooks: Vec<PostUpdateHook<T>>,
}

impl<T, U> Default for Updater<T, U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, U> Updater<T, U> {
    pub fn new() -> Self {
        Updater {
            scalar_updaters: Vec::new(),
            collection_updaters: Vec::new(),
            post_update_hooks: Vec::new(),
        }
    }

    pub fn scalar<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut T, &U) + Send + Sync + 'static,
    {
        self.scalar_updaters.push(Box::new(f));
        self
    }

    pub fn collection<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut T, &U) + Send + Sync + 'static,
    {
        self.collection_updaters.push(Box::new(f));
        self
    }

    pub fn post_update<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut T) + Send + Sync + 'static,
    {
        self.post_update_hooks.push(Box::new(f));
        self
    }

    pub fn apply<'a>(&self, target: &'a mut T, update: &U) -> &'a mut T {
        for f in &self.scalar_updaters {
            f(target, update);
        }
        for f in &self.collection_updaters {
            f(target, update);
        }
        for hook in &self.post_update_hooks {
            hook(target);
        }
        target
    }
}

/// Assigns `value` to `field` when the request carries it.
pub fn set_if_some<V: Clone>(field: &mut V, value: &Option<V>) {
    if let Some(v) = value {
        *field = v.clone();
    }
}

/// Update of one set-valued field.
///
/// `replace` wins when present; otherwise `add` is applied (append if absent,
/// order preserved) and then `remove`.
#[derive(Debug, Clone, Copy)]
pub struct CollectionUpdate<'a, V> {
    pub replace: Option<&'a [V]>,
    pub add: &'a [V],
    pub remove: &'a [V],
}

impl<'a, V> CollectionUpdate<'a, V> {
    pub fn new(replace: Option<&'a [V]>, add: &'a [V], remove: &'a [V]) -> Self {
        CollectionUpdate { replace, add, remove }
    }

    pub fn is_noop(&self) -> bool {
        self.replace.is_none() && self.add.is_empty() && self.remove.is_empty()
    }
}

/// Drops repeated values, keeping the first occurrence of each.
pub fn dedup_preserving_order<V>(values: &mut Vec<V>)
where
    V: Clone + Eq + Hash,
{
    let mut seen = HashSet::with_capacity(values.len());
    values.retain(|v| seen.insert(v.clone()));
}

pub fn apply_collection_update<V>(current: &mut Vec<V>, op: CollectionUpdate<'_, V>)
where
    V: Clone + Eq + Hash,
{
    if op.is_noop() {
        return;
    }
    if let Some(replacement) = op.replace {
        // Replacement input may carry duplicates; membership sets never do.
        *current = replacement.to_vec();
        dedup_preserving_order(current);
        return;
    }

    if !op.add.is_empty() {
        let mut present: HashSet<V> = current.iter().cloned().collect();
        for v in op.add {
            if present.insert(v.clone()) {
                current.push(v.clone());
            }
        }
    }

    if !op.remove.is_empty() {
        let remove: HashSet<&V> = op.remove.iter().collect();
        current.retain(|v| !remove.contains(v));
    }
}
