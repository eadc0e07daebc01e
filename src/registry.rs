//! Process-wide name -> [`Group`] registry.
//!
//! Most embedding applications want one `Group` per logical dataset, looked
//! up by name from wherever a request happens to land, rather than
//! threading a `Group` handle through every call site by hand.

use crate::group::Group;
use crate::loader::Loader;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

fn groups() -> &'static RwLock<HashMap<String, Arc<Group>>> {
    static GROUPS: OnceLock<RwLock<HashMap<String, Arc<Group>>>> = OnceLock::new();
    GROUPS.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Creates and registers a new group under `name`.
///
/// # Panics
///
/// Panics if a group named `name` is already registered. A second
/// registration under the same name is a programming error in the embedding
/// application, not a runtime condition to recover from.
pub fn new_group(name: impl Into<String>, max_bytes: u64, loader: Box<dyn Loader>) -> Arc<Group> {
    let name = name.into();
    let mut registry = groups().write();
    if registry.contains_key(&name) {
        panic!("group {name:?} is already registered");
    }
    let group = Arc::new(Group::new(name.clone(), max_bytes, loader));
    registry.insert(name, Arc::clone(&group));
    group
}

/// Looks up a previously-registered group by name.
pub fn get_group(name: &str) -> Option<Arc<Group>> {
    groups().read().get(name).cloned()
}
