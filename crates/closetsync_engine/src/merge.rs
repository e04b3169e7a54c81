//! Wardrobe reconciliation merge.

use closetsync_types::WardrobeItem;
use std::collections::HashSet;

/// Result of merging the remote wardrobe with local state.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedWardrobe {
    /// The merged collection: every remote item, followed by the local
    /// items the remote store has never seen.
    pub items: Vec<WardrobeItem>,
    /// How many items existed only locally. Non-zero means the remote
    /// store is behind and a re-push is needed.
    pub local_only: usize,
}

/// Merges the remote wardrobe with the local one: a union keyed by item
/// id in which the remote value wins for shared ids.
///
/// This is the load-bearing alternative to replace-on-login. Items
/// created while offline (or before the first sync) exist only locally;
/// replacing local state with the remote collection would silently drop
/// them. The merge keeps them and reports how many there were so the
/// caller can schedule a catch-up push.
pub fn merge_wardrobe(
    remote: Vec<WardrobeItem>,
    local: Vec<WardrobeItem>,
) -> MergedWardrobe {
    let remote_ids: HashSet<String> = remote.iter().map(|item| item.id.clone()).collect();

    let mut items = remote;
    let mut local_only = 0;
    for item in local {
        if !remote_ids.contains(&item.id) {
            items.push(item);
            local_only += 1;
        }
    }

    MergedWardrobe { items, local_only }
}
