//! Registry key layout.

use flowctl_core::path;

/// Root of all liveness nodes.
pub const NODES_ROOT: &str = "/nodes";

/// Worker nodes register beneath `/nodes/worker-groups/{group}/{address}`.
pub const WORKER_GROUPS_ROOT: &str = "/nodes/worker-groups";

/// Path of a worker group.
pub fn worker_group_path(group: &str) -> String {
    path::join(WORKER_GROUPS_ROOT, group)
}

/// Path of a worker's liveness node within a group.
pub fn worker_node_path(group: &str, address: &str) -> String {
    path::join(&worker_group_path(group), address)
}

/// Split a worker liveness path into `(group, address)`.
///
/// Returns `None` for paths outside the worker group tree or at the wrong
/// depth.
pub fn parse_worker_node_path(key: &str) -> Option<(String, String)> {
    if !path::is_parent(WORKER_GROUPS_ROOT, key) {
        return None;
    }
    let depth = path::segments(WORKER_GROUPS_ROOT).count();
    let mut rest = path::segments(key).skip(depth);
    let group = rest.next()?;
    let address = rest.next()?;
    if rest.next().is_some() {
        return None;
    }
    Some((group.to_string(), address.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_node_path_roundtrip() {
        let key = worker_node_path("default", "10.0.0.1:1234");
        assert_eq!(key, "/nodes/worker-groups/default/10.0.0.1:1234");
        assert_eq!(
            parse_worker_node_path(&key),
            Some(("default".to_string(), "10.0.0.1:1234".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_other_paths() {
        assert_eq!(parse_worker_node_path("/nodes/worker-groups"), None);
        assert_eq!(parse_worker_node_path("/nodes/worker-groups/default"), None);
        assert_eq!(parse_worker_node_path("/nodes/worker-groupsx/a/b"), None);
        assert_eq!(parse_worker_node_path("/nodes/worker-groups/a/b/c"), None);
        assert_eq!(parse_worker_node_path("/nodes/master/a"), None);
    }
}
