//! Breadth-first, cycle-safe walk over an error graph.

use std::collections::{HashSet, VecDeque};

use crate::classified::Classification;
use crate::node::{Cause, Error, ErrorId};

/// Identity set of nodes already seen during one traversal.
///
/// Keys are node identities, so nodes whose contents cannot be compared or
/// hashed are tracked just as well.
#[derive(Debug, Default)]
pub struct Visited {
    seen: HashSet<ErrorId>,
}

impl Visited {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `err`; returns `false` if it was already recorded.
    pub fn insert(&mut self, err: &Error) -> bool {
        self.seen.insert(err.id())
    }

    pub fn contains(&self, err: &Error) -> bool {
        self.seen.contains(&err.id())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Visit every classified node reachable from `root`, breadth first.
///
/// Carrier classifications are queued before the carrier's cause; aggregate
/// nodes queue all members in order. Each node is visited at most once, so
/// cyclic graphs terminate.
pub fn walk<'a>(root: &'a Error, mut visit: impl FnMut(&'a Error)) {
    let mut visited = Visited::new();
    let mut queue = VecDeque::from([root]);

    while let Some(current) = queue.pop_front() {
        if !visited.insert(current) {
            continue;
        }

        if current.is_classified() {
            visit(current);
        }

        if let Some(carrier) = current.as_carrier() {
            queue.extend(carrier.classifications().iter().map(Classification::as_error));
        }

        match current.cause() {
            Cause::None => {}
            Cause::Single(next) => queue.push_back(next),
            Cause::Multi(members) => queue.extend(members),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::sentinel::Sentinel;
    use std::fmt;
    use std::sync::OnceLock;

    #[derive(Debug)]
    struct Cyclic {
        next: OnceLock<Error>,
    }

    impl fmt::Display for Cyclic {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("cyclic")
        }
    }

    impl Node for Cyclic {
        fn cause(&self) -> Cause<'_> {
            self.next.get().map_or(Cause::None, Cause::Single)
        }
    }

    fn texts(root: &Error) -> Vec<String> {
        let mut seen = Vec::new();
        walk(root, |node| seen.push(node.to_string()));
        seen
    }

    #[test]
    fn test_visits_classifications_before_cause() {
        let a = Sentinel::new("a");
        let b = Sentinel::new("b");
        let c = Sentinel::new("c");
        let err = Error::msg("root")
            .classify([&c])
            .wrap("ctx", [&a, &b]);
        assert_eq!(texts(&err), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_visits_aggregate_members_in_order() {
        let first = Sentinel::new("first");
        let second = Sentinel::new("second");
        let err = Error::join([
            Error::msg("x").classify([&first]),
            Error::msg("y").classify([&second]),
        ])
        .unwrap();
        assert_eq!(texts(&err), vec!["first", "second"]);
    }

    #[test]
    fn test_shared_node_visited_once() {
        let shared = Sentinel::new("shared");
        let err = Error::join([
            Error::msg("x").classify([&shared]),
            Error::msg("y").classify([&shared]),
        ])
        .unwrap();
        assert_eq!(texts(&err), vec!["shared"]);
    }

    #[test]
    fn test_terminates_on_cycle() {
        let tag = Sentinel::new("tag");
        let looping = Error::new(Cyclic {
            next: OnceLock::new(),
        });
        let err = looping.clone().classify([&tag]);
        if let Some(node) = looping.downcast_ref::<Cyclic>() {
            let _ = node.next.set(err.clone());
        }
        assert_eq!(texts(&err), vec!["tag"]);
    }

    #[test]
    fn test_visited_tracks_identity() {
        let a = Error::msg("same");
        let b = Error::msg("same");
        let mut visited = Visited::new();
        assert!(visited.is_empty());
        assert!(visited.insert(&a));
        assert!(!visited.insert(&a.clone()));
        assert!(visited.insert(&b));
        assert!(visited.contains(&a));
        assert_eq!(visited.len(), 2);
    }
}
