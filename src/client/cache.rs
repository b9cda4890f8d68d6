//! Pure state transitions for the cached task list. No I/O here, so the
//! optimistic-update laws can be checked without a network.

use serde::{Deserialize, Serialize};

/// Placeholder ids handed to speculative inserts until the server assigns
/// a real one.
pub const TEMP_ID_PREFIX: &str = "temp-";

/// Client-side view of a task. Ids are strings so a `temp-{seq}`
/// placeholder and a server-assigned UUID live in the same field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedTodo {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub completed: bool,
}

/// An intended local change, mirroring the three mutations the server
/// accepts.
#[derive(Debug, Clone)]
pub enum Change {
    Insert {
        temp_id: String,
        title: String,
        description: Option<String>,
    },
    Toggle {
        id: String,
        completed: bool,
    },
    Remove {
        id: String,
    },
}

pub fn is_temp_id(id: &str) -> bool {
    id.starts_with(TEMP_ID_PREFIX)
}

/// Apply a speculative change to the cached list, returning the new list.
/// Inserts prepend, matching the server's newest-first ordering.
pub fn apply(list: &[CachedTodo], change: &Change) -> Vec<CachedTodo> {
    match change {
        Change::Insert {
            temp_id,
            title,
            description,
        } => {
            let mut next = Vec::with_capacity(list.len() + 1);
            next.push(CachedTodo {
                id: temp_id.clone(),
                title: title.clone(),
                description: description.clone(),
                completed: false,
            });
            next.extend(list.iter().cloned());
            next
        }
        Change::Toggle { id, completed } => list
            .iter()
            .map(|todo| {
                if todo.id == *id {
                    CachedTodo {
                        completed: *completed,
                        ..todo.clone()
                    }
                } else {
                    todo.clone()
                }
            })
            .collect(),
        Change::Remove { id } => list.iter().filter(|todo| todo.id != *id).cloned().collect(),
    }
}

/// Replace the placeholder inserted under `temp_id` with the authoritative
/// server record. A placeholder that has since been removed stays removed.
pub fn reconcile_inserted(
    list: &[CachedTodo],
    temp_id: &str,
    server: &CachedTodo,
) -> Vec<CachedTodo> {
    list.iter()
        .map(|todo| {
            if todo.id == temp_id {
                server.clone()
            } else {
                todo.clone()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo(id: &str, title: &str, completed: bool) -> CachedTodo {
        CachedTodo {
            id: id.to_string(),
            title: title.to_string(),
            description: None,
            completed,
        }
    }

    #[test]
    fn insert_prepends_placeholder() {
        let list = vec![todo("a", "first", false)];
        let next = apply(
            &list,
            &Change::Insert {
                temp_id: "temp-1".to_string(),
                title: "new".to_string(),
                description: None,
            },
        );

        assert_eq!(next.len(), 2);
        assert_eq!(next[0].id, "temp-1");
        assert!(!next[0].completed);
        assert_eq!(next[1].id, "a");
    }

    #[test]
    fn toggle_flips_only_the_target() {
        let list = vec![todo("a", "first", false), todo("b", "second", false)];
        let next = apply(
            &list,
            &Change::Toggle {
                id: "b".to_string(),
                completed: true,
            },
        );

        assert!(!next[0].completed);
        assert!(next[1].completed);
    }

    #[test]
    fn toggle_of_unknown_id_is_identity() {
        let list = vec![todo("a", "first", false)];
        let next = apply(
            &list,
            &Change::Toggle {
                id: "missing".to_string(),
                completed: true,
            },
        );

        assert_eq!(next, list);
    }

    #[test]
    fn remove_drops_the_entry() {
        let list = vec![todo("a", "first", false), todo("b", "second", true)];
        let next = apply(
            &list,
            &Change::Remove {
                id: "a".to_string(),
            },
        );

        assert_eq!(next, vec![todo("b", "second", true)]);
    }

    #[test]
    fn reconcile_swaps_placeholder_for_server_record() {
        let list = vec![todo("temp-1", "new", false), todo("a", "first", false)];
        let server = todo("6f9d8c2e", "new", false);

        let next = reconcile_inserted(&list, "temp-1", &server);

        assert_eq!(next[0].id, "6f9d8c2e");
        assert_eq!(next[1].id, "a");
        assert!(!next.iter().any(|t| is_temp_id(&t.id)));
    }

    #[test]
    fn reconcile_leaves_other_placeholders_alone() {
        let list = vec![todo("temp-2", "later", false), todo("temp-1", "new", false)];
        let server = todo("6f9d8c2e", "new", false);

        let next = reconcile_inserted(&list, "temp-1", &server);

        assert_eq!(next[0].id, "temp-2");
        assert_eq!(next[1].id, "6f9d8c2e");
    }
}
