//! Nesting of `/`-delimited folder and collection names.
//!
//! Names are trimmed of leading and trailing delimiters and split into
//! segments. Each segment descends one level; a segment whose parent doesn't
//! exist is merged with the next one, so `a/b` without an `a` becomes a root
//! node named `a/b`. Two items with the same full path but different ids are
//! kept side by side.

use crate::model::TreeNodeModel;

/// Default path delimiter.
pub const DELIMITER: char = '/';

/// One node of a [`Tree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode<T> {
    pub node: T,
    /// The segment of the path this node contributes (its display name).
    pub name: String,
    pub parent_id: Option<String>,
    pub children: Vec<TreeNode<T>>,
}

impl<T> TreeNode<T> {
    fn leaf(node: T, name: String, parent_id: Option<String>) -> Self {
        Self {
            node,
            name,
            parent_id,
            children: Vec::new(),
        }
    }
}

/// A forest of nested nodes, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree<T> {
    pub root_nodes: Vec<TreeNode<T>>,
}

impl<T: TreeNodeModel> Tree<T> {
    /// Depth-first lookup by id.
    pub fn get_tree_node(&self, id: &str) -> Option<&TreeNode<T>> {
        find_node(&self.root_nodes, id)
    }
}

fn find_node<'a, T: TreeNodeModel>(nodes: &'a [TreeNode<T>], id: &str) -> Option<&'a TreeNode<T>> {
    nodes.iter().find_map(|node| {
        if node.node.id() == Some(id) {
            Some(node)
        } else {
            find_node(&node.children, id)
        }
    })
}

/// Arrange `items` into a tree. Input order decides sibling order, so sort
/// the items by name first.
pub fn as_nested_nodes<T: TreeNodeModel>(items: &[T], delimiter: char) -> Tree<T> {
    let mut root_nodes = Vec::new();
    for item in items {
        let parts: Vec<String> = item
            .name()
            .trim_matches(delimiter)
            .split(delimiter)
            .map(str::to_owned)
            .collect();
        traverse(&mut root_nodes, item, 0, parts, None, delimiter);
    }
    Tree { root_nodes }
}

fn traverse<T: TreeNodeModel>(
    nodes: &mut Vec<TreeNode<T>>,
    item: &T,
    index: usize,
    mut parts: Vec<String>,
    parent_id: Option<String>,
    delimiter: char,
) {
    if index >= parts.len() {
        return;
    }
    let is_last = index == parts.len() - 1;

    match nodes.iter().position(|node| node.name == parts[index]) {
        Some(position) if is_last && nodes[position].node.id() != item.id() => {
            nodes.push(TreeNode::leaf(item.clone(), parts.swap_remove(index), parent_id));
        }
        Some(position) => {
            let existing = &mut nodes[position];
            let next_parent = existing.node.id().map(str::to_owned);
            traverse(&mut existing.children, item, index + 1, parts, next_parent, delimiter);
        }
        None if is_last => {
            nodes.push(TreeNode::leaf(item.clone(), parts.swap_remove(index), parent_id));
        }
        None => {
            let next = parts.remove(index + 1);
            parts[index] = format!("{}{delimiter}{next}", parts[index]);
            traverse(nodes, item, index, parts, parent_id, delimiter);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FolderView;

    fn folders(entries: &[(&str, &str)]) -> Vec<FolderView> {
        entries.iter().map(|(id, name)| FolderView::new(*id, *name)).collect()
    }

    fn names<T>(nodes: &[TreeNode<T>]) -> Vec<&str> {
        nodes.iter().map(|node| node.name.as_str()).collect()
    }

    #[test]
    fn test_nested_structure() {
        let tree = as_nested_nodes(
            &folders(&[("1", "Work"), ("2", "Work/Clients"), ("3", "Work/Clients/Acme"), ("4", "Home")]),
            DELIMITER,
        );

        assert_eq!(names(&tree.root_nodes), vec!["Work", "Home"]);
        let work = &tree.root_nodes[0];
        assert_eq!(names(&work.children), vec!["Clients"]);
        assert_eq!(work.children[0].parent_id.as_deref(), Some("1"));
        assert_eq!(names(&work.children[0].children), vec!["Acme"]);
        assert_eq!(work.children[0].children[0].parent_id.as_deref(), Some("2"));
    }

    #[test]
    fn test_missing_intermediate_merges_segments() {
        let tree = as_nested_nodes(&folders(&[("1", "a/b"), ("2", "a/b/c")]), DELIMITER);

        assert_eq!(names(&tree.root_nodes), vec!["a/b"]);
        assert_eq!(names(&tree.root_nodes[0].children), vec!["c"]);
    }

    #[test]
    fn test_leading_and_trailing_delimiters_trimmed() {
        let tree = as_nested_nodes(&folders(&[("1", "/Work/"), ("2", "Work/Docs/")]), DELIMITER);
        assert_eq!(names(&tree.root_nodes), vec!["Work"]);
        assert_eq!(names(&tree.root_nodes[0].children), vec!["Docs"]);
    }

    #[test]
    fn test_duplicate_names_with_different_ids_are_siblings() {
        let tree = as_nested_nodes(&folders(&[("1", "Work"), ("2", "Work")]), DELIMITER);
        assert_eq!(tree.root_nodes.len(), 2);
        assert_eq!(tree.root_nodes[1].node.id.as_deref(), Some("2"));
    }

    #[test]
    fn test_same_id_twice_is_kept_once() {
        let tree = as_nested_nodes(&folders(&[("1", "Work"), ("1", "Work")]), DELIMITER);
        assert_eq!(tree.root_nodes.len(), 1);
    }

    #[test]
    fn test_get_tree_node() {
        let tree = as_nested_nodes(
            &folders(&[("1", "Work"), ("2", "Work/Clients"), ("3", "Home")]),
            DELIMITER,
        );
        assert_eq!(tree.get_tree_node("2").map(|n| n.name.as_str()), Some("Clients"));
        assert_eq!(tree.get_tree_node("3").map(|n| n.children.len()), Some(0));
        assert!(tree.get_tree_node("4").is_none());
    }
}
