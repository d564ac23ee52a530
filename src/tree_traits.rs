/*
Rendering lives behind a trait so the binary can print any arena tree whose
payload knows how to display itself.
 */
use std::fmt;

use generational_arena::Index;
use termtree::Tree;

use crate::domain::TreeArena;

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl<T: fmt::Display> TreeNodeConvert for TreeArena<T> {
    fn to_tree_string(&self) -> Tree<String> {
        fn label<T: fmt::Display>(arena: &TreeArena<T>, node_idx: Index) -> String {
            match arena.get_node(node_idx) {
                Some(node) => {
                    let mut label = format!("{} [{}]", node.data, node.id);
                    if node.is_current {
                        label.push_str(" *");
                    }
                    if !node.is_expanded && !node.children.is_empty() {
                        label.push_str(&format!(" (+{} hidden)", node.children.len()));
                    }
                    label
                }
                None => String::from("<released>"),
            }
        }

        fn build_tree<T: fmt::Display>(arena: &TreeArena<T>, node_idx: Index, parent_tree: &mut Tree<String>) {
            if let Some(node) = arena.get_node(node_idx) {
                if !node.is_expanded {
                    return;
                }
                for &child_idx in &node.children {
                    let mut child_tree = Tree::new(label(arena, child_idx));
                    build_tree(arena, child_idx, &mut child_tree);
                    parent_tree.push(child_tree);
                }
            }
        }

        if let Some(root_idx) = self.root() {
            let mut tree = Tree::new(label(self, root_idx));
            build_tree(self, root_idx, &mut tree);
            tree
        } else {
            Tree::new("Empty tree".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_tree_with_current_node_when_rendering_then_marks_it() {
        let mut arena = TreeArena::new();
        let root = arena.insert_node(1, "root", None);
        arena.insert_node(2, "child", Some(root));
        arena.set_current(2).unwrap();

        let rendered = arena.to_tree_string().to_string();

        assert!(rendered.contains("root [1]"));
        assert!(rendered.contains("child [2] *"));
    }

    #[test]
    fn given_collapsed_node_when_rendering_then_hides_children() {
        let mut arena = TreeArena::new();
        let root = arena.insert_node(1, "root", None);
        arena.insert_node(2, "child", Some(root));
        arena.set_expanded(root, false).unwrap();

        let rendered = arena.to_tree_string().to_string();

        assert!(rendered.contains("(+1 hidden)"));
        assert!(!rendered.contains("child"));
    }
}
