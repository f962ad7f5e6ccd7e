//! Randomized edit sequences.
//!
//! 1. Undoing everything restores the starting tree, redoing everything
//!    restores the final tree.
//! 2. A node can never be moved under itself or its descendants, and the
//!    tree stays valid after any sequence of edits.

use pagecraft_editor::{EditSession, EditorError, ParentProblem, StoreError};
use pagecraft_model::{Node, NodeId, Tree};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Add { parent: usize, canvas: bool },
    Move { node: usize, parent: usize, index: usize },
    Delete { node: usize },
    SetProp { node: usize, value: u8 },
    Hide { node: usize, hidden: bool },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (any::<usize>(), any::<bool>()).prop_map(|(parent, canvas)| Op::Add { parent, canvas }),
        2 => (any::<usize>(), any::<usize>(), 0..4usize)
            .prop_map(|(node, parent, index)| Op::Move { node, parent, index }),
        1 => any::<usize>().prop_map(|node| Op::Delete { node }),
        2 => (any::<usize>(), any::<u8>()).prop_map(|(node, value)| Op::SetProp { node, value }),
        1 => (any::<usize>(), any::<bool>()).prop_map(|(node, hidden)| Op::Hide { node, hidden }),
    ]
}

fn pick(session: &EditSession, n: usize) -> NodeId {
    let ids: Vec<NodeId> = session
        .store()
        .tree()
        .iter_preorder()
        .map(|node| node.id.clone())
        .collect();
    ids[n % ids.len()].clone()
}

/// Run one op; structural rejections are expected and simply skipped
fn run(session: &mut EditSession, op: &Op, counter: &mut usize) -> bool {
    let result = match op {
        Op::Add { parent, canvas } => {
            *counter += 1;
            let id = NodeId::new(format!("g{}", counter));
            let node = if *canvas {
                Node::canvas(id, "ContainerBlock")
            } else {
                Node::new(id, "TextBlock")
            };
            let parent = pick(session, *parent);
            session.add_node(node, parent.as_str(), usize::MAX).map(|_| ())
        }
        Op::Move { node, parent, index } => {
            let node = pick(session, *node);
            let parent = pick(session, *parent);
            session.move_node(node.as_str(), parent.as_str(), *index)
        }
        Op::Delete { node } => {
            let node = pick(session, *node);
            session.delete_node(node.as_str())
        }
        Op::SetProp { node, value } => {
            let node = pick(session, *node);
            session.set_prop(node.as_str(), "text", *value)
        }
        Op::Hide { node, hidden } => {
            let node = pick(session, *node);
            session.set_hidden(node.as_str(), *hidden)
        }
    };

    match result {
        Ok(()) => true,
        Err(EditorError::Store(_)) => false,
        Err(other) => panic!("unexpected error: {}", other),
    }
}

fn new_session() -> EditSession {
    EditSession::new("prop", Tree::with_root(Node::canvas("ROOT", "ContainerBlock")))
}

proptest! {
    #[test]
    fn undo_redo_symmetry(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut session = new_session();
        let initial = session.snapshot();
        let mut counter = 0;

        for op in &ops {
            run(&mut session, op, &mut counter);
            prop_assert_eq!(session.store().tree().validate(), Ok(()));
        }
        let last = session.snapshot();

        while session.undo().unwrap() {}
        prop_assert_eq!(session.snapshot(), initial);

        while session.redo().unwrap() {}
        prop_assert_eq!(session.snapshot(), last);
    }

    #[test]
    fn moves_never_create_cycles(
        ops in prop::collection::vec(op_strategy(), 1..40),
        node in any::<usize>(),
        target in any::<usize>(),
    ) {
        let mut session = new_session();
        let mut counter = 0;
        for op in &ops {
            run(&mut session, op, &mut counter);
        }

        let node = pick(&session, node);
        let subtree = session.store().tree().subtree_ids(node.as_str());
        let target = subtree[target % subtree.len()].clone();
        let before = session.snapshot();

        // Canvas-ness is checked first; a leaf target is rejected as NotCanvas
        let err = session.move_node(node.as_str(), target.as_str(), 0).unwrap_err();
        let problem = match err {
            EditorError::Store(StoreError::InvalidParent { problem, .. }) => problem,
            other => panic!("unexpected error: {}", other),
        };
        prop_assert!(matches!(problem, ParentProblem::WouldCreateCycle | ParentProblem::NotCanvas));
        prop_assert_eq!(session.snapshot(), before);
    }
}
