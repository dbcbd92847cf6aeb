//! Skill tree - arena of skill nodes linked by trigger edges

use super::{EvalError, TriggerCondition};
use crate::damage::Skill;
use crate::source::Modifier;
use crate::types::NodeId;
use serde::{Deserialize, Serialize};

/// One skill with its node-scoped modifiers and outgoing triggers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillNode {
    pub skill: Skill,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub triggers: Vec<TriggerEdge>,
}

impl SkillNode {
    pub fn new(skill: Skill) -> Self {
        SkillNode {
            skill,
            ..Default::default()
        }
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }
}

/// Edge from a parent node to the node it triggers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerEdge {
    pub condition: TriggerCondition,
    pub target: NodeId,
}

/// Arena of skill nodes
///
/// Edges address nodes by [`NodeId`], so an edge may point at an ancestor.
/// The propagator tolerates such cycles; [`SkillTree::find_cycle`] lets a
/// loader reject them up front instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillTree {
    nodes: Vec<SkillNode>,
    root: Option<NodeId>,
}

impl SkillTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node; the first node added becomes the root
    pub fn add_node(&mut self, node: SkillNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        if self.root.is_none() {
            self.root = Some(id);
        }
        id
    }

    pub fn set_root(&mut self, id: NodeId) -> Result<(), EvalError> {
        if id.0 >= self.nodes.len() {
            return Err(EvalError::UnknownNode(id));
        }
        self.root = Some(id);
        Ok(())
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Root id, checked against the arena
    pub fn checked_root(&self) -> Result<NodeId, EvalError> {
        if self.nodes.is_empty() {
            return Err(EvalError::EmptyTree);
        }
        match self.root {
            None => Err(EvalError::MissingRoot),
            Some(id) if id.0 >= self.nodes.len() => Err(EvalError::UnknownNode(id)),
            Some(id) => Ok(id),
        }
    }

    /// Add a trigger edge `from → to`
    pub fn link(
        &mut self,
        from: NodeId,
        condition: impl Into<TriggerCondition>,
        to: NodeId,
    ) -> Result<(), EvalError> {
        if to.0 >= self.nodes.len() {
            return Err(EvalError::UnknownNode(to));
        }
        let node = self
            .nodes
            .get_mut(from.0)
            .ok_or(EvalError::UnknownNode(from))?;
        node.triggers.push(TriggerEdge {
            condition: condition.into(),
            target: to,
        });
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<&SkillNode> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate nodes with their ids
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &SkillNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// First cycle reachable from any node, as the ids along it
    ///
    /// The returned path starts and ends at the same node.
    pub fn find_cycle(&self) -> Option<Vec<NodeId>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            OnPath,
            Done,
        }

        fn visit(
            tree: &SkillTree,
            id: NodeId,
            marks: &mut [Mark],
            path: &mut Vec<NodeId>,
        ) -> Option<Vec<NodeId>> {
            marks[id.0] = Mark::OnPath;
            path.push(id);

            for edge in &tree.nodes[id.0].triggers {
                let target = edge.target;
                match marks.get(target.0) {
                    Some(Mark::OnPath) => {
                        let start = path.iter().position(|n| *n == target).unwrap_or(0);
                        let mut cycle = path[start..].to_vec();
                        cycle.push(target);
                        return Some(cycle);
                    }
                    Some(Mark::Unvisited) => {
                        if let Some(cycle) = visit(tree, target, marks, path) {
                            return Some(cycle);
                        }
                    }
                    // Done, or an edge out of the arena
                    _ => {}
                }
            }

            path.pop();
            marks[id.0] = Mark::Done;
            None
        }

        let mut marks = vec![Mark::Unvisited; self.nodes.len()];
        let mut path = Vec::new();
        for start in 0..self.nodes.len() {
            if marks[start] == Mark::Unvisited {
                if let Some(cycle) = visit(self, NodeId(start), &mut marks, &mut path) {
                    return Some(cycle);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str) -> SkillNode {
        SkillNode::new(Skill::new(id, id))
    }

    #[test]
    fn test_first_node_is_root() {
        let mut tree = SkillTree::new();
        let a = tree.add_node(node("a"));
        let b = tree.add_node(node("b"));
        assert_eq!(tree.root(), Some(a));
        tree.set_root(b).unwrap();
        assert_eq!(tree.checked_root(), Ok(b));
    }

    #[test]
    fn test_checked_root_errors() {
        let tree = SkillTree::new();
        assert_eq!(tree.checked_root(), Err(EvalError::EmptyTree));

        let mut tree = SkillTree::new();
        tree.add_node(node("a"));
        assert_eq!(tree.set_root(NodeId(4)), Err(EvalError::UnknownNode(NodeId(4))));
    }

    #[test]
    fn test_link_checks_both_ends() {
        let mut tree = SkillTree::new();
        let a = tree.add_node(node("a"));
        assert!(tree.link(a, "on_hit", NodeId(1)).is_err());
        assert!(tree.link(NodeId(7), "on_hit", a).is_err());
        let b = tree.add_node(node("b"));
        tree.link(a, "on_crit", b).unwrap();
        assert_eq!(tree.node(a).unwrap().triggers[0].condition, TriggerCondition::OnCrit);
    }

    #[test]
    fn test_acyclic_tree() {
        let mut tree = SkillTree::new();
        let a = tree.add_node(node("a"));
        let b = tree.add_node(node("b"));
        let c = tree.add_node(node("c"));
        tree.link(a, "on_hit", b).unwrap();
        tree.link(a, "on_hit", c).unwrap();
        tree.link(b, "on_hit", c).unwrap();
        assert_eq!(tree.find_cycle(), None);
    }

    #[test]
    fn test_finds_cycle_back_to_ancestor() {
        let mut tree = SkillTree::new();
        let a = tree.add_node(node("a"));
        let b = tree.add_node(node("b"));
        let c = tree.add_node(node("c"));
        tree.link(a, "on_hit", b).unwrap();
        tree.link(b, "on_hit", c).unwrap();
        tree.link(c, "on_crit", b).unwrap();
        assert_eq!(tree.find_cycle(), Some(vec![b, c, b]));
    }

    #[test]
    fn test_self_loop_is_cycle() {
        let mut tree = SkillTree::new();
        let a = tree.add_node(node("a"));
        tree.link(a, "on_hit", a).unwrap();
        assert_eq!(tree.find_cycle(), Some(vec![a, a]));
    }
}
