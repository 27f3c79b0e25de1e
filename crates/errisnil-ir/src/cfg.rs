//! CFG navigation helpers over deserialized bridge data.
//!
//! Provides graph algorithms (reverse postorder, reachability, dominators)
//! over the CFG that was built by go/ssa in the bridge.

use crate::ir::{BasicBlock, EdgeKind, Function};
use std::collections::{HashMap, HashSet, VecDeque};

/// A traversable view of a function's CFG
pub struct Cfg<'a> {
    func: &'a Function,
    successors: HashMap<u32, Vec<(u32, &'a EdgeKind)>>,
    predecessors: HashMap<u32, Vec<(u32, &'a EdgeKind)>>,
    block_map: HashMap<u32, &'a BasicBlock>,
    block_order: HashMap<u32, usize>,
}

impl<'a> Cfg<'a> {
    /// Build traversal indices from a deserialized function
    pub fn from_function(func: &'a Function) -> Self {
        let mut successors: HashMap<u32, Vec<(u32, &EdgeKind)>> = HashMap::new();
        let mut predecessors: HashMap<u32, Vec<(u32, &EdgeKind)>> = HashMap::new();
        let mut block_map = HashMap::new();
        let mut block_order = HashMap::new();

        for (index, block) in func.blocks.iter().enumerate() {
            block_map.insert(block.id, block);
            block_order.insert(block.id, index);
            successors.entry(block.id).or_default();
            predecessors.entry(block.id).or_default();
        }

        for edge in &func.cfg_edges {
            successors
                .entry(edge.from_block)
                .or_default()
                .push((edge.to_block, &edge.kind));
            predecessors
                .entry(edge.to_block)
                .or_default()
                .push((edge.from_block, &edge.kind));
        }

        Self {
            func,
            successors,
            predecessors,
            block_map,
            block_order,
        }
    }

    /// Entry block (the first block, as in go/ssa)
    pub fn entry_block(&self) -> Option<&'a BasicBlock> {
        self.func.blocks.first()
    }

    /// Get block by ID
    pub fn block(&self, id: u32) -> Option<&'a BasicBlock> {
        self.block_map.get(&id).copied()
    }

    /// Position of a block in the function's block list
    pub fn block_index(&self, id: u32) -> usize {
        self.block_order.get(&id).copied().unwrap_or(usize::MAX)
    }

    /// Successors of a block
    pub fn successors(&self, block_id: u32) -> &[(u32, &'a EdgeKind)] {
        self.successors
            .get(&block_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Predecessors of a block
    pub fn predecessors(&self, block_id: u32) -> &[(u32, &'a EdgeKind)] {
        self.predecessors
            .get(&block_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Number of incoming edges, duplicates included.
    pub fn pred_count(&self, block_id: u32) -> usize {
        self.predecessors(block_id).len()
    }

    /// `(true_successor, false_successor)` of a block ending in a conditional branch.
    pub fn branch_successors(&self, block_id: u32) -> Option<(u32, u32)> {
        let succs = self.successors(block_id);
        let on = |kind: EdgeKind| {
            succs
                .iter()
                .find(|(_, k)| **k == kind)
                .map(|&(id, _)| id)
        };
        Some((on(EdgeKind::CondTrue)?, on(EdgeKind::CondFalse)?))
    }

    /// All blocks in the CFG
    pub fn blocks(&self) -> impl Iterator<Item = &'a BasicBlock> {
        self.func.blocks.iter()
    }

    /// Number of blocks
    pub fn block_count(&self) -> usize {
        self.func.blocks.len()
    }

    /// Reverse post-order from the entry block
    pub fn reverse_postorder(&self) -> Vec<u32> {
        let mut visited = HashSet::new();
        let mut postorder = Vec::new();

        if let Some(entry) = self.entry_block() {
            self.dfs_postorder(entry.id, &mut visited, &mut postorder);
        }

        postorder.reverse();
        postorder
    }

    fn dfs_postorder(&self, block_id: u32, visited: &mut HashSet<u32>, postorder: &mut Vec<u32>) {
        if !visited.insert(block_id) {
            return;
        }
        for &(succ_id, _) in self.successors(block_id) {
            self.dfs_postorder(succ_id, visited, postorder);
        }
        postorder.push(block_id);
    }

    /// Find all blocks reachable from a given block
    pub fn reachable_from(&self, start: u32) -> HashSet<u32> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(start);

        while let Some(id) = queue.pop_front() {
            if visited.insert(id) {
                for &(succ_id, _) in self.successors(id) {
                    queue.push_back(succ_id);
                }
            }
        }

        visited
    }
}

/// Immediate-dominator tree over the blocks reachable from the entry.
#[derive(Debug, Clone, Default)]
pub struct DominatorTree {
    idom: HashMap<u32, u32>,
    children: HashMap<u32, Vec<u32>>,
    root: Option<u32>,
}

impl DominatorTree {
    /// Cooper-Harvey-Kennedy iterative dominators over reverse postorder.
    pub fn compute(cfg: &Cfg<'_>) -> Self {
        let rpo = cfg.reverse_postorder();
        let Some(&root) = rpo.first() else {
            return Self::default();
        };

        let rpo_index: HashMap<u32, usize> =
            rpo.iter().enumerate().map(|(i, &id)| (id, i)).collect();

        let mut idom: HashMap<u32, u32> = HashMap::new();
        idom.insert(root, root);

        let mut changed = true;
        while changed {
            changed = false;
            for &block in rpo.iter().skip(1) {
                let mut processed = cfg
                    .predecessors(block)
                    .iter()
                    .map(|&(pred, _)| pred)
                    .filter(|pred| idom.contains_key(pred));

                let Some(mut new_idom) = processed.next() else {
                    continue;
                };
                for pred in processed {
                    new_idom = intersect(pred, new_idom, &idom, &rpo_index);
                }

                if idom.get(&block) != Some(&new_idom) {
                    idom.insert(block, new_idom);
                    changed = true;
                }
            }
        }

        idom.remove(&root);

        let mut children: HashMap<u32, Vec<u32>> = HashMap::new();
        for (&block, &parent) in &idom {
            children.entry(parent).or_default().push(block);
        }
        for kids in children.values_mut() {
            kids.sort_by_key(|&id| cfg.block_index(id));
        }

        Self {
            idom,
            children,
            root: Some(root),
        }
    }

    /// Root of the tree (the entry block), if the function has any blocks.
    pub fn root(&self) -> Option<u32> {
        self.root
    }

    /// Immediate dominator; `None` for the entry and unreachable blocks.
    pub fn idom(&self, block: u32) -> Option<u32> {
        self.idom.get(&block).copied()
    }

    /// Blocks immediately dominated by `block`, in function block order.
    pub fn dominees(&self, block: u32) -> &[u32] {
        self.children
            .get(&block)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// True if `dom` dominates `block` (reflexive).
    pub fn dominates(&self, dom: u32, block: u32) -> bool {
        let mut current = block;
        loop {
            if current == dom {
                return true;
            }
            match self.idom(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }
}

fn intersect(
    mut lhs: u32,
    mut rhs: u32,
    idom: &HashMap<u32, u32>,
    rpo_index: &HashMap<u32, usize>,
) -> u32 {
    let order = |id: &u32| rpo_index.get(id).copied().unwrap_or(usize::MAX);
    while lhs != rhs {
        while order(&lhs) > order(&rhs) {
            lhs = idom[&lhs];
        }
        while order(&rhs) > order(&lhs) {
            rhs = idom[&rhs];
        }
    }
    lhs
}
