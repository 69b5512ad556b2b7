use wizard_core::game::GameView;

/// Index of a node inside a [`SearchTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Node<G: GameView> {
    state: G,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    action: Option<G::Action>,
    visits: u32,
    reward: f64,
    untried: Vec<G::Action>,
    terminal: bool,
}

impl<G: GameView> Node<G> {
    fn new(state: G, parent: Option<NodeId>, action: Option<G::Action>) -> Self {
        let untried = state.legal_actions();
        let terminal = untried.is_empty() || state.is_terminal();
        Self {
            state,
            parent,
            children: Vec::new(),
            action,
            visits: 0,
            reward: 0.0,
            untried,
            terminal,
        }
    }

    pub fn state(&self) -> &G {
        &self.state
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Action that led here; `None` for the root.
    pub fn action(&self) -> Option<&G::Action> {
        self.action.as_ref()
    }

    pub fn visits(&self) -> u32 {
        self.visits
    }

    pub fn reward(&self) -> f64 {
        self.reward
    }

    pub fn mean(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.reward / f64::from(self.visits)
        }
    }

    pub fn untried(&self) -> &[G::Action] {
        &self.untried
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub fn is_fully_expanded(&self) -> bool {
        self.untried.is_empty()
    }
}

/// Per-decision search tree. Nodes live in one arena and refer to each
/// other by [`NodeId`]; the tree is dropped with the decision.
#[derive(Debug, Clone)]
pub struct SearchTree<G: GameView> {
    nodes: Vec<Node<G>>,
}

impl<G: GameView> SearchTree<G> {
    pub fn new(root_state: G) -> Self {
        Self {
            nodes: vec![Node::new(root_state, None, None)],
        }
    }

    pub fn root(&self) -> &Node<G> {
        &self.nodes[NodeId::ROOT.index()]
    }

    pub fn node(&self, id: NodeId) -> &Node<G> {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Selection may continue below `id`.
    pub fn can_descend(&self, id: NodeId) -> bool {
        let node = self.node(id);
        node.is_fully_expanded() && !node.children.is_empty() && !node.terminal
    }

    pub fn can_expand(&self, id: NodeId) -> bool {
        let node = self.node(id);
        !node.terminal && !node.untried.is_empty()
    }

    /// UCB1 value of `child` seen from its parent.
    pub fn ucb(&self, child: NodeId, exploration: f64) -> f64 {
        let node = self.node(child);
        if node.visits == 0 {
            return if exploration > 0.0 { f64::INFINITY } else { 0.0 };
        }
        if exploration == 0.0 {
            return node.mean();
        }
        let parent_visits = node
            .parent
            .map(|parent| self.node(parent).visits)
            .unwrap_or(node.visits)
            .max(1);
        let bonus = (2.0 * f64::from(parent_visits).ln() / f64::from(node.visits)).sqrt();
        node.mean() + exploration * bonus
    }

    /// Child of `id` with the highest UCB1 value; ties go to the earliest child.
    pub fn best_child(&self, id: NodeId, exploration: f64) -> Option<NodeId> {
        let mut best: Option<(NodeId, f64)> = None;
        for &child in &self.node(id).children {
            let value = self.ucb(child, exploration);
            match best {
                Some((_, best_value)) if value <= best_value => {}
                _ => best = Some((child, value)),
            }
        }
        best.map(|(child, _)| child)
    }

    /// Pops the last untried action of `id` and adds the resulting child.
    ///
    /// A rejected action still produces a child, holding the unchanged state.
    pub fn expand(&mut self, id: NodeId) -> Option<NodeId> {
        let action = self.nodes[id.index()].untried.pop()?;
        let mut state = self.nodes[id.index()].state.clone();
        if state.apply(&action).is_err() {
            state = self.nodes[id.index()].state.clone();
        }
        let child = NodeId(self.nodes.len());
        self.nodes.push(Node::new(state, Some(id), Some(action)));
        self.nodes[id.index()].children.push(child);
        Some(child)
    }

    /// Adds one visit and `reward` to every node on `path`.
    pub fn backpropagate(&mut self, path: &[NodeId], reward: f64) {
        for id in path {
            let node = &mut self.nodes[id.index()];
            node.visits += 1;
            node.reward += reward;
        }
    }
}
