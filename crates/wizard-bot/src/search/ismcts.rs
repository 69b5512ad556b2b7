use super::budget::Budget;
use super::rollout::{normalized_reward, random_playout};
use super::tree::{NodeId, SearchTree};
use rand::Rng;
use std::time::Duration;
use tracing::{Level, event};
use wizard_core::game::GameView;
use wizard_core::model::player::PlayerId;

/// Exploration constant used while growing the tree.
pub const DEFAULT_EXPLORATION: f64 = 1.4;

/// Single-determinization Monte Carlo tree search.
#[derive(Debug, Clone, Copy)]
pub struct Ismcts {
    iterations: usize,
    exploration: f64,
    time_limit: Option<Duration>,
}

impl Ismcts {
    pub fn new(iterations: usize) -> Self {
        Self {
            iterations,
            exploration: DEFAULT_EXPLORATION,
            time_limit: None,
        }
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Searches from `state`, rewarding outcomes from `player`'s point of view.
    ///
    /// Stops after the configured iterations or once the time limit passes,
    /// whichever comes first. The clock is only checked between iterations.
    pub fn run<G, R>(&self, state: &G, player: PlayerId, rng: &mut R) -> SearchReport<G::Action>
    where
        G: GameView,
        R: Rng + ?Sized,
    {
        let budget = self.time_limit.map(Budget::start);
        let started = std::time::Instant::now();
        let mut tree = SearchTree::new(state.clone());
        let mut completed = 0usize;

        if !tree.root().untried().is_empty() {
            let mut path = Vec::new();
            while completed < self.iterations {
                if budget.is_some_and(|budget| budget.is_exhausted()) {
                    break;
                }

                path.clear();
                let mut node = NodeId::ROOT;
                path.push(node);
                while tree.can_descend(node) {
                    let Some(next) = tree.best_child(node, self.exploration) else {
                        break;
                    };
                    node = next;
                    path.push(node);
                }

                if tree.can_expand(node) {
                    if let Some(child) = tree.expand(node) {
                        node = child;
                        path.push(node);
                    }
                }

                let mut playout = tree.node(node).state().clone();
                let scores = random_playout(&mut playout, rng);
                tree.backpropagate(&path, normalized_reward(&scores, player));
                completed += 1;
            }
        }

        let report = SearchReport::from_tree(&tree, completed, started.elapsed());
        event!(
            target: "wizard_bot::search",
            Level::DEBUG,
            player = %player,
            iterations = report.iterations,
            root_visits = report.root_visits,
            nodes = tree.len(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            chosen = ?report.action,
        );
        report
    }
}

/// Root-level statistics for one root child.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildStats<A> {
    pub action: A,
    pub visits: u32,
    pub mean: f64,
}

#[derive(Debug, Clone)]
pub struct SearchReport<A> {
    /// Exploitation-only pick at the root; `None` if the root never expanded.
    pub action: Option<A>,
    /// Mean reward of that pick, in `[-1, 1]`.
    pub value: Option<f64>,
    pub iterations: usize,
    pub root_visits: u32,
    pub children: Vec<ChildStats<A>>,
    pub elapsed: Duration,
}

impl<A: Clone> SearchReport<A> {
    fn from_tree<G>(tree: &SearchTree<G>, iterations: usize, elapsed: Duration) -> Self
    where
        G: GameView<Action = A>,
    {
        let best = tree.best_child(NodeId::ROOT, 0.0).map(|child| tree.node(child));
        let action = best.and_then(|node| node.action().cloned());
        let value = best.map(|node| node.mean());
        let children = tree
            .root()
            .children()
            .iter()
            .filter_map(|&child| {
                let node = tree.node(child);
                node.action().map(|action| ChildStats {
                    action: action.clone(),
                    visits: node.visits(),
                    mean: node.mean(),
                })
            })
            .collect();
        Self {
            action,
            value,
            iterations,
            root_visits: tree.root().visits(),
            children,
            elapsed,
        }
    }
}
