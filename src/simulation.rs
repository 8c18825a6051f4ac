//! CPU force simulation for graph layout
//!
//! Each tick applies many-body repulsion, per-type link springs and centering
//! gravity as velocity increments, then integrates positions with friction.
//! All forces are scaled by `alpha`, which [`ForceSimulation::start`] re-primes
//! and every tick cools toward `alpha_min`. The loop never stops on its own.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::geometry::Vec2;
use crate::model::{Link, Node, NodeIndex};
use crate::quadtree::QuadNode;

/// Configuration for the force simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Many-body strength (negative = repulsion)
    pub charge: f32,
    /// Rest length for link types missing from `link_distances`
    pub link_distance: f32,
    /// Stiffness for link types missing from `link_strengths`
    pub link_strength: f32,
    /// Rest length per link type
    pub link_distances: HashMap<String, f32>,
    /// Stiffness per link type
    pub link_strengths: HashMap<String, f32>,
    /// Pull toward the viewport center
    pub gravity: f32,
    /// Fraction of velocity kept after each tick
    pub friction: f32,
    /// Alpha after `start`
    pub alpha_start: f32,
    /// Alpha never cools below this
    pub alpha_min: f32,
    /// Fraction of alpha lost per tick
    pub alpha_decay: f32,
    /// Barnes-Hut opening angle
    pub theta: f32,
    /// Node count from which repulsion uses the quadtree
    pub barnes_hut_threshold: usize,
    /// Distances below this are clamped in the inverse-square law
    pub min_distance: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            charge: -1200.0,
            link_distance: 40.0,
            link_strength: 0.7,
            link_distances: HashMap::new(),
            link_strengths: HashMap::new(),
            gravity: 0.05,
            friction: 0.6,
            alpha_start: 1.0,
            alpha_min: 0.001,
            alpha_decay: 1.0 - 0.001_f32.powf(1.0 / 300.0),
            theta: 0.8,
            barnes_hut_threshold: 256,
            min_distance: 8.0,
        }
    }
}

impl SimulationConfig {
    /// Rest length for a link type
    pub fn distance_for(&self, link_type: &str) -> f32 {
        self.link_distances
            .get(link_type)
            .copied()
            .unwrap_or(self.link_distance)
    }

    /// Stiffness for a link type
    pub fn strength_for(&self, link_type: &str) -> f32 {
        self.link_strengths
            .get(link_type)
            .copied()
            .unwrap_or(self.link_strength)
    }
}

/// A node held under the pointer for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragPin {
    pub node: NodeIndex,
    pub position: Vec2,
}

/// Force simulation state: cooling schedule plus scratch buffers
///
/// Node and link data stay in the model; each tick borrows them.
#[derive(Debug)]
pub struct ForceSimulation {
    config: SimulationConfig,
    center: Vec2,
    alpha: f32,
    running: bool,
    ticks: u64,
    forces: Vec<Vec2>,
    positions: Vec<Vec2>,
}

impl ForceSimulation {
    pub fn new(config: SimulationConfig, center: Vec2) -> Self {
        Self {
            alpha: config.alpha_start,
            config,
            center,
            running: false,
            ticks: 0,
            forces: Vec::new(),
            positions: Vec::new(),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Whether `start` has been called
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn set_center(&mut self, center: Vec2) {
        self.center = center;
    }

    /// Engage the tick loop and re-prime the cooling schedule
    ///
    /// Positions are left alone, so calling this after every structural change is safe.
    pub fn start(&mut self) {
        self.alpha = self.config.alpha_start;
        self.running = true;
        debug!(alpha = self.alpha, "simulation started");
    }

    /// Prepare for a new or grown node set
    ///
    /// Nodes that have never been positioned are laid out on a sunflower spiral
    /// around the center, continuing outward from their index so merged nodes
    /// land beyond the existing ones.
    pub fn reseed(&mut self, nodes: &mut [Node]) {
        let golden_angle = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());
        for (index, node) in nodes.iter_mut().enumerate() {
            if node.placed {
                continue;
            }
            let radius = 10.0 * (0.5 + index as f32).sqrt();
            let angle = index as f32 * golden_angle;
            node.position = self.center + Vec2::new(radius * angle.cos(), radius * angle.sin());
            node.velocity = Vec2::ZERO;
            node.placed = true;
        }

        self.forces.resize(nodes.len(), Vec2::ZERO);
        self.positions.resize(nodes.len(), Vec2::ZERO);
    }

    /// Run one simulation tick
    ///
    /// Returns `false` without touching anything until `start` has been called.
    /// `pin` holds one node at a fixed position for this tick only; it still pushes
    /// and pulls on its neighbours.
    pub fn tick(&mut self, nodes: &mut [Node], links: &[Link], pin: Option<DragPin>) -> bool {
        if !self.running {
            return false;
        }

        self.reseed(nodes);
        let pinned = pin.filter(|p| p.node.index() < nodes.len());
        if let Some(pin) = pinned {
            let node = &mut nodes[pin.node.index()];
            node.position = pin.position;
            node.velocity = Vec2::ZERO;
        }

        for (slot, node) in self.positions.iter_mut().zip(nodes.iter()) {
            *slot = node.position;
        }
        self.forces.fill(Vec2::ZERO);

        self.apply_many_body_force();
        self.apply_link_force(links);
        self.apply_center_force();

        let friction = self.config.friction.clamp(0.0, 1.0);
        for (index, (node, force)) in nodes.iter_mut().zip(&self.forces).enumerate() {
            if pinned.is_some_and(|p| p.node.index() == index) {
                continue;
            }
            let velocity = (node.velocity + *force) * friction;
            if !velocity.is_finite() {
                node.velocity = Vec2::ZERO;
                continue;
            }
            node.velocity = velocity;
            node.position += velocity;
        }

        self.alpha = (self.alpha * (1.0 - self.config.alpha_decay)).max(self.config.alpha_min);
        self.ticks += 1;
        trace!(tick = self.ticks, alpha = self.alpha, nodes = nodes.len(), "tick");
        true
    }

    /// Repulsion between all node pairs, exact or via quadtree
    fn apply_many_body_force(&mut self) {
        let n = self.positions.len();
        if n < 2 {
            return;
        }

        let strength = -self.config.charge * self.alpha;
        let min_distance_sq = self.config.min_distance.max(0.0001).powi(2);
        let positions = &self.positions;

        if n < self.config.barnes_hut_threshold {
            for i in 0..n {
                for j in (i + 1)..n {
                    let force = pair_repulsion(positions, i, j, strength, min_distance_sq);
                    self.forces[i] += force;
                    self.forces[j] -= force;
                }
            }
            return;
        }

        let Some(tree) = QuadNode::build(positions) else {
            return;
        };
        let pair = |i: usize, j: usize| pair_repulsion(positions, i, j, strength, min_distance_sq);
        let body = |delta: Vec2, mass: f32| {
            let distance_sq = delta.length_sq().max(min_distance_sq);
            delta / distance_sq.sqrt() * (strength * mass / distance_sq)
        };
        for (index, force) in self.forces.iter_mut().enumerate() {
            tree.accumulate(index, positions, self.config.theta, &pair, &body, force);
        }
    }

    /// Spring force between linked nodes, rest length and stiffness by link type
    fn apply_link_force(&mut self, links: &[Link]) {
        let n = self.positions.len();
        for link in links {
            let (source, target) = (link.source.index(), link.target.index());
            if source >= n || target >= n || source == target {
                continue;
            }

            let delta = self.positions[target] - self.positions[source];
            let distance = delta.length().max(0.0001);
            let rest = self.config.distance_for(&link.link_type);
            let strength = self.config.strength_for(&link.link_type);

            // Hooke's law, split evenly between both ends
            let stretch = (distance - rest) / distance * strength * self.alpha * 0.5;
            let correction = delta * stretch;

            self.forces[source] += correction;
            self.forces[target] -= correction;
        }
    }

    /// Centering gravity toward the viewport center
    fn apply_center_force(&mut self) {
        let k = self.config.gravity * self.alpha;
        for (force, &position) in self.forces.iter_mut().zip(&self.positions) {
            *force += (self.center - position) * k;
        }
    }
}

/// Inverse-square repulsion on `i` from `j`
fn pair_repulsion(
    positions: &[Vec2],
    i: usize,
    j: usize,
    strength: f32,
    min_distance_sq: f32,
) -> Vec2 {
    let delta = positions[i] - positions[j];
    let distance_sq = delta.length_sq();
    let direction = if distance_sq > 1e-8 {
        delta / distance_sq.sqrt()
    } else {
        // Coincident: split along a direction that depends only on the unordered pair
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        let direction = Vec2::golden_direction(lo * 31 + hi);
        if i < j { direction } else { -direction }
    };
    direction * (strength / distance_sq.max(min_distance_sq))
}
