//! Tree orientation: point every link away from the network core.
//!
//! Depth-first walk from the root with an explicit frame stack. On entering a
//! location, every not-yet-processed link that ends there is reversed so it starts
//! there instead; then each link leaving the location is processed in insertion
//! order and its far end is entered. Re-entering a visited location is a loop in
//! the cabling and is reported, not followed.
//!
//! The input link list is left untouched; the oriented copy keeps the same indices.

use crate::diagnostics::{self, Diagnostic, Outcome};
use crate::graph::{Link, LinkState};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Result of orienting a link list from a root.
#[derive(Debug, Clone)]
pub struct Orientation {
    pub root: String,
    /// Links in input order, endpoints swapped where needed.
    pub links: Vec<Link>,
    /// Classification of each link, same indices as `links`.
    pub states: Vec<LinkState>,
    /// Tree distance from the root for every location entered.
    pub depth: BTreeMap<String, usize>,
    /// Number of links whose endpoints were swapped.
    pub swaps: usize,
    /// Location → index of the tree link arriving at it.
    parents: BTreeMap<String, usize>,
    /// Location → indices of tree links leaving it, in insertion order.
    children: BTreeMap<String, Vec<usize>>,
}

impl Orientation {
    /// Index of the tree link arriving at `location` (its uplink towards the root).
    pub fn parent_link(&self, location: &str) -> Option<usize> {
        self.parents.get(location).copied()
    }

    /// Indices of tree links leaving `location`, in insertion order.
    pub fn child_links(&self, location: &str) -> impl Iterator<Item = usize> + '_ {
        self.children.get(location).into_iter().flatten().copied()
    }

    pub fn tree_links(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices_in(LinkState::Tree)
    }

    pub fn indices_in(&self, state: LinkState) -> impl Iterator<Item = usize> + '_ {
        self.states
            .iter()
            .enumerate()
            .filter(move |(_, s)| **s == state)
            .map(|(i, _)| i)
    }

    pub fn is_reachable(&self, location: &str) -> bool {
        self.depth.contains_key(location)
    }
}

/// One location on the walk: where we are and how far through the link list.
struct Frame {
    location: String,
    level: usize,
    cursor: usize,
}

struct Walker {
    links: Vec<Link>,
    processed: Vec<bool>,
    states: Vec<LinkState>,
    depth: BTreeMap<String, usize>,
    parents: BTreeMap<String, usize>,
    children: BTreeMap<String, Vec<usize>>,
    stack: Vec<Frame>,
    swaps: usize,
    max_depth: usize,
    diagnostics: Vec<Diagnostic>,
}

impl Walker {
    fn enter(&mut self, location: String, level: usize, via: Option<usize>) {
        if self.depth.contains_key(&location) {
            if let Some(i) = via {
                self.states[i] = LinkState::Cyclic;
            }
            diagnostics::record(&mut self.diagnostics, Diagnostic::CycleDetected { location });
            return;
        }
        if level > self.max_depth {
            if let Some(i) = via {
                self.states[i] = LinkState::DepthLimited;
            }
            diagnostics::record(
                &mut self.diagnostics,
                Diagnostic::DepthLimitExceeded {
                    location,
                    max_depth: self.max_depth,
                },
            );
            return;
        }

        self.depth.insert(location.clone(), level);
        if let Some(i) = via {
            self.states[i] = LinkState::Tree;
            self.parents.insert(location.clone(), i);
            self.children
                .entry(self.links[i].from_location.clone())
                .or_default()
                .push(i);
        }

        // Links captured pointing at us that no parent has claimed get reversed.
        for (i, link) in self.links.iter_mut().enumerate() {
            if link.to_location == location && !self.processed[i] {
                if link.from_location != location {
                    debug!("Reversing link {} to start at {}", link.feature_id, location);
                    self.swaps += 1;
                }
                link.reverse();
            }
        }

        self.stack.push(Frame {
            location,
            level,
            cursor: 0,
        });
    }

    fn run(&mut self) {
        while let Some(frame) = self.stack.last_mut() {
            let next = (frame.cursor..self.links.len())
                .find(|&i| self.links[i].from_location == frame.location);
            match next {
                Some(i) => {
                    frame.cursor = i + 1;
                    let level = frame.level + 1;
                    self.processed[i] = true;
                    let child = self.links[i].to_location.clone();
                    self.enter(child, level, Some(i));
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Orient `links` into an out-tree rooted at `root`.
///
/// Links never reached from the root keep their captured direction and are
/// classified [`LinkState::Unreachable`]; links that close a loop are
/// [`LinkState::Cyclic`]; links into a branch past `max_depth` are
/// [`LinkState::DepthLimited`]. All three are reported once and excluded from
/// the tree.
pub fn orient(root: &str, links: &[Link], max_depth: usize) -> Outcome<Orientation> {
    let mut walker = Walker {
        links: links.to_vec(),
        processed: vec![false; links.len()],
        states: vec![LinkState::Unreachable; links.len()],
        depth: BTreeMap::new(),
        parents: BTreeMap::new(),
        children: BTreeMap::new(),
        stack: Vec::new(),
        swaps: 0,
        max_depth,
        diagnostics: Vec::new(),
    };

    walker.enter(root.to_string(), 0, None);
    walker.run();

    for (link, state) in walker.links.iter().zip(&walker.states) {
        if *state == LinkState::Unreachable {
            diagnostics::record(
                &mut walker.diagnostics,
                Diagnostic::UnreachableLink {
                    feature_id: link.feature_id.clone(),
                    a: link.from_location.clone(),
                    b: link.to_location.clone(),
                },
            );
        }
    }

    info!(
        "Oriented {} links from {} ({} swapped, {} locations reached)",
        links.len(),
        root,
        walker.swaps,
        walker.depth.len()
    );

    Outcome::new(
        Orientation {
            root: root.to_string(),
            links: walker.links,
            states: walker.states,
            depth: walker.depth,
            swaps: walker.swaps,
            parents: walker.parents,
            children: walker.children,
        },
        walker.diagnostics,
    )
}
