//! Membership graph between category options and option combos
//!
//! A derived index: every edge `option -> option combo` says the COC holds that
//! option. The catalog keeps it in step with its COC records, so lookups in
//! either direction never scan the full COC table. Uses petgraph.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{BTreeSet, HashMap};

use super::uid::Uid;

/// A node in the membership graph
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Member {
    Option(Uid),
    OptionCombo(Uid),
}

impl Member {
    fn uid(&self) -> &Uid {
        match self {
            Member::Option(uid) | Member::OptionCombo(uid) => uid,
        }
    }
}

/// Bipartite option/COC graph
#[derive(Debug, Default, Clone)]
pub struct MembershipGraph {
    graph: DiGraph<Member, ()>,
    node_map: HashMap<Member, NodeIndex>,
}

impl MembershipGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    fn node(&mut self, member: Member) -> NodeIndex {
        if let Some(idx) = self.node_map.get(&member) {
            return *idx;
        }
        let idx = self.graph.add_node(member.clone());
        self.node_map.insert(member, idx);
        idx
    }

    /// Records that the COC holds each of the given options
    pub fn register<'a>(&mut self, option_combo: &Uid, options: impl IntoIterator<Item = &'a Uid>) {
        let coc_idx = self.node(Member::OptionCombo(option_combo.clone()));
        for option in options {
            let option_idx = self.node(Member::Option(option.clone()));
            self.graph.update_edge(option_idx, coc_idx, ());
        }
    }

    /// Removes a COC and all its memberships
    pub fn unregister(&mut self, option_combo: &Uid) -> bool {
        self.remove(&Member::OptionCombo(option_combo.clone()))
    }

    /// Removes an option and all its memberships
    pub fn remove_option(&mut self, option: &Uid) -> bool {
        self.remove(&Member::Option(option.clone()))
    }

    fn remove(&mut self, member: &Member) -> bool {
        if let Some(idx) = self.node_map.remove(member) {
            self.graph.remove_node(idx);
            // petgraph moves the last node into the freed index
            self.rebuild_node_map();
            true
        } else {
            false
        }
    }

    fn rebuild_node_map(&mut self) {
        self.node_map.clear();
        for idx in self.graph.node_indices() {
            if let Some(member) = self.graph.node_weight(idx) {
                self.node_map.insert(member.clone(), idx);
            }
        }
    }

    /// COCs that hold the option
    pub fn option_combos_of(&self, option: &Uid) -> BTreeSet<Uid> {
        self.neighbors(&Member::Option(option.clone()), Direction::Outgoing)
    }

    /// Options held by the COC
    pub fn options_of(&self, option_combo: &Uid) -> BTreeSet<Uid> {
        self.neighbors(&Member::OptionCombo(option_combo.clone()), Direction::Incoming)
    }

    fn neighbors(&self, member: &Member, direction: Direction) -> BTreeSet<Uid> {
        let idx = match self.node_map.get(member) {
            Some(idx) => *idx,
            None => return BTreeSet::new(),
        };

        self.graph
            .neighbors_directed(idx, direction)
            .filter_map(|n| self.graph.node_weight(n))
            .map(|m| m.uid().clone())
            .collect()
    }
}
