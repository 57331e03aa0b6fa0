//! Structural validation of ingested outline hierarchies.
//!
//! Outlines read from documents or imported from JSON were not produced by
//! this crate, so broken entries are tolerated: they are dropped together with
//! their subtree instead of failing the whole load.

use std::collections::{HashMap, HashSet};

use super::sanitize::sanitize_title;
use super::{children_index, OutlineNode};

/// Keep the structurally valid part of a candidate list.
///
/// Roots are admitted in input order when their sanitized title is non-empty.
/// Below an admitted node, each direct child is admitted when its sanitized
/// title is non-empty and its page is not before the parent's page. A rejected
/// node takes its entire subtree with it.
///
/// The result lists admitted nodes in pre-order, with sanitized titles. Ids and
/// parent ids are left as they were; see [`reindex`](super::reindex).
pub fn filter_candidates(candidates: &[OutlineNode]) -> Vec<OutlineNode> {
    let mut walk = FilterWalk {
        candidates,
        children: children_index(candidates),
        admitted: vec![false; candidates.len()],
        adopted_ids: HashSet::new(),
        accepted: Vec::with_capacity(candidates.len()),
    };

    for (position, candidate) in candidates.iter().enumerate() {
        if candidate.parent_id.is_some() {
            continue;
        }

        let title = sanitize_title(&candidate.title);
        if title.is_empty() {
            log::debug!("Dropping outline root {} with an empty title", candidate.id);
            continue;
        }

        walk.admit(position, title);
    }

    let dropped = candidates.len() - walk.accepted.len();
    if dropped > 0 {
        log::debug!("Ingestion filter dropped {} of {} outline entries", dropped, candidates.len());
    }

    walk.accepted
}

struct FilterWalk<'a> {
    candidates: &'a [OutlineNode],
    children: HashMap<u32, Vec<usize>>,
    /// Candidates already placed in the output
    admitted: Vec<bool>,
    /// Ids whose children have been claimed by an admitted node
    adopted_ids: HashSet<u32>,
    accepted: Vec<OutlineNode>,
}

impl FilterWalk<'_> {
    fn admit(&mut self, position: usize, title: String) {
        let candidates = self.candidates;
        let node = &candidates[position];

        self.admitted[position] = true;
        self.accepted.push(OutlineNode {
            title,
            ..node.clone()
        });

        // With duplicated ids, only the first admitted holder adopts the children
        if !self.adopted_ids.insert(node.id) {
            return;
        }

        let child_positions = match self.children.get(&node.id) {
            Some(positions) => positions.clone(),
            None => return,
        };

        for child_position in child_positions {
            if self.admitted[child_position] {
                continue;
            }

            let child = &candidates[child_position];
            let title = sanitize_title(&child.title);
            if title.is_empty() {
                log::debug!("Dropping outline entry {} with an empty title", child.id);
                continue;
            }
            if child.page_num < node.page_num {
                log::debug!(
                    "Dropping outline entry {} ('{}'): page {} precedes parent page {}",
                    child.id,
                    title,
                    child.page_num,
                    node.page_num
                );
                continue;
            }

            self.admit(child_position, title);
        }
    }
}
