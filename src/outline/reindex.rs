//! Canonical id assignment.

use std::collections::HashMap;

use super::OutlineNode;

/// Reassign ids `1..=N` in page order and remap parent links.
///
/// Candidates are stably sorted by `(page_num, id)` and numbered in that
/// order, except that within one page an entry waits for its parent when the
/// parent sits on the same page. A parent id is translated through the ids
/// assigned so far; a parent that has not been numbered yet (or does not
/// exist) turns the node into a root. Every parent therefore ends up with a
/// smaller id than its children.
pub fn reindex(candidates: &[OutlineNode]) -> Vec<OutlineNode> {
    reindex_tracked(candidates).0
}

/// Like [`reindex`], also returning where each output node came from.
///
/// The second vector holds, for every output position, the index of the input
/// candidate that produced it.
pub fn reindex_tracked(candidates: &[OutlineNode]) -> (Vec<OutlineNode>, Vec<usize>) {
    let mut sorted: Vec<usize> = (0..candidates.len()).collect();
    sorted.sort_by_key(|&i| (candidates[i].page_num, candidates[i].id));

    let mut numbering = Numbering {
        candidates,
        translation: HashMap::with_capacity(candidates.len()),
        nodes: Vec::with_capacity(candidates.len()),
        sources: Vec::with_capacity(candidates.len()),
    };

    let mut start = 0;
    while start < sorted.len() {
        let page_num = candidates[sorted[start]].page_num;
        let len = sorted[start..]
            .iter()
            .position(|&i| candidates[i].page_num != page_num)
            .unwrap_or(sorted.len() - start);
        numbering.number_page(&sorted[start..start + len]);
        start += len;
    }

    (numbering.nodes, numbering.sources)
}

/// State of one reindexing pass.
struct Numbering<'a> {
    candidates: &'a [OutlineNode],
    /// Prior id to new id; the first holder of a duplicated prior id wins
    translation: HashMap<u32, u32>,
    nodes: Vec<OutlineNode>,
    sources: Vec<usize>,
}

impl Numbering<'_> {
    /// Number the candidates of one page, given in sorted order.
    fn number_page(&mut self, group: &[usize]) {
        let mut unplaced: HashMap<u32, usize> = HashMap::new();
        for &source in group {
            *unplaced.entry(self.candidates[source].id).or_insert(0) += 1;
        }

        let mut placed = vec![false; group.len()];
        let mut waiting: HashMap<u32, Vec<usize>> = HashMap::new();

        for slot in 0..group.len() {
            if placed[slot] {
                continue;
            }
            let parent = self.candidates[group[slot]]
                .parent_id
                .filter(|p| !self.translation.contains_key(p))
                .filter(|p| unplaced.get(p).is_some_and(|&count| count > 0));
            match parent {
                Some(parent) => waiting.entry(parent).or_default().push(slot),
                None => self.place(group, slot, &mut placed, &mut unplaced, &mut waiting),
            }
        }

        // Whatever still waits is part of a parent cycle; sorted order breaks it
        for slot in 0..group.len() {
            if !placed[slot] {
                self.place(group, slot, &mut placed, &mut unplaced, &mut waiting);
            }
        }
    }

    /// Number one candidate, then every same-page entry that was waiting on it.
    fn place(
        &mut self,
        group: &[usize],
        slot: usize,
        placed: &mut [bool],
        unplaced: &mut HashMap<u32, usize>,
        waiting: &mut HashMap<u32, Vec<usize>>,
    ) {
        let mut stack = vec![slot];
        while let Some(slot) = stack.pop() {
            if placed[slot] {
                continue;
            }
            placed[slot] = true;

            let source = group[slot];
            let candidates = self.candidates;
            let candidate = &candidates[source];
            let new_id = self.nodes.len() as u32 + 1;
            let parent_id = candidate
                .parent_id
                .and_then(|prior| self.translation.get(&prior).copied());

            if let Some(count) = unplaced.get_mut(&candidate.id) {
                *count = count.saturating_sub(1);
            }
            if !self.translation.contains_key(&candidate.id) {
                self.translation.insert(candidate.id, new_id);
                if let Some(mut released) = waiting.remove(&candidate.id) {
                    released.reverse();
                    stack.extend(released);
                }
            }

            self.nodes.push(OutlineNode {
                id: new_id,
                title: candidate.title.clone(),
                page_num: candidate.page_num,
                parent_id,
            });
            self.sources.push(source);
        }
    }
}
