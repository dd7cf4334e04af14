use crate::program::CoverProgram;

/// Cells added to an under-protected row in one visit.
pub const CELLS_PER_ROW: usize = 2;

/// Greedy cover used when the optimizer gives no usable answer.
///
/// Rows are visited in program order. Each row still short of its
/// requirement gains its two cheapest unchosen members (ties broken by
/// variable position), or all of them when fewer remain. Cells already
/// chosen are never added twice and never removed.
///
/// A visited row ends with at least `min(required, 2)` hidden members, so
/// rows requiring more than two cells can stay under-protected; the caller
/// reports those through [`CoverProgram::unmet_rows`].
pub fn heuristic_cover(program: &CoverProgram, start: &[bool]) -> Vec<bool> {
    let mut selection = vec![false; program.len()];
    for (slot, chosen) in selection.iter_mut().zip(start) {
        *slot = *chosen;
    }
    let costs = program.costs();
    for row in program.rows() {
        let covered = row
            .members
            .iter()
            .filter(|member| selection[**member])
            .count();
        if covered >= row.required {
            continue;
        }
        let mut candidates: Vec<usize> = row
            .members
            .iter()
            .copied()
            .filter(|member| !selection[*member])
            .collect();
        candidates.sort_by(|a, b| costs[*a].total_cmp(&costs[*b]).then(a.cmp(b)));
        for candidate in candidates.into_iter().take(CELLS_PER_ROW) {
            selection[candidate] = true;
        }
    }
    selection
}
