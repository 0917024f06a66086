//! Myers shortest-edit-script diff.
//!
//! The greedy O((N+M)·D) forward search from Myers' 1986 paper: explore
//! furthest-reaching paths per diagonal, keeping a snapshot of the frontier
//! at every depth so the edit script can be rebuilt by walking backwards.
//!
//! Consumers get coalesced runs. Within any contiguous changed region,
//! deletions are emitted before insertions, so a pure replacement reads as
//! `Delete` then `Insert`.

use super::{DiffOp, DiffRun};

/// Per-element edit produced by the backtrack, before coalescing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edit {
    Equal,
    Insert,
    Delete,
}

/// Diff two sequences into coalesced runs.
pub fn diff_slices<T: PartialEq + Clone>(left: &[T], right: &[T]) -> Vec<DiffRun<T>> {
    let edits = backtrack(left, right, &shortest_edit_trace(left, right));
    coalesce(left, right, &edits)
}

/// Run the forward search, returning the V-array snapshot taken at the start
/// of each depth round. The last snapshot is the one the end point was
/// reached from.
fn shortest_edit_trace<T: PartialEq>(left: &[T], right: &[T]) -> Vec<Vec<isize>> {
    let n = left.len() as isize;
    let m = right.len() as isize;
    let max = n + m;
    let offset = max;

    let mut v = vec![0isize; (2 * max + 2) as usize];
    let mut trace = Vec::new();

    for d in 0..=max {
        trace.push(v.clone());
        let mut k = -d;
        while k <= d {
            let idx = (k + offset) as usize;
            let mut x = if k == -d || (k != d && v[idx - 1] < v[idx + 1]) {
                v[idx + 1]
            } else {
                v[idx - 1] + 1
            };
            let mut y = x - k;

            // Follow the diagonal as far as the sequences agree.
            while x < n && y < m && left[x as usize] == right[y as usize] {
                x += 1;
                y += 1;
            }

            v[idx] = x;

            if x >= n && y >= m {
                return trace;
            }
            k += 2;
        }
    }

    trace
}

/// Walk the trace from (N, M) back to the origin, emitting one edit per
/// step. Output is reversed into forward order before returning.
fn backtrack<T: PartialEq>(left: &[T], right: &[T], trace: &[Vec<isize>]) -> Vec<Edit> {
    let n = left.len() as isize;
    let m = right.len() as isize;
    let offset = n + m;

    let mut edits = Vec::new();
    let mut x = n;
    let mut y = m;

    for d in (1..trace.len() as isize).rev() {
        let v = &trace[d as usize];
        let k = x - y;
        let idx = (k + offset) as usize;

        let prev_k = if k == -d || (k != d && v[idx - 1] < v[idx + 1]) {
            k + 1
        } else {
            k - 1
        };
        let prev_x = v[(prev_k + offset) as usize];
        let prev_y = prev_x - prev_k;

        while x > prev_x && y > prev_y {
            edits.push(Edit::Equal);
            x -= 1;
            y -= 1;
        }

        if prev_k == k + 1 {
            edits.push(Edit::Insert);
            y -= 1;
        } else {
            edits.push(Edit::Delete);
            x -= 1;
        }
    }

    // Whatever remains is the leading snake at depth zero.
    while x > 0 && y > 0 {
        edits.push(Edit::Equal);
        x -= 1;
        y -= 1;
    }

    edits.reverse();
    edits
}

/// Turn per-element edits into coalesced runs, normalizing each changed
/// region so its deletions precede its insertions.
fn coalesce<T: Clone>(left: &[T], right: &[T], edits: &[Edit]) -> Vec<DiffRun<T>> {
    let mut runs: Vec<DiffRun<T>> = Vec::new();
    let mut li = 0usize;
    let mut ri = 0usize;

    let mut pending_deletes: Vec<T> = Vec::new();
    let mut pending_inserts: Vec<T> = Vec::new();

    let flush =
        |runs: &mut Vec<DiffRun<T>>, deletes: &mut Vec<T>, inserts: &mut Vec<T>| {
            if !deletes.is_empty() {
                runs.push(DiffRun {
                    op: DiffOp::Delete,
                    items: std::mem::take(deletes),
                });
            }
            if !inserts.is_empty() {
                runs.push(DiffRun {
                    op: DiffOp::Insert,
                    items: std::mem::take(inserts),
                });
            }
        };

    for edit in edits {
        match edit {
            Edit::Equal => {
                flush(&mut runs, &mut pending_deletes, &mut pending_inserts);
                match runs.last_mut() {
                    Some(run) if run.op == DiffOp::Equal => run.items.push(left[li].clone()),
                    _ => runs.push(DiffRun {
                        op: DiffOp::Equal,
                        items: vec![left[li].clone()],
                    }),
                }
                li += 1;
                ri += 1;
            }
            Edit::Delete => {
                pending_deletes.push(left[li].clone());
                li += 1;
            }
            Edit::Insert => {
                pending_inserts.push(right[ri].clone());
                ri += 1;
            }
        }
    }
    flush(&mut runs, &mut pending_deletes, &mut pending_inserts);

    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(s: &[&str]) -> Vec<String> {
        s.iter().map(|s| s.to_string()).collect()
    }

    fn diff(a: &[&str], b: &[&str]) -> Vec<DiffRun<String>> {
        diff_slices(&lines(a), &lines(b))
    }

    #[test]
    fn test_empty_vs_empty() {
        assert!(diff(&[], &[]).is_empty());
    }

    #[test]
    fn test_insert_only() {
        let runs = diff(&[], &["a", "b"]);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].op, DiffOp::Insert);
        assert_eq!(runs[0].items, lines(&["a", "b"]));
    }

    #[test]
    fn test_delete_only() {
        let runs = diff(&["a", "b"], &[]);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].op, DiffOp::Delete);
        assert_eq!(runs[0].items, lines(&["a", "b"]));
    }

    #[test]
    fn test_replace_orders_delete_before_insert() {
        let runs = diff(&["a"], &["b"]);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].op, DiffOp::Delete);
        assert_eq!(runs[0].items, lines(&["a"]));
        assert_eq!(runs[1].op, DiffOp::Insert);
        assert_eq!(runs[1].items, lines(&["b"]));
    }

    #[test]
    fn test_identical_inputs_single_equal_run() {
        let runs = diff(&["a", "b"], &["a", "b"]);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].op, DiffOp::Equal);
        assert_eq!(runs[0].items, lines(&["a", "b"]));
    }

    #[test]
    fn test_mid_sequence_replace() {
        let runs = diff(&["a", "b", "c"], &["a", "d", "c"]);
        let expect = [
            (DiffOp::Equal, vec!["a"]),
            (DiffOp::Delete, vec!["b"]),
            (DiffOp::Insert, vec!["d"]),
            (DiffOp::Equal, vec!["c"]),
        ];
        assert_eq!(runs.len(), expect.len());
        for (run, (op, items)) in runs.iter().zip(expect.iter()) {
            assert_eq!(run.op, *op);
            assert_eq!(run.items, lines(items));
        }
    }

    #[test]
    fn test_adjacent_runs_are_coalesced() {
        let runs = diff(&["a", "b", "c", "d"], &["a", "x", "y", "d"]);
        for pair in runs.windows(2) {
            assert_ne!(pair[0].op, pair[1].op, "adjacent runs share a tag");
        }
    }

    #[test]
    fn test_reconstruction_invariants() {
        let cases: &[(&[&str], &[&str])] = &[
            (&[], &[]),
            (&["a"], &[]),
            (&[], &["a"]),
            (&["a", "b", "c"], &["a", "d", "c"]),
            (&["x", "a", "b"], &["a", "b", "y"]),
            (&["1", "2", "3", "4", "5"], &["2", "3", "9", "5", "6"]),
            (&["same"], &["same"]),
        ];

        for (a, b) in cases {
            let runs = diff(a, b);

            // Equal + Insert applied to nothing rebuilds the right side.
            let rebuilt_right: Vec<String> = runs
                .iter()
                .filter(|r| r.op != DiffOp::Delete)
                .flat_map(|r| r.items.clone())
                .collect();
            assert_eq!(rebuilt_right, lines(b), "right side for {a:?} -> {b:?}");

            // Equal + Delete rebuilds the left side.
            let rebuilt_left: Vec<String> = runs
                .iter()
                .filter(|r| r.op != DiffOp::Insert)
                .flat_map(|r| r.items.clone())
                .collect();
            assert_eq!(rebuilt_left, lines(a), "left side for {a:?} -> {b:?}");
        }
    }

    #[test]
    fn test_works_over_non_string_items() {
        let runs = diff_slices(&[1, 2, 3], &[1, 3]);
        let rebuilt: Vec<i32> = runs
            .iter()
            .filter(|r| r.op != DiffOp::Delete)
            .flat_map(|r| r.items.clone())
            .collect();
        assert_eq!(rebuilt, vec![1, 3]);
    }
}
