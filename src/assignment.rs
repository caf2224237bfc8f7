//! Maximum-weight bipartite assignment (Hungarian algorithm).
//!
//! Used by the optimal matching strategy. Works on rectangular matrices by
//! solving over the shorter side.

/// For each row of `weights`, the column it is assigned to. At most
/// `min(rows, cols)` rows receive a column; the total weight is maximal.
pub fn max_weight_assignment(weights: &[Vec<f64>]) -> Vec<Option<usize>> {
    let rows = weights.len();
    let cols = weights.first().map_or(0, Vec::len);
    if rows == 0 {
        return Vec::new();
    }
    if cols == 0 {
        return vec![None; rows];
    }

    if rows <= cols {
        min_cost_assignment(rows, cols, |r, c| -weights[r][c])
    } else {
        let by_col = min_cost_assignment(cols, rows, |c, r| -weights[r][c]);
        let mut by_row = vec![None; rows];
        for (c, row) in by_col.into_iter().enumerate() {
            if let Some(r) = row {
                by_row[r] = Some(c);
            }
        }
        by_row
    }
}

/// Classic O(n²·m) potentials formulation. Requires `n <= m`; every one of
/// the `n` rows is assigned a distinct column.
fn min_cost_assignment(n: usize, m: usize, cost: impl Fn(usize, usize) -> f64) -> Vec<Option<usize>> {
    debug_assert!(n <= m);

    // 1-indexed; index 0 is the virtual start column
    let mut u = vec![0.0_f64; n + 1];
    let mut v = vec![0.0_f64; m + 1];
    let mut owner = vec![0_usize; m + 1];
    let mut way = vec![0_usize; m + 1];

    for row in 1..=n {
        owner[0] = row;
        let mut j0 = 0;
        let mut min_slack = vec![f64::INFINITY; m + 1];
        let mut visited = vec![false; m + 1];

        loop {
            visited[j0] = true;
            let i0 = owner[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0;

            for j in 1..=m {
                if visited[j] {
                    continue;
                }
                let slack = cost(i0 - 1, j - 1) - u[i0] - v[j];
                if slack < min_slack[j] {
                    min_slack[j] = slack;
                    way[j] = j0;
                }
                if min_slack[j] < delta {
                    delta = min_slack[j];
                    j1 = j;
                }
            }

            for j in 0..=m {
                if visited[j] {
                    u[owner[j]] += delta;
                    v[j] -= delta;
                } else {
                    min_slack[j] -= delta;
                }
            }

            j0 = j1;
            if owner[j0] == 0 {
                break;
            }
        }

        // Flip the augmenting path
        loop {
            let j1 = way[j0];
            owner[j0] = owner[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![None; n];
    for j in 1..=m {
        if owner[j] != 0 {
            assignment[owner[j] - 1] = Some(j - 1);
        }
    }
    assignment
}
