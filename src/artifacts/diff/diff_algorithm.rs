//! Myers' shortest edit script
//!
//! `MyersDiff` works over any slice of comparable items; callers diff lines
//! (`&[u8]` slices split after each `\n`). Every edit carries the positions it
//! refers to, so the script can be turned into hunks, patches or merge regions
//! without re-scanning the inputs.
//!
//! Common prefixes and suffixes are matched up front. When the remaining
//! inputs need more than `MAX_EDIT_COST` edits the search stops and the middle
//! is reported as a plain delete-all/insert-all block.

use derive_new::new;
use std::fmt::Display;

/// Upper bound on the edit distance explored by the search
pub const MAX_EDIT_COST: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit<T> {
    Delete { a_index: usize, value: T },
    Insert { b_index: usize, value: T },
    Equal { a_index: usize, b_index: usize, value: T },
}

impl<T> Edit<T> {
    pub fn value(&self) -> &T {
        match self {
            Edit::Delete { value, .. } | Edit::Insert { value, .. } | Edit::Equal { value, .. } => value,
        }
    }

    pub fn is_equal(&self) -> bool {
        matches!(self, Edit::Equal { .. })
    }
}

impl<T: AsRef<[u8]>> Edit<T> {
    pub fn as_string(&self) -> String {
        let (sign, value) = match self {
            Edit::Delete { value, .. } => ('-', value),
            Edit::Insert { value, .. } => ('+', value),
            Edit::Equal { value, .. } => (' ', value),
        };
        let text = String::from_utf8_lossy(value.as_ref());

        format!("{sign}{}", text.strip_suffix('\n').unwrap_or(&text))
    }
}

impl<T: AsRef<[u8]>> Display for Edit<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

pub trait DiffAlgorithm<'d, T> {
    type Trace;
    type EditPath;
    type EditScript;

    fn compute_shortest_edit(&self) -> Self::Trace;
    fn backtrack(&self) -> Self::EditPath;
    fn diff(&self) -> Self::EditScript;
}

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct MyersDiff<'d, T> {
    a: &'d [T],
    b: &'d [T],
}

impl<'d, T: Eq + Clone> MyersDiff<'d, T> {
    fn common_prefix(&self) -> usize {
        self.a
            .iter()
            .zip(self.b.iter())
            .take_while(|(a, b)| a == b)
            .count()
    }

    fn common_suffix(&self, prefix: usize) -> usize {
        self.a[prefix..]
            .iter()
            .rev()
            .zip(self.b[prefix..].iter().rev())
            .take_while(|(a, b)| a == b)
            .count()
    }
}

impl<'d, T: Eq + Clone> DiffAlgorithm<'d, T> for MyersDiff<'d, T> {
    /// One snapshot of the furthest-reaching x per diagonal and per round,
    /// window `[-d, d]`; `None` when the cost bound is exceeded
    type Trace = Option<Vec<Vec<isize>>>;
    /// Moves from the end back to the origin, `(prev_x, prev_y, x, y)`
    type EditPath = Vec<(isize, isize, isize, isize)>;
    type EditScript = Vec<Edit<T>>;

    fn compute_shortest_edit(&self) -> Self::Trace {
        let (n, m) = (self.a.len() as isize, self.b.len() as isize);
        let max = (n + m).min(MAX_EDIT_COST as isize).max(1);
        let offset = max;

        let mut v = vec![0isize; (2 * max + 1) as usize];
        let mut trace = Vec::new();

        for d in 0..=max {
            trace.push(v[(offset - d) as usize..=(offset + d) as usize].to_vec());

            for k in (-d..=d).step_by(2) {
                let idx = (offset + k) as usize;

                let mut x = if k == -d {
                    // only reachable from k+1, an insertion
                    v[idx + 1]
                } else if k == d {
                    // only reachable from k-1, a deletion
                    v[idx - 1] + 1
                } else {
                    let x_del = v[idx - 1] + 1;
                    let x_ins = v[idx + 1];
                    if x_del > x_ins { x_del } else { x_ins }
                };

                let mut y = x - k;
                while x < n && y < m && self.a[x as usize] == self.b[y as usize] {
                    // snake
                    x += 1;
                    y += 1;
                }

                v[idx] = x;

                if x >= n && y >= m {
                    return Some(trace);
                }
            }
        }

        None
    }

    fn backtrack(&self) -> Self::EditPath {
        let (mut x, mut y) = (self.a.len() as isize, self.b.len() as isize);
        let mut edit_path = Vec::new();

        let Some(trace) = self.compute_shortest_edit() else {
            // too expensive: delete everything, then insert everything
            while y > 0 {
                edit_path.push((x, y - 1, x, y));
                y -= 1;
            }
            while x > 0 {
                edit_path.push((x - 1, y, x, y));
                x -= 1;
            }
            return edit_path;
        };

        for (d, v) in trace.iter().enumerate().rev() {
            let d = d as isize;

            if d == 0 {
                while x > 0 && y > 0 {
                    edit_path.push((x - 1, y - 1, x, y));
                    x -= 1;
                    y -= 1;
                }
                break;
            }

            let k = x - y;
            let at = |k: isize| v[(k + d) as usize];

            let prev_k = if k == -d {
                k + 1
            } else if k == d {
                k - 1
            } else if at(k - 1) + 1 > at(k + 1) {
                k - 1
            } else {
                k + 1
            };

            let prev_x = at(prev_k);
            let prev_y = prev_x - prev_k;

            while x > prev_x && y > prev_y {
                edit_path.push((x - 1, y - 1, x, y));
                x -= 1;
                y -= 1;
            }

            edit_path.push((prev_x, prev_y, x, y));
            (x, y) = (prev_x, prev_y);
        }

        edit_path
    }

    fn diff(&self) -> Self::EditScript {
        let prefix = self.common_prefix();
        let suffix = self.common_suffix(prefix);
        let (n, m) = (self.a.len(), self.b.len());

        let mut script = (0..prefix)
            .map(|i| Edit::Equal {
                a_index: i,
                b_index: i,
                value: self.a[i].clone(),
            })
            .collect::<Vec<_>>();

        let middle = MyersDiff::new(&self.a[prefix..n - suffix], &self.b[prefix..m - suffix]);
        let mut middle_script = Vec::new();
        if middle.a.is_empty() || middle.b.is_empty() {
            middle_script.extend(middle.a.iter().enumerate().map(|(i, value)| Edit::Delete {
                a_index: prefix + i,
                value: value.clone(),
            }));
            middle_script.extend(middle.b.iter().enumerate().map(|(i, value)| Edit::Insert {
                b_index: prefix + i,
                value: value.clone(),
            }));
        } else {
            for (prev_x, prev_y, x, y) in middle.backtrack().into_iter().rev() {
                let (a_index, b_index) = (prefix + prev_x as usize, prefix + prev_y as usize);

                let edit = if x == prev_x {
                    // only y moved
                    Edit::Insert {
                        b_index,
                        value: self.b[b_index].clone(),
                    }
                } else if y == prev_y {
                    // only x moved
                    Edit::Delete {
                        a_index,
                        value: self.a[a_index].clone(),
                    }
                } else {
                    Edit::Equal {
                        a_index,
                        b_index,
                        value: self.a[a_index].clone(),
                    }
                };
                middle_script.push(edit);
            }
        }
        script.append(&mut middle_script);

        script.extend((0..suffix).map(|i| Edit::Equal {
            a_index: n - suffix + i,
            b_index: m - suffix + i,
            value: self.a[n - suffix + i].clone(),
        }));

        script
    }
}

/// Split content into lines, each keeping its trailing `\n`
pub fn split_lines(content: &[u8]) -> Vec<&[u8]> {
    content.split_inclusive(|byte| *byte == b'\n').collect()
}
