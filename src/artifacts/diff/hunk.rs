use crate::artifacts::diff::diff_algorithm::Edit;

/// Unchanged lines shown around each change
pub const HUNK_CONTEXT: usize = 3;

/// A run of edits with its surrounding context, as in a unified diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk<T> {
    a_start: usize,
    b_start: usize,
    edits: Vec<Edit<T>>,
}

impl<T: Clone> Hunk<T> {
    /// Group an edit script into hunks; changes separated by at most
    /// `2 * HUNK_CONTEXT` unchanged lines share a hunk.
    pub fn build(script: &[Edit<T>]) -> Vec<Hunk<T>> {
        // line offsets before each edit
        let mut a_line = Vec::with_capacity(script.len());
        let mut b_line = Vec::with_capacity(script.len());
        let (mut a, mut b) = (0, 0);
        for edit in script {
            a_line.push(a);
            b_line.push(b);
            match edit {
                Edit::Delete { .. } => a += 1,
                Edit::Insert { .. } => b += 1,
                Edit::Equal { .. } => {
                    a += 1;
                    b += 1;
                }
            }
        }

        let changes = script
            .iter()
            .enumerate()
            .filter(|(_, edit)| !edit.is_equal())
            .map(|(i, _)| i)
            .collect::<Vec<_>>();

        let mut groups: Vec<(usize, usize)> = Vec::new();
        for change in changes {
            match groups.last_mut() {
                Some((_, end)) if change - *end - 1 <= 2 * HUNK_CONTEXT => *end = change,
                _ => groups.push((change, change)),
            }
        }

        groups
            .into_iter()
            .map(|(first, last)| {
                let start = first.saturating_sub(HUNK_CONTEXT);
                let end = (last + HUNK_CONTEXT + 1).min(script.len());

                Hunk {
                    a_start: a_line[start],
                    b_start: b_line[start],
                    edits: script[start..end].to_vec(),
                }
            })
            .collect()
    }
}

impl<T> Hunk<T> {
    /// 1-based first old line, 0 when the hunk has no old lines
    pub fn a_start(&self) -> usize {
        if self.a_size() == 0 { self.a_start } else { self.a_start + 1 }
    }

    pub fn b_start(&self) -> usize {
        if self.b_size() == 0 { self.b_start } else { self.b_start + 1 }
    }

    pub fn a_size(&self) -> usize {
        self.edits
            .iter()
            .filter(|edit| !matches!(edit, Edit::Insert { .. }))
            .count()
    }

    pub fn b_size(&self) -> usize {
        self.edits
            .iter()
            .filter(|edit| !matches!(edit, Edit::Delete { .. }))
            .count()
    }

    pub fn edits(&self) -> &[Edit<T>] {
        &self.edits
    }

    /// `@@ -a,n +b,m @@`
    pub fn header(&self) -> String {
        format!(
            "@@ -{},{} +{},{} @@",
            self.a_start(),
            self.a_size(),
            self.b_start(),
            self.b_size()
        )
    }
}
