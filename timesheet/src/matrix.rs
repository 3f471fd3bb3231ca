//! Dense row × column grids built from flat lists of dated facts.

use std::collections::HashMap;
use std::hash::Hash;
use std::ops::AddAssign;

/// A value that can be accumulated into a matrix cell.
///
/// Integer amounts (minutes, [`crate::Money`]) keep the grand-total invariant
/// exact; `f64` is supported for already-aggregated hour values.
pub trait Amount: Copy + Default + AddAssign {}

impl<T: Copy + Default + AddAssign> Amount for T {}

/// A read-only grid with row, column and grand totals.
#[derive(Debug, Clone)]
pub struct ReportMatrix<R, C, V> {
    rows: Vec<R>,
    columns: Vec<C>,
    cells: Vec<Vec<V>>,
    row_totals: Vec<V>,
    column_totals: Vec<V>,
    grand_total: V,
    unplaced_total: V,
    row_index: HashMap<R, usize>,
    column_index: HashMap<C, usize>,
}

impl<R, C, V> ReportMatrix<R, C, V>
where
    R: Clone + Eq + Hash,
    C: Clone + Eq + Hash,
    V: Amount,
{
    /// Builds the grid.
    ///
    /// `rows` come first, in the given order. A fact for a row not listed there
    /// appends that row in order of first appearance. Columns are the given
    /// sequence, each kept at its first occurrence only; a fact for any other
    /// column is not placed and only counted in
    /// [`ReportMatrix::unplaced_total`]. Facts sharing a cell are summed.
    pub fn build<I, F>(rows: I, columns: Vec<C>, facts: F) -> Self
    where
        I: IntoIterator<Item = R>,
        F: IntoIterator<Item = (R, C, V)>,
    {
        let mut column_index = HashMap::with_capacity(columns.len());
        let columns: Vec<C> = columns
            .into_iter()
            .filter(|column| {
                let next = column_index.len();
                *column_index.entry(column.clone()).or_insert(next) == next
            })
            .collect();

        let mut matrix = Self {
            rows: Vec::new(),
            cells: Vec::new(),
            row_totals: Vec::new(),
            column_totals: vec![V::default(); columns.len()],
            grand_total: V::default(),
            unplaced_total: V::default(),
            row_index: HashMap::new(),
            column_index,
            columns,
        };

        for row in rows {
            matrix.row_position(row);
        }

        let mut unplaced_facts = 0usize;
        for (row, column, amount) in facts {
            let Some(&c) = matrix.column_index.get(&column) else {
                matrix.unplaced_total += amount;
                unplaced_facts += 1;
                continue;
            };
            let r = matrix.row_position(row);
            matrix.cells[r][c] += amount;
        }

        if unplaced_facts > 0 {
            tracing::debug!(
                count = unplaced_facts,
                "facts outside the report columns were not placed"
            );
        }

        matrix.compute_totals();
        matrix
    }

    fn row_position(&mut self, row: R) -> usize {
        if let Some(&i) = self.row_index.get(&row) {
            return i;
        }

        let i = self.rows.len();
        self.row_index.insert(row.clone(), i);
        self.rows.push(row);
        self.cells.push(vec![V::default(); self.columns.len()]);
        i
    }

    fn compute_totals(&mut self) {
        self.row_totals = Vec::with_capacity(self.rows.len());
        for cells in &self.cells {
            let mut row_total = V::default();
            for (c, &value) in cells.iter().enumerate() {
                row_total += value;
                self.column_totals[c] += value;
            }
            self.row_totals.push(row_total);
            self.grand_total += row_total;
        }
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn columns(&self) -> &[C] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value of a cell; zero for unknown rows or columns.
    pub fn cell(&self, row: &R, column: &C) -> V {
        match (self.row_index.get(row), self.column_index.get(column)) {
            (Some(&r), Some(&c)) => self.cells[r][c],
            _ => V::default(),
        }
    }

    /// All cells of a row, in column order.
    pub fn row(&self, row: &R) -> Option<&[V]> {
        self.row_index.get(row).map(|&r| self.cells[r].as_slice())
    }

    pub fn row_total(&self, row: &R) -> V {
        self.row_index
            .get(row)
            .map(|&r| self.row_totals[r])
            .unwrap_or_default()
    }

    pub fn column_total(&self, column: &C) -> V {
        self.column_index
            .get(column)
            .map(|&c| self.column_totals[c])
            .unwrap_or_default()
    }

    /// Column totals, in column order.
    pub fn column_totals(&self) -> &[V] {
        &self.column_totals
    }

    pub fn grand_total(&self) -> V {
        self.grand_total
    }

    /// Sum of the facts whose column is not part of the grid.
    pub fn unplaced_total(&self) -> V {
        self.unplaced_total
    }

    /// Rows with their cells and total, in row order.
    pub fn iter_rows(&self) -> impl Iterator<Item = (&R, &[V], V)> {
        self.rows
            .iter()
            .zip(&self.cells)
            .zip(&self.row_totals)
            .map(|((row, cells), &total)| (row, cells.as_slice(), total))
    }
}

/// Shorthand for [`ReportMatrix::build`].
pub fn build_matrix<R, C, V, I, F>(rows: I, columns: Vec<C>, facts: F) -> ReportMatrix<R, C, V>
where
    R: Clone + Eq + Hash,
    C: Clone + Eq + Hash,
    V: Amount,
    I: IntoIterator<Item = R>,
    F: IntoIterator<Item = (R, C, V)>,
{
    ReportMatrix::build(rows, columns, facts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_totals_agree(matrix: &ReportMatrix<&str, u8, i64>) {
        let from_rows: i64 = matrix.iter_rows().map(|(_, _, total)| total).sum();
        let from_columns: i64 = matrix.column_totals().iter().sum();
        assert_eq!(matrix.grand_total(), from_rows);
        assert_eq!(matrix.grand_total(), from_columns);
    }

    #[test]
    fn sums_facts_sharing_a_cell() {
        let matrix = build_matrix(
            ["R1", "R2"],
            vec![1u8, 2, 3],
            [("R1", 1, 100i64), ("R1", 1, 50), ("R2", 3, 200)],
        );

        assert_eq!(matrix.row(&"R1"), Some(&[150, 0, 0][..]));
        assert_eq!(matrix.row(&"R2"), Some(&[0, 0, 200][..]));
        assert_eq!(matrix.row_total(&"R1"), 150);
        assert_eq!(matrix.row_total(&"R2"), 200);
        assert_eq!(matrix.column_totals(), &[150, 0, 200]);
        assert_eq!(matrix.grand_total(), 350);
        assert_totals_agree(&matrix);
    }

    #[test]
    fn empty_facts_give_zero_grid_with_given_columns() {
        let matrix: ReportMatrix<&str, u8, i64> =
            build_matrix(["B", "A"], vec![3, 1, 2], Vec::new());

        assert_eq!(matrix.columns(), &[3, 1, 2]);
        assert_eq!(matrix.rows(), &["B", "A"]);
        assert_eq!(matrix.row(&"A"), Some(&[0, 0, 0][..]));
        assert_eq!(matrix.column_totals(), &[0, 0, 0]);
        assert_eq!(matrix.grand_total(), 0);
    }

    #[test]
    fn no_rows_and_no_facts_is_empty() {
        let matrix: ReportMatrix<&str, u8, i64> =
            build_matrix(Vec::new(), (1..=12).collect(), Vec::new());
        assert!(matrix.is_empty());
        assert_eq!(matrix.columns().len(), 12);
        assert_eq!(matrix.cell(&"X", &1), 0);
        assert_eq!(matrix.row_total(&"X"), 0);
    }

    #[test]
    fn rows_from_facts_follow_first_appearance() {
        let matrix = build_matrix(
            ["fixed"],
            vec![1u8, 2],
            [("late", 2, 1i64), ("early", 1, 2), ("late", 1, 3), ("fixed", 2, 4)],
        );

        assert_eq!(matrix.rows(), &["fixed", "late", "early"]);
        assert_eq!(matrix.cell(&"late", &1), 3);
        assert_totals_agree(&matrix);
    }

    #[test]
    fn column_order_is_never_changed_by_data() {
        let matrix = build_matrix(
            Vec::<&str>::new(),
            vec![5u8, 4, 3],
            [("r", 3, 1i64), ("r", 5, 2)],
        );
        assert_eq!(matrix.columns(), &[5, 4, 3]);
        assert_eq!(matrix.row(&"r"), Some(&[2, 0, 1][..]));
    }

    #[test]
    fn facts_outside_columns_are_not_placed() {
        let matrix = build_matrix(
            ["r"],
            vec![1u8, 2],
            [("r", 1, 10i64), ("r", 7, 5), ("ghost", 9, 1)],
        );

        assert_eq!(matrix.rows(), &["r"]);
        assert_eq!(matrix.grand_total(), 10);
        assert_eq!(matrix.unplaced_total(), 6);
        assert_totals_agree(&matrix);
    }

    #[test]
    fn duplicate_explicit_rows_are_kept_once() {
        let matrix: ReportMatrix<&str, u8, i64> =
            build_matrix(["a", "b", "a"], vec![1], [("a", 1, 1)]);
        assert_eq!(matrix.rows(), &["a", "b"]);
    }

    #[test]
    fn duplicate_columns_are_kept_once() {
        let matrix = build_matrix(["r"], vec![1u8, 2, 1], [("r", 1, 5i64), ("r", 2, 3)]);
        assert_eq!(matrix.columns(), &[1, 2]);
        assert_eq!(matrix.row(&"r"), Some(&[5, 3][..]));
        assert_eq!(matrix.column_totals(), &[5, 3]);
        assert_eq!(matrix.cell(&"r", &1), 5);
        assert_totals_agree(&matrix);
    }

    #[test]
    fn grand_total_matches_for_many_facts() {
        let facts: Vec<(&str, u8, i64)> = (0..500)
            .map(|i| {
                let row = ["a", "b", "c", "d"][i % 4];
                (row, (i % 12) as u8 + 1, (i as i64 * 37) % 101)
            })
            .collect();
        let matrix = build_matrix(Vec::new(), (1..=12).collect(), facts.clone());

        assert_eq!(
            matrix.grand_total(),
            facts.iter().map(|(_, _, v)| v).sum::<i64>()
        );
        assert_totals_agree(&matrix);
    }
}
