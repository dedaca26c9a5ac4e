//! Class percentages per pair and the ordered change table

use serde::{Deserialize, Serialize};

use super::classify::{ChangeClass, ClassGrid};

/// Cell counts and percentages of one class grid.
///
/// Percentages are taken over valid cells, so they sum to 100 whenever at
/// least one cell is valid. With no valid cell all three are 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChangeStats {
    pub increase_cells: usize,
    pub decrease_cells: usize,
    pub no_change_cells: usize,
    pub masked_cells: usize,
    pub total_cells: usize,
    pub increase_pct: f64,
    pub decrease_pct: f64,
    pub no_change_pct: f64,
}

impl ChangeStats {
    /// Count every class in a single pass over the grid.
    pub fn from_class_grid(grid: &ClassGrid) -> Self {
        let classes = grid.classes().data();
        let (mut increase, mut decrease, mut no_change, mut masked) = (0, 0, 0, 0);

        let mut tally = |code: i8| match ChangeClass::from_code(code) {
            Some(ChangeClass::Increase) => increase += 1,
            Some(ChangeClass::Decrease) => decrease += 1,
            Some(ChangeClass::NoChange) | None => no_change += 1,
        };

        match grid.valid_mask() {
            Some(valid) => {
                for (&code, &ok) in classes.iter().zip(valid.iter()) {
                    if ok {
                        tally(code);
                    } else {
                        masked += 1;
                    }
                }
            }
            None => classes.iter().for_each(|&code| tally(code)),
        }

        Self::from_counts(increase, decrease, no_change, masked)
    }

    fn from_counts(increase: usize, decrease: usize, no_change: usize, masked: usize) -> Self {
        let valid = increase + decrease + no_change;
        let pct = |n: usize| {
            if valid == 0 {
                0.0
            } else {
                n as f64 / valid as f64 * 100.0
            }
        };
        Self {
            increase_cells: increase,
            decrease_cells: decrease,
            no_change_cells: no_change,
            masked_cells: masked,
            total_cells: valid + masked,
            increase_pct: pct(increase),
            decrease_pct: pct(decrease),
            no_change_pct: pct(no_change),
        }
    }

    /// Cells that entered the percentages
    pub fn valid_cells(&self) -> usize {
        self.total_cells - self.masked_cells
    }
}

/// Statistics of one consecutive pair, labelled `"i to i+1"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub period: String,
    #[serde(skip)]
    pub from_index: usize,
    #[serde(skip)]
    pub to_index: usize,
    pub increase_pct: f64,
    pub decrease_pct: f64,
    pub no_change_pct: f64,
    pub valid_cells: usize,
    pub total_cells: usize,
}

impl ChangeRecord {
    pub fn new(from_index: usize, stats: &ChangeStats) -> Self {
        let to_index = from_index + 1;
        Self {
            period: format!("{} to {}", from_index, to_index),
            from_index,
            to_index,
            increase_pct: stats.increase_pct,
            decrease_pct: stats.decrease_pct,
            no_change_pct: stats.no_change_pct,
            valid_cells: stats.valid_cells(),
            total_cells: stats.total_cells,
        }
    }
}

/// Ordered per-pair records of a series, one per consecutive pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeTable {
    records: Vec<ChangeRecord>,
}

impl ChangeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ChangeRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[ChangeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChangeRecord> {
        self.records.iter()
    }

    /// Record with the largest share of increasing cells
    pub fn max_increase(&self) -> Option<&ChangeRecord> {
        self.records
            .iter()
            .max_by(|a, b| a.increase_pct.total_cmp(&b.increase_pct))
    }

    /// Record with the largest share of decreasing cells
    pub fn max_decrease(&self) -> Option<&ChangeRecord> {
        self.records
            .iter()
            .max_by(|a, b| a.decrease_pct.total_cmp(&b.decrease_pct))
    }
}

impl FromIterator<ChangeRecord> for ChangeTable {
    fn from_iter<I: IntoIterator<Item = ChangeRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ChangeTable {
    type Item = &'a ChangeRecord;
    type IntoIter = std::slice::Iter<'a, ChangeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::classify::classify;
    use approx::assert_relative_eq;
    use ndarray::Array2;
    use vegchange_core::Raster;

    fn class_grid(values: Vec<f64>, rows: usize, cols: usize) -> ClassGrid {
        classify(&Raster::from_vec(values, rows, cols).unwrap())
    }

    #[test]
    fn test_percentages_partition() {
        let g = class_grid(vec![0.5, -0.5, 0.0, 0.0, 0.2, 0.0, -0.1, 0.0], 2, 4);
        let s = ChangeStats::from_class_grid(&g);
        assert_eq!((s.increase_cells, s.decrease_cells, s.no_change_cells), (2, 2, 4));
        assert_relative_eq!(s.increase_pct, 25.0);
        assert_relative_eq!(s.decrease_pct, 25.0);
        assert_relative_eq!(s.no_change_pct, 50.0);
        assert_relative_eq!(s.increase_pct + s.decrease_pct + s.no_change_pct, 100.0);
    }

    #[test]
    fn test_thirds_sum_to_hundred() {
        let g = class_grid(vec![1.0, -1.0, 0.0], 1, 3);
        let s = ChangeStats::from_class_grid(&g);
        for p in [s.increase_pct, s.decrease_pct, s.no_change_pct] {
            assert!((0.0..=100.0).contains(&p));
        }
        assert_relative_eq!(
            s.increase_pct + s.decrease_pct + s.no_change_pct,
            100.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_masked_cells_excluded() {
        let mask = Array2::from_shape_vec((1, 4), vec![true, true, false, false]).unwrap();
        let g = class_grid(vec![0.3, 0.0, -0.3, -0.3], 1, 4).with_mask(mask).unwrap();
        let s = ChangeStats::from_class_grid(&g);
        assert_eq!(s.masked_cells, 2);
        assert_eq!(s.valid_cells(), 2);
        assert_eq!(s.total_cells, 4);
        assert_relative_eq!(s.increase_pct, 50.0);
        assert_relative_eq!(s.decrease_pct, 0.0);
        assert_relative_eq!(s.no_change_pct, 50.0);
    }

    #[test]
    fn test_fully_masked_reports_zero() {
        let mask = Array2::from_elem((2, 2), false);
        let g = class_grid(vec![0.3; 4], 2, 2).with_mask(mask).unwrap();
        let s = ChangeStats::from_class_grid(&g);
        assert_eq!(s.valid_cells(), 0);
        assert_eq!(
            (s.increase_pct, s.decrease_pct, s.no_change_pct),
            (0.0, 0.0, 0.0)
        );
    }

    #[test]
    fn test_record_label_and_table_queries() {
        let grow = ChangeStats::from_class_grid(&class_grid(vec![0.2, 0.2, 0.0, 0.0], 2, 2));
        let loss = ChangeStats::from_class_grid(&class_grid(vec![-0.2, -0.2, -0.2, 0.0], 2, 2));
        let table: ChangeTable = [ChangeRecord::new(0, &grow), ChangeRecord::new(1, &loss)]
            .into_iter()
            .collect();

        assert_eq!(table.len(), 2);
        assert_eq!(table.records()[1].period, "1 to 2");
        assert_eq!(table.records()[1].to_index, 2);
        assert_eq!(table.max_increase().map(|r| r.period.as_str()), Some("0 to 1"));
        assert_eq!(table.max_decrease().map(|r| r.period.as_str()), Some("1 to 2"));
    }
}
