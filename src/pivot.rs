//! Read-time derivations and cross-tabulations over the stored table.
//!
//! Role, area and salary average are computed here on every read, never
//! persisted, so a classification-rule change retroactively applies to all
//! stored rows.

use std::collections::{BTreeMap, BTreeSet};

use crate::classify::classify;
use crate::db::JobRecord;
use crate::normalize::decode_area_list;

/// Coarse geographic grouping: the second element of the decoded area
/// breadcrumb. Null when the breadcrumb is absent, undecodable, or too short.
pub fn derive_area(area_list: Option<&str>) -> Option<String> {
    decode_area_list(area_list?)?.get(1).cloned()
}

/// Midpoint of the salary band; undefined unless both ends are present.
pub fn salary_avg(min: Option<f64>, max: Option<f64>) -> Option<f64> {
    match (min, max) {
        (Some(lo), Some(hi)) => Some((lo + hi) / 2.0),
        _ => None,
    }
}

/// A 2-D count table. Axes are sorted over the distinct observed values;
/// combinations never observed hold 0.
#[derive(Debug)]
pub struct CountPivot {
    pub rows: Vec<String>,
    pub cols: Vec<String>,
    pub cells: Vec<Vec<u64>>,
}

impl CountPivot {
    pub fn get(&self, row: &str, col: &str) -> Option<u64> {
        let r = self.rows.iter().position(|x| x == row)?;
        let c = self.cols.iter().position(|x| x == col)?;
        Some(self.cells[r][c])
    }

    pub fn total(&self) -> u64 {
        self.cells.iter().flatten().sum()
    }
}

/// A 2-D mean table. Combinations with no contributing value hold `None`,
/// not 0.
#[derive(Debug)]
pub struct MeanPivot {
    pub rows: Vec<String>,
    pub cols: Vec<String>,
    pub cells: Vec<Vec<Option<f64>>>,
}

impl MeanPivot {
    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let r = self.rows.iter().position(|x| x == row)?;
        let c = self.cols.iter().position(|x| x == col)?;
        self.cells[r][c]
    }
}

fn count_pivot(pairs: impl IntoIterator<Item = (String, String)>) -> CountPivot {
    let mut counts: BTreeMap<(String, String), u64> = BTreeMap::new();
    let mut rows = BTreeSet::new();
    let mut cols = BTreeSet::new();
    for (row, col) in pairs {
        rows.insert(row.clone());
        cols.insert(col.clone());
        *counts.entry((row, col)).or_insert(0) += 1;
    }

    let rows: Vec<String> = rows.into_iter().collect();
    let cols: Vec<String> = cols.into_iter().collect();
    let cells = rows
        .iter()
        .map(|r| {
            cols.iter()
                .map(|c| {
                    counts
                        .get(&(r.clone(), c.clone()))
                        .copied()
                        .unwrap_or(0)
                })
                .collect()
        })
        .collect();
    CountPivot { rows, cols, cells }
}

/// Listing counts per (role, category). Records without a category fall out.
pub fn role_by_category_counts(jobs: &[JobRecord]) -> CountPivot {
    count_pivot(jobs.iter().filter_map(|j| {
        let category = j.category.clone()?;
        Some((classify(j.title.as_deref()).label().to_string(), category))
    }))
}

/// Mean salary average per (role, category). Axes span only records with a
/// category and a defined salary band; empty cells mean "no salaried
/// listing", not 0.
pub fn salary_by_role_and_category(jobs: &[JobRecord]) -> MeanPivot {
    let mut sums: BTreeMap<(String, String), (f64, u64)> = BTreeMap::new();
    let mut rows = BTreeSet::new();
    let mut cols = BTreeSet::new();
    for j in jobs {
        let (Some(category), Some(avg)) =
            (j.category.clone(), salary_avg(j.salary_min, j.salary_max))
        else {
            continue;
        };
        let role = classify(j.title.as_deref()).label().to_string();
        rows.insert(role.clone());
        cols.insert(category.clone());
        let entry = sums.entry((role, category)).or_insert((0.0, 0));
        entry.0 += avg;
        entry.1 += 1;
    }

    let rows: Vec<String> = rows.into_iter().collect();
    let cols: Vec<String> = cols.into_iter().collect();
    let cells = rows
        .iter()
        .map(|r| {
            cols.iter()
                .map(|c| {
                    sums.get(&(r.clone(), c.clone()))
                        .map(|(sum, n)| sum / *n as f64)
                })
                .collect()
        })
        .collect();
    MeanPivot { rows, cols, cells }
}

/// Listing counts per (area, role). Records without a derivable area fall out.
pub fn area_by_role_counts(jobs: &[JobRecord]) -> CountPivot {
    count_pivot(jobs.iter().filter_map(|j| {
        let area = derive_area(j.area_list.as_deref())?;
        Some((area, classify(j.title.as_deref()).label().to_string()))
    }))
}

/// Listing counts per (area, category). Needs both to be present.
pub fn area_by_category_counts(jobs: &[JobRecord]) -> CountPivot {
    count_pivot(jobs.iter().filter_map(|j| {
        let area = derive_area(j.area_list.as_deref())?;
        let category = j.category.clone()?;
        Some((area, category))
    }))
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn job(
        id: &str,
        title: Option<&str>,
        category: Option<&str>,
        area: Option<&[&str]>,
        salary: Option<(f64, f64)>,
    ) -> JobRecord {
        JobRecord {
            id: Some(id.to_string()),
            title: title.map(str::to_string),
            category: category.map(str::to_string),
            area_list: area.map(|a| {
                serde_json::to_string(&a.iter().map(|s| s.to_string()).collect::<Vec<_>>())
                    .unwrap()
            }),
            salary_min: salary.map(|(lo, _)| lo),
            salary_max: salary.map(|(_, hi)| hi),
            ..Default::default()
        }
    }

    #[test]
    fn derive_area_takes_second_element() {
        assert_eq!(
            derive_area(Some(r#"["UK","London","Camden"]"#)),
            Some("London".to_string())
        );
    }

    #[test]
    fn derive_area_absorbs_bad_input() {
        assert_eq!(derive_area(None), None);
        assert_eq!(derive_area(Some("not json")), None);
        assert_eq!(derive_area(Some(r#"["UK"]"#)), None);
        assert_eq!(derive_area(Some("[]")), None);
    }

    #[test]
    fn salary_avg_needs_both_ends() {
        assert_eq!(salary_avg(Some(40000.0), Some(60000.0)), Some(50000.0));
        assert_eq!(salary_avg(Some(40000.0), None), None);
        assert_eq!(salary_avg(None, Some(60000.0)), None);
        assert_eq!(salary_avg(None, None), None);
    }

    #[test]
    fn counts_fill_missing_combinations_with_zero() {
        let jobs = vec![
            job("1", Some("Data Analyst"), Some("IT Jobs"), None, None),
            job("2", Some("Data Analyst"), Some("IT Jobs"), None, None),
            job("3", Some("Data Scientist"), Some("Science Jobs"), None, None),
        ];
        let p = role_by_category_counts(&jobs);
        assert_eq!(p.get("Data Analyst", "IT Jobs"), Some(2));
        assert_eq!(p.get("Data Scientist", "Science Jobs"), Some(1));
        assert_eq!(p.get("Data Analyst", "Science Jobs"), Some(0));
        assert_eq!(p.get("Data Scientist", "IT Jobs"), Some(0));
    }

    #[test]
    fn count_total_matches_categorized_records() {
        let jobs = vec![
            job("1", Some("Data Analyst"), Some("IT Jobs"), None, None),
            job("2", None, Some("IT Jobs"), None, None),
            job("3", Some("Plumber"), Some("Trade Jobs"), None, None),
            // No category: excluded from the table entirely.
            job("4", Some("Data Analyst"), None, None, None),
        ];
        let p = role_by_category_counts(&jobs);
        assert_eq!(p.total(), 3);
    }

    #[test]
    fn axes_are_sorted_and_deterministic() {
        let jobs = vec![
            job("1", Some("Zoo Keeper"), Some("Zoo Jobs"), None, None),
            job("2", Some("Data Analyst"), Some("Accounting Jobs"), None, None),
        ];
        let p = role_by_category_counts(&jobs);
        assert_eq!(p.rows, vec!["Data Analyst", "Other"]);
        assert_eq!(p.cols, vec!["Accounting Jobs", "Zoo Jobs"]);
    }

    #[test]
    fn mean_salary_excludes_unsalaried_records() {
        let jobs = vec![
            job("1", Some("Data Analyst"), Some("IT Jobs"), None, Some((40000.0, 60000.0))),
            job("2", Some("Data Analyst"), Some("IT Jobs"), None, Some((60000.0, 80000.0))),
            // No salary band: must not drag the mean toward zero.
            job("3", Some("Data Analyst"), Some("IT Jobs"), None, None),
        ];
        let p = salary_by_role_and_category(&jobs);
        assert_eq!(p.get("Data Analyst", "IT Jobs"), Some(60000.0));
    }

    #[test]
    fn mean_salary_missing_cell_is_none_not_zero() {
        let jobs = vec![
            job("1", Some("Data Analyst"), Some("IT Jobs"), None, Some((40000.0, 60000.0))),
            job("2", Some("Data Scientist"), Some("Science Jobs"), None, Some((80000.0, 90000.0))),
        ];
        let p = salary_by_role_and_category(&jobs);
        assert_eq!(p.get("Data Analyst", "Science Jobs"), None);
        assert_eq!(p.get("Data Analyst", "IT Jobs"), Some(50000.0));
    }

    #[test]
    fn mean_axes_span_only_salaried_records() {
        let jobs = vec![
            job("1", Some("Data Analyst"), Some("IT Jobs"), None, Some((40000.0, 60000.0))),
            job("2", Some("Data Scientist"), Some("Science Jobs"), None, None),
        ];
        let p = salary_by_role_and_category(&jobs);
        assert_eq!(p.rows, vec!["Data Analyst"]);
        assert_eq!(p.cols, vec!["IT Jobs"]);
    }

    #[test]
    fn area_tables_drop_records_without_area() {
        let jobs = vec![
            job("1", Some("Data Analyst"), Some("IT Jobs"), Some(&["UK", "London"]), None),
            job("2", Some("Data Analyst"), Some("IT Jobs"), None, None),
            job("3", Some("Data Engineer"), Some("IT Jobs"), Some(&["US", "New York"]), None),
        ];
        let by_role = area_by_role_counts(&jobs);
        assert_eq!(by_role.total(), 2);
        assert_eq!(by_role.get("London", "Data Analyst"), Some(1));
        assert_eq!(by_role.get("New York", "Data Engineer"), Some(1));

        let by_category = area_by_category_counts(&jobs);
        assert_eq!(by_category.rows, vec!["London", "New York"]);
        assert_eq!(by_category.get("London", "IT Jobs"), Some(1));
    }

    #[test]
    fn empty_input_yields_empty_tables() {
        let p = role_by_category_counts(&[]);
        assert!(p.rows.is_empty());
        assert!(p.cols.is_empty());
        assert_eq!(p.total(), 0);

        let m = salary_by_role_and_category(&[]);
        assert!(m.rows.is_empty());
    }
}
