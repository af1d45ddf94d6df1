//! Month/year filter over archive file names such as `RC_2023-01.zst`.

use crate::error::{TorrentFilterError, TorrentFilterResult};
use crate::torrent::TorrentFile;
use regex::Regex;
use std::fmt;

#[derive(Debug, Clone)]
pub struct MonthFilter {
    month: u32,
    year: Option<u32>,
    pattern: Regex,
}

impl MonthFilter {
    /// Any `month` outside 1..=12, negative values included, is rejected.
    pub fn new(month: i64, year: Option<u32>) -> TorrentFilterResult<Self> {
        let month = match u32::try_from(month) {
            Ok(m) if (1..=12).contains(&m) => m,
            _ => {
                return Err(TorrentFilterError::InvalidArgument(
                    "Month must be between 1 and 12".to_string(),
                ))
            }
        };

        let source = match year {
            Some(year) => format!(r"_{}-{:02}\.zst$", year, month),
            None => format!(r"_\d{{4}}-{:02}\.zst$", month),
        };
        let pattern = Regex::new(&source)
            .map_err(|e| TorrentFilterError::InvalidArgument(e.to_string()))?;

        Ok(Self {
            month,
            year,
            pattern,
        })
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> Option<u32> {
        self.year
    }

    pub fn matches(&self, path: &str) -> bool {
        self.pattern.is_match(path)
    }

    /// Keep matching files, preserving order and original indices.
    pub fn apply(&self, files: &[TorrentFile]) -> Vec<TorrentFile> {
        files
            .iter()
            .filter(|f| self.matches(&f.path))
            .cloned()
            .collect()
    }
}

/// Renders as `month M` or `month M and year Y`.
impl fmt::Display for MonthFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "month {}", self.month)?;
        if let Some(year) = self.year {
            write!(f, " and year {}", year)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn file(index: usize, path: &str) -> TorrentFile {
        TorrentFile {
            index,
            path: path.to_string(),
            length: 1,
        }
    }

    #[rstest::rstest]
    #[case("reddit/comments/RC_2023-01.zst", 1, None, true)]
    #[case("reddit/comments/RC_2023-01.zst", 1, Some(2023), true)]
    #[case("reddit/comments/RC_2023-01.zst", 1, Some(2022), false)]
    #[case("reddit/comments/RC_2023-01.zst", 2, None, false)]
    #[case("reddit/comments/RC_2023-11.zst", 1, None, false)]
    #[case("reddit/comments/RC_2023-01.zst.part", 1, None, false)]
    #[case("reddit/comments/RC_2023-01.json", 1, None, false)]
    #[case("reddit/comments/RC-2023-01.zst", 1, None, false)]
    #[case("reddit/comments/RC_23-01.zst", 1, None, false)]
    #[case("RS_2019-12.zst", 12, Some(2019), true)]
    #[case("a/b_2019-12Xzst", 12, None, false)]
    fn test_matches(
        #[case] path: &str,
        #[case] month: i64,
        #[case] year: Option<u32>,
        #[case] expected: bool,
    ) {
        let filter = MonthFilter::new(month, year).unwrap();
        assert_eq!(filter.matches(path), expected, "{} vs {}", path, filter);
    }

    #[rstest::rstest]
    #[case(0)]
    #[case(13)]
    #[case(100)]
    #[case(-1)]
    #[case(i64::MIN)]
    #[case(u32::MAX as i64 + 1)]
    fn test_rejects_invalid_month(#[case] month: i64) {
        let err = MonthFilter::new(month, None).unwrap_err();
        assert_eq!(err.to_string(), "Month must be between 1 and 12");
    }

    #[test]
    fn test_apply_keeps_original_indices() {
        let files = vec![
            file(1, "d/RC_2023-01.zst"),
            file(2, "d/RC_2023-02.zst"),
            file(3, "d/RS_2023-01.zst"),
            file(4, "d/README.txt"),
        ];
        let filtered = MonthFilter::new(1, None).unwrap().apply(&files);
        let indices: Vec<_> = filtered.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![1, 3]);
    }

    #[test]
    fn test_apply_empty_result() {
        let files = vec![file(1, "d/RC_2023-02.zst")];
        assert!(MonthFilter::new(5, Some(2023)).unwrap().apply(&files).is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(MonthFilter::new(3, None).unwrap().to_string(), "month 3");
        assert_eq!(
            MonthFilter::new(3, Some(2021)).unwrap().to_string(),
            "month 3 and year 2021"
        );
    }

    proptest! {
        #[test]
        fn prop_month_matches_only_itself(
            year in 1000u32..10000,
            month in 1u32..=12,
            other in 1i64..=12
        ) {
            let path = format!("dumps/RC_{}-{:02}.zst", year, month);
            let filter = MonthFilter::new(other, None).unwrap();
            prop_assert_eq!(filter.matches(&path), i64::from(month) == other);
        }

        #[test]
        fn prop_year_filter_is_stricter(
            year in 1000u32..10000,
            other_year in 1000u32..10000,
            month in 1u32..=12
        ) {
            let path = format!("dumps/RS_{}-{:02}.zst", year, month);
            let filter = MonthFilter::new(i64::from(month), Some(other_year)).unwrap();
            prop_assert_eq!(filter.matches(&path), year == other_year);
        }
    }
}
