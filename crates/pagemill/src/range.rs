//! Page range expressions.
//!
//! Supports individual pages and ranges over the current page sequence:
//! - "1" - single page
//! - "1-5" - range of pages (inclusive)
//! - "1,3,5" - multiple individual pages
//! - "1-5, 10-15" - combination of ranges
//!
//! Positions are 1-indexed in the expression and zero-indexed in the result.

use crate::error::{PageMillError, Result};

/// A parsed page range, validated against a page count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRange {
    indices: Vec<usize>,
}

impl PageRange {
    /// Parse a page range expression over `total_pages` pages.
    ///
    /// Whitespace around tokens and numbers is ignored, as are empty tokens.
    /// Duplicate pages are merged and the result is sorted.
    ///
    /// # Errors
    ///
    /// Returns an error naming the offending token if it is not a number or
    /// `start-end` pair, if a range is reversed, or if a page falls outside
    /// `1..=total_pages`. An expression without any token is rejected too.
    ///
    /// # Examples
    ///
    /// ```
    /// use pagemill::range::PageRange;
    ///
    /// let range = PageRange::parse("1-3, 5, 2", 10).unwrap();
    /// assert_eq!(range.indices(), &[0, 1, 2, 4]);
    /// assert!(PageRange::parse("1-3, 5, 20", 10).is_err());
    /// ```
    pub fn parse(s: &str, total_pages: usize) -> Result<Self> {
        let mut indices = Vec::new();

        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            if let Some((start, end)) = part.split_once('-') {
                let start = parse_page(part, start)?;
                let end = parse_page(part, end)?;

                if start > end {
                    return Err(PageMillError::invalid_range(
                        part,
                        format!("start page {start} is after end page {end}"),
                    ));
                }
                check_bounds(part, start, total_pages)?;
                check_bounds(part, end, total_pages)?;

                indices.extend((start - 1)..end);
            } else {
                let page = parse_page(part, part)?;
                check_bounds(part, page, total_pages)?;
                indices.push(page - 1);
            }
        }

        if indices.is_empty() {
            return Err(PageMillError::invalid_range(
                s,
                "enter at least one page or range",
            ));
        }

        indices.sort_unstable();
        indices.dedup();

        Ok(Self { indices })
    }

    /// Zero-indexed positions, sorted ascending, without duplicates.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Consume the range, returning its positions.
    pub fn into_indices(self) -> Vec<usize> {
        self.indices
    }

    /// Check if a zero-indexed position is included.
    pub fn contains(&self, index: usize) -> bool {
        self.indices.binary_search(&index).is_ok()
    }
}

fn parse_page(token: &str, number: &str) -> Result<usize> {
    number
        .trim()
        .parse::<usize>()
        .map_err(|_| PageMillError::invalid_range(token, format!("'{}' is not a page number", number.trim())))
}

fn check_bounds(token: &str, page: usize, total_pages: usize) -> Result<()> {
    if page == 0 || page > total_pages {
        return Err(PageMillError::invalid_range(
            token,
            format!("page {page} is out of bounds (1-{total_pages})"),
        ));
    }
    Ok(())
}

/// Canned range expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangePreset {
    /// Every page.
    All,
    /// Pages 1, 3, 5, ...
    Odd,
    /// Pages 2, 4, 6, ...
    Even,
    /// The first half, rounded up.
    FirstHalf,
    /// Everything after the first half.
    SecondHalf,
}

impl RangePreset {
    /// Render the preset as an expression over `total_pages` pages.
    ///
    /// May return an expression that [`PageRange::parse`] rejects when the
    /// preset is empty for that page count (e.g. `Even` over one page).
    pub fn expression(self, total_pages: usize) -> String {
        let half = total_pages.div_ceil(2);
        match self {
            Self::All => format!("1-{total_pages}"),
            Self::Odd => join((1..=total_pages).step_by(2)),
            Self::Even => join((2..=total_pages).step_by(2)),
            Self::FirstHalf => format!("1-{half}"),
            Self::SecondHalf => format!("{}-{total_pages}", half + 1),
        }
    }
}

fn join(pages: impl Iterator<Item = usize>) -> String {
    pages.map(|p| p.to_string()).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_range_single() {
        let range = PageRange::parse("5", 10).unwrap();
        assert_eq!(range.indices(), &[4]);
        assert!(range.contains(4));
        assert!(!range.contains(5));
    }

    #[test]
    fn test_page_range_range() {
        let range = PageRange::parse("5-7", 10).unwrap();
        assert_eq!(range.indices(), &[4, 5, 6]);
    }

    #[test]
    fn test_page_range_whitespace_and_duplicates() {
        let range = PageRange::parse(" 3 - 4 ,1,, 4 ,2 ", 10).unwrap();
        assert_eq!(range.indices(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_page_range_out_of_bounds_names_token() {
        let err = PageRange::parse("1-3, 5, 20", 10).unwrap_err();
        match err {
            PageMillError::InvalidPageRange { token, .. } => assert_eq!(token, "20"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_page_range_invalid() {
        assert!(PageRange::parse("0", 10).is_err());
        assert!(PageRange::parse("5-3", 10).is_err());
        assert!(PageRange::parse("abc", 10).is_err());
        assert!(PageRange::parse("", 10).is_err());
        assert!(PageRange::parse(" , ", 10).is_err());
        assert!(PageRange::parse("1-2-3", 10).is_err());
        assert!(PageRange::parse("8-12", 10).is_err());
        assert!(PageRange::parse("1", 0).is_err());
    }

    #[test]
    fn test_result_is_subset_sorted_unique() {
        let total = 12;
        for expr in ["12,1,6-8,7", "1-12", "2, 2, 2", "11-12,1-2"] {
            let indices = PageRange::parse(expr, total).unwrap().into_indices();
            assert!(indices.iter().all(|&i| i < total), "{expr}");
            assert!(indices.windows(2).all(|w| w[0] < w[1]), "{expr}");
        }
    }

    #[test]
    fn test_presets() {
        assert_eq!(RangePreset::All.expression(5), "1-5");
        assert_eq!(RangePreset::Odd.expression(5), "1, 3, 5");
        assert_eq!(RangePreset::Even.expression(5), "2, 4");
        assert_eq!(RangePreset::FirstHalf.expression(5), "1-3");
        assert_eq!(RangePreset::SecondHalf.expression(5), "4-5");

        let odd = PageRange::parse(&RangePreset::Odd.expression(6), 6).unwrap();
        assert_eq!(odd.indices(), &[0, 2, 4]);
    }
}
