use std::fmt;

use super::criteria::CriteriaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Asc => write!(f, "asc"),
            Direction::Desc => write!(f, "desc"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    pub property: String,
    pub direction: Direction,
}

impl SortOrder {
    pub fn asc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: Direction::Desc,
        }
    }
}

/// Largest row offset or page size a query may carry; the drivers bind both
/// as signed 64-bit integers.
pub const MAX_WINDOW: u64 = i64::MAX as u64;

/// Zero-based page window plus ordering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pageable {
    pub page: u64,
    pub size: u64,
    pub sort: Vec<SortOrder>,
}

impl Pageable {
    pub fn of(page: u64, size: u64) -> Self {
        Self {
            page,
            size: size.clamp(1, MAX_WINDOW),
            sort: Vec::new(),
        }
    }

    pub fn sorted_by(mut self, order: SortOrder) -> Self {
        self.sort.push(order);
        self
    }

    /// Number of rows skipped before this page
    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size).min(MAX_WINDOW)
    }

    /// Reads `page`, `size` and repeated `sort=prop[,prop...][,asc|desc]`
    /// query pairs. Missing size falls back to `default_size`; sizes above
    /// `max_size` are clamped. A page whose offset does not fit
    /// [`MAX_WINDOW`] is rejected.
    pub fn from_query_pairs<'a, I>(
        pairs: I,
        default_size: u64,
        max_size: u64,
    ) -> Result<Self, CriteriaError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut pageable = Pageable::of(0, default_size);
        for (key, value) in pairs {
            match key {
                "page" => {
                    pageable.page = value.trim().parse().map_err(|_| CriteriaError::Malformed {
                        field: "page".into(),
                        message: format!("'{value}' is not a page number"),
                    })?
                }
                "size" => {
                    let size: u64 = value.trim().parse().map_err(|_| CriteriaError::Malformed {
                        field: "size".into(),
                        message: format!("'{value}' is not a page size"),
                    })?;
                    pageable.size = size.clamp(1, max_size.clamp(1, MAX_WINDOW));
                }
                "sort" => pageable.sort.extend(parse_sort(value)),
                _ => {}
            }
        }

        match pageable.page.checked_mul(pageable.size) {
            Some(offset) if offset <= MAX_WINDOW => Ok(pageable),
            _ => Err(CriteriaError::Malformed {
                field: "page".into(),
                message: format!("page {} is out of range", pageable.page),
            }),
        }
    }
}

fn parse_sort(raw: &str) -> Vec<SortOrder> {
    let mut parts: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    let direction = match parts.last().map(|p| p.to_ascii_lowercase()) {
        Some(last) if last == "asc" => {
            parts.pop();
            Direction::Asc
        }
        Some(last) if last == "desc" => {
            parts.pop();
            Direction::Desc
        }
        _ => Direction::Asc,
    };
    parts
        .into_iter()
        .map(|property| SortOrder {
            property: property.to_string(),
            direction,
        })
        .collect()
}

/// One page of results with the total across all pages
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u64,
    pub size: u64,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, pageable: &Pageable, total: u64) -> Self {
        Self {
            content,
            page: pageable.page,
            size: pageable.size,
            total,
        }
    }

    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            0
        } else {
            self.total.div_ceil(self.size)
        }
    }

    pub fn has_next(&self) -> bool {
        self.page.saturating_add(1) < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 0
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_params() {
        let pageable = Pageable::from_query_pairs(std::iter::empty(), 20, 100).unwrap();
        assert_eq!(pageable, Pageable::of(0, 20));
        assert_eq!(pageable.offset(), 0);
    }

    #[test]
    fn reads_page_size_and_sorts() {
        let pageable = Pageable::from_query_pairs(
            [
                ("page", "2"),
                ("size", "5"),
                ("sort", "id,desc"),
                ("sort", "date"),
                ("id.equals", "3"),
            ],
            20,
            100,
        )
        .unwrap();
        assert_eq!(pageable.page, 2);
        assert_eq!(pageable.size, 5);
        assert_eq!(pageable.offset(), 10);
        assert_eq!(
            pageable.sort,
            vec![SortOrder::desc("id"), SortOrder::asc("date")]
        );
    }

    #[test]
    fn several_properties_share_one_direction() {
        assert_eq!(
            parse_sort("date,trackingCode,DESC"),
            vec![SortOrder::desc("date"), SortOrder::desc("trackingCode")]
        );
    }

    #[test]
    fn size_is_clamped() {
        let pageable = Pageable::from_query_pairs([("size", "5000")], 20, 100).unwrap();
        assert_eq!(pageable.size, 100);
        let pageable = Pageable::from_query_pairs([("size", "0")], 20, 100).unwrap();
        assert_eq!(pageable.size, 1);
    }

    #[test]
    fn bad_page_number_is_rejected() {
        assert!(Pageable::from_query_pairs([("page", "-1")], 20, 100).is_err());
    }

    #[test]
    fn page_beyond_offset_range_is_rejected() {
        let err = Pageable::from_query_pairs([("page", "1000000000000000000")], 20, 100).unwrap_err();
        assert!(matches!(err, CriteriaError::Malformed { ref field, .. } if field == "page"));
        assert!(Pageable::from_query_pairs([("page", "18446744073709551615"), ("size", "1")], 20, 100).is_err());

        let edge = (MAX_WINDOW / 20).to_string();
        let pageable = Pageable::from_query_pairs([("page", edge.as_str())], 20, 100).unwrap();
        assert!(pageable.offset() <= MAX_WINDOW);
    }

    #[test]
    fn offset_never_leaves_the_bindable_range() {
        assert_eq!(Pageable::of(u64::MAX, u64::MAX).offset(), MAX_WINDOW);
        assert_eq!(Pageable::of(0, u64::MAX).size, MAX_WINDOW);
    }

    #[test]
    fn last_possible_page_has_no_next() {
        let page = Page::new(Vec::<u8>::new(), &Pageable::of(u64::MAX, 1), 3);
        assert!(!page.has_next());
        assert!(page.has_previous());
    }

    #[test]
    fn page_navigation() {
        let page = Page::new(vec![1, 2], &Pageable::of(1, 2), 5);
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next());
        assert!(page.has_previous());

        let last = Page::new(vec![5], &Pageable::of(2, 2), 5);
        assert!(!last.has_next());
    }
}
