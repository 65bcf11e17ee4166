//! crates/student_admin_core/src/pager.rs
//!
//! Client-side paging over the in-memory snapshot. Stateless: the visible
//! page is always recomputed from the full list and the page number.

/// Rows shown per page.
pub const PAGE_SIZE: usize = 5;

/// Page size requested when pulling the whole snapshot in a single call.
pub const BULK_FETCH_SIZE: usize = 1000;

/// Returns the `page`-th window (1-based) of `records`.
///
/// Pages past the end, and page 0, are empty rather than an error.
pub fn paginate<T>(records: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= records.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(records.len());
    &records[start..end]
}

/// Number of pages needed for `count` records. Never less than 1.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    count.div_ceil(page_size).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_has_a_floor_of_one() {
        assert_eq!(total_pages(0, 5), 1);
        assert_eq!(total_pages(5, 5), 1);
        assert_eq!(total_pages(6, 5), 2);
        assert_eq!(total_pages(11, 5), 3);
    }

    #[test]
    fn pages_never_exceed_the_page_size() {
        let records: Vec<u32> = (0..13).collect();
        for page in 1..=total_pages(records.len(), PAGE_SIZE) {
            assert!(paginate(&records, page, PAGE_SIZE).len() <= PAGE_SIZE);
        }
        assert_eq!(paginate(&records, 3, PAGE_SIZE), &[10, 11, 12]);
    }

    #[test]
    fn concatenated_pages_rebuild_the_snapshot() {
        for len in [0usize, 1, 4, 5, 6, 10, 23] {
            let records: Vec<usize> = (0..len).collect();
            let rebuilt: Vec<usize> = (1..=total_pages(len, PAGE_SIZE))
                .flat_map(|page| paginate(&records, page, PAGE_SIZE).iter().copied())
                .collect();
            assert_eq!(rebuilt, records);
        }
    }

    #[test]
    fn out_of_range_pages_are_empty() {
        let records = [1, 2, 3];
        assert!(paginate(&records, 2, PAGE_SIZE).is_empty());
        assert!(paginate(&records, 0, PAGE_SIZE).is_empty());
        assert!(paginate(&records, usize::MAX, PAGE_SIZE).is_empty());
    }
}
