//! Pagination controller for the patient table

use crate::models::{PatientPage, PatientRow};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaginationCursor {
    pub next_page: u32,
    pub has_more: bool,
}

impl Default for PaginationCursor {
    fn default() -> Self {
        PaginationCursor {
            next_page: 1,
            has_more: true,
        }
    }
}

/// State of the "load more" affordance
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadMore {
    #[default]
    Ready,
    /// A page request is outstanding; further loads are refused
    InFlight,
    /// End of data reached; only a reset brings it back
    Removed,
}

/// A page request handed to the network layer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub seq: u64,
    pub page: u32,
}

#[derive(Debug, Default)]
pub struct PatientTable {
    rows: Vec<PatientRow>,
    cursor: PaginationCursor,
    load_more: LoadMore,
    /// Bumped on every request and reset; responses carry it back
    seq: u64,
    loaded: bool,
}

impl PatientTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[PatientRow] {
        &self.rows
    }

    pub fn cursor(&self) -> PaginationCursor {
        self.cursor
    }

    pub fn load_more(&self) -> LoadMore {
        self.load_more
    }

    /// Whether any page has been requested since the last reset
    pub fn has_loaded(&self) -> bool {
        self.loaded
    }

    /// Drop all rows and start again from page 1
    pub fn reset(&mut self) {
        self.rows.clear();
        self.cursor = PaginationCursor::default();
        self.load_more = LoadMore::Ready;
        self.seq += 1;
        self.loaded = false;
    }

    /// Claim the affordance for the next page. None while a request is in
    /// flight or after the end of data.
    pub fn begin_load(&mut self) -> Option<PageRequest> {
        if self.load_more != LoadMore::Ready || !self.cursor.has_more {
            return None;
        }
        self.seq += 1;
        self.load_more = LoadMore::InFlight;
        self.loaded = true;
        Some(PageRequest {
            seq: self.seq,
            page: self.cursor.next_page,
        })
    }

    fn accepts(&self, request: PageRequest) -> bool {
        request.seq == self.seq && self.load_more == LoadMore::InFlight
    }

    /// Append a fetched page. Returns the number of appended rows, or None
    /// when the response belongs to a superseded request.
    pub fn apply_page(&mut self, request: PageRequest, page: PatientPage) -> Option<usize> {
        if !self.accepts(request) {
            tracing::debug!(seq = request.seq, page = request.page, "Discarding stale patient page");
            return None;
        }

        let appended = page.patients.len();
        self.rows.extend(page.patients);
        self.cursor = PaginationCursor {
            next_page: page.next_page.unwrap_or(request.page.saturating_add(1)),
            has_more: page.has_more,
        };
        self.load_more = if page.has_more {
            LoadMore::Ready
        } else {
            LoadMore::Removed
        };
        Some(appended)
    }

    /// Release the affordance after a failed load; the cursor stays put.
    pub fn fail(&mut self, request: PageRequest) -> bool {
        if !self.accepts(request) {
            return false;
        }
        self.load_more = LoadMore::Ready;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: u32) -> PatientRow {
        PatientRow {
            patient_id: Some(id.to_string()),
            ..Default::default()
        }
    }

    fn page(ids: &[u32], has_more: bool, next_page: Option<u32>) -> PatientPage {
        PatientPage {
            patients: ids.iter().map(|id| row(*id)).collect(),
            has_more,
            next_page,
        }
    }

    #[test]
    fn test_pages_append_in_server_order() {
        let mut table = PatientTable::new();
        let first = table.begin_load().unwrap();
        assert_eq!(first.page, 1);
        assert_eq!(table.apply_page(first, page(&[9, 8], true, Some(2))), Some(2));

        let second = table.begin_load().unwrap();
        assert_eq!(second.page, 2);
        assert_eq!(table.apply_page(second, page(&[7, 6, 5], false, Some(3))), Some(3));

        let ids: Vec<_> = table.rows().iter().map(|r| r.cells()[0].clone()).collect();
        assert_eq!(ids, vec!["9", "8", "7", "6", "5"]);
        assert_eq!(table.load_more(), LoadMore::Removed);
        assert!(table.begin_load().is_none());
    }

    #[test]
    fn test_only_one_page_request_at_a_time() {
        let mut table = PatientTable::new();
        assert!(table.begin_load().is_some());
        assert!(table.begin_load().is_none());
        assert_eq!(table.load_more(), LoadMore::InFlight);
    }

    #[test]
    fn test_failure_keeps_cursor_for_retry() {
        let mut table = PatientTable::new();
        let first = table.begin_load().unwrap();
        table.apply_page(first, page(&[1], true, Some(2)));

        let attempt = table.begin_load().unwrap();
        assert!(table.fail(attempt));
        assert_eq!(table.cursor().next_page, 2);
        assert_eq!(table.load_more(), LoadMore::Ready);
        assert_eq!(table.rows().len(), 1);

        let retry = table.begin_load().unwrap();
        assert_eq!(retry.page, 2);
    }

    #[test]
    fn test_missing_next_page_falls_back_to_increment() {
        let mut table = PatientTable::new();
        let first = table.begin_load().unwrap();
        table.apply_page(first, page(&[1], true, None));
        assert_eq!(table.cursor().next_page, 2);
    }

    #[test]
    fn test_last_possible_page_does_not_overflow_cursor() {
        let mut table = PatientTable::new();
        let first = table.begin_load().unwrap();
        table.apply_page(first, page(&[1], true, Some(u32::MAX)));

        let last = table.begin_load().unwrap();
        assert_eq!(last.page, u32::MAX);
        assert_eq!(table.apply_page(last, page(&[2], true, None)), Some(1));
        assert_eq!(table.cursor().next_page, u32::MAX);
    }

    #[test]
    fn test_reset_discards_in_flight_page() {
        let mut table = PatientTable::new();
        let request = table.begin_load().unwrap();
        table.reset();
        assert_eq!(table.apply_page(request, page(&[1], false, None)), None);
        assert!(table.rows().is_empty());
        assert_eq!(table.load_more(), LoadMore::Ready);
    }
}
