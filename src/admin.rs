//! Admin dashboard state: the fetched list, client-side pagination, counters.

use std::collections::HashSet;
use std::ops::Range;

use tracing::info;

use crate::client::PanelistApi;
use crate::error::Result;
use crate::models::Panelist;

/// Rows per table page.
pub const PAGE_SIZE: usize = 50;

/// Client-side pager over an in-memory list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    /// Zero-based page index.
    pub current: usize,
    pub page_size: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self {
            current: 0,
            page_size: PAGE_SIZE,
        }
    }
}

impl Pager {
    /// ceil(total / page_size); zero for an empty list.
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size)
    }

    pub fn has_prev(&self) -> bool {
        self.current > 0
    }

    pub fn has_next(&self, total: usize) -> bool {
        self.current + 1 < self.page_count(total)
    }

    /// Previous page; no-op on the first page.
    pub fn prev(&mut self) {
        if self.has_prev() {
            self.current -= 1;
        }
    }

    /// Next page; no-op on the last page.
    pub fn next(&mut self, total: usize) {
        if self.has_next(total) {
            self.current += 1;
        }
    }

    /// Pull the current page back inside the list after it shrinks.
    pub fn clamp(&mut self, total: usize) {
        self.current = self.current.min(self.page_count(total).saturating_sub(1));
    }

    /// Index range of the current page.
    pub fn range(&self, total: usize) -> Range<usize> {
        let start = (self.current * self.page_size).min(total);
        let end = (start + self.page_size).min(total);
        start..end
    }
}

/// Summary counters shown on the statistics tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSummary {
    pub total: usize,
    /// Last record of the API response. This follows API order and is not a
    /// creation-time guarantee.
    pub latest: Option<String>,
    pub distinct_domains: usize,
}

/// The panelist list as fetched from the API.
#[derive(Debug, Clone, Default)]
pub struct PanelistBoard {
    panelists: Vec<Panelist>,
    pub pager: Pager,
}

impl PanelistBoard {
    pub fn new(panelists: Vec<Panelist>) -> Self {
        Self {
            panelists,
            pager: Pager::default(),
        }
    }

    /// Replace the list with a fresh fetch, back on page one.
    pub fn replace(&mut self, panelists: Vec<Panelist>) {
        self.panelists = panelists;
        self.pager = Pager::default();
    }

    pub fn all(&self) -> &[Panelist] {
        &self.panelists
    }

    pub fn len(&self) -> usize {
        self.panelists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panelists.is_empty()
    }

    /// Rows of the current page.
    pub fn page(&self) -> &[Panelist] {
        &self.panelists[self.pager.range(self.panelists.len())]
    }

    pub fn page_count(&self) -> usize {
        self.pager.page_count(self.panelists.len())
    }

    pub fn next_page(&mut self) {
        self.pager.next(self.panelists.len());
    }

    pub fn prev_page(&mut self) {
        self.pager.prev();
    }

    /// Drop the record with this id after a confirmed server delete.
    ///
    /// Returns whether a record was removed.
    pub fn remove(&mut self, id: i64) -> bool {
        let before = self.panelists.len();
        self.panelists.retain(|p| p.id != id);
        self.pager.clamp(self.panelists.len());
        self.panelists.len() != before
    }

    pub fn summary(&self) -> BoardSummary {
        let distinct_domains = self
            .panelists
            .iter()
            .flat_map(|p| p.domaines.iter())
            .collect::<HashSet<_>>()
            .len();

        BoardSummary {
            total: self.panelists.len(),
            latest: self.panelists.last().map(Panelist::display_name),
            distinct_domains,
        }
    }
}

/// Fetch the full list with the session token.
pub async fn fetch_panelists<A: PanelistApi>(api: &A, token: &str) -> Result<Vec<Panelist>> {
    let panelists = api.list_panelists(token).await?;
    info!("Loaded {} panelists", panelists.len());
    Ok(panelists)
}

/// Delete one panelist on the server; returns the id for local removal.
pub async fn delete_panelist<A: PanelistApi>(api: &A, token: &str, id: i64) -> Result<i64> {
    api.delete_panelist(token, id).await?;
    info!("Deleted panelist {id}");
    Ok(id)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::{Domains, Panelist};

    pub fn panelist(id: i64, domaines: &[&str], autre: Option<&str>) -> Panelist {
        Panelist {
            id,
            nom: format!("Nom{id}"),
            prenom: format!("Prenom{id}"),
            email: format!("p{id}@example.ci"),
            contact: format!("07000000{id:02}"),
            poste: "Chargé d'études".to_string(),
            organisation: "MTND".to_string(),
            domaines: Domains::new(domaines.iter().map(|s| s.to_string()).collect()),
            autre_domaine: autre.map(str::to_string),
            experience: id as u32,
            photo: None,
        }
    }

    pub fn many(n: usize) -> Vec<Panelist> {
        (1..=n as i64).map(|id| panelist(id, &["Santé"], None)).collect()
    }

    /// Three records whose domain union is {Santé, Éducation, Autre}.
    pub fn sample() -> Vec<Panelist> {
        vec![
            panelist(1, &["Santé"], None),
            panelist(2, &["Santé", "Éducation"], None),
            panelist(3, &["Autre"], Some("IA")),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{many, sample};
    use super::*;
    use crate::client::mock::MockApi;
    use crate::error::AppError;

    #[test]
    fn test_page_count() {
        let pager = Pager::default();
        assert_eq!(pager.page_count(0), 0);
        assert_eq!(pager.page_count(1), 1);
        assert_eq!(pager.page_count(50), 1);
        assert_eq!(pager.page_count(51), 2);
        assert_eq!(pager.page_count(120), 3);
    }

    #[test]
    fn test_navigation_bounds_are_noops() {
        let mut board = PanelistBoard::new(many(120));

        board.prev_page();
        assert_eq!(board.pager.current, 0);

        board.next_page();
        board.next_page();
        assert_eq!(board.pager.current, 2);
        assert_eq!(board.page().len(), 20);

        board.next_page();
        assert_eq!(board.pager.current, 2);
        assert!(!board.pager.has_next(board.len()));
    }

    #[test]
    fn test_empty_board_has_no_navigation() {
        let mut board = PanelistBoard::default();
        assert!(!board.pager.has_prev());
        assert!(!board.pager.has_next(0));
        board.next_page();
        assert_eq!(board.pager.current, 0);
        assert!(board.page().is_empty());
    }

    #[test]
    fn test_page_slices() {
        let mut board = PanelistBoard::new(many(51));
        assert_eq!(board.page().len(), 50);
        assert_eq!(board.page()[0].id, 1);

        board.next_page();
        assert_eq!(board.page().len(), 1);
        assert_eq!(board.page()[0].id, 51);
    }

    #[test]
    fn test_remove_exactly_one_id() {
        let mut board = PanelistBoard::new(sample());
        assert!(board.remove(2));

        let ids: Vec<_> = board.all().iter().map(|p| p.id).collect();
        assert_eq!(ids, [1, 3]);
        assert!(!board.remove(2));
    }

    #[test]
    fn test_remove_clamps_page() {
        let mut board = PanelistBoard::new(many(51));
        board.next_page();
        assert!(board.remove(51));
        assert_eq!(board.pager.current, 0);
        assert_eq!(board.page().len(), 50);
    }

    #[test]
    fn test_summary_counts_distinct_domains() {
        let board = PanelistBoard::new(sample());
        let summary = board.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.distinct_domains, 3);
        assert_eq!(summary.latest.as_deref(), Some("Nom3 Prenom3"));
    }

    #[test]
    fn test_summary_empty() {
        let summary = PanelistBoard::default().summary();
        assert_eq!(summary.total, 0);
        assert_eq!(summary.latest, None);
        assert_eq!(summary.distinct_domains, 0);
    }

    #[test]
    fn test_replace_resets_page() {
        let mut board = PanelistBoard::new(many(120));
        board.next_page();
        board.replace(many(10));
        assert_eq!(board.pager.current, 0);
        assert_eq!(board.len(), 10);
    }

    #[tokio::test]
    async fn test_fetch_sends_token() {
        let api = MockApi {
            panelists: std::sync::Mutex::new(sample()),
            ..Default::default()
        };

        let list = fetch_panelists(&api, "tok").await.unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(api.calls(), ["list_panelists:tok"]);
    }

    #[tokio::test]
    async fn test_delete_then_remove_locally() {
        let api = MockApi {
            panelists: std::sync::Mutex::new(sample()),
            ..Default::default()
        };
        let mut board = PanelistBoard::new(sample());

        let id = delete_panelist(&api, "tok", 1).await.unwrap();
        board.remove(id);

        assert_eq!(board.len(), 2);
        assert!(board.all().iter().all(|p| p.id != 1));
        assert_eq!(api.calls(), ["delete_panelist:tok:1"]);
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_list() {
        let api = MockApi {
            delete_status: Some(500),
            ..Default::default()
        };
        let board = PanelistBoard::new(sample());

        let err = delete_panelist(&api, "tok", 1).await.unwrap_err();
        assert!(matches!(err, AppError::Rejected { status: 500 }));
        assert_eq!(board.len(), 3);
    }
}
