use crate::client::ApiClient;
use crate::error::Result;
use crate::models::CatalogEntry;
use crate::services::pagination::{paginate, total_pages, Page, PageWindow, Pager, DEFAULT_PER_PAGE};
use rand::seq::SliceRandom;
use rand::Rng;

/// Browsable list of videos: shuffled once when loaded, then searched and
/// paged locally.
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    filtered: Vec<CatalogEntry>,
    per_page: usize,
    pager: Pager,
}

impl Catalog {
    pub fn new<R: Rng + ?Sized>(mut entries: Vec<CatalogEntry>, rng: &mut R) -> Self {
        entries.shuffle(rng);
        let pages = total_pages(entries.len(), DEFAULT_PER_PAGE);

        Self {
            filtered: entries.clone(),
            entries,
            per_page: DEFAULT_PER_PAGE,
            pager: Pager::new(pages),
        }
    }

    pub async fn load(api: &ApiClient) -> Result<Self> {
        let entries: Vec<CatalogEntry> = api.get("/api/videos").await?;
        tracing::debug!("Catalog loaded with {} videos", entries.len());
        Ok(Self::new(entries, &mut rand::rng()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Case-insensitive title filter. Always returns to the first page.
    pub fn search(&mut self, query: &str) {
        let needle = query.trim().to_lowercase();
        self.filtered = self
            .entries
            .iter()
            .filter(|e| e.title.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        self.pager
            .reset(total_pages(self.filtered.len(), self.per_page));
    }

    pub fn results(&self) -> &[CatalogEntry] {
        &self.filtered
    }

    pub fn go_to(&mut self, page: usize) -> bool {
        self.pager.go_to(page)
    }

    pub fn current_page(&self) -> Page<CatalogEntry> {
        paginate(&self.filtered, self.pager.current(), self.per_page)
    }

    pub fn window(&self) -> PageWindow {
        self.pager.window()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn entries(n: usize) -> Vec<CatalogEntry> {
        (1..=n)
            .map(|i| CatalogEntry {
                id: format!("v{}", i),
                title: if i % 2 == 0 {
                    format!("Pantai {}", i)
                } else {
                    format!("Gunung {}", i)
                },
                url: format!("https://cdn.videy.co/v{}.mp4", i),
            })
            .collect()
    }

    #[test]
    fn shuffle_keeps_every_entry() {
        let catalog = Catalog::new(entries(25), &mut StdRng::seed_from_u64(3));
        assert_eq!(catalog.len(), 25);
        let mut ids: Vec<_> = catalog.results().iter().map(|e| e.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 25);
        assert_eq!(catalog.current_page().items.len(), 10);
        assert_eq!(catalog.current_page().total_pages, 3);
    }

    #[test]
    fn search_is_case_insensitive_and_resets_page() {
        let mut catalog = Catalog::new(entries(30), &mut StdRng::seed_from_u64(3));
        assert!(catalog.go_to(3));

        catalog.search("PANTAI");
        assert_eq!(catalog.results().len(), 15);
        assert!(catalog.results().iter().all(|e| e.title.starts_with("Pantai")));
        assert_eq!(catalog.current_page().page, 1);
        assert_eq!(catalog.current_page().total_pages, 2);
        assert!(!catalog.go_to(3));

        catalog.search("");
        assert_eq!(catalog.results().len(), 30);
    }

    #[test]
    fn find_by_id() {
        let catalog = Catalog::new(entries(3), &mut StdRng::seed_from_u64(1));
        assert_eq!(catalog.find("v2").unwrap().title, "Pantai 2");
        assert!(catalog.find("v9").is_none());
    }
}
