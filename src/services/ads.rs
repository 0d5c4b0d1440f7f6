use crate::error::{Result, VideyError};
use rand::seq::IndexedRandom;
use rand::Rng;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdLink {
    pub id: String,
    pub url: String,
    pub network: String,
}

impl AdLink {
    fn new(id: &str, url: &str, network: &str) -> Self {
        Self {
            id: id.to_string(),
            url: url.to_string(),
            network: network.to_string(),
        }
    }
}

/// Redirect links, pop-under targets and external player hosts.
#[derive(Debug, Clone)]
pub struct AdRotation {
    links: Vec<AdLink>,
    popunders: Vec<String>,
    embed_bases: Vec<String>,
}

impl AdRotation {
    pub fn new(links: Vec<AdLink>, popunders: Vec<String>, embed_bases: Vec<String>) -> Self {
        Self {
            links,
            popunders,
            embed_bases,
        }
    }

    pub fn links(&self) -> &[AdLink] {
        &self.links
    }

    /// Target URL for a redirect id. Ids are matched exactly.
    pub fn resolve(&self, id: &str) -> Result<&AdLink> {
        self.links
            .iter()
            .find(|link| link.id == id)
            .ok_or_else(|| VideyError::NotFound(format!("Unknown redirect: {}", id)))
    }

    pub fn random_popunder<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        self.popunders.choose(rng).map(String::as_str)
    }

    /// External player URL for a catalog entry, on a randomly chosen host.
    pub fn embed_url<R: Rng + ?Sized>(&self, rng: &mut R, video_id: &str) -> Option<String> {
        self.embed_bases
            .choose(rng)
            .map(|base| format!("{}{}", base, video_id))
    }
}

impl Default for AdRotation {
    fn default() -> Self {
        Self::new(
            vec![
                AdLink::new(
                    "b5Hsb8Hd",
                    "https://www.effectiveratecpm.com/mq9nji1yb?key=566feec5e7d369956bdb7a53a074fec2",
                    "Adsterra",
                ),
                AdLink::new(
                    "Gs86shHs",
                    "https://lovingassociate.com/bG3SVz0xP.3/pfvobLmSVjJ/ZjDf0Q0tOODvQsziOlDkMI3ILHT/QQ4dN/DZMF4YMizmg-",
                    "HillTop",
                ),
                AdLink::new("G6shSh7H", "https://so-gr3at3.com/go/1239096", "Roller"),
                AdLink::new("Hsh4hI8s", "https://behoneyono.com/ilcDrCNYWkby/94691", "Galaxion"),
            ],
            [
                "https://so-gr3at3.com/go/1237187",
                "https://malakingannets.com/ic4wSTmH5JgaK77X/94691",
                "https://meowadvertising.com/hc70ax5ct2?key=7df760c08ecfe3653c332fbdce13d42a",
                "https://superficial-work.com/ba3RV.0YPk3Xp/v/b/mOVsJHZqDV0Y0KO/DVQWzkOvD/MK3pLvT/QJ4JNmDyM/4MMozHgS",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            vec!["https://doobs.top/e/".to_string()],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn resolves_known_ids_only() {
        let ads = AdRotation::default();
        assert_eq!(ads.resolve("G6shSh7H").unwrap().network, "Roller");
        assert!(matches!(ads.resolve("g6shsh7h"), Err(VideyError::NotFound(_))));
        assert!(ads.resolve("").is_err());
    }

    #[test]
    fn random_picks_come_from_the_lists() {
        let ads = AdRotation::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let url = ads.random_popunder(&mut rng).unwrap();
            assert!(ads.popunders.iter().any(|p| p == url));
        }
        assert_eq!(
            ads.embed_url(&mut rng, "abc123").as_deref(),
            Some("https://doobs.top/e/abc123")
        );
    }

    #[test]
    fn empty_rotation_yields_nothing() {
        let ads = AdRotation::new(Vec::new(), Vec::new(), Vec::new());
        let mut rng = StdRng::seed_from_u64(1);
        assert!(ads.random_popunder(&mut rng).is_none());
        assert!(ads.embed_url(&mut rng, "x").is_none());
    }
}
