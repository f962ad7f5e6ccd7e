use crate::NodeId;
use crc32fast::Hasher;

/// Fixed-width hex seed for ids generated inside one page.
///
/// Case and surrounding whitespace are ignored, so `About Us` and `about us`
/// share a seed.
pub fn slug_seed(slug: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(slug.trim().to_lowercase().as_bytes());
    format!("{:08x}", hasher.finalize())
}

/// Hands out `<seed>-<n>` node ids for one page
#[derive(Debug, Clone)]
pub struct IDGenerator {
    seed: String,
    last: u32,
}

impl IDGenerator {
    pub fn for_page(slug: &str) -> Self {
        Self {
            seed: slug_seed(slug),
            last: 0,
        }
    }

    /// Continue numbering after the generated ids already present in `existing`
    pub fn resume<'a>(slug: &str, existing: impl IntoIterator<Item = &'a NodeId>) -> Self {
        let mut ids = Self::for_page(slug);
        for id in existing {
            ids.observe(id.as_str());
        }
        ids
    }

    pub fn next_id(&mut self) -> NodeId {
        self.last += 1;
        NodeId::new(format!("{}-{}", self.seed, self.last))
    }

    /// Skip past `id` if this generator could have produced it
    pub fn observe(&mut self, id: &str) {
        let number = id
            .strip_prefix(self.seed.as_str())
            .and_then(|rest| rest.strip_prefix('-'))
            .and_then(|n| n.parse::<u32>().ok());

        if let Some(n) = number {
            self.last = self.last.max(n);
        }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_stable_per_slug() {
        assert_eq!(slug_seed("home"), slug_seed("home"));
        assert_eq!(slug_seed("About Us"), slug_seed(" about us "));
        assert_ne!(slug_seed("home"), slug_seed("about"));
        assert_eq!(slug_seed("home").len(), 8);
    }

    #[test]
    fn test_ids_count_up_from_one() {
        let mut ids = IDGenerator::for_page("home");
        let seed = ids.seed().to_string();

        assert_eq!(ids.next_id(), NodeId::new(format!("{}-1", seed)));
        assert_eq!(ids.next_id(), NodeId::new(format!("{}-2", seed)));
    }

    #[test]
    fn test_resume_skips_existing_ids() {
        let seed = slug_seed("home");
        let existing = [
            NodeId::new(format!("{}-7", seed)),
            NodeId::new("other-99"),
            NodeId::new(format!("{}-x", seed)),
            NodeId::root(),
        ];

        let mut ids = IDGenerator::resume("home", &existing);
        assert_eq!(ids.next_id(), NodeId::new(format!("{}-8", seed)));
    }
}
