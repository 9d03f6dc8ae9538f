//! Static navigation configuration
//!
//! The site header renders one entry per category listed here. The list is
//! maintained by hand alongside the frontend routes and is the reference for
//! which categories the database is expected to contain.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::BTreeMap;

/// Navigation metadata for one category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavCategory {
    /// Category slug, the key shared with the database
    pub slug: &'static str,
    /// Menu label
    pub label: &'static str,
    /// Frontend route
    pub href: &'static str,
    /// Tagline shown on the category landing page
    pub description: &'static str,
}

const NAV_CATEGORIES: &[NavCategory] = &[
    NavCategory {
        slug: "politics",
        label: "Politics",
        href: "/category/politics",
        description: "Government, elections and policy",
    },
    NavCategory {
        slug: "world",
        label: "World",
        href: "/category/world",
        description: "International news",
    },
    NavCategory {
        slug: "business",
        label: "Business",
        href: "/category/business",
        description: "Markets, companies and the economy",
    },
    NavCategory {
        slug: "technology",
        label: "Technology",
        href: "/category/technology",
        description: "Tech industry, gadgets and the internet",
    },
    NavCategory {
        slug: "science",
        label: "Science",
        href: "/category/science",
        description: "Research, space and the environment",
    },
    NavCategory {
        slug: "health",
        label: "Health",
        href: "/category/health",
        description: "Medicine, wellbeing and public health",
    },
    NavCategory {
        slug: "sports",
        label: "Sports",
        href: "/category/sports",
        description: "Results, transfers and analysis",
    },
    NavCategory {
        slug: "entertainment",
        label: "Entertainment",
        href: "/category/entertainment",
        description: "Film, music and television",
    },
    NavCategory {
        slug: "culture",
        label: "Culture",
        href: "/category/culture",
        description: "Books, art and ideas",
    },
    NavCategory {
        slug: "opinion",
        label: "Opinion",
        href: "/category/opinion",
        description: "Columns and editorials",
    },
];

static CATEGORY_NAV: Lazy<BTreeMap<&'static str, NavCategory>> = Lazy::new(|| {
    NAV_CATEGORIES
        .iter()
        .map(|entry| (entry.slug, *entry))
        .collect()
});

/// Category slugs the navigation expects, sorted
pub fn category_keys() -> Vec<String> {
    CATEGORY_NAV.keys().map(|slug| slug.to_string()).collect()
}

/// Navigation entry for a slug
pub fn lookup(slug: &str) -> Option<&'static NavCategory> {
    CATEGORY_NAV.get(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugs_are_unique() {
        assert_eq!(CATEGORY_NAV.len(), NAV_CATEGORIES.len());
    }

    #[test]
    fn test_keys_are_sorted() {
        let keys = category_keys();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert!(keys.contains(&"technology".to_string()));
    }

    #[test]
    fn test_href_matches_slug() {
        for (slug, entry) in CATEGORY_NAV.iter() {
            assert_eq!(entry.href, format!("/category/{}", slug));
            assert!(!entry.label.is_empty());
        }
    }

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("sports").map(|c| c.label), Some("Sports"));
        assert!(lookup("weather").is_none());
    }
}
