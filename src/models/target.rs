/// A path the scanner is allowed to navigate to
///
/// Only constructed through [`NavigationTarget::new`], which checks the path
/// against the expected prefix, so holding one means it is safe to navigate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NavigationTarget {
    path: String,
    prefix_len: usize,
}

impl NavigationTarget {
    /// Accept `path` only if it starts with `prefix`
    pub fn new(path: &str, prefix: &str) -> Option<Self> {
        if prefix.is_empty() || !path.starts_with(prefix) {
            return None;
        }
        Some(Self {
            path: path.to_string(),
            prefix_len: prefix.len(),
        })
    }

    /// The full path, e.g. `/products/F101`
    pub fn path(&self) -> &str {
        &self.path
    }

    /// First path segment after the prefix (the product article number), if any
    pub fn article_no(&self) -> Option<&str> {
        self.path[self.prefix_len..]
            .split('/')
            .next()
            .filter(|s| !s.is_empty())
    }
}

impl std::fmt::Display for NavigationTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_prefix() {
        let target = NavigationTarget::new("/products/F101", "/products/").unwrap();
        assert_eq!(target.path(), "/products/F101");
        assert_eq!(target.article_no(), Some("F101"));
        assert!(NavigationTarget::new("/about", "/products/").is_none());
        assert!(NavigationTarget::new("/products", "/products/").is_none());
    }

    #[test]
    fn test_article_no_missing() {
        let target = NavigationTarget::new("/products/", "/products/").unwrap();
        assert_eq!(target.article_no(), None);
        let nested = NavigationTarget::new("/products/A101/reviews", "/products/").unwrap();
        assert_eq!(nested.article_no(), Some("A101"));
    }
}
