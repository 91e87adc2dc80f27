use anyhow::Result;
use reqwest::Url;

pub const QUERY_PARAM: &str = "q";

/// The address bar of the search page. Writes replace the current entry,
/// they never add to the history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    url: Url,
}

impl Location {
    pub fn new(url: Url) -> Location {
        Location { url }
    }

    pub fn parse(url: &str) -> Result<Location> {
        Ok(Location::new(Url::parse(url)?))
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// First value of `name`, if present.
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// Sets `name` to `value` in place, dropping any earlier values of
    /// `name` and keeping every other parameter in order.
    pub fn replace_query_param(&mut self, name: &str, value: &str) {
        let others: Vec<(String, String)> = self
            .url
            .query_pairs()
            .filter(|(key, _)| key != name)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        let mut pairs = self.url.query_pairs_mut();
        pairs.clear();
        for (k, v) in &others {
            pairs.append_pair(k, v);
        }
        pairs.append_pair(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_query_param() {
        let loc = Location::parse("http://localhost/search?q=rust&page=2").unwrap();
        assert_eq!(loc.query_param("q").as_deref(), Some("rust"));
        assert_eq!(loc.query_param("page").as_deref(), Some("2"));
        assert_eq!(loc.query_param("language"), None);
    }

    #[test]
    fn test_decodes_query_param() {
        let loc = Location::parse("http://localhost/search?q=rust%20%26%20go").unwrap();
        assert_eq!(loc.query_param("q").as_deref(), Some("rust & go"));
    }

    #[test]
    fn test_replace_keeps_other_params() {
        let mut loc = Location::parse("http://localhost/search?page=2&q=old").unwrap();
        loc.replace_query_param("q", "new query");
        assert_eq!(loc.query_param("q").as_deref(), Some("new query"));
        assert_eq!(loc.query_param("page").as_deref(), Some("2"));
        assert_eq!(loc.url().query_pairs().filter(|(k, _)| k == "q").count(), 1);
    }

    #[test]
    fn test_replace_on_bare_url() {
        let mut loc = Location::parse("http://localhost/search").unwrap();
        loc.replace_query_param("q", "a&b");
        assert_eq!(loc.query_param("q").as_deref(), Some("a&b"));
        assert_eq!(loc.url().path(), "/search");
    }
}
