//! `application/x-www-form-urlencoded` decoding for query strings and bodies.

use percent_encoding::percent_decode_str;

/// Decoded `key=value` pairs in arrival order. Keys may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    pairs: Vec<(String, String)>,
}

impl Form {
    pub fn parse(input: &str) -> Self {
        let pairs = input
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((key, value)) => (decode(key), decode(value)),
                None => (decode(pair), String::new()),
            })
            .collect();
        Self { pairs }
    }

    /// Query string pairs followed by body pairs.
    pub fn merged(query: Option<&str>, body: &str) -> Self {
        let mut form = Self::parse(query.unwrap_or_default());
        form.pairs.extend(Self::parse(body).pairs);
        form
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value for `key`, in order.
    pub fn get_all(&self, key: &str) -> Vec<String> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .collect()
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| v.trim().parse().ok())
    }
}

fn decode(text: &str) -> String {
    let text = text.replace('+', " ");
    percent_decode_str(&text).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_percent_escapes_and_repeats() {
        let form = Form::parse("title=%E3%83%86%E3%82%B9%E3%83%88&link=a&link=b%2Fc&flag");
        assert_eq!(form.get("title"), Some("テスト"));
        assert_eq!(form.get_all("link"), ["a", "b/c"]);
        assert_eq!(form.get("flag"), Some(""));
        assert_eq!(form.get("missing"), None);
    }

    #[test]
    fn plus_is_a_space() {
        let form = Form::parse("q=a+b%2Bc");
        assert_eq!(form.get("q"), Some("a b+c"));
    }

    #[test]
    fn merged_keeps_query_first() {
        let form = Form::merged(Some("id=1&timeline_key=k"), "title=x&id=2");
        assert_eq!(form.get_i64("id"), Some(1));
        assert_eq!(form.get_all("id"), ["1", "2"]);
        assert_eq!(form.get("title"), Some("x"));
        assert_eq!(Form::merged(None, "").get("id"), None);
    }
}
