//! Which trial, if any, the viewer should display.
//!
//! The host derives a [`Selection`] from its navigation state, normally a
//! query string of the form `?show-trial=<index>`.

use percent_encoding::percent_decode_str;
use url::Url;

/// Query prefix that opens the trial view.
pub const SHOW_TRIAL_PREFIX: &str = "?show-trial=";

/// Visibility flag plus the positional index of the selected trial.
///
/// A visible selection with no index (malformed query value) resolves to the
/// hidden state, exactly like an index that is out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Selection {
    pub visible: bool,
    pub trial_index: Option<usize>,
}

impl Selection {
    pub fn hidden() -> Self {
        Self::default()
    }

    pub fn show(trial_index: usize) -> Self {
        Self {
            visible: true,
            trial_index: Some(trial_index),
        }
    }

    /// Parse a raw query string such as `?show-trial=3`.
    ///
    /// The value is percent-decoded and must be a non-negative integer; any
    /// further parameters after `&` are ignored.
    pub fn from_query(query: &str) -> Self {
        let Some(raw_value) = query.strip_prefix(SHOW_TRIAL_PREFIX) else {
            return Self::hidden();
        };
        let raw_value = raw_value.split('&').next().unwrap_or_default();
        let decoded = percent_decode_str(raw_value).decode_utf8_lossy();
        Self {
            visible: true,
            trial_index: decoded.trim().parse::<usize>().ok(),
        }
    }

    /// Parse the query component of a full URL.
    pub fn from_url(url: &Url) -> Self {
        match url.query() {
            Some(query) => Self::from_query(&format!("?{query}")),
            None => Self::hidden(),
        }
    }

    /// Query string that reproduces this selection. Closing the view maps to
    /// the empty query.
    pub fn to_query(&self) -> String {
        match (self.visible, self.trial_index) {
            (true, Some(index)) => format!("{SHOW_TRIAL_PREFIX}{index}"),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_show_trial_query() {
        assert_eq!(Selection::from_query("?show-trial=4"), Selection::show(4));
    }

    #[test]
    fn missing_prefix_is_hidden() {
        assert_eq!(Selection::from_query(""), Selection::hidden());
        assert_eq!(Selection::from_query("?other=1"), Selection::hidden());
    }

    #[test]
    fn malformed_index_is_visible_without_index() {
        for query in ["?show-trial=", "?show-trial=abc", "?show-trial=-1", "?show-trial=1.5"] {
            let selection = Selection::from_query(query);
            assert!(selection.visible, "query: {query}");
            assert_eq!(selection.trial_index, None, "query: {query}");
        }
    }

    #[test]
    fn percent_encoded_value_is_decoded() {
        assert_eq!(Selection::from_query("?show-trial=%31%32"), Selection::show(12));
        assert_eq!(Selection::from_query("?show-trial=%207"), Selection::show(7));
    }

    #[test]
    fn trailing_parameters_are_ignored() {
        assert_eq!(Selection::from_query("?show-trial=2&tab=log"), Selection::show(2));
    }

    #[test]
    fn from_url_reads_query_component() {
        let url = Url::parse("https://example.com/mocap/folder?show-trial=9").unwrap();
        assert_eq!(Selection::from_url(&url), Selection::show(9));
        let url = Url::parse("https://example.com/mocap/folder").unwrap();
        assert_eq!(Selection::from_url(&url), Selection::hidden());
    }

    #[test]
    fn to_query_round_trips_and_closes() {
        assert_eq!(Selection::show(3).to_query(), "?show-trial=3");
        assert_eq!(Selection::from_query(&Selection::show(3).to_query()), Selection::show(3));
        assert_eq!(Selection::hidden().to_query(), "");
    }
}
