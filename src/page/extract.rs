//! Pure extraction helpers over fetched HTML.
//!
//! Pages are matched with regexes rather than a DOM parser; the markup
//! involved is a single player iframe and plain anchor tags.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use super::PageError;

/// Compiles a regex at static init; panics on invalid pattern.
fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

static IFRAME_TAG_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"(?is)<iframe\b[^>]*>"));
static ID_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r#"(?is)\bid\s*=\s*["']([^"']*)["']"#));
static SRC_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r#"(?is)\bsrc\s*=\s*["']([^"']*)["']"#));
static SHOW_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r#"(?is)<a\b[^>]*?\bhref\s*=\s*["'](/vaata/[^"']*)["']"#)
});

/// Prefix of the `id` attribute carried by the player iframe.
const MEDIAFRAME_ID_PREFIX: &str = "mediaframe";

/// Stream parameters carried in a player URL's query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerParams {
    /// `stream` parameter: transport locator.
    pub stream: String,
    /// `file` parameter: remote file token.
    pub file: String,
}

/// Returns the `src` of the first iframe whose id starts with `mediaframe`.
///
/// Returns `None` when there is no such iframe or it has no `src`.
#[must_use]
pub fn find_player_url(html: &str) -> Option<String> {
    let tag = IFRAME_TAG_RE.find_iter(html).map(|m| m.as_str()).find(|tag| {
        attribute(tag, &ID_ATTR_RE).is_some_and(|id| id.starts_with(MEDIAFRAME_ID_PREFIX))
    })?;
    attribute(tag, &SRC_ATTR_RE).map(|src| decode_entities(&src))
}

/// Reads the `stream` and `file` query parameters from a player URL.
///
/// Relative player URLs are resolved against `page_url`.
///
/// # Errors
///
/// Returns [`PageError::InvalidPlayerUrl`] if the URL cannot be parsed or
/// either parameter is missing or empty.
pub fn parse_player_params(player_url: &str, page_url: &Url) -> Result<PlayerParams, PageError> {
    let url = page_url
        .join(player_url)
        .map_err(|e| PageError::invalid_player_url(player_url, e.to_string()))?;

    let mut stream = String::new();
    let mut file = String::new();
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "stream" if stream.is_empty() => stream = value.into_owned(),
            "file" if file.is_empty() => file = value.into_owned(),
            _ => {}
        }
    }

    if stream.is_empty() || file.is_empty() {
        return Err(PageError::invalid_player_url(
            player_url,
            "missing stream or file parameter",
        ));
    }
    Ok(PlayerParams { stream, file })
}

/// Collects absolute URLs of every `/vaata/...` link, first occurrence first.
#[must_use]
pub fn find_show_urls(html: &str, base: &Url) -> Vec<String> {
    let mut seen = HashSet::new();
    SHOW_LINK_RE
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .filter_map(|href| base.join(&decode_entities(href.as_str())).ok())
        .map(String::from)
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

fn attribute(tag: &str, regex: &Regex) -> Option<String> {
    regex
        .captures(tag)
        .and_then(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()))
}

/// Decodes the handful of character references that show up in attributes.
fn decode_entities(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE_SHOW: &str = r#"<html><body>
<div class="player">
  <iframe id="share" src="https://facebook.com/plugin"></iframe>
  <iframe width="640" id="mediaframe0" height="360"
      src="//arhiiv.err.ee/media/player.php?stream=media.err.ee:80/arhiiv/&amp;file=/AUDIO/a_8378_RMARHIIV.m4a&amp;autoplay=0">
  </iframe>
</div></body></html>"#;

    const SAMPLE_SERIES: &str = r#"<ul>
<li><a class="item" href="/vaata/kirjutamata-memuaare">Kirjutamata memuaare</a></li>
<li><a href="/vaata/kirjutamata-memuaare">again</a></li>
<li><a href="/seeria/other">series link</a></li>
<li><a href='/vaata/kirjutamata-memuaare-2'>second</a></li>
</ul>"#;

    fn page_url() -> Url {
        Url::parse("https://arhiiv.err.ee/vaata/kirjutamata-memuaare").unwrap()
    }

    #[test]
    fn test_find_player_url_picks_mediaframe_iframe() {
        let player = find_player_url(SAMPLE_SHOW).unwrap();
        assert_eq!(
            player,
            "//arhiiv.err.ee/media/player.php?stream=media.err.ee:80/arhiiv/&file=/AUDIO/a_8378_RMARHIIV.m4a&autoplay=0"
        );
    }

    #[test]
    fn test_find_player_url_missing_iframe() {
        assert!(find_player_url("<html><iframe id=\"other\" src=\"x\"></iframe></html>").is_none());
    }

    #[test]
    fn test_find_player_url_mediaframe_without_src() {
        assert!(find_player_url(r#"<iframe id="mediaframe1"></iframe>"#).is_none());
    }

    #[test]
    fn test_rtmp_stream_extraction_from_sample_page() {
        let player = find_player_url(SAMPLE_SHOW).unwrap();
        let params = parse_player_params(&player, &page_url()).unwrap();
        assert_eq!(params.stream, "media.err.ee:80/arhiiv/");
        assert_eq!(params.file, "/AUDIO/a_8378_RMARHIIV.m4a");
    }

    #[test]
    fn test_parse_player_params_missing_file_is_invalid() {
        let result = parse_player_params("/player?stream=media.err.ee:80/arhiiv/", &page_url());
        assert!(matches!(result, Err(PageError::InvalidPlayerUrl { .. })));
    }

    #[test]
    fn test_parse_player_params_empty_stream_is_invalid() {
        let result = parse_player_params("/player?stream=&file=/a.m4a", &page_url());
        assert!(matches!(result, Err(PageError::InvalidPlayerUrl { .. })));
    }

    #[test]
    fn test_show_list_extraction() {
        let base =
            Url::parse("https://arhiiv.err.ee/seeria/kirjutamata-memuaare/elu/69/default/koik")
                .unwrap();
        let urls = find_show_urls(SAMPLE_SERIES, &base);
        assert_eq!(
            urls,
            vec![
                "https://arhiiv.err.ee/vaata/kirjutamata-memuaare".to_string(),
                "https://arhiiv.err.ee/vaata/kirjutamata-memuaare-2".to_string(),
            ]
        );
    }

    #[test]
    fn test_decode_entities_amp_last() {
        assert_eq!(decode_entities("a&amp;lt;b"), "a&lt;b");
    }
}
