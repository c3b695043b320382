//! Shared User-Agent string for page and API requests.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/ants/errdownload";

/// Default User-Agent for every HTTP request made by the tool.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("errdownload/{version} (archive-fetcher; +{PROJECT_UA_URL})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_carries_version_and_project_url() {
        let ua = default_user_agent();
        assert!(ua.contains(PROJECT_UA_URL), "UA must contain project URL: {ua}");
        assert_eq!(
            env!("CARGO_PKG_VERSION"),
            ua.strip_prefix("errdownload/")
                .and_then(|s| s.split(' ').next())
                .expect("UA has version"),
        );
    }
}
