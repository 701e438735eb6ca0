use url::Url;

// Second-level public suffixes that appear in company registries often
// enough to matter. Anything else is treated as a single-label suffix.
const SECOND_LEVEL_SUFFIXES: [&str; 12] = [
    "co.uk", "org.uk", "ac.uk", "com.au", "net.au", "co.nz", "co.jp", "com.br", "com.cn",
    "co.za", "com.tr", "com.pl",
];

/// Registrable domain label of a url: the host label left of the public
/// suffix, lower-cased. `https://www.ssab.com/sv-se/kontakt` gives `ssab`.
pub fn company_domain(url: &str) -> Option<String> {
    let host = host_without_www(url)?;

    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    let suffix_len = match labels.len() {
        0 => return None,
        1 => 0,
        n => {
            let last_two = labels[n - 2..].join(".");
            match SECOND_LEVEL_SUFFIXES.contains(&last_two.as_str()) && n > 2 {
                true => 2,
                false => 1,
            }
        }
    };

    labels
        .get(labels.len() - suffix_len - 1)
        .map(|label| label.to_string())
}

/// Lower-cased host without a leading `www.`.
pub fn host_without_www(url: &str) -> Option<String> {
    match Url::parse(url) {
        Ok(parsed_url) => match parsed_url.host_str() {
            Some("") | None => None,
            Some(any_host) => match any_host.strip_prefix("www.") {
                Some(h) => Some(h.to_lowercase()),
                None => Some(any_host.to_lowercase()),
            },
        },
        Err(_) => None,
    }
}

/// Comparable form of a url: scheme dropped, host without `www.`, no query
/// or fragment, no trailing slash.
pub fn normalize_url(url: &str) -> Option<String> {
    let parsed_url = Url::parse(url.trim()).ok()?;
    let host = host_without_www(url.trim())?;
    let path = parsed_url.path().trim_end_matches('/');

    Some(format!("{}{}", host, path.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::{company_domain, normalize_url};

    #[test]
    fn company_domain_valid() {
        let urls = [
            "https://ssab.se/",
            "https://www.ssab.com/sv-se/kontakt",
            "https://lkab.com/",
            "https://www.bbc.co.uk/news",
            "http://Volvo.SE",
        ];
        let results: Vec<Option<String>> = urls.iter().map(|u| company_domain(u)).collect();

        assert_eq!(
            results,
            vec![
                Some("ssab".to_string()),
                Some("ssab".to_string()),
                Some("lkab".to_string()),
                Some("bbc".to_string()),
                Some("volvo".to_string()),
            ]
        )
    }

    #[test]
    fn company_domain_invalid() {
        let urls = ["", "#", "/sv-se/kontakt", "mailto:info@ssab.com"];

        for url in urls {
            assert_eq!(company_domain(url), None, "{url}");
        }
    }

    #[test]
    fn normalize_url_ignores_cosmetic_differences() {
        assert_eq!(
            normalize_url("https://www.ssab.se/"),
            normalize_url("http://ssab.se")
        );
        assert_eq!(
            normalize_url("https://lkab.com/om-lkab/?utm=1#top").as_deref(),
            Some("lkab.com/om-lkab")
        );
        assert_ne!(
            normalize_url("https://ssab.se/"),
            normalize_url("https://ssab.com/")
        );
    }
}
