use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use serde_json::{Map, Value};
use strsim::jaro_winkler;

use crate::{
    configuration::ExtractionConfig,
    domain::scraped_page::{ExtractedPage, ScrapedPage},
};

// Never visible text.
const HIDDEN_TAGS: [&str; 5] = ["script", "style", "noscript", "template", "svg"];
// Site chrome, left out of the body text but still searched for contact details.
const CHROME_TAGS: [&str; 4] = ["nav", "header", "footer", "aside"];
const BLOCK_TAGS: [&str; 22] = [
    "address", "article", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption", "h1", "h2",
    "h3", "h4", "h5", "h6", "li", "main", "p", "section", "table", "td", "tr",
];
const TITLE_SEPARATORS: [&str; 5] = [" | ", " - ", " – ", " — ", " · "];
const MIN_PHONE_DIGITS: usize = 7;
const MAX_PHONE_DIGITS: usize = 15;

static TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static BODY_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").unwrap());
static P_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());
static SITE_NAME_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[property="og:site_name"], meta[name="application-name"]"#).unwrap()
});
static LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static JSON_LD_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());
static STREET_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[itemprop="streetAddress"]"#).unwrap());
static POSTAL_CODE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[itemprop="postalCode"]"#).unwrap());
static LOCALITY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[itemprop="addressLocality"]"#).unwrap());

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+\d{1,3}[ -]?(?:\(0\) ?)?\d{1,4}|\b0\d{1,3})(?:[ -]?\d{2,4}){1,4}\b")
        .unwrap()
});
static LABELLED_ORG_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:org(?:anisations)?\.?\s*-?\s*n(?:umme)?r|corporate\s+id(?:entity)?(?:\s+number)?|reg(?:istration)?\.?\s*no)\.?\s*:?\s*(\d{6})\s?-?\s?(\d{4})\b")
        .unwrap()
});
static ORG_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{6})-(\d{4})\b").unwrap());
static STREET_POSTAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\p{Lu}[\p{L}.\- ]{1,60}? \d{1,4} ?[A-Za-z]?),? +(?:SE-? ?)?(\d{3}) ?(\d{2}) +(\p{Lu}[\p{L}\-]+(?: \p{Lu}[\p{L}\-]+)?)")
        .unwrap()
});
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Turns a scraped page into the fields that can be read off its markup.
pub trait PageExtractor {
    fn extract(&self, page: &ScrapedPage, config: &ExtractionConfig) -> ExtractedPage;
}

/// Markup-driven extraction: `<meta>` tags, `tel:` links, schema.org address
/// data and a few text patterns for Swedish company pages.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlExtractor;

impl PageExtractor for HtmlExtractor {
    fn extract(&self, page: &ScrapedPage, config: &ExtractionConfig) -> ExtractedPage {
        let html_document = Html::parse_document(&page.raw_html);
        let mut extracted = ExtractedPage::default();

        if config.extract_meta {
            let visible_text = visible_text(&html_document, &HIDDEN_TAGS);
            let json_ld = json_ld_blocks(&html_document);
            let address = extract_address(&html_document, &json_ld, &visible_text);

            extracted.company_name = extract_company_name(&html_document, &page.domain);
            extracted.phone_number = extract_phone_number(&html_document, &json_ld, &visible_text);
            extracted.org_number = extract_org_number(&visible_text);
            extracted.address = address.street;
            extracted.postal_code = address.postal_code;
            extracted.municipality = address.locality;
        }

        if config.extract_body {
            extracted.text = match config.p_only {
                true => paragraph_text(&html_document),
                false => body_text(&html_document),
            };
        }

        extracted
    }
}

#[derive(Debug, Default, PartialEq)]
struct PostalAddress {
    street: Option<String>,
    postal_code: Option<String>,
    locality: Option<String>,
}

impl PostalAddress {
    fn is_empty(&self) -> bool {
        self.street.is_none() && self.postal_code.is_none() && self.locality.is_none()
    }
}

fn extract_company_name(html_document: &Html, domain: &str) -> Option<String> {
    let from_meta = html_document
        .select(&SITE_NAME_SELECTOR)
        .filter_map(|tag| tag.value().attr("content"))
        .map(collapse_whitespace)
        .find(|name| !name.is_empty());

    if from_meta.is_some() {
        return from_meta;
    }

    let title: String = html_document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|tag| tag.text().collect())?;

    company_name_from_title(&title, domain)
}

/// Picks the title segment closest to the page's domain, so both
/// "SSAB - Kontakt" and "Kontakt | SSAB" give "SSAB".
fn company_name_from_title(title: &str, domain: &str) -> Option<String> {
    let title = collapse_whitespace(title);

    let mut segments = vec![title.as_str()];
    for separator in TITLE_SEPARATORS {
        segments = segments
            .into_iter()
            .flat_map(|segment| segment.split(separator))
            .collect();
    }
    let segments: Vec<&str> = segments
        .into_iter()
        .map(|segment| segment.trim())
        .filter(|segment| segment.chars().any(char::is_alphanumeric))
        .collect();

    match domain.is_empty() {
        true => segments.first().map(|segment| segment.to_string()),
        false => {
            let domain = domain.to_lowercase();
            segments
                .into_iter()
                .rev()
                .max_by(|a, b| {
                    jaro_winkler(&domain, &a.to_lowercase())
                        .total_cmp(&jaro_winkler(&domain, &b.to_lowercase()))
                })
                .map(|segment| segment.to_string())
        }
    }
}

fn extract_phone_number(html_document: &Html, json_ld: &[Value], visible_text: &str) -> Option<String> {
    let from_link = html_document
        .select(&LINK_SELECTOR)
        .filter_map(|tag| tag.value().attr("href"))
        .filter_map(clean_tel_href)
        .next();

    if from_link.is_some() {
        return from_link;
    }

    let from_json_ld = json_ld
        .iter()
        .find_map(|value| find_string_field(value, "telephone"))
        .filter(|phone| is_phone_shaped(phone));

    if from_json_ld.is_some() {
        return from_json_ld;
    }

    PHONE_RE
        .find_iter(visible_text)
        .map(|m| collapse_whitespace(m.as_str()))
        .find(|candidate| is_phone_shaped(candidate))
}

/// `tel:`, `Tel:` and `TEL:` links, percent-decoded.
fn clean_tel_href(href: &str) -> Option<String> {
    let href = href.trim();
    if !href.get(..4)?.eq_ignore_ascii_case("tel:") {
        return None;
    }

    let number = urlencoding::decode(&href[4..]).ok()?;
    let number = collapse_whitespace(&number);

    match is_phone_shaped(&number) {
        true => Some(number),
        false => None,
    }
}

fn is_phone_shaped(candidate: &str) -> bool {
    let digits = candidate.chars().filter(|c| c.is_ascii_digit()).count();
    let allowed = candidate
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')' | '.'));

    allowed && (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits)
}

fn extract_org_number(visible_text: &str) -> Option<String> {
    if let Some(caps) = LABELLED_ORG_NUMBER_RE.captures(visible_text) {
        return Some(format!("{}-{}", &caps[1], &caps[2]));
    }

    ORG_NUMBER_RE
        .captures(visible_text)
        .map(|caps| format!("{}-{}", &caps[1], &caps[2]))
}

fn extract_address(html_document: &Html, json_ld: &[Value], visible_text: &str) -> PostalAddress {
    if let Some(address) = json_ld.iter().find_map(find_postal_address) {
        let address = PostalAddress {
            street: address_part(address, "streetAddress"),
            postal_code: address_part(address, "postalCode").and_then(|c| normalize_postal_code(&c)),
            locality: address_part(address, "addressLocality"),
        };
        if !address.is_empty() {
            return address;
        }
    }

    let microdata = PostalAddress {
        street: first_text(html_document, &STREET_SELECTOR),
        postal_code: first_text(html_document, &POSTAL_CODE_SELECTOR)
            .and_then(|c| normalize_postal_code(&c)),
        locality: first_text(html_document, &LOCALITY_SELECTOR),
    };
    if !microdata.is_empty() {
        return microdata;
    }

    match STREET_POSTAL_RE.captures(visible_text) {
        Some(caps) => PostalAddress {
            street: Some(collapse_whitespace(&caps[1])),
            postal_code: Some(format!("{} {}", &caps[2], &caps[3])),
            locality: Some(caps[4].to_string()),
        },
        None => PostalAddress::default(),
    }
}

/// `SE-971 28`, `97128` and `971 28` all become `971 28`.
fn normalize_postal_code(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    match digits.len() {
        0 => None,
        5 => Some(format!("{} {}", &digits[..3], &digits[3..])),
        _ => Some(collapse_whitespace(raw)),
    }
}

fn json_ld_blocks(html_document: &Html) -> Vec<Value> {
    html_document
        .select(&JSON_LD_SELECTOR)
        .filter_map(|tag| {
            let raw: String = tag.text().collect();
            match serde_json::from_str::<Value>(raw.trim()) {
                Ok(value) => Some(value),
                Err(e) => {
                    log::debug!("Skipping unparseable JSON-LD block: {}", e);
                    None
                }
            }
        })
        .collect()
}

fn find_postal_address(value: &Value) -> Option<&Map<String, Value>> {
    match value {
        Value::Object(map) => {
            if map.contains_key("streetAddress") || map.contains_key("postalCode") {
                return Some(map);
            }
            map.values().find_map(find_postal_address)
        }
        Value::Array(items) => items.iter().find_map(find_postal_address),
        _ => None,
    }
}

fn find_string_field(value: &Value, key: &str) -> Option<String> {
    match value {
        Value::Object(map) => match map.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(collapse_whitespace(s)),
            _ => map.values().find_map(|v| find_string_field(v, key)),
        },
        Value::Array(items) => items.iter().find_map(|v| find_string_field(v, key)),
        _ => None,
    }
}

fn address_part(address: &Map<String, Value>, key: &str) -> Option<String> {
    let part = match address.get(key) {
        Some(Value::String(s)) => collapse_whitespace(s),
        Some(Value::Number(n)) => n.to_string(),
        _ => return None,
    };

    match part.is_empty() {
        true => None,
        false => Some(part),
    }
}

fn first_text(html_document: &Html, selector: &Selector) -> Option<String> {
    html_document
        .select(selector)
        .map(|tag| collapse_whitespace(&tag.text().collect::<String>()))
        .find(|text| !text.is_empty())
}

fn paragraph_text(html_document: &Html) -> String {
    html_document
        .select(&P_SELECTOR)
        .map(|p| collapse_whitespace(&p.text().collect::<String>()))
        .filter(|text| !text.is_empty())
        .join("\n")
}

fn body_text(html_document: &Html) -> String {
    let skip: Vec<&str> = HIDDEN_TAGS.iter().chain(CHROME_TAGS.iter()).copied().collect();
    visible_text(html_document, &skip)
}

/// Text of the `<body>` (or the whole document when there is none), one
/// line per block element, `skip` subtrees left out.
fn visible_text(html_document: &Html, skip: &[&str]) -> String {
    let root = html_document
        .select(&BODY_SELECTOR)
        .next()
        .unwrap_or_else(|| html_document.root_element());

    let mut raw = String::new();
    collect_text(root, skip, &mut raw);

    raw.lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .join("\n")
}

fn collect_text(element: ElementRef, skip: &[&str], out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(tag) => {
                if skip.contains(&tag.name()) {
                    continue;
                }
                if let Some(child_element) = ElementRef::wrap(child) {
                    let is_block = BLOCK_TAGS.contains(&tag.name());
                    if is_block {
                        out.push('\n');
                    }
                    collect_text(child_element, skip, out);
                    if is_block {
                        out.push('\n');
                    }
                }
            }
            _ => {}
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text.trim(), " ").to_string()
}
