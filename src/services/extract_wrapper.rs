use std::{collections::HashMap, path::Path};

use crate::{
    configuration::ExtractionConfig,
    dal::{dataset_file, output_file, scraped_data_file},
    domain::{
        company_domain::company_domain,
        company_record::CompanyRecord,
        scraped_page::{ExtractedPage, ScrapedPage},
    },
};

use super::{DomainMatcher, HtmlExtractor, NameSimilarityMatcher, PageExtractor, RecordMatcher};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    pub pages: usize,
    pub records: usize,
    pub matched: usize,
}

/// Reads the reference dataset and the scraped pages, extracts one
/// `CompanyRecord` per page (per domain with `merge_pages_by_domain`) and
/// writes them to `output_path`.
pub fn extract_wrapper(
    dataset_path: impl AsRef<Path>,
    scraped_data_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> anyhow::Result<ExtractionSummary> {
    let (dataset_path, scraped_data_path, output_path) =
        (dataset_path.as_ref(), scraped_data_path.as_ref(), output_path.as_ref());

    match config.match_by_company_name {
        true => extract_wrapper_with(
            dataset_path,
            scraped_data_path,
            output_path,
            config,
            &HtmlExtractor,
            &NameSimilarityMatcher::default(),
        ),
        false => extract_wrapper_with(
            dataset_path,
            scraped_data_path,
            output_path,
            config,
            &HtmlExtractor,
            &DomainMatcher,
        ),
    }
}

pub fn extract_wrapper_with(
    dataset_path: &Path,
    scraped_data_path: &Path,
    output_path: &Path,
    config: &ExtractionConfig,
    extractor: &impl PageExtractor,
    matcher: &impl RecordMatcher,
) -> anyhow::Result<ExtractionSummary> {
    log::info!("Starting extraction with {:?}", config);

    let dataset = dataset_file::read_dataset(dataset_path)?;
    let pages = scraped_data_file::read_scraped_pages(scraped_data_path)?;

    let (records, summary) = extract_records(&dataset, &pages, config, extractor, matcher);
    output_file::write_records(output_path, &records)?;

    log::info!(
        "Extraction done: {} pages, {} records, {} matched to the dataset",
        summary.pages,
        summary.records,
        summary.matched
    );

    Ok(summary)
}

/// The in-memory part of [`extract_wrapper`]: no file access, output order
/// follows the first appearance of each page (or domain).
pub fn extract_records(
    dataset: &[CompanyRecord],
    pages: &[ScrapedPage],
    config: &ExtractionConfig,
    extractor: &impl PageExtractor,
    matcher: &impl RecordMatcher,
) -> (Vec<CompanyRecord>, ExtractionSummary) {
    let groups: Vec<Vec<&ScrapedPage>> = match config.merge_pages_by_domain {
        true => group_by_domain(pages),
        false => pages.iter().map(|page| vec![page]).collect(),
    };

    let mut summary = ExtractionSummary {
        pages: pages.len(),
        ..Default::default()
    };
    let mut records = Vec::with_capacity(groups.len());

    for group in groups {
        let Some(first_page) = group.first() else {
            continue;
        };

        let mut extracted = ExtractedPage::default();
        for page in group.iter() {
            log::debug!("Extracting {} ({})", page.url, page.domain);
            extracted.absorb(extractor.extract(page, config));
        }

        let reference = group.iter().find_map(|page| matcher.find(page, dataset));
        match reference {
            Some(_) => summary.matched += 1,
            None => log::warn!("No reference record for {}", first_page.url),
        }

        records.push(build_record(first_page, reference, extracted, config));
    }

    summary.records = records.len();
    (records, summary)
}

fn group_by_domain(pages: &[ScrapedPage]) -> Vec<Vec<&ScrapedPage>> {
    let mut groups: Vec<Vec<&ScrapedPage>> = vec![];
    let mut index_by_key: HashMap<String, usize> = HashMap::new();

    for page in pages {
        let key = match page.domain.trim() {
            "" => company_domain(&page.url).unwrap_or_else(|| page.url.clone()),
            domain => domain.to_lowercase(),
        };

        match index_by_key.get(&key) {
            Some(&i) => groups[i].push(page),
            None => {
                index_by_key.insert(key, groups.len());
                groups.push(vec![page]);
            }
        }
    }

    groups
}

fn build_record(
    page: &ScrapedPage,
    reference: Option<&CompanyRecord>,
    extracted: ExtractedPage,
    config: &ExtractionConfig,
) -> CompanyRecord {
    let from_reference = |field: fn(&CompanyRecord) -> &String| -> Option<String> {
        reference
            .map(field)
            .filter(|value| !value.trim().is_empty())
            .cloned()
    };
    let metadata = |found: Option<String>, field: fn(&CompanyRecord) -> &String| -> String {
        match config.extract_meta {
            true => found.or_else(|| from_reference(field)).unwrap_or_default(),
            false => String::new(),
        }
    };

    CompanyRecord {
        company_name: from_reference(|r| &r.company_name)
            .or(extracted.company_name.filter(|_| config.extract_meta))
            .unwrap_or_default(),
        sni: from_reference(|r| &r.sni).unwrap_or_default(),
        text: match config.extract_body {
            true => extracted.text,
            false => String::new(),
        },
        phone_number: metadata(extracted.phone_number, |r| &r.phone_number),
        org_number: metadata(extracted.org_number, |r| &r.org_number),
        address: metadata(extracted.address, |r| &r.address),
        municipality: metadata(extracted.municipality, |r| &r.municipality),
        postal_code: metadata(extracted.postal_code, |r| &r.postal_code),
        url: page.url.clone(),
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        configuration::ExtractionConfig,
        domain::{
            company_record::CompanyRecord,
            scraped_page::{ExtractedPage, ScrapedPage},
        },
        services::{DomainMatcher, HtmlExtractor, PageExtractor},
    };

    use super::{extract_records, ExtractionSummary};

    const SSAB_HTML: &str = r#"<html><head><title>SSAB</title></head><body>
        <p>Stål för en hållbar framtid.</p>
        <footer><a href="tel:+4684545700">Växel</a> Klarabergsviadukten 70, 111 64 Stockholm</footer>
        </body></html>"#;
    const SSAB_CONTACT_HTML: &str = r#"<html><body><p>Kontakta oss</p>
        <p>Org.nr 556016-3750</p></body></html>"#;
    const UNKNOWN_HTML: &str = "<html><head><title>Boliden</title></head><body><p>Metaller</p></body></html>";

    fn page(domain: &str, url: &str, raw_html: &str) -> ScrapedPage {
        ScrapedPage {
            domain: domain.to_string(),
            url: url.to_string(),
            raw_html: raw_html.to_string(),
        }
    }

    fn dataset() -> Vec<CompanyRecord> {
        vec![CompanyRecord {
            company_name: "SSAB AB".to_string(),
            sni: "24100".to_string(),
            phone_number: "08-000 00 00".to_string(),
            org_number: "556016-3750".to_string(),
            municipality: "Stockholm".to_string(),
            url: "https://ssab.se/".to_string(),
            ..Default::default()
        }]
    }

    fn pages() -> Vec<ScrapedPage> {
        vec![
            page("ssab", "https://ssab.se/", SSAB_HTML),
            page("ssab", "https://www.ssab.com/sv-se/kontakt", SSAB_CONTACT_HTML),
            page("boliden", "https://www.boliden.com/", UNKNOWN_HTML),
        ]
    }

    #[test]
    fn one_record_per_page_by_default() {
        let (records, summary) = extract_records(
            &dataset(),
            &pages(),
            &ExtractionConfig::default(),
            &HtmlExtractor,
            &DomainMatcher,
        );

        assert_eq!(records.len(), 3);
        assert_eq!(summary.pages, 3);
        assert_eq!(summary.records, 3);
        assert_eq!(summary.matched, 2);

        assert_eq!(records[0].company_name, "SSAB AB");
        assert_eq!(records[0].sni, "24100");
        assert_eq!(records[0].phone_number, "+4684545700");
        assert_eq!(records[0].postal_code, "111 64");
        assert_eq!(records[0].text, "Stål för en hållbar framtid.");
        assert_eq!(records[1].url, "https://www.ssab.com/sv-se/kontakt");
        assert_eq!(records[1].phone_number, "08-000 00 00");

        assert_eq!(records[2].company_name, "Boliden");
        assert_eq!(records[2].sni, "");
        assert_eq!(records[2].url, "https://www.boliden.com/");
    }

    #[test]
    fn merge_pages_by_domain_folds_pages() {
        let config = ExtractionConfig {
            merge_pages_by_domain: true,
            ..Default::default()
        };
        let (records, summary) =
            extract_records(&dataset(), &pages(), &config, &HtmlExtractor, &DomainMatcher);

        assert_eq!(records.len(), 2);
        assert_eq!(summary.pages, 3);
        assert_eq!(summary.matched, 1);
        assert_eq!(records[0].url, "https://ssab.se/");
        assert_eq!(
            records[0].text,
            "Stål för en hållbar framtid.\n\nKontakta oss\nOrg.nr 556016-3750"
        );
        assert_eq!(records[1].url, "https://www.boliden.com/");
    }

    #[test]
    fn disabled_flags_leave_fields_empty() {
        let config = ExtractionConfig {
            extract_meta: false,
            extract_body: false,
            ..Default::default()
        };
        let (records, _) =
            extract_records(&dataset(), &pages(), &config, &HtmlExtractor, &DomainMatcher);

        for record in records.iter() {
            assert_eq!(record.text, "");
            assert_eq!(record.phone_number, "");
            assert_eq!(record.org_number, "");
            assert_eq!(record.address, "");
            assert_eq!(record.municipality, "");
            assert_eq!(record.postal_code, "");
        }
        assert_eq!(records[0].company_name, "SSAB AB");
        assert_eq!(records[2].company_name, "");
    }

    struct FixedName;

    impl PageExtractor for FixedName {
        fn extract(&self, _page: &ScrapedPage, _config: &ExtractionConfig) -> ExtractedPage {
            ExtractedPage {
                company_name: Some("Boliden Mineral".to_string()),
                ..Default::default()
            }
        }
    }

    #[test]
    fn page_company_name_needs_extract_meta() {
        let config = ExtractionConfig {
            extract_meta: false,
            ..Default::default()
        };
        let (records, _) = extract_records(&dataset(), &pages(), &config, &FixedName, &DomainMatcher);

        assert_eq!(records[0].company_name, "SSAB AB");
        assert_eq!(records[2].company_name, "");

        let (records, _) = extract_records(
            &dataset(),
            &pages(),
            &ExtractionConfig::default(),
            &FixedName,
            &DomainMatcher,
        );

        assert_eq!(records[0].company_name, "SSAB AB");
        assert_eq!(records[2].company_name, "Boliden Mineral");
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let (records, summary) = extract_records(
            &dataset(),
            &[],
            &ExtractionConfig::default(),
            &HtmlExtractor,
            &DomainMatcher,
        );

        assert!(records.is_empty());
        assert_eq!(summary, ExtractionSummary::default());
    }
}
