use strsim::jaro_winkler;

use crate::domain::{
    company_domain::{company_domain, normalize_url},
    company_record::CompanyRecord,
    scraped_page::ScrapedPage,
};

const NAME_SIMILARITY_THRESHOLD: f64 = 0.9;

/// Finds the reference record a scraped page belongs to.
pub trait RecordMatcher {
    fn find<'a>(&self, page: &ScrapedPage, dataset: &'a [CompanyRecord]) -> Option<&'a CompanyRecord>;
}

/// Matches on the page url first, then on the registrable domain label.
#[derive(Debug, Default, Clone, Copy)]
pub struct DomainMatcher;

impl RecordMatcher for DomainMatcher {
    fn find<'a>(&self, page: &ScrapedPage, dataset: &'a [CompanyRecord]) -> Option<&'a CompanyRecord> {
        if let Some(page_url) = normalize_url(&page.url) {
            let by_url = dataset
                .iter()
                .find(|record| normalize_url(&record.url).as_deref() == Some(page_url.as_str()));
            if by_url.is_some() {
                return by_url;
            }
        }

        let page_domain = page_domain(page)?;
        dataset
            .iter()
            .find(|record| company_domain(&record.url).as_deref() == Some(page_domain.as_str()))
    }
}

/// [`DomainMatcher`], falling back to the record whose company name reads
/// closest to the page domain. Only for datasets without usable urls: similar
/// names such as `volvo` and `Volvo Cars AB` can be joined.
#[derive(Debug, Clone, Copy)]
pub struct NameSimilarityMatcher {
    pub threshold: f64,
}

impl Default for NameSimilarityMatcher {
    fn default() -> Self {
        NameSimilarityMatcher {
            threshold: NAME_SIMILARITY_THRESHOLD,
        }
    }
}

impl RecordMatcher for NameSimilarityMatcher {
    fn find<'a>(&self, page: &ScrapedPage, dataset: &'a [CompanyRecord]) -> Option<&'a CompanyRecord> {
        if let Some(record) = DomainMatcher.find(page, dataset) {
            return Some(record);
        }

        let page_domain = page_domain(page)?;
        dataset
            .iter()
            .filter(|record| !record.company_name.trim().is_empty())
            .map(|record| (record, name_similarity(&page_domain, &record.company_name)))
            .filter(|(_, score)| *score >= self.threshold)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(record, _)| record)
    }
}

fn page_domain(page: &ScrapedPage) -> Option<String> {
    match page.domain.trim() {
        "" => company_domain(&page.url),
        domain => Some(domain.to_lowercase()),
    }
}

// "Volvo Cars AB" is compared as "volvocars" against the domain label.
fn name_similarity(domain: &str, company_name: &str) -> f64 {
    let squashed: String = company_name
        .to_lowercase()
        .split_whitespace()
        .filter(|word| !matches!(*word, "ab" | "publ" | "(publ)" | "aktiebolag"))
        .collect();

    jaro_winkler(domain, &squashed)
}
