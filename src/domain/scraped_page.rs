use serde::{Deserialize, Serialize};

/// A fetched web page as written by the scraper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedPage {
    pub domain: String,
    pub url: String,
    pub raw_html: String,
}

/// Fields pulled out of a single page. `None` means the page had nothing
/// usable for that field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedPage {
    pub company_name: Option<String>,
    pub phone_number: Option<String>,
    pub org_number: Option<String>,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub municipality: Option<String>,
    pub text: String,
}

impl ExtractedPage {
    /// Folds `other` into `self`: fields already found are kept, gaps are
    /// filled, body texts are joined by a blank line.
    pub fn absorb(&mut self, other: ExtractedPage) {
        fill(&mut self.company_name, other.company_name);
        fill(&mut self.phone_number, other.phone_number);
        fill(&mut self.org_number, other.org_number);
        fill(&mut self.address, other.address);
        fill(&mut self.postal_code, other.postal_code);
        fill(&mut self.municipality, other.municipality);

        match (self.text.is_empty(), other.text.is_empty()) {
            (_, true) => {}
            (true, false) => self.text = other.text,
            (false, false) => {
                self.text.push_str("\n\n");
                self.text.push_str(&other.text);
            }
        }
    }
}

fn fill(slot: &mut Option<String>, candidate: Option<String>) {
    if slot.is_none() {
        *slot = candidate;
    }
}
