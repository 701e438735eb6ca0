use std::path::Path;

use crate::domain::scraped_page::ScrapedPage;

use super::json_file;

pub fn read_scraped_pages(path: &Path) -> anyhow::Result<Vec<ScrapedPage>> {
    let pages = json_file::read_array(path)?;
    log::info!("Read {} scraped pages from {}", pages.len(), path.display());

    Ok(pages)
}
