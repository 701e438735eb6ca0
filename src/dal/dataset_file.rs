use std::path::Path;

use crate::domain::company_record::CompanyRecord;

use super::json_file;

pub fn read_dataset(path: &Path) -> anyhow::Result<Vec<CompanyRecord>> {
    let records = json_file::read_array(path)?;
    log::info!("Read {} reference records from {}", records.len(), path.display());

    Ok(records)
}
