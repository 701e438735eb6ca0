use std::path::Path;

use crate::domain::company_record::CompanyRecord;

use super::json_file;

pub fn write_records(path: &Path, records: &[CompanyRecord]) -> anyhow::Result<()> {
    json_file::write_array(path, records)?;
    log::info!("Wrote {} records to {}", records.len(), path.display());

    Ok(())
}
