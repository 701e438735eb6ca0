use std::path::PathBuf;

use serde::Deserialize;
use serde_aux::field_attributes::deserialize_bool_from_anything;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub files: FileSettings,
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

#[derive(Debug, Deserialize)]
pub struct FileSettings {
    pub dataset: PathBuf,
    pub scraped_data: PathBuf,
    pub output: PathBuf,
}

/// Switches controlling which parts of a page end up in the output records.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExtractionConfig {
    /// Fill phone number, organisation number, address, postal code and
    /// municipality from page metadata. When off these fields are empty.
    #[serde(default = "enabled", deserialize_with = "deserialize_bool_from_anything")]
    pub extract_meta: bool,
    /// Fill `text` from the page body. When off `text` is empty.
    #[serde(default = "enabled", deserialize_with = "deserialize_bool_from_anything")]
    pub extract_body: bool,
    /// Restrict body text to `<p>` elements instead of the whole visible body.
    #[serde(default, deserialize_with = "deserialize_bool_from_anything")]
    pub p_only: bool,
    /// Fold pages sharing a `domain` into a single record.
    #[serde(default, deserialize_with = "deserialize_bool_from_anything")]
    pub merge_pages_by_domain: bool,
    /// Join pages to reference records by company name similarity when
    /// neither url nor domain label matches.
    #[serde(default, deserialize_with = "deserialize_bool_from_anything")]
    pub match_by_company_name: bool,
}

fn enabled() -> bool {
    true
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        ExtractionConfig {
            extract_meta: true,
            extract_body: true,
            p_only: false,
            merge_pages_by_domain: false,
            match_by_company_name: false,
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().map_err(|e| {
        config::ConfigError::Message(format!("Failed to determine the current directory: {}", e))
    })?;
    let configuration_directory = base_path.join("configuration");

    let mut builder = config::Config::builder().add_source(
        config::File::from(configuration_directory.join("base.yaml")).required(false),
    );

    if let Ok(extra_file) = std::env::var("APP_CONFIG_FILE") {
        builder = builder.add_source(config::File::from(PathBuf::from(extra_file)));
    }

    // E.g. `APP_EXTRACTION__P_ONLY=true` sets `Settings.extraction.p_only`
    let settings = builder
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
