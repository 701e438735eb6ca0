pub mod dataset_file;
pub mod json_file;
pub mod output_file;
pub mod scraped_data_file;
