use company_extract::{configuration::get_configuration, services::extract_wrapper};
use env_logger::Env;

fn main() -> std::process::ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = match get_configuration() {
        Ok(configuration) => configuration,
        Err(e) => {
            log::error!("Failed to read configuration: {}", e);
            return std::process::ExitCode::FAILURE;
        }
    };

    match extract_wrapper(
        &configuration.files.dataset,
        &configuration.files.scraped_data,
        &configuration.files.output,
        &configuration.extraction,
    ) {
        Ok(_) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Extraction failed: {:#}", e);
            std::process::ExitCode::FAILURE
        }
    }
}
