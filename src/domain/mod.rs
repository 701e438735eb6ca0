pub mod company_domain;
pub mod company_record;
pub mod scraped_page;
