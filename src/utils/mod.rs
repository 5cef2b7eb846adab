pub mod admin_code_cache;
pub mod name_filter;
