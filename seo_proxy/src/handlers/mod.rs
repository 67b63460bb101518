pub mod seo_handlers;
