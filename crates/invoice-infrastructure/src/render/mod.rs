//! PDF renderers

pub mod chromium;

pub use chromium::ChromiumPdfRenderer;
