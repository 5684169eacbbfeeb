pub mod download;
pub mod error;
pub mod listings;
pub mod pages;
pub mod render;
pub mod types;

pub use download::ImageDownloader;
pub use error::ScrapeError;
pub use listings::{discover_flyers, parse_flyer_listings};
pub use pages::{extract_page_urls, extract_store_images};
pub use render::RenderClient;
pub use types::{FlyerListing, StoreDownload, StoreImageSet};
