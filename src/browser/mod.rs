pub mod chrome;
pub mod driver;

pub use chrome::{ChromeDriver, ChromePage, ConnectionMode};
pub use driver::{BoundingBox, NavigationOptions, PageDriver};
