pub mod backend;
pub mod chromedriver;
pub mod webdriver;

pub use backend::WebDriverBackend;
