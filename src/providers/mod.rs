pub mod coze;
pub mod streaming;

pub use coze::CozeClient;
