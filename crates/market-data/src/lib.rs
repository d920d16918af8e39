pub mod keypool;
pub mod news;
pub mod rate_limit;
pub mod twelvedata;
pub mod waterfall;
pub mod yahoo;

pub use keypool::ApiKeyPool;
pub use news::NewsClient;
pub use twelvedata::{Quote, TwelveDataClient};
pub use waterfall::{FetchWaterfall, MarketData};
pub use yahoo::YahooClient;
