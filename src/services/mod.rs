pub mod series;
pub mod wallet;

pub use series::PriceSeries;
pub use wallet::WalletState;
