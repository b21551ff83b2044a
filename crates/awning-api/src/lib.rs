// awning-api: Async Rust clients for the Bond Bridge local API, the Open-Meteo
// forecast API and the Telegram Bot API.

pub mod bond;
pub mod error;
pub mod retry;
pub mod telegram;
pub mod transport;
pub mod weather;

pub use bond::{BondAction, BondClient};
pub use error::Error;
pub use retry::RetryPolicy;
pub use telegram::TelegramClient;
pub use transport::TransportConfig;
pub use weather::{CurrentConditions, OpenMeteoClient};
