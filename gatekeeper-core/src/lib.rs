pub mod platform;
pub mod throttle;

use std::future::Future;
use std::pin::Pin;

use gatekeeper_database::ConfigStore;

pub use platform::{
    ChannelInfo, ChannelKind, HistoryMessage, NewChannel, NewRole, Platform, RoleInfo, UserInfo,
};
pub use throttle::{ChannelThrottles, ThrottleOutcome};

pub type Error = anyhow::Error;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Shared state handed to every event and command handler.
#[derive(Debug)]
pub struct Data {
    pub store: ConfigStore,
    pub throttles: ChannelThrottles,
    pub throttle_enabled: bool,
    pub greeting_enabled: bool,
}

impl Data {
    pub fn new(store: ConfigStore) -> Self {
        Self {
            store,
            throttles: ChannelThrottles::default(),
            throttle_enabled: true,
            greeting_enabled: true,
        }
    }
}

pub type Context<'a> = poise::Context<'a, Data, Error>;
