use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub relay: RelayConfig,
    pub order: OrderDefaults,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    pub api_url: String,
    /// Settlement contract deployment the relay matches against; stamped
    /// into every built order request.
    pub exchange_contract_address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderDefaults {
    pub expires_in_minutes: u64,
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name(path));
        Ok(builder.build()?.try_deserialize()?)
    }
}
