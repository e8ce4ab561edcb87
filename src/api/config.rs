use clap::Args;

/// HTTP listener settings
#[derive(Args, Debug, Clone)]
pub struct ApiConfig {
    #[arg(long, env, default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env, default_value_t = 3000)]
    pub port: u16,
}

impl ApiConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
