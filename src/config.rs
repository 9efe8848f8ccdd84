use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "churn-api", version, about = "Customer churn prediction API")]
pub struct ServerArgs {
    /// Address or hostname to bind
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8000)]
    pub port: u16,
}

impl ServerArgs {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
