use chat_relay::server::{self, AppState, RelayConfig};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "chat-relay", about = "Streaming chat relay for an Azure OpenAI deployment")]
struct Args {
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    #[arg(long, env = "SERVER_PORT", default_value_t = 3000)]
    port: u16,
    #[arg(long, env = "AZURE_OPENAI_ENDPOINT")]
    endpoint: String,
    #[arg(long, env = "AZURE_OPENAI_API_KEY", hide_env_values = true)]
    api_key: String,
    #[arg(long, env = "AZURE_OPENAI_DEPLOYMENT")]
    deployment: String,
    /// Upstream request timeout in seconds.
    #[arg(long, default_value_t = 600)]
    timeout: u64,
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let config = RelayConfig {
        host: args.host,
        port: args.port,
        endpoint: args.endpoint,
        api_key: args.api_key,
        deployment: args.deployment,
        timeout: args.timeout,
    };
    let app_state = AppState::new(&config)?;

    actix_web::rt::System::new().block_on(server::startup(config, app_state))?;
    Ok(())
}
