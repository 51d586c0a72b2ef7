use medstock_lib::config::AppConfig;

#[tokio::main]
async fn main() {
    medstock_lib::init_tracing();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(2);
        }
    };

    if let Err(e) = medstock_lib::run(config).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
