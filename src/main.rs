use woodland::{
    config::AppConfig,
    logging::{init_logging, LoggingConfig},
    WoodlandApp,
};

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let config = AppConfig::from_env();
    WoodlandApp::new(config)?.run()
}
