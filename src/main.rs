use anyhow::Result;
use jd_shop_day::utils::logging;
use jd_shop_day::{App, Config, ShopDayOutcome};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env()?;

    // 初始化日志
    logging::init(config.verbose_logging);
    config.validate()?;

    // 初始化并运行应用
    let outcome = App::initialize(config).await?.run().await?;
    if outcome == ShopDayOutcome::LoginFailed {
        std::process::exit(1);
    }

    Ok(())
}
