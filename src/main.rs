use dotenvy::dotenv;
use registry_api::prelude::{get_subscriber, init_subscriber, Config};
use registry_api::Application;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let subscriber = get_subscriber("registry-api".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let configuration = Config::load()?;

    let application = Application::start(&configuration).await?;

    application.spawn().await
}
