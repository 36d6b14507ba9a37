use lambda_runtime::{run, service_fn, Error};

use clearcut_core::Config;
use clearcut_lambda::handler::{function_handler, EventProcessor};
use clearcut_lambda::telemetry;
use clearcut_services::PhotoRoomClient;
use clearcut_storage::create_storage;

#[tokio::main]
async fn main() -> Result<(), Error> {
    telemetry::init();

    let config = Config::from_env()?;
    let storage = create_storage(&config).await?;
    let photoroom = PhotoRoomClient::new(config.photoroom_api_key.clone())?;
    let processor = EventProcessor::new(storage, photoroom);

    run(service_fn(|event| function_handler(event, &processor))).await
}
