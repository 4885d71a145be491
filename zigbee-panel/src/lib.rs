use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::codec::{DateTimeCodec, RuleCodec};
use crate::configs::Settings;
use crate::console::{Command, Console, Flow};
use crate::controller::ViewController;
use crate::errors::StartupError;
use crate::services::HttpGateway;

pub mod codec;
pub mod configs;
pub mod console;
pub mod controller;
pub mod errors;
pub mod models;
pub mod services;
pub mod views;

pub fn create_controller(settings: &Settings) -> Result<Arc<ViewController>, StartupError> {
    let gateway = Arc::new(HttpGateway::new(&settings.api)?);

    let datetime = match settings.display.offset()? {
        Some(offset) => DateTimeCodec::new(offset),
        None => DateTimeCodec::local(),
    };
    tracing::debug!(zone = ?datetime.zone(), "displaying local times");

    Ok(Arc::new(ViewController::new(
        gateway,
        RuleCodec::new(datetime),
        settings.api.login_url.clone(),
    )))
}

pub async fn run(settings: &Arc<Settings>) -> Result<(), StartupError> {
    let controller = create_controller(settings)?;
    tracing::info!("using backend {}", settings.api.endpoint(""));

    let mut console = Console::new(controller);
    console.start().await;
    println!("{}", console.render().await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        match console.execute(command).await {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => {}
            Err(e) => println!("{e}"),
        }
        println!("{}", console.render().await);
    }

    Ok(())
}
