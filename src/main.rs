use std::sync::Arc;

use dotenv::dotenv;
use hangul_quiz::{
    canvas::Canvas,
    config::Config,
    feedback::TerminalFeedback,
    quiz::controller::{Controller, UserEvent},
    recognition::HttpRecognizer,
    script,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

type MainResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

const GREETING_TEXT: &str = "Hangul practice! Type `start`, then draw with mousedown/mousemove/mouseup \
(or touchstart/touchmove/touchend) and `submit`. `clear` wipes the surface, `giveup` skips.";

#[tokio::main(flavor = "current_thread")]
async fn main() -> MainResult {
    // A missing .env file is fine, everything has a default
    let _ = dotenv();

    pretty_env_logger::init();
    log::info!("Starting hangul quiz...");

    let config = Config::from_env()?;
    let recognizer = Arc::new(HttpRecognizer::new(&config.recognizer)?);
    log::info!("Recognizer endpoint: {}", recognizer.endpoint());

    let controller = Controller::new(
        Canvas::new(config.canvas_width, config.canvas_height),
        config.surface_origin,
        recognizer,
        TerminalFeedback,
    );

    println!("{}", GREETING_TEXT);
    let (tx, rx) = mpsc::channel(64);
    tokio::spawn(read_events(tx));

    let session = controller.run(rx).await;
    log::info!(
        "Leaving with {}/{} answered, score {}",
        session.results().len(),
        session.total_questions(),
        session.score()
    );
    Ok(())
}

async fn read_events(tx: mpsc::Sender<UserEvent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match script::parse_line(&line) {
                Ok(Some(event)) => {
                    if tx.send(event).await.is_err() {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    log::warn!("Skipping line {:?}: {}", line, e);
                    println!("{}", e);
                }
            },
            Ok(None) => break,
            Err(e) => {
                log::error!("Failed to read input: {}", e);
                break;
            }
        }
    }
}
