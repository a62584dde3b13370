use reqwest::{Client, Url};
use serde_json::Value;

use super::{
    interpret_response, FailureReason, RecognitionError, RecognitionOutcome, RecognitionRequest,
    Recognizer,
};
use crate::config::RecognizerConfig;

/// Talks to the handwriting endpoint over HTTPS.
pub struct HttpRecognizer {
    http: Client,
    endpoint: Url,
}

impl HttpRecognizer {
    pub fn new(config: &RecognizerConfig) -> Result<Self, RecognitionError> {
        let endpoint = Url::parse_with_params(
            &config.url,
            &[("itc", config.itc.as_str()), ("app", config.app.as_str())],
        )
        .map_err(|e| RecognitionError::InvalidEndpoint {
            url: config.url.clone(),
            reason: e.to_string(),
        })?;
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl Recognizer for HttpRecognizer {
    async fn recognize(&self, request: RecognitionRequest) -> RecognitionOutcome {
        if log::log_enabled!(log::Level::Debug) {
            if let Ok(body) = serde_json::to_string(&request) {
                log::debug!("POST {} {}", self.endpoint, body);
            }
        }

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .and_then(|response| response.error_for_status());
        let response = match response {
            Ok(response) => response,
            Err(e) => {
                log::warn!("Recognition request failed: {}", e);
                return RecognitionOutcome::Failed(FailureReason::Transport(e.to_string()));
            }
        };

        match response.json::<Value>().await {
            Ok(body) => {
                log::debug!("Recognition response: {}", body);
                interpret_response(&body)
            }
            Err(e) if e.is_decode() => {
                log::warn!("Recognition response is not JSON: {}", e);
                RecognitionOutcome::Failed(FailureReason::Malformed(e.to_string()))
            }
            Err(e) => {
                log::warn!("Failed to read recognition response: {}", e);
                RecognitionOutcome::Failed(FailureReason::Transport(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn endpoint_carries_the_input_tool_parameters() {
        let config = Config::from_lookup(|_| None).unwrap();
        let recognizer = HttpRecognizer::new(&config.recognizer).unwrap();
        assert_eq!(
            recognizer.endpoint().as_str(),
            "https://inputtools.google.com/request?itc=ko-t-i0-handwrit&app=mobilesearch"
        );
    }

    #[test]
    fn unparsable_endpoints_are_reported() {
        let mut config = Config::from_lookup(|_| None).unwrap().recognizer;
        config.url = "not a url".to_string();
        assert!(matches!(
            HttpRecognizer::new(&config),
            Err(RecognitionError::InvalidEndpoint { .. })
        ));
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_failure() {
        let mut config = Config::from_lookup(|_| None).unwrap().recognizer;
        // nothing listens on the discard port
        config.url = "http://127.0.0.1:9/request".to_string();
        config.timeout = std::time::Duration::from_secs(2);
        let recognizer = HttpRecognizer::new(&config).unwrap();

        let mut ink = crate::ink::Ink::new();
        let mut capture = crate::ink::capture::StrokeCapture::new(Default::default());
        capture.begin(crate::ink::Point::new(1.0, 1.0));
        capture.end(&mut ink);
        let request = RecognitionRequest::new(&ink, 300, 150).unwrap();

        match recognizer.recognize(request).await {
            RecognitionOutcome::Failed(FailureReason::Transport(_)) => {}
            other => panic!("expected transport failure, got {:?}", other),
        }
    }
}
