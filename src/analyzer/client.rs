use crate::analyzer::{
    parse_analysis_response, AnalysisResponse, AnalyzerError, AnalyzerRequest, AnalyzerResult,
    StructureAnalyzer,
};
use crate::config::AnalyzerConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Posts the request as JSON to a configured endpoint
#[derive(Debug, Clone)]
pub struct HttpAnalyzer {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpAnalyzer {
    pub fn new(client: Client, config: &AnalyzerConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

#[async_trait]
impl StructureAnalyzer for HttpAnalyzer {
    async fn analyze(&self, request: &AnalyzerRequest) -> AnalyzerResult<AnalysisResponse> {
        let base_url = Url::parse(&request.url).map_err(|e| AnalyzerError::Malformed(e.to_string()))?;

        tracing::debug!("Sending {} chars of HTML to {}", request.html.chars().count(), self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalyzerError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        parse_analysis_response(&body, &base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn analyzer_for(server: &MockServer) -> HttpAnalyzer {
        let config = AnalyzerConfig {
            endpoint: format!("{}/analyze", server.uri()),
            max_html_chars: 1000,
            timeout_secs: 5,
        };
        HttpAnalyzer::new(Client::new(), &config)
    }

    #[tokio::test]
    async fn test_analyze_parses_answer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"dictionary": [{"term": "청년부", "category": "department"}]}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let request = AnalyzerRequest::new("https://church.example/", "<html></html>", 1000);
        let answer = analyzer_for(&server).analyze(&request).await.unwrap();

        assert_eq!(answer.dictionary.len(), 1);
        assert!(answer.navigation.is_empty());
    }

    #[tokio::test]
    async fn test_analyze_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let request = AnalyzerRequest::new("https://church.example/", "", 1000);
        let err = analyzer_for(&server).analyze(&request).await.unwrap_err();

        assert!(matches!(err, AnalyzerError::Status(503)));
    }
}
