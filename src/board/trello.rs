use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, multipart};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, info};

use crate::config::TrelloConfig;
use crate::error::{BoardsubError, Result};
use super::{Attachment, BoardClient, BoardList, Card};

/// Trello REST client. Every API call carries the key/token pair as query
/// parameters; attachment downloads authenticate with an OAuth header instead.
pub struct TrelloClient {
    client: Client,
    config: TrelloConfig,
}

impl TrelloClient {
    pub fn new(config: TrelloConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("boardsub/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(BoardsubError::Http)?;

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn auth(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Accept", "application/json")
            .query(&[("key", &self.config.api_key), ("token", &self.config.api_token)])
    }

    fn oauth_header(&self) -> String {
        format!(
            "OAuth oauth_consumer_key=\"{}\", oauth_token=\"{}\"",
            self.config.api_key, self.config.api_token
        )
    }

    async fn check(response: Response, action: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(BoardsubError::Board(format!("{} failed ({}): {}", action, status, body.trim())))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, action: &str) -> Result<T> {
        debug!("GET {}", path);
        let response = self.auth(self.client.get(self.url(path))).send().await?;
        let response = Self::check(response, action).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl BoardClient for TrelloClient {
    async fn get_lists(&self, board_id: &str) -> Result<Vec<BoardList>> {
        self.get_json(&format!("/boards/{}/lists", board_id), "Fetching board lists").await
    }

    async fn get_cards(&self, list_id: &str, limit: usize) -> Result<Vec<Card>> {
        let mut cards: Vec<Card> = self
            .get_json(&format!("/lists/{}/cards", list_id), "Fetching list cards")
            .await?;
        cards.truncate(limit);
        Ok(cards)
    }

    async fn get_attachments(&self, card_id: &str) -> Result<Vec<Attachment>> {
        self.get_json(&format!("/cards/{}/attachments", card_id), "Fetching card attachments").await
    }

    async fn download_attachment(&self, url: &str) -> Result<Vec<u8>> {
        info!("Downloading attachment {}", url);

        let response = self
            .client
            .get(url)
            .header("Authorization", self.oauth_header())
            .send()
            .await?;
        let response = Self::check(response, "Downloading attachment").await?;
        let bytes = response.bytes().await?;

        info!("Downloaded {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }

    async fn move_card(&self, card_id: &str, list_id: &str) -> Result<()> {
        debug!("PUT /cards/{} idList={}", card_id, list_id);

        let request = self
            .client
            .put(self.url(&format!("/cards/{}", card_id)))
            .query(&[("idList", list_id)]);
        let response = self.auth(request).send().await?;
        Self::check(response, "Moving card").await?;

        info!("Moved card {} to list {}", card_id, list_id);
        Ok(())
    }

    async fn create_card(&self, list_id: &str, name: &str, desc: &str) -> Result<Card> {
        debug!("POST /cards idList={} name={}", list_id, name);

        let request = self
            .client
            .post(self.url("/cards"))
            .query(&[("idList", list_id), ("name", name), ("desc", desc)]);
        let response = self.auth(request).send().await?;
        let card: Card = Self::check(response, "Creating card").await?.json().await?;

        info!("Created card '{}' in list {}", card.name, list_id);
        Ok(card)
    }

    async fn upload_attachment(&self, card_id: &str, file_path: &Path) -> Result<Attachment> {
        let file_name = file_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| BoardsubError::FileNotFound(file_path.display().to_string()))?;

        info!("Uploading {} to card {}", file_name, card_id);

        let bytes = tokio::fs::read(file_path).await?;
        let form = multipart::Form::new()
            .part("file", multipart::Part::bytes(bytes).file_name(file_name.clone()));

        let request = self
            .client
            .post(self.url(&format!("/cards/{}/attachments", card_id)))
            .multipart(form);
        let response = self.auth(request).send().await?;
        let attachment: Attachment = Self::check(response, "Uploading attachment").await?.json().await?;

        info!("{} upload successful", file_name);
        Ok(attachment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> TrelloClient {
        TrelloClient::new(TrelloConfig {
            board_id: "board-1".to_string(),
            api_key: "test-key".to_string(),
            api_token: "test-token".to_string(),
            base_url: server.uri(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_get_lists_sends_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/boards/board-1/lists"))
            .and(query_param("key", "test-key"))
            .and(query_param("token", "test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "l1", "name": "IN", "closed": false},
                {"id": "l2", "name": "Process"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let lists = client(&server).get_lists("board-1").await.unwrap();
        assert_eq!(lists.len(), 2);
        assert_eq!(lists[0].name, "IN");
        assert_eq!(lists[1].id, "l2");
    }

    #[tokio::test]
    async fn test_get_cards_truncates_to_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lists/l1/cards"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "c1", "name": "first"},
                {"id": "c2", "name": "second"}
            ])))
            .mount(&server)
            .await;

        let cards = client(&server).get_cards("l1", 1).await.unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].id, "c1");
    }

    #[tokio::test]
    async fn test_download_uses_oauth_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/download/talk.mp3"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3audio".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/download/talk.mp3", server.uri());
        let bytes = client(&server).download_attachment(&url).await.unwrap();
        assert_eq!(bytes, b"ID3audio");

        // The header value holds a comma, which wiremock's header matcher splits on
        let requests = server.received_requests().await.unwrap();
        let authorization = requests[0]
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok());
        assert_eq!(
            authorization,
            Some("OAuth oauth_consumer_key=\"test-key\", oauth_token=\"test-token\"")
        );
        assert!(requests[0].url.query().is_none());
    }

    #[tokio::test]
    async fn test_move_card() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/cards/c1"))
            .and(query_param("idList", "l2"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "c1"})))
            .expect(1)
            .mount(&server)
            .await;

        client(&server).move_card("c1", "l2").await.unwrap();
    }

    #[tokio::test]
    async fn test_move_card_error_status_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/cards/c1"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
            .mount(&server)
            .await;

        let err = client(&server).move_card("c1", "l2").await.unwrap_err();
        match err {
            BoardsubError::Board(message) => {
                assert!(message.contains("401"));
                assert!(message.contains("invalid token"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_card() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cards"))
            .and(query_param("idList", "errors-list"))
            .and(query_param("name", "Attachment Error"))
            .and(query_param("desc", "No valid attachment found"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "new", "name": "Attachment Error", "desc": "No valid attachment found"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let card = client(&server)
            .create_card("errors-list", "Attachment Error", "No valid attachment found")
            .await
            .unwrap();
        assert_eq!(card.id, "new");
    }

    #[tokio::test]
    async fn test_upload_attachment() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cards/c1/attachments"))
            .and(query_param("token", "test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "a9", "fileName": "Transcribed.txt", "url": "https://x/Transcribed.txt"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Transcribed.txt");
        std::fs::write(&file, "shalom").unwrap();

        let attachment = client(&server).upload_attachment("c1", &file).await.unwrap();
        assert_eq!(attachment.file_name.as_deref(), Some("Transcribed.txt"));

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains("filename=\"Transcribed.txt\""));
        assert!(body.contains("shalom"));
    }

    #[tokio::test]
    async fn test_upload_missing_file() {
        let server = MockServer::start().await;
        let result = client(&server)
            .upload_attachment("c1", Path::new("/nonexistent/out.mp4"))
            .await;
        assert!(matches!(result, Err(BoardsubError::Io(_))));
    }
}
