#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use crate::core::errors::AgentError;
    use crate::llm::provider::LlmProvider;
    use crate::llm::service::{ensure_model_available, model_matches};
    use crate::llm::types::{ChatRequest, ProviderModel};

    struct StaticProvider {
        healthy: bool,
        models: Vec<&'static str>,
    }

    #[async_trait]
    impl LlmProvider for StaticProvider {
        fn name(&self) -> &str {
            "static"
        }

        async fn health_check(&self) -> Result<bool, AgentError> {
            Ok(self.healthy)
        }

        async fn list_models(&self) -> Result<Vec<ProviderModel>, AgentError> {
            Ok(self
                .models
                .iter()
                .map(|id| ProviderModel {
                    id: id.to_string(),
                    name: id.to_string(),
                })
                .collect())
        }

        async fn chat(&self, _request: ChatRequest, _model_id: &str) -> Result<String, AgentError> {
            Ok(String::new())
        }
    }

    #[test]
    fn test_model_matching_accepts_implicit_latest_tag() {
        assert!(model_matches("llama3.2:1b", "llama3.2:1b"));
        assert!(model_matches("llama3:latest", "llama3"));
        assert!(!model_matches("llama3:8b", "llama3"));
        assert!(!model_matches("llama3:latest", "llama3:8b"));
    }

    #[tokio::test]
    async fn test_unreachable_provider_fails_startup() {
        let provider = StaticProvider {
            healthy: false,
            models: vec!["llama3.2:1b"],
        };
        let err = ensure_model_available(&provider, "llama3.2:1b")
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Provider(_)));
    }

    #[tokio::test]
    async fn test_missing_model_lists_alternatives() {
        let provider = StaticProvider {
            healthy: true,
            models: vec!["mistral:latest", "phi3:mini"],
        };
        let err = ensure_model_available(&provider, "llama3.2:1b")
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("llama3.2:1b"));
        assert!(message.contains("mistral:latest, phi3:mini"));
    }

    #[tokio::test]
    async fn test_present_model_passes() {
        let provider = StaticProvider {
            healthy: true,
            models: vec!["llama3.2:1b"],
        };
        assert!(ensure_model_available(&provider, "llama3.2:1b").await.is_ok());
    }

    #[tokio::test]
    #[ignore]
    async fn test_live_ollama_connection() {
        use crate::llm::ollama::OllamaProvider;
        use crate::llm::types::ChatMessage;

        let provider = OllamaProvider::new("http://localhost:11434".to_string());

        let models = provider.list_models().await;
        match models {
            Ok(models) => {
                println!("Ollama Models found: {}", models.len());
                if let Some(first_model) = models.first() {
                    let mut req = ChatRequest::new(vec![ChatMessage::user("Hello")]);
                    req.max_tokens = Some(10);

                    match provider.chat(req, &first_model.id).await {
                        Ok(response) => println!("Ollama Chat Response: {}", response),
                        Err(e) => println!("Ollama Chat Error: {}", e),
                    }
                }
            }
            Err(e) => panic!("Failed to connect to Ollama: {}", e),
        }
    }

    #[tokio::test]
    #[ignore]
    async fn test_live_lmstudio_connection() {
        use crate::llm::lmstudio::LmStudioProvider;
        use crate::llm::types::ChatMessage;

        let provider = LmStudioProvider::new("http://localhost:1234".to_string());

        let models = provider.list_models().await;
        match models {
            Ok(models) => {
                println!("LM Studio Models found: {}", models.len());
                if let Some(first_model) = models.first() {
                    let mut req = ChatRequest::new(vec![ChatMessage::user("Hello")]);
                    req.max_tokens = Some(10);

                    match provider.chat(req, &first_model.id).await {
                        Ok(response) => println!("LM Studio Chat Response: {}", response),
                        Err(e) => println!("LM Studio Chat Error: {}", e),
                    }
                }
            }
            Err(e) => panic!("Failed to connect to LM Studio: {}", e),
        }
    }

    mod http {
        use std::sync::{Arc, Mutex};

        use axum::http::StatusCode;
        use axum::routing::{get, post};
        use axum::{Json, Router};
        use serde_json::{json, Value};

        use crate::core::errors::AgentError;
        use crate::llm::lmstudio::LmStudioProvider;
        use crate::llm::ollama::OllamaProvider;
        use crate::llm::provider::LlmProvider;
        use crate::llm::types::{ChatMessage, ChatRequest};

        type Bodies = Arc<Mutex<Vec<Value>>>;

        async fn spawn_stub(app: Router) -> String {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("bind stub");
            let addr = listener.local_addr().expect("local addr");
            tokio::spawn(async move {
                axum::serve(listener, app).await.expect("stub server");
            });
            format!("http://{}", addr)
        }

        /// Records each JSON body and answers with `reply`.
        fn recording_route(bodies: Bodies, reply: Value) -> axum::routing::MethodRouter {
            post(move |Json(body): Json<Value>| {
                let bodies = bodies.clone();
                let reply = reply.clone();
                async move {
                    bodies.lock().expect("lock").push(body);
                    Json(reply)
                }
            })
        }

        fn hello() -> ChatRequest {
            ChatRequest::new(vec![ChatMessage::user("hi")]).with_temperature(0.3)
        }

        #[tokio::test]
        async fn test_ollama_chat_sends_non_streaming_body() {
            let bodies: Bodies = Arc::default();
            let app = Router::new().route(
                "/api/chat",
                recording_route(
                    bodies.clone(),
                    json!({ "model": "llama3.2:1b", "message": { "role": "assistant", "content": "hello" }, "done": true }),
                ),
            );
            let provider = OllamaProvider::new(spawn_stub(app).await);

            let reply = provider.chat(hello(), "llama3.2:1b").await.expect("chat");

            assert_eq!(reply, "hello");
            let sent = bodies.lock().expect("lock").clone();
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0]["model"], json!("llama3.2:1b"));
            assert_eq!(sent[0]["stream"], json!(false));
            assert_eq!(sent[0]["messages"], json!([{ "role": "user", "content": "hi" }]));
            assert_eq!(sent[0]["options"]["temperature"], json!(0.3));
        }

        #[tokio::test]
        async fn test_ollama_tags_are_listed() {
            let app = Router::new().route(
                "/api/tags",
                get(|| async { Json(json!({ "models": [{ "name": "llama3.2:1b" }, { "name": "phi3:mini" }] })) }),
            );
            let provider = OllamaProvider::new(spawn_stub(app).await);

            let ids: Vec<String> = provider
                .list_models()
                .await
                .expect("models")
                .into_iter()
                .map(|m| m.id)
                .collect();
            assert_eq!(ids, vec!["llama3.2:1b", "phi3:mini"]);
        }

        #[tokio::test]
        async fn test_ollama_error_status_is_provider_error() {
            let app = Router::new().route(
                "/api/tags",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "down") }),
            );
            let provider = OllamaProvider::new(spawn_stub(app).await);

            let err = provider.list_models().await.unwrap_err();
            assert!(matches!(err, AgentError::Provider(_)), "got {:?}", err);
        }

        #[tokio::test]
        async fn test_ollama_off_schema_body_is_parse_error() {
            let app = Router::new()
                .route("/api/tags", get(|| async { Json(json!({ "models": [{ "id": 1 }] })) }))
                .route("/api/chat", post(|| async { Json(json!({ "error": "model not loaded" })) }));
            let provider = OllamaProvider::new(spawn_stub(app).await);

            let err = provider.list_models().await.unwrap_err();
            assert!(matches!(err, AgentError::Parse(_)), "got {:?}", err);

            let err = provider.chat(hello(), "llama3.2:1b").await.unwrap_err();
            assert!(matches!(err, AgentError::Parse(_)), "got {:?}", err);
        }

        #[tokio::test]
        async fn test_lmstudio_chat_reads_first_choice() {
            let bodies: Bodies = Arc::default();
            let app = Router::new().route(
                "/v1/chat/completions",
                recording_route(
                    bodies.clone(),
                    json!({ "choices": [
                        { "index": 0, "message": { "role": "assistant", "content": "first" } },
                        { "index": 1, "message": { "role": "assistant", "content": "second" } }
                    ]}),
                ),
            );
            let provider = LmStudioProvider::new(spawn_stub(app).await);

            let reply = provider.chat(hello(), "local-model").await.expect("chat");

            assert_eq!(reply, "first");
            let sent = bodies.lock().expect("lock").clone();
            assert_eq!(sent[0]["model"], json!("local-model"));
            assert_eq!(sent[0]["temperature"], json!(0.3));
        }

        #[tokio::test]
        async fn test_lmstudio_without_choices_is_parse_error() {
            let app = Router::new().route(
                "/v1/chat/completions",
                post(|| async { Json(json!({ "choices": [] })) }),
            );
            let provider = LmStudioProvider::new(spawn_stub(app).await);

            let err = provider.chat(hello(), "local-model").await.unwrap_err();
            assert!(matches!(err, AgentError::Parse(_)), "got {:?}", err);
        }

        #[tokio::test]
        async fn test_lmstudio_error_body_is_parse_error() {
            let app = Router::new()
                .route(
                    "/v1/chat/completions",
                    post(|| async { Json(json!({ "error": { "message": "no model" } })) }),
                )
                .route("/v1/models", get(|| async { Json(json!({ "object": "list" })) }));
            let provider = LmStudioProvider::new(spawn_stub(app).await);

            let err = provider.chat(hello(), "local-model").await.unwrap_err();
            assert!(matches!(err, AgentError::Parse(_)), "got {:?}", err);

            let err = provider.list_models().await.unwrap_err();
            assert!(matches!(err, AgentError::Parse(_)), "got {:?}", err);
        }

        #[tokio::test]
        async fn test_lmstudio_error_status_fails_generation() {
            let app = Router::new().route(
                "/v1/chat/completions",
                post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "loading") }),
            );
            let provider = LmStudioProvider::new(spawn_stub(app).await);

            let err = provider.chat(hello(), "local-model").await.unwrap_err();
            assert!(matches!(err, AgentError::Generation(_)), "got {:?}", err);
        }
    }
}
