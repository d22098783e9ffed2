//! Integration tests for the streaming clients.
//!
//! A throwaway HTTP server on localhost plays the provider, so the full
//! request/SSE path runs without network access.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use rgm_llm::{
    files_schema, parse_file_batch, stream_with_retry, GeminiGenerator, GenerationRequest,
    LlmError, OpenAiGenerator, RetryPolicy,
};

/// Serve the given raw responses, one per connection, and return the base URL.
async fn serve(responses: Vec<String>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        for response in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        }
    });

    format!("http://{}", addr)
}

async fn read_request(socket: &mut tokio::net::TcpStream) {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = socket.read(&mut buf).await.unwrap();
        if n == 0 {
            return;
        }
        data.extend_from_slice(&buf[..n]);
        let text = String::from_utf8_lossy(&data);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let lower = line.to_ascii_lowercase();
                    lower
                        .strip_prefix("content-length:")
                        .map(|v| v.trim().parse::<usize>().unwrap_or(0))
                })
                .unwrap_or(0);
            if data.len() >= header_end + 4 + length {
                return;
            }
        }
    }
}

fn sse_response(events: &[&str]) -> String {
    let mut body = String::new();
    for event in events {
        body.push_str("data: ");
        body.push_str(event);
        body.push_str("\r\n\r\n");
    }
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nConnection: close\r\n\r\n{}",
        body
    )
}

fn status_response(status: u16, reason: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        body.len(),
        body
    )
}

/// Gemini chunks are concatenated into the full structured response.
#[tokio::test]
async fn test_gemini_structured_stream() {
    let base = serve(vec![sse_response(&[
        r#"{"candidates":[{"content":{"parts":[{"text":"{\"files\": [{\"path\": \"calc.py\", "}],"role":"model"}}]}"#,
        r#"{"candidates":[{"content":{"parts":[{"text":"\"sourcecode\": \"x = 1\"}]}"}],"role":"model"}}]}"#,
    ])])
    .await;

    let client = GeminiGenerator::new("test-key").with_base_url(base);
    let request =
        GenerationRequest::text("gemini-2.0-flash-exp", "coder", "repo").with_schema(files_schema());

    let mut chunks = 0;
    let out = stream_with_retry(&client, &request, &RetryPolicy::immediate(1), |_| chunks += 1)
        .await
        .unwrap();

    assert_eq!(chunks, 2);
    let batch = parse_file_batch(&out.text).unwrap();
    assert_eq!(batch["calc.py"], "x = 1");
}

/// A rate-limited attempt is retried and the next attempt's text is used.
#[tokio::test]
async fn test_openai_retries_after_rate_limit() {
    let base = serve(vec![
        status_response(429, "Too Many Requests", r#"{"error":"slow down"}"#),
        sse_response(&[
            r#"{"choices":[{"index":0,"delta":{"content":"The add "}}]}"#,
            r#"{"choices":[{"index":0,"delta":{"content":"function is missing."}}]}"#,
            "[DONE]",
        ]),
    ])
    .await;

    let client = OpenAiGenerator::new("test-key").with_base_url(base);
    let request = GenerationRequest::text("gpt-4o", "analyst", "failing output");

    let out = stream_with_retry(&client, &request, &RetryPolicy::immediate(3), |_| {})
        .await
        .unwrap();

    assert_eq!(out.text, "The add function is missing.");
    assert_eq!(out.attempts, 2);
    assert!(!out.exhausted);
}

/// Authentication failures are not retried.
#[tokio::test]
async fn test_auth_failure_is_fatal() {
    let base = serve(vec![status_response(401, "Unauthorized", r#"{"error":"bad key"}"#)]).await;

    let client = GeminiGenerator::new("wrong").with_base_url(base);
    let request = GenerationRequest::text("gemini-2.0-flash-exp", "analyst", "output");

    let err = stream_with_retry(&client, &request, &RetryPolicy::immediate(3), |_| {})
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::AuthenticationFailed(_)));
}
