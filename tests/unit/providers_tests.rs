/*!
 * Tests for provider implementations and the request contract
 */

use doctrans::providers::mock::MockProvider;
use doctrans::providers::{ChatRequest, Provider};

/// Test the request builder defaults and overrides
#[test]
fn test_chatRequest_builders_shouldSetFields() {
    let request = ChatRequest::new("system", "user")
        .temperature(0.7)
        .max_tokens(512);

    assert_eq!(request.system_instruction, "system");
    assert_eq!(request.user_text, "user");
    assert_eq!(request.sampling_temperature, 0.7);
    assert_eq!(request.max_output_tokens, 512);
}

/// Test the working mock marks content lines but not batch markers
#[tokio::test]
async fn test_mockProvider_working_shouldMarkOnlyContentLines() {
    let provider = MockProvider::working();
    let request = ChatRequest::new("sys", "<<SEG_0>>\nhello\n<<SEG_END>>");

    let response = provider.complete(request).await.unwrap();

    assert_eq!(response, "<<SEG_0>>\n[TR] hello\n<<SEG_END>>");
    assert_eq!(provider.call_count(), 1);
}

/// Test the flaky mock recovers after its configured failures
#[tokio::test]
async fn test_mockProvider_flaky_shouldFailThenSucceed() {
    let provider = MockProvider::flaky(1);

    let first = provider.complete(ChatRequest::new("sys", "text")).await;
    assert!(first.is_err());

    let second = provider.complete(ChatRequest::new("sys", "text")).await;
    assert_eq!(second.unwrap(), "[TR] text");
}

/// Test the placeholder-dropping mock removes well-formed placeholders only
#[tokio::test]
async fn test_mockProvider_droppingPlaceholders_shouldStripTokens() {
    let provider = MockProvider::dropping_placeholders();
    let request = ChatRequest::new("sys", "see __KEEP_0__ and __KEEP_12__ but not __KEEP_x__");

    let response = provider.complete(request).await.unwrap();

    assert!(!response.contains("__KEEP_0__"));
    assert!(!response.contains("__KEEP_12__"));
    assert!(response.contains("__KEEP_x__"));
}

/// Test the default connection probe goes through complete()
#[tokio::test]
async fn test_provider_testConnection_shouldUseCompletion() {
    let provider = MockProvider::working();
    provider.test_connection().await.unwrap();
    assert_eq!(provider.call_count(), 1);

    let failing = MockProvider::failing();
    assert!(failing.test_connection().await.is_err());
}
