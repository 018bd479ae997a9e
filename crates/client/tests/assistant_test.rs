//! Assistant chat against the mock backend.

mod common;

use budgetly_client::{AssistantClient, ChatBackend, Conversation, Session, SessionContext};
use budgetly_core::budget::BudgetSnapshot;
use budgetly_shared::{Amount, AppError};
use rust_decimal_macros::dec;

use common::{MockBackend, TOKEN};

fn client(backend: &MockBackend) -> AssistantClient {
    let session = SessionContext::in_memory();
    session
        .establish(Session::new(TOKEN.to_string(), None))
        .unwrap();
    AssistantClient::new(backend.client(session))
}

fn budget() -> BudgetSnapshot {
    BudgetSnapshot {
        total_amount: Amount::new(dec!(50000)),
        bills: Amount::new(dec!(18500)),
        debt: Amount::new(dec!(4000)),
        savings: Amount::new(dec!(5000)),
    }
}

#[tokio::test]
async fn test_chat_sends_budget_data() {
    let backend = MockBackend::start().await;
    let assistant = client(&backend);

    let reply = assistant.chat("Is my budget healthy?", &budget()).await.unwrap();

    assert_eq!(reply, "Your total budget is 50000.");
    let chats = backend.state.chats.lock().unwrap();
    assert_eq!(chats[0]["message"], "Is my budget healthy?");
    assert_eq!(chats[0]["budgetData"]["bills"], 18500);
    assert_eq!(chats[0]["budgetData"]["savings"], 5000);
}

#[tokio::test]
async fn test_unsuccessful_reply_is_assistant_error() {
    let backend = MockBackend::start().await;
    let err = client(&backend).chat("fail", &budget()).await.unwrap_err();

    assert_eq!(err, AppError::Assistant("AI service unavailable".to_string()));
}

#[tokio::test]
async fn test_conversation_recovers_after_failure() {
    let backend = MockBackend::start().await;
    let assistant = client(&backend);
    let mut conversation = Conversation::new();

    let reply = conversation.send(&assistant, "fail", &budget()).await.cloned();
    assert_eq!(
        reply.unwrap().content,
        budgetly_client::assistant::FALLBACK_REPLY
    );
    assert_eq!(conversation.error(), Some("AI service unavailable"));

    let reply = conversation.send(&assistant, "hello", &budget()).await.cloned();
    assert_eq!(reply.unwrap().content, "Your total budget is 50000.");

    conversation.clear(&assistant).await.unwrap();
    assert_eq!(conversation.messages().len(), 1);
    assert_eq!(*backend.state.clears.lock().unwrap(), 1);
}
