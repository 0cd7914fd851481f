mod common;

use std::sync::Arc;

use common::{TestContext, committed_text, handoff, history, run_role, said, streamed_text};
use homescout_agent::{NO_LISTINGS_FOUND, NOTHING_TO_TRANSLATE, TranslationRole};
use homescout_core::{Content, InvocationContext, LlmResponse, Message, Role, RoleKind, ScoutError};
use homescout_model::MockLlm;

#[tokio::test]
async fn translates_latest_retrieval_output() {
    let model = Arc::new(MockLlm::new("translator").with_streamed_text(&["Anuncio ", "de propiedad."]));
    let role = TranslationRole::new(model.clone());
    let events = run_role(
        &role,
        history(vec![
            Message::user("find flats"),
            said("retrieval", "Old listing."),
            Message::user("find more"),
            said("retrieval", "Property listing."),
            said("coordinator", "Here is one listing."),
            Message::user("translate that"),
        ]),
        &[RoleKind::Coordinator],
    )
    .await;

    assert_eq!(streamed_text(&events), "Anuncio de propiedad.");
    assert_eq!(committed_text(&events), "Anuncio de propiedad.");
    assert_eq!(handoff(&events).as_deref(), Some("coordinator"));

    let request = &model.requests()[0];
    assert!(request.contents[0].text().contains("into Spanish"));
    assert_eq!(request.contents[1].text(), "Property listing.");
}

#[tokio::test]
async fn nothing_to_translate_without_listings() {
    let model = Arc::new(MockLlm::new("translator"));
    let role = TranslationRole::new(model.clone());
    let events =
        run_role(&role, history(vec![Message::user("translate that")]), &[RoleKind::Coordinator])
            .await;

    assert_eq!(committed_text(&events), NOTHING_TO_TRANSLATE);
    assert!(model.requests().is_empty());
}

#[tokio::test]
async fn no_results_sentence_is_not_translated() {
    let role = TranslationRole::unavailable();
    let events = run_role(
        &role,
        history(vec![
            Message::user("find castles"),
            said("retrieval", NO_LISTINGS_FOUND),
            Message::user("translate that"),
        ]),
        &[RoleKind::Coordinator],
    )
    .await;

    assert_eq!(committed_text(&events), NOTHING_TO_TRANSLATE);
}

#[tokio::test]
async fn missing_model_is_a_fault() {
    let role = TranslationRole::unavailable();
    let ctx: Arc<dyn InvocationContext> = Arc::new(TestContext::new(
        "translation",
        history(vec![Message::user("find flats"), said("retrieval", "Property listing.")]),
        &[RoleKind::Coordinator],
    ));

    assert!(matches!(role.run(ctx).await, Err(ScoutError::Role(_))));
}

#[test]
fn target_language_is_configurable() {
    let role = TranslationRole::unavailable().with_language("French");
    assert_eq!(role.language(), "French");
    assert!(role.instructions().contains("into French"));
    assert_eq!(role.kind(), RoleKind::Translation);
}

fn after_search(request: &str) -> homescout_core::ConversationHistory {
    history(vec![
        Message::user("find flats"),
        said("retrieval", "Property listing."),
        said("coordinator", "Here is one listing."),
        Message::user(request),
    ])
}

#[tokio::test]
async fn closing_fragment_is_kept() {
    let closing = LlmResponse {
        content: Some(Content::new("model").with_text("mundo")),
        turn_complete: true,
        ..Default::default()
    };
    let model = Arc::new(
        MockLlm::new("translator").with_responses(vec![LlmResponse::partial_text("Hola "), closing]),
    );
    let role = TranslationRole::new(model);
    let events = run_role(&role, after_search("translate that"), &[RoleKind::Coordinator]).await;

    assert_eq!(streamed_text(&events), "Hola mundo");
    assert_eq!(committed_text(&events), "Hola mundo");
}

#[tokio::test]
async fn repeated_full_reply_is_not_duplicated() {
    let model = Arc::new(MockLlm::new("translator").with_responses(vec![
        LlmResponse::partial_text("Hola "),
        LlmResponse::partial_text("mundo"),
        LlmResponse::new(Content::new("model").with_text("Hola mundo")),
    ]));
    let role = TranslationRole::new(model);
    let events = run_role(&role, after_search("translate that"), &[RoleKind::Coordinator]).await;

    assert_eq!(streamed_text(&events), "Hola mundo");
    assert_eq!(committed_text(&events), "Hola mundo");
}
