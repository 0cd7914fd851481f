mod common;

use std::sync::Arc;

use common::{committed_text, handoff, history, run_role, said, streamed_text};
use homescout_agent::{
    CoordinatorRole, HELP_TEXT, Intent, IntentClassifier, LlmIntentClassifier, NO_LISTINGS_FOUND,
};
use homescout_core::{ConversationHistory, Message, Role, RoleKind};
use homescout_model::MockLlm;

const ALL_TARGETS: &[RoleKind] = &[RoleKind::Retrieval, RoleKind::Translation];

#[tokio::test]
async fn property_search_hands_off_to_retrieval() {
    let coordinator = CoordinatorRole::builder().build();
    let events = run_role(
        &coordinator,
        history(vec![Message::user("find 3-bedroom flats in X")]),
        ALL_TARGETS,
    )
    .await;

    assert_eq!(handoff(&events).as_deref(), Some("retrieval"));
    assert_eq!(committed_text(&events), "");
}

#[tokio::test]
async fn translate_request_hands_off_to_translation() {
    let coordinator = CoordinatorRole::builder().build();
    let events = run_role(
        &coordinator,
        history(vec![
            Message::user("find flats"),
            said("retrieval", "Property listing.\nTitle: Flat A."),
            said("coordinator", "Property listing.\nTitle: Flat A."),
            Message::user("translate that"),
        ]),
        ALL_TARGETS,
    )
    .await;

    assert_eq!(handoff(&events).as_deref(), Some("translation"));
}

#[tokio::test]
async fn no_listings_sentence_is_presented_verbatim() {
    let responder = Arc::new(MockLlm::new("responder"));
    let coordinator = CoordinatorRole::builder().responder(responder.clone()).build();
    let events = run_role(
        &coordinator,
        history(vec![Message::user("find castles"), said("retrieval", NO_LISTINGS_FOUND)]),
        ALL_TARGETS,
    )
    .await;

    assert_eq!(committed_text(&events), NO_LISTINGS_FOUND);
    assert_eq!(handoff(&events), None);
    assert!(responder.requests().is_empty());
}

#[tokio::test]
async fn translation_output_is_presented_verbatim() {
    let coordinator =
        CoordinatorRole::builder().responder(Arc::new(MockLlm::new("responder"))).build();
    let events = run_role(
        &coordinator,
        history(vec![Message::user("translate that"), said("translation", "Piso A")]),
        ALL_TARGETS,
    )
    .await;

    assert_eq!(committed_text(&events), "Piso A");
}

#[tokio::test]
async fn retrieval_output_is_summarized_by_the_responder() {
    let responder = Arc::new(MockLlm::new("responder").with_streamed_text(&["One flat ", "found."]));
    let coordinator = CoordinatorRole::builder().responder(responder.clone()).build();
    let events = run_role(
        &coordinator,
        history(vec![Message::user("find flats"), said("retrieval", "Title: Flat A.")]),
        ALL_TARGETS,
    )
    .await;

    assert_eq!(streamed_text(&events), "One flat found.");
    assert_eq!(committed_text(&events), "One flat found.");

    let request = &responder.requests()[0];
    assert_eq!(request.contents[0].role, "system");
    assert!(request.contents[1].text().contains("Title: Flat A."));
}

#[tokio::test]
async fn retrieval_output_is_verbatim_without_a_responder() {
    let coordinator = CoordinatorRole::builder().build();
    let events = run_role(
        &coordinator,
        history(vec![Message::user("find flats"), said("retrieval", "Title: Flat A.")]),
        ALL_TARGETS,
    )
    .await;

    assert_eq!(committed_text(&events), "Title: Flat A.");
}

#[tokio::test]
async fn general_question_gets_help_text_offline() {
    let coordinator = CoordinatorRole::builder().build();
    let events = run_role(&coordinator, history(vec![Message::user("hello")]), ALL_TARGETS).await;

    assert_eq!(committed_text(&events), HELP_TEXT);
    assert_eq!(handoff(&events), None);
}

#[tokio::test]
async fn general_question_is_answered_by_the_responder() {
    let coordinator = CoordinatorRole::builder()
        .responder(Arc::new(MockLlm::new("responder").with_text("Hi! Ask me about listings.")))
        .build();
    let events = run_role(&coordinator, history(vec![Message::user("hello")]), ALL_TARGETS).await;

    assert_eq!(committed_text(&events), "Hi! Ask me about listings.");
}

#[tokio::test]
async fn missing_target_is_a_role_error() {
    let coordinator = CoordinatorRole::builder().build();
    let ctx: Arc<dyn homescout_core::InvocationContext> = Arc::new(common::TestContext::new(
        "coordinator",
        history(vec![Message::user("find flats")]),
        &[],
    ));
    assert!(coordinator.run(ctx).await.is_err());
}

#[tokio::test]
async fn llm_classifier_drives_routing() {
    let classifier = LlmIntentClassifier::new(Arc::new(MockLlm::new("classifier").with_text("translate")));
    let coordinator = CoordinatorRole::builder().classifier(Arc::new(classifier)).build();
    let events =
        run_role(&coordinator, history(vec![Message::user("en español por favor")]), ALL_TARGETS)
            .await;

    assert_eq!(handoff(&events).as_deref(), Some("translation"));
}

#[tokio::test]
async fn llm_classifier_maps_unknown_labels_to_general() {
    let classifier = LlmIntentClassifier::new(Arc::new(MockLlm::new("classifier").with_text("weather")));
    let mut history = ConversationHistory::new();
    history.append(Message::user("is it sunny?"));
    assert_eq!(classifier.classify(&history).await.unwrap(), Intent::General);
}

#[test]
fn coordinator_identity() {
    let coordinator = CoordinatorRole::builder().name("host").build();
    assert_eq!(coordinator.name(), "host");
    assert_eq!(coordinator.kind(), RoleKind::Coordinator);
    assert!(coordinator.tools().is_empty());
    assert!(coordinator.instructions().contains("You are a coordinator."));
}
