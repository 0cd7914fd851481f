#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use futures::{StreamExt, stream};
use homescout_agent::{CoordinatorRole, CustomRole, RetrievalRole, TranslationRole};
use homescout_core::{Content, Event, EventStream, Result, Role, RoleKind};
use homescout_rag::{HashingEmbeddingProvider, ListingDetail, ListingStore, SearchListingsTool};
use homescout_runner::{HandoffRouter, RouterEvent, TurnError, TurnResult};

/// What a scripted role does on its next invocation.
#[derive(Debug, Clone)]
pub enum Step {
    Say(String),
    HandOff(RoleKind),
}

pub type Script = Arc<Mutex<VecDeque<Step>>>;

pub fn script(steps: impl IntoIterator<Item = Step>) -> Script {
    Arc::new(Mutex::new(steps.into_iter().collect()))
}

pub fn text_events(invocation_id: &str, author: &str, text: &str) -> Vec<Result<Event>> {
    vec![
        Ok(Event::delta(invocation_id, author, text)),
        Ok(Event::message(invocation_id, author, Content::new("model").with_text(text))),
    ]
}

/// A role that pops its behavior from `script`, saying "done" once the
/// script runs out. Handing off to its own kind is turned into text.
pub fn scripted(name: &str, kind: RoleKind, script: Script) -> Arc<dyn Role> {
    let role_name = name.to_string();
    let role = CustomRole::builder(name, kind)
        .handler(move |ctx| {
            let script = Arc::clone(&script);
            let role_name = role_name.clone();
            async move {
                let step = script.lock().unwrap().pop_front();
                let inv = ctx.invocation_id().to_string();
                let events = match step {
                    Some(Step::HandOff(target)) if target != kind => {
                        let to = ctx
                            .target_for(target)
                            .map(|t| t.name.clone())
                            .unwrap_or_else(|| target.default_name().to_string());
                        vec![Ok(Event::handoff(&inv, &role_name, to))]
                    }
                    Some(Step::HandOff(_)) => text_events(&inv, &role_name, "staying"),
                    Some(Step::Say(text)) => text_events(&inv, &role_name, &text),
                    None => text_events(&inv, &role_name, "done"),
                };
                let stream: EventStream = Box::pin(stream::iter(events));
                Ok(stream)
            }
        })
        .build()
        .unwrap();
    Arc::new(role)
}

/// A role that always hands off to the role called `to`.
pub fn forwarding(name: &str, kind: RoleKind, to: &str) -> Arc<dyn Role> {
    let role_name = name.to_string();
    let to = to.to_string();
    let role = CustomRole::builder(name, kind)
        .handler(move |ctx| {
            let event = Event::handoff(ctx.invocation_id(), &role_name, &to);
            async move {
                let stream: EventStream = Box::pin(stream::iter(vec![Ok(event)]));
                Ok(stream)
            }
        })
        .build()
        .unwrap();
    Arc::new(role)
}

pub fn flat_a() -> ListingDetail {
    ListingDetail {
        title: Some("Flat A".into()),
        rooms: Some("3".into()),
        status: Some("For Sale".into()),
        description: Some("Bright flat".into()),
        nearby_schools: Some(vec!["Elm Primary".into()]),
        agent_name: Some("Jane".into()),
        address: Some("1 Main St".into()),
    }
}

pub async fn listing_store(listings: Vec<ListingDetail>) -> Arc<ListingStore> {
    let store = ListingStore::in_memory(Arc::new(HashingEmbeddingProvider::default())).await.unwrap();
    store.upsert_all(listings).await.unwrap();
    Arc::new(store)
}

/// Coordinator, retrieval over `store`, and the given translation role.
pub fn homescout_router(store: Arc<ListingStore>, translation: TranslationRole) -> HandoffRouter {
    let search = Arc::new(SearchListingsTool::new(store));
    HandoffRouter::builder()
        .role(Arc::new(CoordinatorRole::builder().build()))
        .role(Arc::new(RetrievalRole::new(search)))
        .role(Arc::new(translation))
        .build()
        .unwrap()
}

pub async fn collect_turn(router: &HandoffRouter, text: &str) -> Vec<TurnResult<RouterEvent>> {
    router.run(text).collect().await
}

/// Events of a turn that must succeed, ending with `TurnComplete`.
pub async fn completed_turn(router: &HandoffRouter, text: &str) -> Vec<RouterEvent> {
    let events: Vec<RouterEvent> =
        collect_turn(router, text).await.into_iter().map(|item| item.unwrap()).collect();
    assert!(matches!(events.last(), Some(RouterEvent::TurnComplete { .. })));
    events
}

pub fn failure(items: &[TurnResult<RouterEvent>]) -> &TurnError {
    match items.last() {
        Some(Err(error)) => error,
        other => panic!("expected the turn to fail, got {other:?}"),
    }
}

pub fn final_text(events: &[RouterEvent]) -> String {
    match events.last() {
        Some(RouterEvent::TurnComplete { text, .. }) => text.clone(),
        other => panic!("expected TurnComplete, got {other:?}"),
    }
}

pub fn handoffs(events: &[RouterEvent]) -> Vec<(String, String)> {
    events
        .iter()
        .filter_map(|event| match event {
            RouterEvent::Handoff { from, to } => Some((from.clone(), to.clone())),
            _ => None,
        })
        .collect()
}
