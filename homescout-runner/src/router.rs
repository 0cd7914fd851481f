//! The handoff router: one user turn in, a stream of [`RouterEvent`]s out.

use crate::context::{CallContext, HopContext};
use crate::error::{TurnError, TurnResult};
use crate::event::{RouterEvent, TurnState};
use crate::graph::HandoffGraph;
use async_stream::stream;
use futures::{Stream, StreamExt, future::join_all};
use homescout_core::{
    ConversationHistory, Event, HandoffTarget, InvocationContext, Message, Part, Result, Role,
    RoleKind, ScoutError, Tool, ToolContext,
};
use homescout_telemetry::{debug, info, role_run_span, tool_execute_span, turn_span, warn};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

pub const DEFAULT_MAX_HOPS: usize = 10;

pub type TurnStream = Pin<Box<dyn Stream<Item = TurnResult<RouterEvent>> + Send>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    /// Role invocations allowed per turn, tool re-invocations included.
    pub max_hops: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self { max_hops: DEFAULT_MAX_HOPS }
    }
}

impl RouterConfig {
    #[must_use]
    pub fn with_max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops;
        self
    }
}

/// Registered roles, one per kind.
struct RoleTable {
    roles: HashMap<RoleKind, Arc<dyn Role>>,
}

impl RoleTable {
    fn get(&self, kind: RoleKind) -> Option<&Arc<dyn Role>> {
        self.roles.get(&kind)
    }

    fn kind_named(&self, name: &str) -> Option<RoleKind> {
        self.roles.iter().find(|(_, role)| role.name() == name).map(|(kind, _)| *kind)
    }

    fn name_of(&self, kind: RoleKind) -> &str {
        self.roles.get(&kind).map_or(kind.default_name(), |role| role.name())
    }

    fn kinds(&self) -> BTreeSet<RoleKind> {
        self.roles.keys().copied().collect()
    }
}

struct Routing {
    roles: RoleTable,
    graph: HandoffGraph,
    config: RouterConfig,
}

impl Routing {
    fn targets(&self, from: RoleKind) -> Vec<HandoffTarget> {
        self.graph
            .targets(from)
            .filter_map(|kind| {
                self.roles
                    .get(kind)
                    .map(|role| HandoffTarget { kind, name: role.name().to_string() })
            })
            .collect()
    }

    /// Kind of the role called `to`, provided `from` may hand off to it.
    fn resolve(&self, from: RoleKind, to: &str) -> TurnResult<RoleKind> {
        self.roles.kind_named(to).filter(|kind| self.graph.allows(from, *kind)).ok_or_else(|| {
            TurnError::InvalidHandoffTarget {
                from: self.roles.name_of(from).to_string(),
                to: to.to_string(),
            }
        })
    }
}

/// Drives a conversation between a coordinator and its specialist roles.
///
/// Each call to [`run`](Self::run) is one turn. The user message is appended
/// to the shared history, the coordinator is invoked, and control moves along
/// the edges of the [`HandoffGraph`] until the coordinator replies without
/// handing off. Turns are serialized: a second turn waits until the stream of
/// the first one is finished or dropped.
///
/// A role's output for a hop is committed to history only after the hop has
/// succeeded. A failed hop leaves history as it was before the hop.
pub struct HandoffRouter {
    routing: Arc<Routing>,
    history: Arc<Mutex<ConversationHistory>>,
    state: Arc<watch::Sender<TurnState>>,
}

impl HandoffRouter {
    pub fn builder() -> HandoffRouterBuilder {
        HandoffRouterBuilder::default()
    }

    pub fn config(&self) -> &RouterConfig {
        &self.routing.config
    }

    pub fn graph(&self) -> &HandoffGraph {
        &self.routing.graph
    }

    pub fn role_name(&self, kind: RoleKind) -> Option<&str> {
        self.routing.roles.get(kind).map(|role| role.name())
    }

    pub fn state(&self) -> TurnState {
        *self.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<TurnState> {
        self.state.subscribe()
    }

    /// Snapshot of the conversation. Waits for a running turn to finish.
    pub async fn history(&self) -> ConversationHistory {
        self.history.lock().await.clone()
    }

    pub fn run(&self, user_text: impl Into<String>) -> TurnStream {
        self.run_with_cancel(user_text, CancellationToken::new())
    }

    /// Like [`run`](Self::run), but the turn ends with [`TurnError::Cancelled`]
    /// as soon as `cancel` fires. Whatever was committed before that stays.
    pub fn run_with_cancel(
        &self,
        user_text: impl Into<String>,
        cancel: CancellationToken,
    ) -> TurnStream {
        let routing = Arc::clone(&self.routing);
        let history = Arc::clone(&self.history);
        let state = Arc::clone(&self.state);
        let user_text = user_text.into();

        Box::pin(stream! {
            let Some(mut history) = or_cancel(&cancel, history.lock_owned()).await else {
                yield Err(TurnError::Cancelled);
                return;
            };
            let _idle = IdleOnDrop(Arc::clone(&state));
            let invocation_id = format!("turn-{}", uuid::Uuid::new_v4());
            let turn = turn_span(&invocation_id);
            turn.in_scope(|| info!("turn started"));

            history.append(Message::user(user_text));
            let mut active = RoleKind::Coordinator;
            let mut hops = 0usize;
            state.send_replace(TurnState::RoleActive(active));
            yield Ok(RouterEvent::RoleChanged {
                role: routing.roles.name_of(active).to_string(),
                kind: active,
            });

            loop {
                if cancel.is_cancelled() {
                    yield Err(failed(&invocation_id, TurnError::Cancelled));
                    return;
                }
                if hops >= routing.config.max_hops {
                    let max_hops = routing.config.max_hops;
                    yield Err(failed(&invocation_id, TurnError::RoutingExhausted { max_hops }));
                    return;
                }
                hops += 1;

                let Some(role) = routing.roles.get(active).cloned() else {
                    let missing = ScoutError::Config(format!("no role registered for {active}"));
                    yield Err(failed(&invocation_id, TurnError::fault(active.default_name(), missing)));
                    return;
                };
                let role_name = role.name().to_string();
                let ctx: Arc<dyn InvocationContext> = Arc::new(HopContext::new(
                    invocation_id.as_str(),
                    role_name.as_str(),
                    ConversationHistory::clone(&history),
                    routing.targets(active),
                ));
                debug!(invocation.id = %invocation_id, role = %role_name, hop = hops, "invoking role");

                let span = turn.in_scope(|| role_run_span(&role_name, &invocation_id));
                let mut events = match or_cancel(&cancel, role.run(ctx).instrument(span)).await {
                    None => {
                        yield Err(failed(&invocation_id, TurnError::Cancelled));
                        return;
                    }
                    Some(Err(e)) => {
                        yield Err(failed(&invocation_id, TurnError::fault(&role_name, e)));
                        return;
                    }
                    Some(Ok(events)) => events,
                };

                let mut output = HopOutput::default();
                loop {
                    let Some(next) = or_cancel(&cancel, events.next()).await else {
                        yield Err(failed(&invocation_id, TurnError::Cancelled));
                        return;
                    };
                    match next {
                        None => break,
                        Some(Err(e)) => {
                            yield Err(failed(&invocation_id, TurnError::fault(&role_name, e)));
                            return;
                        }
                        Some(Ok(event)) if event.is_partial() => {
                            let text = event.text();
                            if !text.is_empty() {
                                yield Ok(RouterEvent::TextDelta { role: role_name.clone(), text });
                            }
                        }
                        Some(Ok(event)) => {
                            if let Err(e) = output.accept(&role_name, event) {
                                yield Err(failed(&invocation_id, TurnError::fault(&role_name, e)));
                                return;
                            }
                        }
                    }
                }

                let calls = output.calls();
                if !calls.is_empty() {
                    if let Some(target) = &output.transfer {
                        let conflict = ScoutError::Role(format!(
                            "requested tool calls and a handoff to '{target}' in the same step"
                        ));
                        yield Err(failed(&invocation_id, TurnError::fault(&role_name, conflict)));
                        return;
                    }
                    let tools = match resolve_tools(role.as_ref(), &calls) {
                        Ok(tools) => tools,
                        Err(e) => {
                            yield Err(failed(&invocation_id, TurnError::fault(&role_name, e)));
                            return;
                        }
                    };
                    for call in &calls {
                        debug!(role = %role_name, tool = %call.name, args = %call.args, "tool call");
                        yield Ok(RouterEvent::ToolCall {
                            role: role_name.clone(),
                            name: call.name.clone(),
                            args: call.args.clone(),
                        });
                    }

                    let executions = join_all(calls.iter().zip(tools).map(|(call, tool)| {
                        let tool_ctx: Arc<dyn ToolContext> =
                            Arc::new(CallContext::new(&invocation_id, &call.id, &role_name));
                        let args = call.args.clone();
                        async move { tool.execute(tool_ctx, args).await }
                            .instrument(turn.in_scope(|| tool_execute_span(&call.name)))
                    }));
                    let Some(results) = or_cancel(&cancel, executions).await else {
                        yield Err(failed(&invocation_id, TurnError::Cancelled));
                        return;
                    };
                    let responses = match results.into_iter().collect::<Result<Vec<Value>>>() {
                        Ok(responses) => responses,
                        Err(e) => {
                            yield Err(failed(&invocation_id, TurnError::fault(&role_name, e)));
                            return;
                        }
                    };

                    for message in output.messages {
                        history.append(message);
                    }
                    let parts = calls
                        .iter()
                        .zip(&responses)
                        .map(|(call, response)| {
                            Part::function_response(
                                call.name.clone(),
                                response.clone(),
                                Some(call.id.clone()),
                            )
                        })
                        .collect();
                    history.append(Message::tool(role_name.clone(), parts));

                    for (call, response) in calls.into_iter().zip(responses) {
                        yield Ok(RouterEvent::ToolResult {
                            role: role_name.clone(),
                            name: call.name,
                            response,
                        });
                    }
                    // Same role again, now with the results in its history.
                    continue;
                }

                let next = match &output.transfer {
                    Some(target) => routing.resolve(active, target).map(Some),
                    None if active.is_coordinator() => Ok(None),
                    None => routing
                        .resolve(active, routing.roles.name_of(RoleKind::Coordinator))
                        .map(Some),
                };
                let next = match next {
                    Ok(next) => next,
                    Err(e) => {
                        yield Err(failed(&invocation_id, e));
                        return;
                    }
                };

                let text = output.text();
                for message in output.messages {
                    history.append(message);
                }

                let Some(kind) = next else {
                    state.send_replace(TurnState::TurnComplete);
                    info!(invocation.id = %invocation_id, hops, "turn complete");
                    yield Ok(RouterEvent::TurnComplete { role: role_name, text, hops });
                    return;
                };

                let to = routing.roles.name_of(kind).to_string();
                debug!(invocation.id = %invocation_id, from = %role_name, to = %to, "handoff");
                yield Ok(RouterEvent::Handoff { from: role_name, to: to.clone() });
                active = kind;
                state.send_replace(TurnState::RoleActive(active));
                yield Ok(RouterEvent::RoleChanged { role: to, kind });
            }
        })
    }
}

#[derive(Default)]
pub struct HandoffRouterBuilder {
    roles: Vec<Arc<dyn Role>>,
    graph: Option<HandoffGraph>,
    config: RouterConfig,
    history: ConversationHistory,
}

impl HandoffRouterBuilder {
    pub fn role(mut self, role: Arc<dyn Role>) -> Self {
        self.roles.push(role);
        self
    }

    /// Handoff edges. Defaults to [`HandoffGraph::standard`] limited to the
    /// registered roles.
    pub fn graph(mut self, graph: HandoffGraph) -> Self {
        self.graph = Some(graph);
        self
    }

    pub fn config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_hops(mut self, max_hops: usize) -> Self {
        self.config.max_hops = max_hops;
        self
    }

    /// Start from an existing conversation instead of an empty one.
    pub fn history(mut self, history: ConversationHistory) -> Self {
        self.history = history;
        self
    }

    pub fn build(self) -> Result<HandoffRouter> {
        if self.config.max_hops == 0 {
            return Err(ScoutError::Config("max_hops must be at least 1".to_string()));
        }

        let mut roles: HashMap<RoleKind, Arc<dyn Role>> = HashMap::new();
        let mut names = BTreeSet::new();
        for role in self.roles {
            if !names.insert(role.name().to_string()) {
                return Err(ScoutError::Config(format!(
                    "role name '{}' registered twice",
                    role.name()
                )));
            }
            if let Some(existing) = roles.get(&role.kind()) {
                return Err(ScoutError::Config(format!(
                    "roles '{}' and '{}' are both registered as {}",
                    existing.name(),
                    role.name(),
                    role.kind()
                )));
            }
            roles.insert(role.kind(), role);
        }
        let roles = RoleTable { roles };
        let registered = roles.kinds();
        if !registered.contains(&RoleKind::Coordinator) {
            return Err(ScoutError::Config("a coordinator role is required".to_string()));
        }

        let graph = match self.graph {
            Some(graph) => {
                if let Some(kind) = graph.kinds().difference(&registered).next() {
                    return Err(ScoutError::Config(format!(
                        "handoff graph references {kind}, which has no registered role"
                    )));
                }
                graph
            }
            None => HandoffGraph::standard().restricted_to(&registered),
        };
        graph.validate()?;
        for kind in &registered {
            if !kind.is_coordinator() && !graph.reaches_coordinator(*kind) {
                return Err(ScoutError::Config(format!(
                    "role '{}' has no handoff path back to the coordinator",
                    roles.name_of(*kind)
                )));
            }
        }

        let (state, _) = watch::channel(TurnState::Idle);
        Ok(HandoffRouter {
            routing: Arc::new(Routing { roles, graph, config: self.config }),
            history: Arc::new(Mutex::new(self.history)),
            state: Arc::new(state),
        })
    }
}

struct PendingCall {
    name: String,
    args: Value,
    id: String,
}

/// Non-partial output of one hop, held back until the hop succeeds.
#[derive(Default)]
struct HopOutput {
    messages: Vec<Message>,
    transfer: Option<String>,
}

impl HopOutput {
    fn accept(&mut self, author: &str, event: Event) -> Result<()> {
        if let Some(target) = event.actions.transfer_to_role {
            match &self.transfer {
                Some(existing) if *existing != target => {
                    return Err(ScoutError::Role(format!(
                        "requested handoffs to both '{existing}' and '{target}'"
                    )));
                }
                _ => self.transfer = Some(target),
            }
        }
        if let Some(mut content) = event.llm_response.content {
            if content.parts.is_empty() {
                return Ok(());
            }
            for part in &mut content.parts {
                if let Part::FunctionCall { id, .. } = part {
                    id.get_or_insert_with(new_call_id);
                }
            }
            self.messages.push(Message::assistant(author, content.parts));
        }
        Ok(())
    }

    fn calls(&self) -> Vec<PendingCall> {
        self.messages
            .iter()
            .flat_map(Message::function_calls)
            .map(|(name, args, id)| PendingCall {
                name: name.to_string(),
                args: args.clone(),
                id: id.map_or_else(new_call_id, str::to_string),
            })
            .collect()
    }

    fn text(&self) -> String {
        self.messages
            .iter()
            .map(Message::text)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn new_call_id() -> String {
    format!("call_{}", uuid::Uuid::new_v4().simple())
}

fn resolve_tools(role: &dyn Role, calls: &[PendingCall]) -> Result<Vec<Arc<dyn Tool>>> {
    calls
        .iter()
        .map(|call| {
            role.tools().iter().find(|tool| tool.name() == call.name).cloned().ok_or_else(|| {
                ScoutError::Tool(format!("role '{}' has no tool named '{}'", role.name(), call.name))
            })
        })
        .collect()
}

async fn or_cancel<F: Future>(cancel: &CancellationToken, future: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        output = future => Some(output),
    }
}

fn failed(invocation_id: &str, error: TurnError) -> TurnError {
    warn!(invocation.id = %invocation_id, role = error.role().unwrap_or("-"), error = %error, "turn failed");
    error
}

struct IdleOnDrop(Arc<watch::Sender<TurnState>>);

impl Drop for IdleOnDrop {
    fn drop(&mut self) {
        self.0.send_replace(TurnState::Idle);
    }
}
