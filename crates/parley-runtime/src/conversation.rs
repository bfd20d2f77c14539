//! Conversation state machine.
//!
//! A [`ConversationRuntime`] walks one NPC's [`DialogueGraph`] at a time:
//! it plays node intros and option dialogue as timed turns, shows the
//! options whose conditions hold, and applies option side effects to the
//! injected [`StateStore`]. The presentation layer drives it with
//! [`update`](ConversationRuntime::update),
//! [`select_option`](ConversationRuntime::select_option) and
//! [`request_skip`](ConversationRuntime::request_skip), and reads back
//! [`ConversationEvent`]s with
//! [`drain_events`](ConversationRuntime::drain_events).

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use parley_core::StateStore;
use parley_script::{DialogueGraph, DialogueOption, Line, START_NODE, Speaker};

use crate::config::RuntimeConfig;
use crate::error::{ConversationError, ConversationResult};
use crate::timing::TurnTimer;
use crate::used::UsedOptions;

/// Where the conversation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversationState {
    /// No conversation.
    #[default]
    Idle,
    /// Playing a node's intro lines.
    PlayingIntro,
    /// Options are shown and input is expected.
    AwaitingChoice,
    /// Playing the hero's line for the picked option.
    PlayingHeroLine,
    /// Playing the NPC's reply to the picked option.
    PlayingNpcResponse,
}

/// Why a conversation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// An option routed to `END`.
    Exited,
    /// A node had no visible options.
    DeadEnd,
    /// An option routed to a node that does not exist.
    MissingNode,
    /// [`ConversationRuntime::exit_conversation`] was called.
    Requested,
}

/// An option as offered to the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleOption {
    /// Index of the option within its node.
    pub index: usize,
    /// Menu text.
    pub text: String,
    /// Picked before in this conversation.
    pub used: bool,
}

/// Something the presentation layer should react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationEvent {
    /// A conversation began; player input is frozen.
    Started {
        /// NPC being talked to.
        npc: String,
    },
    /// A node was entered.
    NodeEntered {
        /// Node key.
        node: String,
    },
    /// A line started playing.
    Line(Line),
    /// The option menu is up.
    OptionsShown(Vec<VisibleOption>),
    /// The option menu was taken down.
    OptionsHidden,
    /// The conversation is over; player input is released.
    Ended(EndReason),
}

/// Outcome of [`ConversationRuntime::select_option`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The option was picked.
    Accepted,
    /// No choice was pending; nothing happened.
    Ignored,
}

/// What happens once the queued lines are played.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Continuation {
    ShowOptions,
    Offer(Vec<VisibleOption>),
    Enter(String),
    Exit,
}

#[derive(Debug)]
struct Turn {
    line: Line,
    timer: TurnTimer,
}

#[derive(Debug)]
struct Session {
    npc: String,
    graph: Arc<DialogueGraph>,
    node: String,
    used: UsedOptions,
}

/// Drives conversations against a state store.
///
/// The store is owned; pass `&mut store` to keep ownership elsewhere.
#[derive(Debug)]
pub struct ConversationRuntime<S> {
    store: S,
    config: RuntimeConfig,
    state: ConversationState,
    session: Option<Session>,
    queue: VecDeque<(ConversationState, Line)>,
    turn: Option<Turn>,
    continuation: Continuation,
    options: Vec<VisibleOption>,
    events: Vec<ConversationEvent>,
}

/// Flag recording that a `once` option was spent.
pub fn once_flag(npc: &str, node: &str, option: &DialogueOption, index: usize) -> String {
    match &option.id {
        Some(id) => format!("once.{npc}.{node}.{id}"),
        None => format!("once.{npc}.{node}.{index}"),
    }
}

impl<S: StateStore> ConversationRuntime<S> {
    /// Create an idle runtime with default pacing.
    pub fn new(store: S) -> Self {
        Self::with_config(store, RuntimeConfig::default())
    }

    /// Create an idle runtime.
    pub fn with_config(store: S, config: RuntimeConfig) -> Self {
        Self {
            store,
            config,
            state: ConversationState::Idle,
            session: None,
            queue: VecDeque::new(),
            turn: None,
            continuation: Continuation::ShowOptions,
            options: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Start a conversation at the `start` node.
    pub fn enter_conversation(
        &mut self,
        npc: &str,
        graph: Arc<DialogueGraph>,
    ) -> ConversationResult<()> {
        self.enter_conversation_at(npc, graph, START_NODE)
    }

    /// Start a conversation at a given node.
    pub fn enter_conversation_at(
        &mut self,
        npc: &str,
        graph: Arc<DialogueGraph>,
        node: &str,
    ) -> ConversationResult<()> {
        if let Some(session) = &self.session {
            return Err(ConversationError::AlreadyActive {
                npc: session.npc.clone(),
            });
        }
        if !graph.contains(node) {
            return Err(ConversationError::UnknownEntryNode(node.to_string()));
        }

        info!("conversation with {npc} started at `{node}`");
        self.session = Some(Session {
            npc: npc.to_string(),
            graph,
            node: node.to_string(),
            used: UsedOptions::new(),
        });
        self.events.push(ConversationEvent::Started {
            npc: npc.to_string(),
        });
        self.enter_node(node.to_string());
        Ok(())
    }

    /// End the conversation now. No-op when idle.
    pub fn exit_conversation(&mut self) {
        if self.session.is_some() {
            self.end(EndReason::Requested);
        }
    }

    /// Pick an option from the visible list.
    ///
    /// `index` counts visible options only. Calls made while no choice is
    /// pending are ignored.
    pub fn select_option(&mut self, index: usize) -> ConversationResult<Selection> {
        if self.state != ConversationState::AwaitingChoice {
            debug!("selection {index} ignored in state {:?}", self.state);
            return Ok(Selection::Ignored);
        }
        let Some(visible) = self.options.get(index) else {
            return Err(ConversationError::InvalidChoice(index));
        };
        let Some(session) = self.session.as_mut() else {
            return Ok(Selection::Ignored);
        };

        let option_index = visible.index;
        let graph = Arc::clone(&session.graph);
        let node_key = session.node.clone();
        let Some(option) = graph
            .node(&node_key)
            .and_then(|node| node.options.get(option_index))
        else {
            return Err(ConversationError::InvalidChoice(index));
        };

        // Leave AwaitingChoice before touching the store.
        self.state = ConversationState::PlayingHeroLine;
        self.options.clear();
        self.events.push(ConversationEvent::OptionsHidden);

        debug!("picked `{}` in `{node_key}`", option.text);
        session.used.mark(node_key.as_str(), option_index);
        if let Some(id) = &option.id {
            self.store.mark_asked(id);
        }
        if option.is_once() {
            let flag = once_flag(&session.npc, &node_key, option, option_index);
            self.store.set_flag(&flag, true.into());
        }
        if let Some(actions) = &option.actions {
            actions.apply(&mut self.store);
        }

        if !option.hero_line.is_empty() {
            let line = Line::new(
                Speaker::Hero,
                self.config.hero.as_str(),
                option.hero_line.as_str(),
            );
            self.queue
                .push_back((ConversationState::PlayingHeroLine, line));
        }
        for line in option.npc_response.iter().flatten() {
            self.queue
                .push_back((ConversationState::PlayingNpcResponse, line.clone()));
        }

        self.continuation = match (&option.next_node, option.exit) {
            (_, true) => Continuation::Exit,
            (Some(next), false) => Continuation::Enter(next.clone()),
            (None, false) => Continuation::ShowOptions,
        };
        self.play_next();
        Ok(Selection::Accepted)
    }

    /// Advance the line on screen by `dt`, moving on when it runs out.
    ///
    /// Time left over from a finished line carries into the next one.
    pub fn update(&mut self, dt: Duration) {
        let mut dt = dt;
        while let Some(turn) = self.turn.as_mut() {
            match turn.timer.advance(dt) {
                Some(rest) => {
                    dt = rest;
                    self.turn = None;
                    self.play_next();
                }
                None => break,
            }
        }
    }

    /// Cut the current line short.
    ///
    /// Honored only once the line has been up for the skip guard; returns
    /// whether it was.
    pub fn request_skip(&mut self) -> bool {
        let honored = self
            .turn
            .as_ref()
            .is_some_and(|turn| turn.timer.can_skip(self.config.skip_guard));
        if honored {
            self.turn = None;
            self.play_next();
        }
        honored
    }

    /// Current state.
    pub fn state(&self) -> ConversationState {
        self.state
    }

    /// Whether a conversation is running.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Whether player movement input should be blocked.
    pub fn is_input_frozen(&self) -> bool {
        self.session.is_some()
    }

    /// Key of the current node.
    pub fn current_node(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.node.as_str())
    }

    /// NPC being talked to.
    pub fn current_npc(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.npc.as_str())
    }

    /// Line on screen.
    pub fn current_line(&self) -> Option<&Line> {
        self.turn.as_ref().map(|turn| &turn.line)
    }

    /// Time left on the current line.
    pub fn turn_remaining(&self) -> Option<Duration> {
        self.turn.as_ref().map(|turn| turn.timer.remaining())
    }

    /// Options on offer while awaiting a choice.
    pub fn visible_options(&self) -> &[VisibleOption] {
        &self.options
    }

    /// Options picked so far in this conversation.
    pub fn used_options(&self) -> Option<&UsedOptions> {
        self.session.as_ref().map(|s| &s.used)
    }

    /// Take the events produced since the last call.
    pub fn drain_events(&mut self) -> Vec<ConversationEvent> {
        std::mem::take(&mut self.events)
    }

    /// The state store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The state store, mutably.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Runtime settings.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Give back the store.
    pub fn into_store(self) -> S {
        self.store
    }

    fn enter_node(&mut self, key: String) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let graph = Arc::clone(&session.graph);
        let Some(node) = graph.node(&key) else {
            warn!(
                "dialogue for {} routes to missing node `{key}`; ending conversation",
                session.npc
            );
            self.end(EndReason::MissingNode);
            return;
        };

        debug!("entering node `{key}`");
        session.node.clone_from(&key);
        self.events.push(ConversationEvent::NodeEntered { node: key });
        // The menu reflects the store as it was on entry, not after the intro.
        let options = self.collect_options().unwrap_or_default();
        if let Some(intro) = node.intro_for(&self.store) {
            self.queue.extend(
                intro
                    .lines
                    .iter()
                    .map(|line| (ConversationState::PlayingIntro, line.clone())),
            );
        }
        self.continuation = Continuation::Offer(options);
        self.play_next();
    }

    fn play_next(&mut self) {
        if let Some((state, line)) = self.queue.pop_front() {
            self.state = state;
            let timer = TurnTimer::new(self.config.turn_duration(&line.text));
            self.events.push(ConversationEvent::Line(line.clone()));
            self.turn = Some(Turn { line, timer });
            return;
        }

        match std::mem::replace(&mut self.continuation, Continuation::ShowOptions) {
            Continuation::ShowOptions => match self.collect_options() {
                Some(options) => self.offer(options),
                None => self.end(EndReason::MissingNode),
            },
            Continuation::Offer(options) => self.offer(options),
            Continuation::Enter(node) => self.enter_node(node),
            Continuation::Exit => self.end(EndReason::Exited),
        }
    }

    /// Options of the current node the store lets through right now.
    fn collect_options(&self) -> Option<Vec<VisibleOption>> {
        let session = self.session.as_ref()?;
        let node = session.graph.node(&session.node)?;

        let store = &self.store;
        let options = node
            .visible_options(store)
            .filter(|&(index, option)| {
                !option.is_once()
                    || !store.is_flag_set(&once_flag(&session.npc, &session.node, option, index))
            })
            .map(|(index, option)| VisibleOption {
                index,
                text: option.text.clone(),
                used: session.used.is_used(&session.node, index),
            })
            .collect();
        Some(options)
    }

    fn offer(&mut self, options: Vec<VisibleOption>) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if options.is_empty() {
            warn!(
                "node `{}` of {} has no visible options; ending conversation",
                session.node, session.npc
            );
            self.end(EndReason::DeadEnd);
            return;
        }

        self.state = ConversationState::AwaitingChoice;
        self.options = options.clone();
        self.events.push(ConversationEvent::OptionsShown(options));
    }

    fn end(&mut self, reason: EndReason) {
        if let Some(session) = self.session.take() {
            info!("conversation with {} ended: {reason:?}", session.npc);
        }
        self.state = ConversationState::Idle;
        self.queue.clear();
        self.turn = None;
        self.continuation = Continuation::ShowOptions;
        if !self.options.is_empty() {
            self.options.clear();
            self.events.push(ConversationEvent::OptionsHidden);
        }
        self.events.push(ConversationEvent::Ended(reason));
    }
}
