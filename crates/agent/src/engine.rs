//! Dialogue Engine
//!
//! Pure state machine. Given the stored state, the inbound text and the
//! local date it decides the next state and the ordered list of effects.
//! Nothing here touches the transport; the caller commits the state and
//! then runs the effects.
//!
//! Rules, in order:
//! 1. Daily gate: first message of the local day gets the welcome menu and
//!    is not interpreted any further.
//! 2. The `menu` keyword shows the bare menu from any mode.
//! 3. Mode-specific handling (confirmation, plan name, menu digit).
//! 4. Anything else in `Normal` is ignored.

use chrono::NaiveDate;
use serde::Serialize;

use chat_agent_core::{ConversationState, DialogueMode, Effect, MenuOption, PlanKind};

use crate::intent::{self, Confirmation};
use crate::replies::{self, ReplyCatalog};

/// What a turn amounted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TurnOutcome {
    /// First message of the day, welcome menu sent
    DailyWelcome,
    /// `menu` keyword
    Menu,
    OptionSelected(MenuOption),
    InvalidOption,
    PlanSelected(PlanKind),
    PlanNotUnderstood,
    PlanConfirmed(PlanKind),
    PlanDeclined(PlanKind),
    ConfirmationUnclear(PlanKind),
    /// Idle conversation, nothing sent
    Ignored,
}

impl TurnOutcome {
    /// Stable label for logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnOutcome::DailyWelcome => "daily_welcome",
            TurnOutcome::Menu => "menu",
            TurnOutcome::OptionSelected(_) => "option_selected",
            TurnOutcome::InvalidOption => "invalid_option",
            TurnOutcome::PlanSelected(_) => "plan_selected",
            TurnOutcome::PlanNotUnderstood => "plan_not_understood",
            TurnOutcome::PlanConfirmed(_) => "plan_confirmed",
            TurnOutcome::PlanDeclined(_) => "plan_declined",
            TurnOutcome::ConfirmationUnclear(_) => "confirmation_unclear",
            TurnOutcome::Ignored => "ignored",
        }
    }
}

/// Decision for one inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub state: ConversationState,
    pub effects: Vec<Effect>,
    pub outcome: TurnOutcome,
}

impl Turn {
    fn new(state: ConversationState, outcome: TurnOutcome, effects: Vec<Effect>) -> Self {
        Self {
            state,
            effects,
            outcome,
        }
    }

    /// Text bodies in send order
    pub fn texts(&self) -> Vec<&str> {
        self.effects.iter().filter_map(Effect::as_text).collect()
    }
}

/// Menu-driven dialogue state machine
#[derive(Debug, Clone, Default)]
pub struct DialogueEngine {
    replies: ReplyCatalog,
}

impl DialogueEngine {
    pub fn new(replies: ReplyCatalog) -> Self {
        Self { replies }
    }

    pub fn replies(&self) -> &ReplyCatalog {
        &self.replies
    }

    /// Decide the next state and effects for `input`.
    ///
    /// `display_name` is only read when the daily gate fires.
    pub fn decide(
        &self,
        state: &ConversationState,
        input: &str,
        today: NaiveDate,
        display_name: Option<&str>,
    ) -> Turn {
        if state.needs_daily_menu(today) {
            let mode = match state.mode {
                DialogueMode::Normal => DialogueMode::AwaitingOption,
                other => other,
            };
            return Turn::new(
                ConversationState::new(mode, Some(today)),
                TurnOutcome::DailyWelcome,
                vec![Effect::Typing, Effect::text(self.replies.welcome(display_name))],
            );
        }

        let text = intent::normalize(input);

        if intent::is_menu_keyword(&text) {
            return self.show_menu(state);
        }

        match state.mode {
            DialogueMode::ConfirmingPlan(kind) => self.confirm_plan(state, kind, &text),
            DialogueMode::AwaitingPlan => self.select_plan(state, &text),
            DialogueMode::AwaitingOption => match intent::parse_menu_option(&text) {
                Some(option) => self.menu_option(state, option),
                None => Turn::new(
                    *state,
                    TurnOutcome::InvalidOption,
                    vec![Effect::text(self.replies.invalid_option())],
                ),
            },
            DialogueMode::Normal => Turn::new(*state, TurnOutcome::Ignored, Vec::new()),
        }
    }

    fn show_menu(&self, state: &ConversationState) -> Turn {
        Turn::new(
            state.with_mode(DialogueMode::AwaitingOption),
            TurnOutcome::Menu,
            vec![Effect::Typing, Effect::text(self.replies.menu())],
        )
    }

    fn menu_option(&self, state: &ConversationState, option: MenuOption) -> Turn {
        let mut effects = Vec::new();
        if let Some(text) = self.replies.option_text(option) {
            effects.push(Effect::text(text));
        }

        let next = match option {
            MenuOption::TrialClass => {
                effects.push(Effect::SendSchedule);
                effects.push(Effect::MarkUnread);
                DialogueMode::Normal
            },
            MenuOption::Plans => DialogueMode::AwaitingPlan,
            MenuOption::Schedule => {
                effects.push(Effect::SendSchedule);
                DialogueMode::Normal
            },
            MenuOption::Payments | MenuOption::StaffContact => {
                effects.push(Effect::MarkUnread);
                DialogueMode::Normal
            },
            MenuOption::EndSession | MenuOption::AboutCenter => DialogueMode::Normal,
        };

        Turn::new(
            state.with_mode(next),
            TurnOutcome::OptionSelected(option),
            effects,
        )
    }

    fn select_plan(&self, state: &ConversationState, text: &str) -> Turn {
        match intent::match_plan_name(text) {
            Some(kind) => Turn::new(
                state.with_mode(DialogueMode::ConfirmingPlan(kind)),
                TurnOutcome::PlanSelected(kind),
                vec![Effect::text(replies::plan(kind).selection_prompt)],
            ),
            None => Turn::new(
                *state,
                TurnOutcome::PlanNotUnderstood,
                vec![Effect::text(self.replies.plan_not_understood())],
            ),
        }
    }

    fn confirm_plan(&self, state: &ConversationState, kind: PlanKind, text: &str) -> Turn {
        match intent::classify_confirmation(text) {
            Confirmation::Affirmative => {
                let plan = replies::plan(kind);
                let mut effects = Vec::new();
                if let Some(success) = plan.success_text {
                    effects.push(Effect::Typing);
                    effects.push(Effect::text(success));
                }
                effects.push(Effect::SendSchedule);
                if plan.requires_payment() {
                    effects.push(Effect::Typing);
                    effects.push(Effect::text(self.replies.payments()));
                }
                effects.push(Effect::MarkUnread);

                Turn::new(
                    state.with_mode(DialogueMode::Normal),
                    TurnOutcome::PlanConfirmed(kind),
                    effects,
                )
            },
            Confirmation::Negative => Turn::new(
                state.with_mode(DialogueMode::AwaitingOption),
                TurnOutcome::PlanDeclined(kind),
                vec![
                    Effect::MarkUnread,
                    Effect::text(self.replies.back_to_menu()),
                    Effect::text(self.replies.menu()),
                ],
            ),
            Confirmation::Unclear => Turn::new(
                *state,
                TurnOutcome::ConfirmationUnclear(kind),
                vec![Effect::text(self.replies.confirm_reprompt())],
            ),
        }
    }
}
