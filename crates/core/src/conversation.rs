//! Conversation types: identifiers, dialogue modes and per-conversation state

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Opaque identifier of a single private chat.
///
/// Only compared for equality and used as a map key. The transport decides
/// what the string looks like.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ConversationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The four plans offered by the training center
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanKind {
    /// "Iniciante", one class per week
    Starter,
    /// "Lutador", up to three classes per week
    Fighter,
    /// "Campeão", unlimited
    Champion,
    /// Gympass / Wellhub partnership
    GymPassPartner,
}

impl PlanKind {
    /// Fixed priority order used when resolving a plan name from free text
    pub const PRIORITY: [PlanKind; 4] = [
        PlanKind::Starter,
        PlanKind::Fighter,
        PlanKind::Champion,
        PlanKind::GymPassPartner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanKind::Starter => "starter",
            PlanKind::Fighter => "fighter",
            PlanKind::Champion => "champion",
            PlanKind::GymPassPartner => "gym_pass_partner",
        }
    }

    /// Whether confirming this plan ends with the payment details
    pub fn requires_payment(&self) -> bool {
        !matches!(self, PlanKind::GymPassPartner)
    }
}

impl std::fmt::Display for PlanKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dialogue mode of a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DialogueMode {
    /// Idle. Initial mode and the mode every finished sub-flow returns to.
    #[default]
    Normal,
    /// Menu was shown, waiting for a digit
    AwaitingOption,
    /// Plans were listed, waiting for a plan name
    AwaitingPlan,
    /// A plan was picked, waiting for yes/no
    ConfirmingPlan(PlanKind),
}

impl DialogueMode {
    pub fn display_name(&self) -> &'static str {
        match self {
            DialogueMode::Normal => "Normal",
            DialogueMode::AwaitingOption => "Awaiting Option",
            DialogueMode::AwaitingPlan => "Awaiting Plan",
            DialogueMode::ConfirmingPlan(_) => "Confirming Plan",
        }
    }
}

impl std::fmt::Display for DialogueMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DialogueMode::ConfirmingPlan(kind) => write!(f, "Confirming Plan ({})", kind),
            other => f.write_str(other.display_name()),
        }
    }
}

/// Remembered state of one conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConversationState {
    /// Current dialogue mode
    pub mode: DialogueMode,
    /// Local calendar date the welcome menu was last sent on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_menu_date: Option<NaiveDate>,
}

impl ConversationState {
    pub fn new(mode: DialogueMode, last_menu_date: Option<NaiveDate>) -> Self {
        Self {
            mode,
            last_menu_date,
        }
    }

    /// True when the welcome menu has not been sent yet on `today`
    pub fn needs_daily_menu(&self, today: NaiveDate) -> bool {
        self.last_menu_date != Some(today)
    }

    pub fn with_mode(mut self, mode: DialogueMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Numbered entries of the main menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuOption {
    EndSession,
    AboutCenter,
    TrialClass,
    Plans,
    Schedule,
    Payments,
    StaffContact,
}

impl MenuOption {
    /// Map a menu digit (0-6) to its option
    pub fn from_digit(digit: char) -> Option<Self> {
        match digit {
            '0' => Some(MenuOption::EndSession),
            '1' => Some(MenuOption::AboutCenter),
            '2' => Some(MenuOption::TrialClass),
            '3' => Some(MenuOption::Plans),
            '4' => Some(MenuOption::Schedule),
            '5' => Some(MenuOption::Payments),
            '6' => Some(MenuOption::StaffContact),
            _ => None,
        }
    }

    pub fn digit(&self) -> char {
        match self {
            MenuOption::EndSession => '0',
            MenuOption::AboutCenter => '1',
            MenuOption::TrialClass => '2',
            MenuOption::Plans => '3',
            MenuOption::Schedule => '4',
            MenuOption::Payments => '5',
            MenuOption::StaffContact => '6',
        }
    }
}

/// Inbound text message from a private conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    pub conversation_id: ConversationId,
    pub body: String,
    /// Display name as announced by the transport, when it carries one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
}

impl InboundMessage {
    pub fn new(conversation_id: impl Into<ConversationId>, body: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            body: body.into(),
            sender_name: None,
        }
    }

    pub fn with_sender_name(mut self, name: impl Into<String>) -> Self {
        self.sender_name = Some(name.into());
        self
    }
}
