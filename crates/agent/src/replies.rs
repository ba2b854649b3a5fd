//! Reply catalog
//!
//! Fixed Portuguese texts for the menu, the numbered options and the plan
//! sub-flow. Templates only; nothing here holds state.

use chat_agent_core::{MenuOption, PlanKind};

const MENU_ITEMS: &str = "1 – Conhecer o CT\n\
    2 – Aula experimental\n\
    3 – Planos\n\
    4 – Horários\n\
    5 – Pagamentos\n\
    6 – Atendimento Pessoal\n\
    0 – Encerrar atendimento";

const ABOUT_CENTER: &str = "*Modalidades do CT*:\n\
    - Muay Thai, Boxe, Jiu Jitsu, Capoeira, Treino Funcional\n\
    *Unidades*:\n\
    • Saraiva: Rua Tapajós, 767\n\
    • Santa Mônica: Rua José Carrijo, 195\n\
    Atendemos todos os níveis: iniciantes a competidores profissionais.\n\n\
    Temos modalidades específicas para mulheres e crianças também\n\n\
    Siga nossa página no instagram @ctjhonnyalves (https://www.instagram.com/ctjhonnyalves)\n\n\
    Se quiser ver as opções novamente é só digitar *menu* 😉";

const TRIAL_CLASS: &str = "*Aula Experimental*:\n\
    Perfeito! 😃\n\
    Quando ficaria melhor pra você?\n\
    Pra te ajudar, vou te mandar a planilha de horários, só um instante.\n\n\
    Se quiser voltar ao menu é só digitar *menu* 😉";

const PLANS_OVERVIEW: &str = "Treine a hora que quiser!!! Aqui no CT trabalhamos com um sistema de \
    agendamento para te trazer mais conforto e flexibilidade\n\n\
    *Planos Disponíveis*:\n\
    - Iniciante (R$99,00): 1 aula/semana\n\
    - Lutador (R$150,00): até 3 aulas/semana + descontos\n\
    - Campeão (R$260,00): ilimitado + 1 personal/mês + descontos familiares\n\
    - Universitário (R$79,90): 4 aulas/semana + descontos\n\
    - Gympass/WellHub: Aceitamos a partir do Plano Basic, 3x semanais (Somente uma Modalidade)\n\n\
    Me conta *qual plano* te agrada mais (pode escrever o nome do plano).\n\n\
    Se quiser ver as opções novamente é só digitar *menu* 😉";

const PAYMENTS: &str = "*Pagamentos*:\n\
    Todos os pagamentos devem ser feitos para:\n\
    CNPJ: 58.656.721/0001-34\n\
    Titular: João Pedro Alves Santana (Banco Sicred)\n\n\
    Se quiser ver as opções novamente é só digitar \"menu\"😉";

const STAFF_CONTACT: &str =
    "Ok! Assim que possível, um de nossos professores irá entrar em contato";

const SESSION_ENDED: &str = "Encerrando atendimento. Se precisar de algo mais, digite *menu*.";

const BACK_TO_MENU: &str = "Sem problema! Voltei para o menu pra você 👍";

const CONFIRM_REPROMPT: &str =
    "Responde com *sim* ou *não*, por favor. (ou digite *menu* para voltar)";

const PLAN_NOT_UNDERSTOOD: &str = "Não entendi 🤔. Diga o *nome* de um plano \
    (Iniciante, Lutador, Campeão) ou digite *menu*.";

const INVALID_OPTION: &str = "Por favor, digite um número de 0 a 6 ou *menu* para ver o menu.";

const SCHEDULE_CAPTION: &str = "*Segue a planilha de horários em PDF:*";

const SCHEDULE_MISSING: &str = "⚠️ Arquivo de horários não encontrado no servidor.";

/// A plan the assistant can walk a contact through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plan {
    pub kind: PlanKind,
    /// Name as shown to contacts
    pub label: &'static str,
    /// Monthly price, when the center sets one
    pub price: Option<&'static str>,
    /// Short description followed by the yes/no question
    pub selection_prompt: &'static str,
    /// Text sent before the schedule when the contact confirms
    pub success_text: Option<&'static str>,
}

impl Plan {
    pub fn requires_payment(&self) -> bool {
        self.kind.requires_payment()
    }
}

static PLANS: [Plan; 4] = [
    Plan {
        kind: PlanKind::Starter,
        label: "Iniciante",
        price: Some("R$99,00"),
        selection_prompt: "Curtiu o *Iniciante*. Quer marcar uma *aula experimental*?",
        success_text: Some(
            "Boa decisão! 🎯 A *aula experimental* é a melhor forma de sentir o ritmo e conhecer \
             os professores. Dá pra ajustar a intensidade, tirar dúvidas e achar o melhor horário \
             pra você.\n\nVou te mandar a planilha de horários:",
        ),
    },
    Plan {
        kind: PlanKind::Fighter,
        label: "Lutador",
        price: Some("R$150,00"),
        selection_prompt: "Show! Plano *Lutador*. Quer que eu já te mande os *horários*?",
        success_text: None,
    },
    Plan {
        kind: PlanKind::Champion,
        label: "Campeão",
        price: Some("R$260,00"),
        selection_prompt: "Top! Plano *Campeão*. Quer que eu te mande a *planilha de horários*?",
        success_text: None,
    },
    Plan {
        kind: PlanKind::GymPassPartner,
        label: "Gympass/WellHub",
        price: None,
        selection_prompt: "Fico muito feliz que tenha nos encontrado pelo Wellhub/Gympass!! \
             Quer marcar uma aula?",
        success_text: Some(
            "Que ótimo!!! Ficamos felizes em ter você conosco. Irei te mandar a planilha de \
             horários para que possa marcar sua aula",
        ),
    },
];

/// Plan catalog entry for a kind
pub fn plan(kind: PlanKind) -> &'static Plan {
    match kind {
        PlanKind::Starter => &PLANS[0],
        PlanKind::Fighter => &PLANS[1],
        PlanKind::Champion => &PLANS[2],
        PlanKind::GymPassPartner => &PLANS[3],
    }
}

/// All plans in matching priority order
pub fn plans() -> &'static [Plan] {
    &PLANS
}

/// Text catalog for one assistant
#[derive(Debug, Clone)]
pub struct ReplyCatalog {
    fallback_name: String,
}

impl Default for ReplyCatalog {
    fn default() -> Self {
        Self::new("amigo")
    }
}

impl ReplyCatalog {
    pub fn new(fallback_name: impl Into<String>) -> Self {
        Self {
            fallback_name: fallback_name.into(),
        }
    }

    /// First whitespace-separated token of the display name, or the fallback
    pub fn first_name<'a>(&'a self, display_name: Option<&'a str>) -> &'a str {
        display_name
            .and_then(|name| name.split_whitespace().next())
            .unwrap_or(self.fallback_name.as_str())
    }

    /// Greeting plus the full menu, sent once per day
    pub fn welcome(&self, display_name: Option<&str>) -> String {
        format!(
            "Olá {}, bem-vindo ao CT Jhonny Alves! 🤖\n\
             Serei seu assistente virtual. Se quiser ver o menu novamente, digite *menu*.\n\n\
             {}",
            self.first_name(display_name),
            MENU_ITEMS
        )
    }

    pub fn menu(&self) -> String {
        format!("Menu:\n{}", MENU_ITEMS)
    }

    /// Leading text of a numbered option, if it has one
    pub fn option_text(&self, option: MenuOption) -> Option<&'static str> {
        match option {
            MenuOption::EndSession => Some(SESSION_ENDED),
            MenuOption::AboutCenter => Some(ABOUT_CENTER),
            MenuOption::TrialClass => Some(TRIAL_CLASS),
            MenuOption::Plans => Some(PLANS_OVERVIEW),
            MenuOption::Schedule => None,
            MenuOption::Payments => Some(PAYMENTS),
            MenuOption::StaffContact => Some(STAFF_CONTACT),
        }
    }

    pub fn payments(&self) -> &'static str {
        PAYMENTS
    }

    pub fn back_to_menu(&self) -> &'static str {
        BACK_TO_MENU
    }

    pub fn confirm_reprompt(&self) -> &'static str {
        CONFIRM_REPROMPT
    }

    pub fn plan_not_understood(&self) -> &'static str {
        PLAN_NOT_UNDERSTOOD
    }

    pub fn invalid_option(&self) -> &'static str {
        INVALID_OPTION
    }

    pub fn schedule_caption(&self) -> &'static str {
        SCHEDULE_CAPTION
    }

    pub fn schedule_missing(&self) -> &'static str {
        SCHEDULE_MISSING
    }
}
