// Rendering wizard steps as Discord components and feeding interactions back

use std::collections::BTreeMap;
use std::time::Duration;

use futures::StreamExt;
use poise::serenity_prelude as serenity;
use tracing::{debug, warn};

use super::{FieldStyle, FormSpec, Input, Rejection, Selections, Step, Terminal, Wizard};
use crate::utils::config::{FORM_TIMEOUT, MENU_TIMEOUT};
use crate::{Context, Error};

/// What a component on a wizard message asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Input(Input),
    OpenForm,
}

fn component_id(wizard_id: u64, action: &str) -> String {
    format!("wizard:{}:{}", wizard_id, action)
}

/// Map a component interaction on wizard `wizard_id` to an action
pub fn decode_action(wizard_id: u64, custom_id: &str, values: &[String]) -> Option<Action> {
    let rest = custom_id.strip_prefix(&format!("wizard:{}:", wizard_id))?;
    let action = match rest {
        "prev" => Action::Input(Input::PrevPage),
        "next" => Action::Input(Input::NextPage),
        "confirm" => Action::Input(Input::Confirm),
        "open" => Action::OpenForm,
        "select" => Action::Input(Input::Pick(values.first()?.clone())),
        _ => return None,
    };
    Some(action)
}

/// Components for the current step; empty once the wizard is finished
pub fn render(wizard_id: u64, step: &Step) -> Vec<serenity::CreateActionRow> {
    match step {
        Step::Select(select) => {
            let options = select
                .pages
                .current()
                .iter()
                .map(|c| {
                    let option = serenity::CreateSelectMenuOption::new(&c.label, &c.value);
                    match &c.description {
                        Some(description) => option.description(description),
                        None => option,
                    }
                })
                .collect();

            let page_count = select.pages.page_count();
            let placeholder = if page_count > 1 {
                format!("{} (page {} of {})", select.placeholder, select.pages.page() + 1, page_count)
            } else {
                select.placeholder.clone()
            };

            let menu = serenity::CreateSelectMenu::new(
                component_id(wizard_id, "select"),
                serenity::CreateSelectMenuKind::String { options },
            )
            .placeholder(placeholder)
            .min_values(1)
            .max_values(1);

            let mut rows = vec![serenity::CreateActionRow::SelectMenu(menu)];
            if page_count > 1 {
                rows.push(serenity::CreateActionRow::Buttons(vec![
                    serenity::CreateButton::new(component_id(wizard_id, "prev"))
                        .label("⏪ Previous")
                        .style(serenity::ButtonStyle::Secondary)
                        .disabled(!select.pages.has_prev()),
                    serenity::CreateButton::new(component_id(wizard_id, "next"))
                        .label("Next ⏩")
                        .style(serenity::ButtonStyle::Secondary)
                        .disabled(!select.pages.has_next()),
                ]));
            }
            rows
        }
        Step::Confirm { label } => vec![serenity::CreateActionRow::Buttons(vec![
            serenity::CreateButton::new(component_id(wizard_id, "confirm"))
                .label(label)
                .style(serenity::ButtonStyle::Danger),
        ])],
        Step::Form(spec) => vec![serenity::CreateActionRow::Buttons(vec![
            serenity::CreateButton::new(component_id(wizard_id, "open"))
                .label(format!("📝 {}", spec.title))
                .style(serenity::ButtonStyle::Primary),
        ])],
        Step::Terminal(_) => Vec::new(),
    }
}

/// Modal for a form step
pub fn build_modal(custom_id: &str, spec: &FormSpec) -> serenity::CreateModal {
    let rows = spec
        .fields
        .iter()
        .map(|field| {
            let style = match field.style {
                FieldStyle::Short => serenity::InputTextStyle::Short,
                FieldStyle::Paragraph => serenity::InputTextStyle::Paragraph,
            };
            let mut input = serenity::CreateInputText::new(style, &field.label, field.key)
                .required(field.required);
            if let Some(placeholder) = &field.placeholder {
                input = input.placeholder(placeholder);
            }
            if let Some(max_length) = field.max_length {
                input = input.max_length(max_length);
            }
            serenity::CreateActionRow::InputText(input)
        })
        .collect();

    serenity::CreateModal::new(custom_id, &spec.title).components(rows)
}

/// Collect `custom_id -> value` from a submitted modal
pub fn form_values(rows: &[serenity::ActionRow]) -> BTreeMap<String, String> {
    rows.iter()
        .flat_map(|row| row.components.iter())
        .filter_map(|component| match component {
            serenity::ActionRowComponent::InputText(input) => {
                Some((input.custom_id.clone(), input.value.clone().unwrap_or_default()))
            }
            _ => None,
        })
        .collect()
}

/// The interaction that ended a wizard; it still owes the user one response
pub enum Responder {
    Component(serenity::ComponentInteraction),
    Modal(serenity::ModalInteraction),
}

impl Responder {
    pub fn user(&self) -> &serenity::User {
        match self {
            Responder::Component(interaction) => &interaction.user,
            Responder::Modal(interaction) => &interaction.user,
        }
    }

    async fn respond(
        &self,
        http: impl serenity::CacheHttp,
        response: serenity::CreateInteractionResponse,
    ) -> Result<(), serenity::Error> {
        match self {
            Responder::Component(interaction) => interaction.create_response(http, response).await,
            Responder::Modal(interaction) => interaction.create_response(http, response).await,
        }
    }

    /// Ephemeral acknowledgment to the user who finished the wizard
    pub async fn reply(
        &self,
        http: impl serenity::CacheHttp,
        content: impl Into<String>,
    ) -> Result<(), serenity::Error> {
        self.respond(
            http,
            serenity::CreateInteractionResponse::Message(
                serenity::CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(true),
            ),
        )
        .await
    }

    /// Acknowledge by rewriting the wizard message in place
    pub async fn update(
        &self,
        http: impl serenity::CacheHttp,
        content: impl Into<String>,
    ) -> Result<(), serenity::Error> {
        self.respond(
            http,
            serenity::CreateInteractionResponse::UpdateMessage(
                serenity::CreateInteractionResponseMessage::new()
                    .content(content)
                    .components(Vec::new()),
            ),
        )
        .await
    }
}

/// A wizard that reached `Terminal::Completed`
pub struct Completion {
    pub selections: Selections,
    pub responder: Responder,
    pub message: serenity::Message,
}

async fn reject_component(
    ctx: Context<'_>,
    interaction: &serenity::ComponentInteraction,
    rejection: &Rejection,
) -> Result<(), serenity::Error> {
    interaction
        .create_response(
            ctx,
            serenity::CreateInteractionResponse::Message(
                serenity::CreateInteractionResponseMessage::new()
                    .content(format!("❌ {}", rejection))
                    .ephemeral(true),
            ),
        )
        .await
}

/// How long a step may sit untouched before the wizard is abandoned.
/// The clock restarts after every accepted interaction.
pub fn idle_timeout(step: &Step) -> Duration {
    match step {
        Step::Form(_) => FORM_TIMEOUT,
        _ => MENU_TIMEOUT,
    }
}

enum Received {
    Component(serenity::ComponentInteraction),
    Form(serenity::ModalInteraction),
}

/// Post the wizard as a message and drive it until it finishes or sits idle.
///
/// Returns `None` when the wizard was rejected (the user has been told why) or
/// abandoned (silently). On completion the caller performs the effect and
/// answers through [`Completion::responder`].
pub async fn run(ctx: Context<'_>, prompt: &str, mut wizard: Wizard) -> Result<Option<Completion>, Error> {
    if let Step::Terminal(Terminal::Rejected(rejection)) = wizard.step() {
        ctx.say(format!("⚠️ {}", rejection)).await?;
        return Ok(None);
    }

    let wizard_id = ctx.id();
    let modal_id = component_id(wizard_id, "form");
    let reply = ctx
        .send(
            poise::CreateReply::default()
                .content(prompt)
                .components(render(wizard_id, wizard.step())),
        )
        .await?;
    let message = reply.message().await?.into_owned();

    // Anyone may click; only the initiator gets past `advance`
    let mut clicks = message
        .await_component_interactions(ctx.serenity_context())
        .stream();
    let mut forms = serenity::ModalInteractionCollector::new(ctx.serenity_context())
        .author_id(wizard.initiator())
        .custom_ids(vec![modal_id.clone()])
        .stream();

    loop {
        let next = tokio::time::timeout(idle_timeout(wizard.step()), async {
            tokio::select! {
                Some(interaction) = clicks.next() => Some(Received::Component(interaction)),
                Some(submission) = forms.next() => Some(Received::Form(submission)),
                else => None,
            }
        })
        .await;
        let Ok(Some(received)) = next else {
            break;
        };

        let interaction = match received {
            Received::Component(interaction) => interaction,
            Received::Form(submission) => {
                let values = form_values(&submission.data.components);
                match wizard.advance(submission.user.id, Input::Submit(values)) {
                    Ok(Step::Terminal(Terminal::Completed(selections))) => {
                        let selections = selections.clone();
                        clear_components(ctx, &message).await;
                        return Ok(Some(Completion {
                            selections,
                            responder: Responder::Modal(submission),
                            message,
                        }));
                    }
                    Ok(Step::Terminal(Terminal::Rejected(rejection))) => {
                        let rejection = rejection.clone();
                        Responder::Modal(submission)
                            .reply(ctx, format!("❌ {}", rejection))
                            .await?;
                        clear_components(ctx, &message).await;
                        return Ok(None);
                    }
                    Ok(_) => {
                        Responder::Modal(submission)
                            .reply(ctx, format!("❌ {}", Rejection::UnexpectedInput))
                            .await?;
                    }
                    // State is unchanged and the form button is still up
                    Err(rejection) => {
                        Responder::Modal(submission)
                            .reply(ctx, format!("❌ {}", rejection))
                            .await?;
                    }
                }
                continue;
            }
        };

        let values = match &interaction.data.kind {
            serenity::ComponentInteractionDataKind::StringSelect { values } => values.clone(),
            _ => Vec::new(),
        };
        let Some(action) = decode_action(wizard_id, &interaction.data.custom_id, &values) else {
            continue;
        };

        let step = match action {
            Action::OpenForm => {
                if interaction.user.id != wizard.initiator() {
                    reject_component(ctx, &interaction, &Rejection::NotInitiator).await?;
                    continue;
                }
                wizard.step().clone()
            }
            Action::Input(input) => match wizard.advance(interaction.user.id, input) {
                Ok(step) => step.clone(),
                Err(rejection) => {
                    reject_component(ctx, &interaction, &rejection).await?;
                    continue;
                }
            },
        };

        match step {
            Step::Select(_) | Step::Confirm { .. } => {
                interaction
                    .create_response(
                        ctx,
                        serenity::CreateInteractionResponse::UpdateMessage(
                            serenity::CreateInteractionResponseMessage::new()
                                .components(render(wizard_id, &step)),
                        ),
                    )
                    .await?;
            }
            Step::Form(ref spec) => {
                interaction
                    .create_response(
                        ctx,
                        serenity::CreateInteractionResponse::Modal(build_modal(&modal_id, spec)),
                    )
                    .await?;
                // A dismissed form can be reopened from the message
                show_components(ctx, &message, render(wizard_id, &step)).await;
            }
            Step::Terminal(Terminal::Completed(selections)) => {
                clear_components(ctx, &message).await;
                return Ok(Some(Completion {
                    selections,
                    responder: Responder::Component(interaction),
                    message,
                }));
            }
            Step::Terminal(Terminal::Rejected(rejection)) => {
                reject_component(ctx, &interaction, &rejection).await?;
                clear_components(ctx, &message).await;
                return Ok(None);
            }
        }
    }

    debug!("Wizard {} abandoned", wizard_id);
    clear_components(ctx, &message).await;
    Ok(None)
}

async fn show_components(
    ctx: Context<'_>,
    message: &serenity::Message,
    rows: Vec<serenity::CreateActionRow>,
) {
    let result = message
        .channel_id
        .edit_message(ctx, message.id, serenity::EditMessage::new().components(rows))
        .await;
    if let Err(e) = result {
        warn!("Failed to update wizard components: {:?}", e);
    }
}

async fn clear_components(ctx: Context<'_>, message: &serenity::Message) {
    show_components(ctx, message, Vec::new()).await;
}
