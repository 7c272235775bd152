// Wizards - multi-step select/confirm/form flows driven by one user

pub mod candidates;
pub mod paging;
pub mod view;

use std::collections::{BTreeMap, VecDeque};

use poise::serenity_prelude as serenity;

use self::paging::Paginator;

/// One option of a select step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub value: String,
    pub label: String,
    pub description: Option<String>,
}

impl Candidate {
    pub fn new(value: impl ToString, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: candidates::truncate_label(label),
            description: None,
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(candidates::truncate_label(description));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStyle {
    Short,
    Paragraph,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub key: &'static str,
    pub label: String,
    pub style: FieldStyle,
    pub required: bool,
    pub placeholder: Option<String>,
    pub max_length: Option<u16>,
}

impl FormField {
    pub fn short(key: &'static str, label: &str) -> Self {
        Self {
            key,
            label: label.to_string(),
            style: FieldStyle::Short,
            required: true,
            placeholder: None,
            max_length: None,
        }
    }

    pub fn paragraph(key: &'static str, label: &str) -> Self {
        Self {
            style: FieldStyle::Paragraph,
            ..Self::short(key, label)
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    pub fn max_length(mut self, max_length: u16) -> Self {
        self.max_length = Some(max_length);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSpec {
    pub title: String,
    pub fields: Vec<FormField>,
    /// Select keys that must have been picked before the form can be submitted
    pub requires: Vec<&'static str>,
}

impl FormSpec {
    pub fn new(title: &str, fields: Vec<FormField>) -> Self {
        Self {
            title: title.to_string(),
            fields,
            requires: Vec::new(),
        }
    }

    pub fn requires(mut self, keys: &[&'static str]) -> Self {
        self.requires.extend_from_slice(keys);
        self
    }
}

/// A planned step, before it becomes current
#[derive(Debug, Clone)]
pub enum Stage {
    Select {
        key: &'static str,
        placeholder: String,
        candidates: Vec<Candidate>,
    },
    Confirm {
        label: String,
    },
    Form(FormSpec),
}

impl Stage {
    pub fn select(key: &'static str, placeholder: &str, candidates: Vec<Candidate>) -> Self {
        Stage::Select {
            key,
            placeholder: placeholder.to_string(),
            candidates,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectStep {
    pub key: &'static str,
    pub placeholder: String,
    pub pages: Paginator<Candidate>,
}

/// The current state of a wizard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Select(SelectStep),
    Confirm { label: String },
    Form(FormSpec),
    Terminal(Terminal),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Terminal {
    Completed(Selections),
    Rejected(Rejection),
}

/// Everything picked, confirmed and typed so far
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selections {
    picks: BTreeMap<&'static str, String>,
    fields: BTreeMap<&'static str, String>,
    confirmed: bool,
}

impl Selections {
    pub fn pick(&self, key: &str) -> Option<&str> {
        self.picks.get(key).map(String::as_str)
    }

    /// A pick interpreted as a platform id
    pub fn pick_id(&self, key: &str) -> Option<u64> {
        self.pick(key)?.parse().ok().filter(|id| *id != 0)
    }

    /// A submitted form value; blank values are never stored
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn confirmed(&self) -> bool {
        self.confirmed
    }
}

/// Something the user did on the current step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    PrevPage,
    NextPage,
    Pick(String),
    Confirm,
    Submit(BTreeMap<String, String>),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("No valid {} options are available.", .0.replace('_', " "))]
    NoCandidates(&'static str),
    #[error("Only the person who started this can use it.")]
    NotInitiator,
    #[error("That option is no longer available.")]
    UnknownChoice,
    #[error("That action does not fit this step.")]
    UnexpectedInput,
    #[error("A {} must be chosen first.", .0.replace('_', " "))]
    MissingSelection(&'static str),
    #[error("The `{0}` field cannot be empty.")]
    MissingField(&'static str),
    #[error("This menu is already finished.")]
    Finished,
}

#[derive(Debug, Clone)]
pub struct Wizard {
    initiator: serenity::UserId,
    plan: VecDeque<Stage>,
    step: Step,
    selections: Selections,
}

impl Wizard {
    /// Build a wizard and enter its first stage
    pub fn start(initiator: serenity::UserId, stages: Vec<Stage>) -> Self {
        let mut wizard = Self {
            initiator,
            plan: stages.into(),
            step: Step::Terminal(Terminal::Rejected(Rejection::Finished)),
            selections: Selections::default(),
        };
        wizard.enter_next();
        wizard
    }

    pub fn initiator(&self) -> serenity::UserId {
        self.initiator
    }

    pub fn step(&self) -> &Step {
        &self.step
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.step, Step::Terminal(_))
    }

    /// Apply one input. A rejection leaves the wizard exactly as it was.
    pub fn advance(&mut self, actor: serenity::UserId, input: Input) -> Result<&Step, Rejection> {
        if self.is_finished() {
            return Err(Rejection::Finished);
        }
        if actor != self.initiator {
            return Err(Rejection::NotInitiator);
        }

        enum Next {
            Stay,
            Advance,
            Finish(Terminal),
        }

        let next = match (&mut self.step, input) {
            (Step::Select(select), Input::NextPage) => {
                select.pages.next_page();
                Next::Stay
            }
            (Step::Select(select), Input::PrevPage) => {
                select.pages.prev_page();
                Next::Stay
            }
            (Step::Select(select), Input::Pick(value)) => {
                if !select.pages.items().iter().any(|c| c.value == value) {
                    return Err(Rejection::UnknownChoice);
                }
                self.selections.picks.insert(select.key, value);
                Next::Advance
            }
            (Step::Confirm { .. }, Input::Confirm) => {
                self.selections.confirmed = true;
                Next::Advance
            }
            (Step::Form(spec), Input::Submit(values)) => {
                match validate_form(spec, &self.selections, values) {
                    Ok(fields) => {
                        self.selections.fields.extend(fields);
                        Next::Advance
                    }
                    Err(rejection) => Next::Finish(Terminal::Rejected(rejection)),
                }
            }
            _ => return Err(Rejection::UnexpectedInput),
        };

        match next {
            Next::Stay => {}
            Next::Advance => self.enter_next(),
            Next::Finish(terminal) => self.step = Step::Terminal(terminal),
        }

        Ok(&self.step)
    }

    fn enter_next(&mut self) {
        self.step = match self.plan.pop_front() {
            Some(Stage::Select {
                key,
                placeholder,
                candidates,
            }) => {
                if candidates.is_empty() {
                    Step::Terminal(Terminal::Rejected(Rejection::NoCandidates(key)))
                } else {
                    Step::Select(SelectStep {
                        key,
                        placeholder,
                        pages: Paginator::new(candidates),
                    })
                }
            }
            Some(Stage::Confirm { label }) => Step::Confirm { label },
            Some(Stage::Form(spec)) => Step::Form(spec),
            None => Step::Terminal(Terminal::Completed(std::mem::take(&mut self.selections))),
        };
    }
}

/// Validate a form submitted outside a running wizard, such as one opened by
/// a persistent button after a restart
pub fn submit_form(
    initiator: serenity::UserId,
    spec: FormSpec,
    values: BTreeMap<String, String>,
) -> Result<Selections, Rejection> {
    let mut wizard = Wizard::start(initiator, vec![Stage::Form(spec)]);
    match wizard.advance(initiator, Input::Submit(values))? {
        Step::Terminal(Terminal::Completed(selections)) => Ok(selections.clone()),
        Step::Terminal(Terminal::Rejected(rejection)) => Err(rejection.clone()),
        _ => Err(Rejection::UnexpectedInput),
    }
}

fn validate_form(
    spec: &FormSpec,
    selections: &Selections,
    mut values: BTreeMap<String, String>,
) -> Result<BTreeMap<&'static str, String>, Rejection> {
    if let Some(missing) = spec.requires.iter().find(|key| selections.pick(key).is_none()) {
        return Err(Rejection::MissingSelection(*missing));
    }

    let mut fields = BTreeMap::new();
    for field in &spec.fields {
        let value = values
            .remove(field.key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        match value {
            Some(value) => {
                fields.insert(field.key, value);
            }
            None if field.required => return Err(Rejection::MissingField(field.key)),
            None => {}
        }
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: u64) -> serenity::UserId {
        serenity::UserId::new(id)
    }

    fn numbered(n: usize) -> Vec<Candidate> {
        (1..=n).map(|i| Candidate::new(i, &format!("option {}", i))).collect()
    }

    fn form() -> FormSpec {
        FormSpec::new(
            "Compose",
            vec![
                FormField::short("title", "Title"),
                FormField::paragraph("body", "Body"),
                FormField::short("image", "Image URL").optional(),
            ],
        )
        .requires(&["mention", "type"])
    }

    fn values(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_single_select_completes() {
        let mut wizard = Wizard::start(user(1), vec![Stage::select("role", "Pick a role", numbered(3))]);
        assert!(matches!(wizard.step(), Step::Select(_)));

        let step = wizard.advance(user(1), Input::Pick("2".into())).unwrap().clone();
        match step {
            Step::Terminal(Terminal::Completed(selections)) => {
                assert_eq!(selections.pick("role"), Some("2"));
                assert_eq!(selections.pick_id("role"), Some(2));
            }
            other => panic!("unexpected step {:?}", other),
        }
        assert_eq!(wizard.advance(user(1), Input::Confirm), Err(Rejection::Finished));
    }

    #[test]
    fn test_no_candidates_rejects_at_start() {
        let wizard = Wizard::start(user(1), vec![Stage::select("role", "Pick", Vec::new())]);
        assert_eq!(
            wizard.step(),
            &Step::Terminal(Terminal::Rejected(Rejection::NoCandidates("role")))
        );
    }

    #[test]
    fn test_later_empty_stage_rejects_when_reached() {
        let mut wizard = Wizard::start(
            user(1),
            vec![
                Stage::select("mention", "Mention", numbered(2)),
                Stage::select("message_type", "Type", Vec::new()),
            ],
        );
        let step = wizard.advance(user(1), Input::Pick("1".into())).unwrap();
        assert_eq!(
            step,
            &Step::Terminal(Terminal::Rejected(Rejection::NoCandidates("message_type")))
        );
        assert_eq!(
            Rejection::NoCandidates("message_type").to_string(),
            "No valid message type options are available."
        );
    }

    #[test]
    fn test_paging_preserves_upstream_picks() {
        let mut wizard = Wizard::start(
            user(1),
            vec![
                Stage::select("mention", "Mention", numbered(2)),
                Stage::select("channel", "Channel", numbered(60)),
            ],
        );
        wizard.advance(user(1), Input::Pick("2".into())).unwrap();
        wizard.advance(user(1), Input::NextPage).unwrap();
        wizard.advance(user(1), Input::NextPage).unwrap();
        wizard.advance(user(1), Input::NextPage).unwrap();

        match wizard.step() {
            Step::Select(select) => {
                assert_eq!(select.pages.page(), 2);
                assert_eq!(select.pages.current().len(), 10);
            }
            other => panic!("unexpected step {:?}", other),
        }

        wizard.advance(user(1), Input::PrevPage).unwrap();
        let step = wizard.advance(user(1), Input::Pick("55".into())).unwrap();
        match step {
            Step::Terminal(Terminal::Completed(selections)) => {
                assert_eq!(selections.pick("mention"), Some("2"));
                assert_eq!(selections.pick("channel"), Some("55"));
            }
            other => panic!("unexpected step {:?}", other),
        }
    }

    #[test]
    fn test_unknown_pick_leaves_state() {
        let mut wizard = Wizard::start(user(1), vec![Stage::select("role", "Pick", numbered(3))]);
        let before = wizard.step().clone();
        assert_eq!(wizard.advance(user(1), Input::Pick("99".into())), Err(Rejection::UnknownChoice));
        assert_eq!(wizard.step(), &before);
    }

    #[test]
    fn test_confirm_by_other_identity_is_rejected() {
        let mut wizard = Wizard::start(
            user(1),
            vec![Stage::Confirm {
                label: "Yes, purge".into(),
            }],
        );
        let before = wizard.step().clone();

        assert_eq!(wizard.advance(user(2), Input::Confirm), Err(Rejection::NotInitiator));
        assert_eq!(wizard.step(), &before);
        assert!(!wizard.is_finished());

        match wizard.advance(user(1), Input::Confirm).unwrap() {
            Step::Terminal(Terminal::Completed(selections)) => assert!(selections.confirmed()),
            other => panic!("unexpected step {:?}", other),
        }
    }

    #[test]
    fn test_wrong_input_for_step() {
        let mut wizard = Wizard::start(user(1), vec![Stage::Confirm { label: "Go".into() }]);
        assert_eq!(wizard.advance(user(1), Input::NextPage), Err(Rejection::UnexpectedInput));
        assert_eq!(
            wizard.advance(user(1), Input::Pick("1".into())),
            Err(Rejection::UnexpectedInput)
        );
    }

    #[test]
    fn test_form_submission_completes() {
        let mut wizard = Wizard::start(
            user(1),
            vec![
                Stage::select("mention", "Mention", numbered(2)),
                Stage::select("type", "Type", numbered(2)),
                Stage::Form(form()),
            ],
        );
        wizard.advance(user(1), Input::Pick("1".into())).unwrap();
        let step = wizard.advance(user(1), Input::Pick("2".into())).unwrap();
        assert!(matches!(step, Step::Form(_)));

        let submitted = values(&[("title", " Hello "), ("body", "World"), ("image", "  ")]);
        match wizard.advance(user(1), Input::Submit(submitted)).unwrap() {
            Step::Terminal(Terminal::Completed(selections)) => {
                assert_eq!(selections.field("title"), Some("Hello"));
                assert_eq!(selections.field("body"), Some("World"));
                assert_eq!(selections.field("image"), None);
                assert_eq!(selections.pick("type"), Some("2"));
            }
            other => panic!("unexpected step {:?}", other),
        }
    }

    #[test]
    fn test_form_missing_required_field_rejects() {
        let mut wizard = Wizard::start(
            user(1),
            vec![Stage::Form(FormSpec::new("Ticket", vec![FormField::short("name", "Name")]))],
        );
        let step = wizard.advance(user(1), Input::Submit(values(&[("name", "   ")]))).unwrap();
        assert_eq!(step, &Step::Terminal(Terminal::Rejected(Rejection::MissingField("name"))));
    }

    #[test]
    fn test_submit_form() {
        let spec = FormSpec::new("Suggestion", vec![FormField::paragraph("message", "Message")]);

        let selections = submit_form(user(3), spec.clone(), values(&[("message", "more emojis")])).unwrap();
        assert_eq!(selections.field("message"), Some("more emojis"));

        assert_eq!(
            submit_form(user(3), spec, values(&[])),
            Err(Rejection::MissingField("message"))
        );
    }

    #[test]
    fn test_form_missing_upstream_selection_rejects() {
        let mut wizard = Wizard::start(user(1), vec![Stage::Form(form())]);
        let step = wizard
            .advance(user(1), Input::Submit(values(&[("title", "t"), ("body", "b")])))
            .unwrap();
        assert_eq!(
            step,
            &Step::Terminal(Terminal::Rejected(Rejection::MissingSelection("mention")))
        );
    }
}
