use crate::domain::model::Participant;

/// Message text with macros:
/// `%1` sender name, `%2` sender contact, `%3` receiver name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    subject: String,
    body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub subject: String,
    pub body: String,
}

impl MessageTemplate {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
        }
    }

    pub fn render(&self, source: &Participant, destination: &Participant) -> RenderedMessage {
        RenderedMessage {
            subject: expand(&self.subject, source, destination),
            body: expand(&self.body, source, destination),
        }
    }
}

fn expand(text: &str, source: &Participant, destination: &Participant) -> String {
    text.replace("%1", &source.name)
        .replace("%2", &source.contact)
        .replace("%3", &destination.name)
}
