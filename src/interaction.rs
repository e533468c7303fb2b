//! Interaction construction: short-lived request objects dispatched by the
//! wire `type` tag.
//!
//! Interactions are not cached. Each payload is turned into the concrete
//! variant once, handed to the caller, and dropped; no collection holds
//! them and repeated payloads produce independent values.

use serde::{Deserialize, Serialize};

use crate::{
    error::CacheError,
    id::{
        marker::{
            ApplicationMarker, ChannelMarker, CommandMarker, GuildMarker, InteractionMarker,
            MessageMarker, UserMarker,
        },
        Id,
    },
    user::RawUser,
};

// ---------------------------------------------------------------------------
// Discriminant
// ---------------------------------------------------------------------------

/// The integer `type` tag on an interaction payload.
///
/// Open enum so unrecognized tags degrade to a base-capability value
/// instead of failing deserialization.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum InteractionType {
    Ping,
    ApplicationCommand,
    MessageComponent,
    Autocomplete,
    ModalSubmit,
    Unknown(u8),
}

impl InteractionType {
    /// The wire value of the tag.
    pub const fn value(self) -> u8 {
        match self {
            Self::Ping => 1,
            Self::ApplicationCommand => 2,
            Self::MessageComponent => 3,
            Self::Autocomplete => 4,
            Self::ModalSubmit => 5,
            Self::Unknown(value) => value,
        }
    }
}

impl From<u8> for InteractionType {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Ping,
            2 => Self::ApplicationCommand,
            3 => Self::MessageComponent,
            4 => Self::Autocomplete,
            5 => Self::ModalSubmit,
            other => Self::Unknown(other),
        }
    }
}

impl Serialize for InteractionType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.value())
    }
}

impl<'de> Deserialize<'de> for InteractionType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u64::deserialize(deserializer)?;
        let value = u8::try_from(value).map_err(serde::de::Error::custom)?;
        Ok(Self::from(value))
    }
}

// ---------------------------------------------------------------------------
// Raw payload
// ---------------------------------------------------------------------------

/// Wire form of any interaction kind.
#[derive(Clone, Debug, Deserialize)]
pub struct RawInteraction {
    pub id: Id<InteractionMarker>,
    pub application_id: Id<ApplicationMarker>,
    #[serde(rename = "type")]
    pub kind: InteractionType,
    pub token: String,
    #[serde(default)]
    pub guild_id: Option<Id<GuildMarker>>,
    #[serde(default)]
    pub channel_id: Option<Id<ChannelMarker>>,
    /// Present for guild interactions; the user rides inside.
    #[serde(default)]
    pub member: Option<RawInteractionMember>,
    /// Present for direct-message interactions.
    #[serde(default)]
    pub user: Option<RawUser>,
    #[serde(default)]
    pub data: Option<RawInteractionData>,
    /// The message a component interaction was attached to.
    #[serde(default)]
    pub message: Option<RawInteractionMessage>,
}

/// The member sub-object on a guild interaction. Only the embedded user is
/// needed for authorship.
#[derive(Clone, Debug, Deserialize)]
pub struct RawInteractionMember {
    #[serde(default)]
    pub user: Option<RawUser>,
}

/// The message sub-object on a component interaction.
#[derive(Clone, Debug, Deserialize)]
pub struct RawInteractionMessage {
    pub id: Id<MessageMarker>,
}

/// The `data` sub-object, shape shared across command, component, and modal
/// interactions; each variant reads the keys it owns.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawInteractionData {
    #[serde(default)]
    pub id: Option<Id<CommandMarker>>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<CommandDataOption>>,
    #[serde(default)]
    pub custom_id: Option<String>,
    #[serde(default)]
    pub component_type: Option<u8>,
    #[serde(default)]
    pub values: Option<Vec<String>>,
    #[serde(default)]
    pub components: Option<Vec<ModalRow>>,
}

// ---------------------------------------------------------------------------
// Shared core
// ---------------------------------------------------------------------------

/// Fields common to every interaction kind.
#[derive(Clone, Debug, Serialize)]
pub struct InteractionCore {
    pub id: Id<InteractionMarker>,
    pub application_id: Id<ApplicationMarker>,
    #[serde(rename = "type")]
    pub kind: InteractionType,
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Id<GuildMarker>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<Id<ChannelMarker>>,
    /// The invoking user, taken from `member.user` in guilds and from the
    /// top-level `user` in direct messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Id<UserMarker>>,
}

impl InteractionCore {
    fn from_raw(raw: &RawInteraction) -> Self {
        let user_id = raw
            .member
            .as_ref()
            .and_then(|member| member.user.as_ref())
            .or(raw.user.as_ref())
            .map(|user| user.id);
        Self {
            id: raw.id,
            application_id: raw.application_id,
            kind: raw.kind,
            token: raw.token.clone(),
            guild_id: raw.guild_id,
            channel_id: raw.channel_id,
            user_id,
        }
    }

    /// Milliseconds since the Unix epoch, decoded from the snowflake.
    pub const fn created_at_ms(&self) -> u64 {
        self.id.timestamp_ms()
    }
}

// ---------------------------------------------------------------------------
// Command data
// ---------------------------------------------------------------------------

/// A single option the invoker supplied, possibly nesting subcommand
/// options.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CommandDataOption {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandDataOption>,
    #[serde(default, skip_serializing_if = "crate::util::is_false")]
    pub focused: bool,
}

/// The command identity and options of a slash-command invocation.
#[derive(Clone, Debug, Serialize)]
pub struct CommandData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Id<CommandMarker>>,
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandDataOption>,
}

impl CommandData {
    fn from_raw(data: &RawInteractionData) -> Self {
        Self {
            id: data.id,
            name: data.name.clone().unwrap_or_default(),
            options: data.options.clone().unwrap_or_default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Modal rows
// ---------------------------------------------------------------------------

/// An action row in a modal submission, wrapping the text inputs.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ModalRow {
    #[serde(default)]
    pub components: Vec<ModalField>,
}

/// A submitted text input inside a modal row.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ModalField {
    pub custom_id: String,
    #[serde(default)]
    pub value: Option<String>,
}

// ---------------------------------------------------------------------------
// Concrete variants
// ---------------------------------------------------------------------------

/// A gateway liveness check. Carries nothing beyond the core.
#[derive(Clone, Debug, Serialize)]
pub struct PingInteraction {
    #[serde(flatten)]
    pub core: InteractionCore,
}

/// A slash-command invocation.
#[derive(Clone, Debug, Serialize)]
pub struct CommandInteraction {
    #[serde(flatten)]
    pub core: InteractionCore,
    pub data: CommandData,
}

impl CommandInteraction {
    /// Look up an option the invoker supplied, searching one level of
    /// subcommand nesting.
    pub fn option(&self, name: &str) -> Option<&CommandDataOption> {
        find_option(&self.data.options, name)
    }

    /// Like [`option`](Self::option) but an absent option is an error,
    /// for options the command registered as required.
    pub fn required_option(&self, name: &str) -> Result<&CommandDataOption, CacheError> {
        self.option(name).ok_or_else(|| CacheError::MissingOption {
            name: name.to_owned(),
        })
    }
}

fn find_option<'a>(
    options: &'a [CommandDataOption],
    name: &str,
) -> Option<&'a CommandDataOption> {
    for option in options {
        if option.name == name {
            return Some(option);
        }
        if let Some(found) = find_option(&option.options, name) {
            return Some(found);
        }
    }
    None
}

/// A typeahead request for a command option.
#[derive(Clone, Debug, Serialize)]
pub struct AutocompleteInteraction {
    #[serde(flatten)]
    pub core: InteractionCore,
    pub data: CommandData,
}

impl AutocompleteInteraction {
    /// The option the invoker is currently typing into.
    pub fn focused_option(&self) -> Option<&CommandDataOption> {
        find_focused(&self.data.options)
    }
}

fn find_focused(options: &[CommandDataOption]) -> Option<&CommandDataOption> {
    for option in options {
        if option.focused {
            return Some(option);
        }
        if let Some(found) = find_focused(&option.options) {
            return Some(found);
        }
    }
    None
}

/// A button press or select-menu choice on a message.
#[derive(Clone, Debug, Serialize)]
pub struct ComponentInteraction {
    #[serde(flatten)]
    pub core: InteractionCore,
    pub custom_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_type: Option<u8>,
    /// Chosen values, for select menus.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    /// The message the component lives on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<Id<MessageMarker>>,
}

/// A submitted modal form.
#[derive(Clone, Debug, Serialize)]
pub struct ModalSubmitInteraction {
    #[serde(flatten)]
    pub core: InteractionCore,
    pub custom_id: String,
    pub components: Vec<ModalRow>,
}

impl ModalSubmitInteraction {
    /// The value the user typed into the named text input.
    pub fn field_value(&self, custom_id: &str) -> Option<&str> {
        self.components
            .iter()
            .flat_map(|row| &row.components)
            .find(|field| field.custom_id == custom_id)
            .and_then(|field| field.value.as_deref())
    }
}

// ---------------------------------------------------------------------------
// The union
// ---------------------------------------------------------------------------

/// Any interaction, discriminated by the wire `type` tag.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum Interaction {
    Ping(PingInteraction),
    Command(CommandInteraction),
    Component(ComponentInteraction),
    Autocomplete(AutocompleteInteraction),
    ModalSubmit(ModalSubmitInteraction),
    /// Unrecognized tag; exposes the core fields only.
    Unknown(InteractionCore),
}

impl Interaction {
    /// Construct the concrete variant selected by the discriminant.
    pub fn from_raw(raw: RawInteraction) -> Self {
        let core = InteractionCore::from_raw(&raw);
        let data = raw.data.unwrap_or_default();
        match raw.kind {
            InteractionType::Ping => Self::Ping(PingInteraction { core }),
            InteractionType::ApplicationCommand => Self::Command(CommandInteraction {
                core,
                data: CommandData::from_raw(&data),
            }),
            InteractionType::MessageComponent => Self::Component(ComponentInteraction {
                core,
                custom_id: data.custom_id.unwrap_or_default(),
                component_type: data.component_type,
                values: data.values.unwrap_or_default(),
                message_id: raw.message.map(|message| message.id),
            }),
            InteractionType::Autocomplete => Self::Autocomplete(AutocompleteInteraction {
                core,
                data: CommandData::from_raw(&data),
            }),
            InteractionType::ModalSubmit => Self::ModalSubmit(ModalSubmitInteraction {
                core,
                custom_id: data.custom_id.unwrap_or_default(),
                components: data.components.unwrap_or_default(),
            }),
            InteractionType::Unknown(_) => Self::Unknown(core),
        }
    }

    /// The shared core of whichever variant this is.
    pub fn core(&self) -> &InteractionCore {
        match self {
            Self::Ping(i) => &i.core,
            Self::Command(i) => &i.core,
            Self::Component(i) => &i.core,
            Self::Autocomplete(i) => &i.core,
            Self::ModalSubmit(i) => &i.core,
            Self::Unknown(core) => core,
        }
    }

    /// The interaction's snowflake.
    pub fn id(&self) -> Id<InteractionMarker> {
        self.core().id
    }

    /// The interaction's discriminant.
    pub fn kind(&self) -> InteractionType {
        self.core().kind
    }

    /// The invoking user, when the payload carried one.
    pub fn author_id(&self) -> Option<Id<UserMarker>> {
        self.core().user_id
    }

    /// The guild the interaction happened in, for guild interactions.
    pub fn guild_id(&self) -> Option<Id<GuildMarker>> {
        self.core().guild_id
    }

    /// The channel the interaction happened in.
    pub fn channel_id(&self) -> Option<Id<ChannelMarker>> {
        self.core().channel_id
    }

    /// Milliseconds since the Unix epoch, decoded from the snowflake.
    pub fn created_at_ms(&self) -> u64 {
        self.core().created_at_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::{Interaction, InteractionType, RawInteraction};
    use crate::{error::CacheError, id::Id};
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawInteraction {
        serde_json::from_value(value).expect("valid raw interaction")
    }

    #[test]
    fn command_dispatch_and_option_lookup() {
        let interaction = Interaction::from_raw(raw(json!({
            "id": "175928847299117063",
            "application_id": "2",
            "type": 2,
            "token": "tok",
            "guild_id": "100",
            "channel_id": "10",
            "member": { "user": { "id": "200", "username": "amy" } },
            "data": {
                "id": "900",
                "name": "echo",
                "options": [
                    { "name": "text", "type": 3, "value": "hi" },
                ],
            },
        })));

        let Interaction::Command(command) = &interaction else {
            panic!("expected command interaction");
        };
        assert_eq!(command.data.name, "echo");
        assert_eq!(
            command.option("text").and_then(|o| o.value.as_ref()),
            Some(&json!("hi"))
        );
        assert!(matches!(
            command.required_option("missing"),
            Err(CacheError::MissingOption { .. })
        ));
        assert_eq!(interaction.author_id(), Some(Id::new(200)));
        assert_eq!(interaction.created_at_ms(), 1_462_015_105_796);
    }

    #[test]
    fn options_are_found_through_subcommand_nesting() {
        let interaction = Interaction::from_raw(raw(json!({
            "id": "1",
            "application_id": "2",
            "type": 2,
            "token": "tok",
            "data": {
                "name": "config",
                "options": [{
                    "name": "set",
                    "type": 1,
                    "options": [{ "name": "key", "type": 3, "value": "color" }],
                }],
            },
        })));

        let Interaction::Command(command) = interaction else {
            panic!("expected command interaction");
        };
        assert_eq!(
            command.option("key").and_then(|o| o.value.as_ref()),
            Some(&json!("color"))
        );
    }

    #[test]
    fn autocomplete_surfaces_the_focused_option() {
        let interaction = Interaction::from_raw(raw(json!({
            "id": "1",
            "application_id": "2",
            "type": 4,
            "token": "tok",
            "data": {
                "name": "search",
                "options": [
                    { "name": "scope", "type": 3, "value": "all" },
                    { "name": "query", "type": 3, "value": "ru", "focused": true },
                ],
            },
        })));

        let Interaction::Autocomplete(autocomplete) = interaction else {
            panic!("expected autocomplete interaction");
        };
        assert_eq!(
            autocomplete.focused_option().map(|o| o.name.as_str()),
            Some("query")
        );
    }

    #[test]
    fn component_carries_custom_id_values_and_message() {
        let interaction = Interaction::from_raw(raw(json!({
            "id": "1",
            "application_id": "2",
            "type": 3,
            "token": "tok",
            "user": { "id": "200", "username": "amy" },
            "message": { "id": "500" },
            "data": {
                "custom_id": "color_select",
                "component_type": 3,
                "values": ["red", "blue"],
            },
        })));

        let Interaction::Component(component) = interaction else {
            panic!("expected component interaction");
        };
        assert_eq!(component.custom_id, "color_select");
        assert_eq!(component.values, vec!["red", "blue"]);
        assert_eq!(component.message_id, Some(Id::new(500)));
        assert_eq!(component.core.user_id, Some(Id::new(200)));
    }

    #[test]
    fn modal_field_lookup_walks_the_rows() {
        let interaction = Interaction::from_raw(raw(json!({
            "id": "1",
            "application_id": "2",
            "type": 5,
            "token": "tok",
            "data": {
                "custom_id": "feedback_form",
                "components": [
                    { "components": [{ "custom_id": "subject", "value": "bug" }] },
                    { "components": [{ "custom_id": "body", "value": "details" }] },
                ],
            },
        })));

        let Interaction::ModalSubmit(modal) = interaction else {
            panic!("expected modal submit");
        };
        assert_eq!(modal.custom_id, "feedback_form");
        assert_eq!(modal.field_value("body"), Some("details"));
        assert_eq!(modal.field_value("absent"), None);
    }

    #[test]
    fn unknown_tag_degrades_to_the_core() {
        let interaction = Interaction::from_raw(raw(json!({
            "id": "1",
            "application_id": "2",
            "type": 42,
            "token": "tok",
        })));

        assert!(matches!(interaction, Interaction::Unknown(_)));
        assert_eq!(interaction.kind(), InteractionType::Unknown(42));
        assert_eq!(interaction.author_id(), None);
    }
}
