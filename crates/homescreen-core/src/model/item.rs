use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};

/// Top-level kinds of home screen item.
///
/// Kinds this client does not know are kept as [`ItemKind::Unknown`] and
/// passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Todo,
    People,
    Announcement,
    Unknown(i32),
}

impl ItemKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "TODO",
            Self::People => "PEOPLE",
            Self::Announcement => "ANNOUNCEMENT",
            Self::Unknown(_) => "UNKNOWN",
        }
    }

    /// Integer discriminant used on the wire.
    #[must_use]
    pub const fn wire_value(self) -> i32 {
        match self {
            Self::Todo => 1,
            Self::People => 2,
            Self::Announcement => 3,
            Self::Unknown(value) => value,
        }
    }

    #[must_use]
    pub const fn from_wire(value: i32) -> Self {
        match value {
            1 => Self::Todo,
            2 => Self::People,
            3 => Self::Announcement,
            other => Self::Unknown(other),
        }
    }
}

/// TODO sub-types delivered by the server.
///
/// Values the client does not recognise are kept in [`TodoType::Unknown`]
/// so they survive a decode/encode cycle unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum TodoType {
    None,
    Bio,
    Proof,
    Device,
    Follow,
    Paperkey,
    Team,
    Folder,
    GitRepo,
    TeamShowcase,
    AvatarUser,
    AvatarTeam,
    AddPhoneNumber,
    VerifyAllPhoneNumber,
    VerifyAllEmail,
    LegacyEmailVisibility,
    AddEmail,
    AnnouncementPlaceholder,
    Unknown(i32),
}

impl TodoType {
    const fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Bio => "BIO",
            Self::Proof => "PROOF",
            Self::Device => "DEVICE",
            Self::Follow => "FOLLOW",
            Self::Paperkey => "PAPERKEY",
            Self::Team => "TEAM",
            Self::Folder => "FOLDER",
            Self::GitRepo => "GIT_REPO",
            Self::TeamShowcase => "TEAM_SHOWCASE",
            Self::AvatarUser => "AVATAR_USER",
            Self::AvatarTeam => "AVATAR_TEAM",
            Self::AddPhoneNumber => "ADD_PHONE_NUMBER",
            Self::VerifyAllPhoneNumber => "VERIFY_ALL_PHONE_NUMBER",
            Self::VerifyAllEmail => "VERIFY_ALL_EMAIL",
            Self::LegacyEmailVisibility => "LEGACY_EMAIL_VISIBILITY",
            Self::AddEmail => "ADD_EMAIL",
            Self::AnnouncementPlaceholder => "ANNOUNCEMENT_PLACEHOLDER",
            Self::Unknown(_) => "UNKNOWN",
        }
    }

    /// Integer discriminant used on the wire.
    #[must_use]
    pub const fn wire_value(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Bio => 1,
            Self::Proof => 2,
            Self::Device => 3,
            Self::Follow => 4,
            Self::Paperkey => 6,
            Self::Team => 7,
            Self::Folder => 8,
            Self::GitRepo => 9,
            Self::TeamShowcase => 10,
            Self::AvatarUser => 11,
            Self::AvatarTeam => 12,
            Self::AddPhoneNumber => 18,
            Self::VerifyAllPhoneNumber => 19,
            Self::VerifyAllEmail => 20,
            Self::LegacyEmailVisibility => 21,
            Self::AddEmail => 22,
            Self::AnnouncementPlaceholder => 10000,
            Self::Unknown(value) => value,
        }
    }

    /// Returns true for the sub-types whose payload is filled in client-side.
    #[must_use]
    pub const fn carries_user_data(self) -> bool {
        self.payload_field().is_some()
    }

    /// Wire field holding the user data of a data-carrying sub-type.
    #[must_use]
    pub const fn payload_field(self) -> Option<&'static str> {
        match self {
            Self::VerifyAllPhoneNumber => Some("verifyAllPhoneNumber"),
            Self::VerifyAllEmail => Some("verifyAllEmail"),
            Self::LegacyEmailVisibility => Some("legacyEmailVisibility"),
            _ => None,
        }
    }
}

impl From<i32> for TodoType {
    fn from(value: i32) -> Self {
        match value {
            0 => Self::None,
            1 => Self::Bio,
            2 => Self::Proof,
            3 => Self::Device,
            4 => Self::Follow,
            6 => Self::Paperkey,
            7 => Self::Team,
            8 => Self::Folder,
            9 => Self::GitRepo,
            10 => Self::TeamShowcase,
            11 => Self::AvatarUser,
            12 => Self::AvatarTeam,
            18 => Self::AddPhoneNumber,
            19 => Self::VerifyAllPhoneNumber,
            20 => Self::VerifyAllEmail,
            21 => Self::LegacyEmailVisibility,
            22 => Self::AddEmail,
            10000 => Self::AnnouncementPlaceholder,
            other => Self::Unknown(other),
        }
    }
}

impl From<TodoType> for i32 {
    fn from(value: TodoType) -> Self {
        value.wire_value()
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(value) => write!(f, "UNKNOWN({value})"),
            other => f.write_str(other.as_str()),
        }
    }
}

impl fmt::Display for TodoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(value) => write!(f, "UNKNOWN({value})"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// A TODO item as delivered, before its user data has been resolved.
///
/// Also the resting state when enrichment found no qualifying candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawTodo {
    todo_type: TodoType,
}

impl RawTodo {
    #[must_use]
    pub const fn new(todo_type: TodoType) -> Self {
        Self { todo_type }
    }

    #[must_use]
    pub const fn todo_type(&self) -> TodoType {
        self.todo_type
    }
}

/// A TODO item whose user data is present. The value is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatedTodo {
    VerifyAllPhoneNumber(String),
    VerifyAllEmail(String),
    LegacyEmailVisibility(String),
}

impl ValidatedTodo {
    /// Pair a data-carrying sub-type with its value.
    ///
    /// Returns `None` for other sub-types and for an empty value.
    #[must_use]
    pub fn new(todo_type: TodoType, value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            return None;
        }
        match todo_type {
            TodoType::VerifyAllPhoneNumber => Some(Self::VerifyAllPhoneNumber(value)),
            TodoType::VerifyAllEmail => Some(Self::VerifyAllEmail(value)),
            TodoType::LegacyEmailVisibility => Some(Self::LegacyEmailVisibility(value)),
            _ => None,
        }
    }

    #[must_use]
    pub const fn todo_type(&self) -> TodoType {
        match self {
            Self::VerifyAllPhoneNumber(_) => TodoType::VerifyAllPhoneNumber,
            Self::VerifyAllEmail(_) => TodoType::VerifyAllEmail,
            Self::LegacyEmailVisibility(_) => TodoType::LegacyEmailVisibility,
        }
    }

    /// Wire field the value is carried in.
    #[must_use]
    pub const fn payload_field(&self) -> &'static str {
        match self {
            Self::VerifyAllPhoneNumber(_) => "verifyAllPhoneNumber",
            Self::VerifyAllEmail(_) => "verifyAllEmail",
            Self::LegacyEmailVisibility(_) => "legacyEmailVisibility",
        }
    }

    /// The phone number or email this TODO is about.
    #[must_use]
    pub fn user_data(&self) -> &str {
        match self {
            Self::VerifyAllPhoneNumber(value)
            | Self::VerifyAllEmail(value)
            | Self::LegacyEmailVisibility(value) => value,
        }
    }

    fn into_user_data(self) -> String {
        match self {
            Self::VerifyAllPhoneNumber(value)
            | Self::VerifyAllEmail(value)
            | Self::LegacyEmailVisibility(value) => value,
        }
    }
}

/// The two states a TODO item moves through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoState {
    Raw(RawTodo),
    Validated(ValidatedTodo),
}

/// A TODO item: its state plus every wire field the client does not
/// interpret, which is re-emitted unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TodoItemWire", into = "TodoItemWire")]
pub struct TodoItem {
    state: TodoState,
    extra: Map<String, Value>,
}

impl TodoItem {
    #[must_use]
    pub fn raw(todo_type: TodoType) -> Self {
        Self {
            state: TodoState::Raw(RawTodo::new(todo_type)),
            extra: Map::new(),
        }
    }

    /// Attach an uninterpreted wire field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    #[must_use]
    pub const fn state(&self) -> &TodoState {
        &self.state
    }

    #[must_use]
    pub const fn validated(&self) -> Option<&ValidatedTodo> {
        match &self.state {
            TodoState::Raw(_) => None,
            TodoState::Validated(validated) => Some(validated),
        }
    }

    /// Read the sub-type discriminant without requiring the payload.
    #[must_use]
    pub const fn todo_type(&self) -> TodoType {
        match &self.state {
            TodoState::Raw(raw) => raw.todo_type(),
            TodoState::Validated(validated) => validated.todo_type(),
        }
    }

    #[must_use]
    pub const fn is_validated(&self) -> bool {
        matches!(self.state, TodoState::Validated(_))
    }

    #[must_use]
    pub fn user_data(&self) -> Option<&str> {
        self.validated().map(ValidatedTodo::user_data)
    }

    #[must_use]
    pub const fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Move into the validated state. Uninterpreted fields are kept; a stale
    /// payload field left over from the raw state is replaced.
    pub fn resolve(&mut self, validated: ValidatedTodo) {
        self.extra.remove(validated.payload_field());
        self.state = TodoState::Validated(validated);
    }
}

impl From<ValidatedTodo> for TodoItem {
    fn from(value: ValidatedTodo) -> Self {
        Self {
            state: TodoState::Validated(value),
            extra: Map::new(),
        }
    }
}

/// Wire shape of a TODO item: the discriminant plus an open set of fields.
/// The one named by [`TodoType::payload_field`] carries the user data.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TodoItemWire {
    t: i32,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl From<TodoItemWire> for TodoItem {
    fn from(mut wire: TodoItemWire) -> Self {
        let todo_type = TodoType::from(wire.t);
        let validated = todo_type.payload_field().and_then(|field| {
            let Some(Value::String(value)) = wire.fields.get(field) else {
                return None;
            };
            let validated = ValidatedTodo::new(todo_type, value.as_str())?;
            wire.fields.remove(field);
            Some(validated)
        });

        let state = validated.map_or(TodoState::Raw(RawTodo::new(todo_type)), TodoState::Validated);
        Self {
            state,
            extra: wire.fields,
        }
    }
}

impl From<TodoItem> for TodoItemWire {
    fn from(item: TodoItem) -> Self {
        let t = item.todo_type().wire_value();
        let mut fields = item.extra;
        if let TodoState::Validated(validated) = item.state {
            let field = validated.payload_field();
            fields.insert(field.to_string(), Value::String(validated.into_user_data()));
        }
        Self { t, fields }
    }
}

/// Error returned when an item of a known kind cannot be read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("home screen item of type {0} has no payload")]
    MissingPayload(ItemKind),
}

/// Tagged payload of a home screen item.
///
/// `t` is the raw wire discriminant; for the known kinds the payload field
/// matching it must be present. PEOPLE and ANNOUNCEMENT payloads are opaque
/// here, and anything else on the wire is kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemData {
    pub t: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub todo: Option<TodoItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub people: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub announcement: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ItemData {
    #[must_use]
    pub fn todo(item: TodoItem) -> Self {
        Self {
            t: ItemKind::Todo.wire_value(),
            todo: Some(item),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn people(payload: Value) -> Self {
        Self {
            t: ItemKind::People.wire_value(),
            people: Some(payload),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn announcement(payload: Value) -> Self {
        Self {
            t: ItemKind::Announcement.wire_value(),
            announcement: Some(payload),
            ..Self::default()
        }
    }

    /// Validated read of the item kind.
    ///
    /// Unknown discriminants are not an error; they read as
    /// [`ItemKind::Unknown`].
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when a known kind is missing its payload.
    pub const fn kind(&self) -> Result<ItemKind, DecodeError> {
        let kind = ItemKind::from_wire(self.t);
        let present = match kind {
            ItemKind::Todo => self.todo.is_some(),
            ItemKind::People => self.people.is_some(),
            ItemKind::Announcement => self.announcement.is_some(),
            ItemKind::Unknown(_) => true,
        };
        if present {
            Ok(kind)
        } else {
            Err(DecodeError::MissingPayload(kind))
        }
    }
}

/// One entry on the home screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeScreenItem {
    #[serde(default)]
    pub badged: bool,
    pub data: ItemData,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data_ext: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HomeScreenItem {
    #[must_use]
    pub fn new(data: ItemData) -> Self {
        Self {
            badged: false,
            data,
            data_ext: Value::Null,
            extra: Map::new(),
        }
    }

    #[must_use]
    pub const fn badged(mut self, badged: bool) -> Self {
        self.badged = badged;
        self
    }
}

/// A decoded home screen snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HomeScreen {
    pub last_viewed: i64,
    pub version: i32,
    pub visited: bool,
    pub items: Vec<HomeScreenItem>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub follow_suggestions: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HomeScreen {
    #[must_use]
    pub fn with_items(items: Vec<HomeScreenItem>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    /// Decode a snapshot from its JSON wire form.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error for malformed input.
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }

    /// Read and decode a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Read`] when the file cannot be read and
    /// [`SnapshotError::Parse`] when it is not a snapshot.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(path).map_err(|source| SnapshotError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| SnapshotError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// TODO items in order, skipping anything that is not a readable TODO.
    pub fn todos(&self) -> impl Iterator<Item = &TodoItem> {
        self.items
            .iter()
            .filter(|item| matches!(item.data.kind(), Ok(ItemKind::Todo)))
            .filter_map(|item| item.data.todo.as_ref())
    }
}

/// Failure to load a snapshot file.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse snapshot {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
