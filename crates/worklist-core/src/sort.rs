//! Multi-key, per-field cyclic sort state.
//!
//! Every sortable field belongs to a sort class, and each class has its own
//! direction cycle driven by repeated toggles on the same field:
//!
//! | class | cycle |
//! |---|---|
//! | binary (name, due date, members, meeting link) | absent → asc → desc → absent |
//! | status | absent → asc → desc → custom → absent |
//! | priority | absent → asc → desc → custom → absent |
//!
//! Active keys are kept in insertion order; the oldest key is the primary
//! one. A newly toggled field is always appended as the least significant
//! key.
//!
//! Status and priority compare by [`RankTable`]. `asc` and `desc` share the
//! natural table with opposite signs; `custom` switches to a second table
//! and compares ascending. Labels missing from a table rank after every
//! known label, so the ordering stays total on corrupt data.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::model::ParseEnumError;
use crate::model::entity::ListEntity;

// ---------------------------------------------------------------------------
// Fields and classes
// ---------------------------------------------------------------------------

/// A column the list can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    /// Display name (project name or work-item title).
    Name,
    DueDate,
    /// Team members or assignees, joined.
    Members,
    MeetingLink,
    Status,
    Priority,
}

/// The family of direction cycles and rank tables a field follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortClass {
    Binary,
    StatusTernary,
    PriorityTernary,
}

impl SortField {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::DueDate => "due_date",
            Self::Members => "members",
            Self::MeetingLink => "meeting_link",
            Self::Status => "status",
            Self::Priority => "priority",
        }
    }

    #[must_use]
    pub const fn class(self) -> SortClass {
        match self {
            Self::Name | Self::DueDate | Self::Members | Self::MeetingLink => SortClass::Binary,
            Self::Status => SortClass::StatusTernary,
            Self::Priority => SortClass::PriorityTernary,
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match crate::model::normalize(s).as_str() {
            "name" | "title" => Ok(Self::Name),
            "due_date" | "due" => Ok(Self::DueDate),
            "members" | "team" | "team_members" | "assigned_to" | "assignees" => {
                Ok(Self::Members)
            }
            "meeting_link" => Ok(Self::MeetingLink),
            "status" => Ok(Self::Status),
            "priority" => Ok(Self::Priority),
            _ => Err(ParseEnumError {
                expected: "sort field",
                got: s.to_string(),
            }),
        }
    }
}

/// Fields in the binary sort class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryField {
    Name,
    DueDate,
    Members,
    MeetingLink,
}

impl BinaryField {
    const fn field(self) -> SortField {
        match self {
            Self::Name => SortField::Name,
            Self::DueDate => SortField::DueDate,
            Self::Members => SortField::Members,
            Self::MeetingLink => SortField::MeetingLink,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TernaryDirection {
    Asc,
    Desc,
    Custom,
}

/// Class-independent view of a key's direction, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
    Custom,
}

impl Direction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SortKey state machine
// ---------------------------------------------------------------------------

/// One active sort key. The variant fixes the sort class, so a binary field
/// can never hold a `custom` direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Binary {
        field: BinaryField,
        direction: BinaryDirection,
    },
    Status(TernaryDirection),
    Priority(TernaryDirection),
}

impl SortKey {
    /// The state a field enters on its first toggle.
    #[must_use]
    pub const fn start(field: SortField) -> Self {
        match field {
            SortField::Name => Self::binary_asc(BinaryField::Name),
            SortField::DueDate => Self::binary_asc(BinaryField::DueDate),
            SortField::Members => Self::binary_asc(BinaryField::Members),
            SortField::MeetingLink => Self::binary_asc(BinaryField::MeetingLink),
            SortField::Status => Self::Status(TernaryDirection::Asc),
            SortField::Priority => Self::Priority(TernaryDirection::Asc),
        }
    }

    const fn binary_asc(field: BinaryField) -> Self {
        Self::Binary {
            field,
            direction: BinaryDirection::Asc,
        }
    }

    /// Next state in this key's cycle; `None` once the cycle is exhausted
    /// and the key should be removed.
    #[must_use]
    pub const fn advance(self) -> Option<Self> {
        match self {
            Self::Binary {
                field,
                direction: BinaryDirection::Asc,
            } => Some(Self::Binary {
                field,
                direction: BinaryDirection::Desc,
            }),
            Self::Binary {
                direction: BinaryDirection::Desc,
                ..
            } => None,
            Self::Status(direction) => match advance_ternary(direction) {
                Some(next) => Some(Self::Status(next)),
                None => None,
            },
            Self::Priority(direction) => match advance_ternary(direction) {
                Some(next) => Some(Self::Priority(next)),
                None => None,
            },
        }
    }

    #[must_use]
    pub const fn field(self) -> SortField {
        match self {
            Self::Binary { field, .. } => field.field(),
            Self::Status(_) => SortField::Status,
            Self::Priority(_) => SortField::Priority,
        }
    }

    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::Binary {
                direction: BinaryDirection::Asc,
                ..
            }
            | Self::Status(TernaryDirection::Asc)
            | Self::Priority(TernaryDirection::Asc) => Direction::Asc,
            Self::Binary {
                direction: BinaryDirection::Desc,
                ..
            }
            | Self::Status(TernaryDirection::Desc)
            | Self::Priority(TernaryDirection::Desc) => Direction::Desc,
            Self::Status(TernaryDirection::Custom) | Self::Priority(TernaryDirection::Custom) => {
                Direction::Custom
            }
        }
    }
}

const fn advance_ternary(direction: TernaryDirection) -> Option<TernaryDirection> {
    match direction {
        TernaryDirection::Asc => Some(TernaryDirection::Desc),
        TernaryDirection::Desc => Some(TernaryDirection::Custom),
        TernaryDirection::Custom => None,
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field(), self.direction())
    }
}

/// Ordered list of active sort keys, oldest (primary) first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortKeys {
    keys: Vec<SortKey>,
}

impl SortKeys {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SortKey> {
        self.keys.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[SortKey] {
        &self.keys
    }

    /// Current direction of `field`, `None` when it is not sorted.
    #[must_use]
    pub fn direction_of(&self, field: SortField) -> Option<Direction> {
        self.keys
            .iter()
            .find(|k| k.field() == field)
            .map(|k| k.direction())
    }

    /// Advance `field` one step through its class's cycle.
    ///
    /// An inactive field is appended in `asc`. An active field moves to its
    /// next direction in place, keeping its priority; at the end of the
    /// cycle it is removed.
    pub fn toggle(&mut self, field: SortField) {
        match self.keys.iter().position(|k| k.field() == field) {
            Some(pos) => match self.keys[pos].advance() {
                Some(next) => self.keys[pos] = next,
                None => {
                    self.keys.remove(pos);
                }
            },
            None => self.keys.push(SortKey::start(field)),
        }
        tracing::debug!(%field, keys = %self, "sort key toggled");
    }

    /// Functional form of [`SortKeys::toggle`].
    #[must_use]
    pub fn toggled(&self, field: SortField) -> Self {
        let mut next = self.clone();
        next.toggle(field);
        next
    }

    /// Toggle `field` only if the entity shape offers it. Returns whether
    /// anything changed.
    pub fn toggle_for<E: ListEntity>(&mut self, field: SortField) -> bool {
        if !E::SORTABLE.contains(&field) {
            tracing::debug!(%field, kind = %E::KIND, "ignoring toggle on unsortable field");
            return false;
        }
        self.toggle(field);
        true
    }

    /// Toggle a field named by the UI. Unknown names are ignored.
    pub fn toggle_named<E: ListEntity>(&mut self, name: &str) -> bool {
        name.parse::<SortField>()
            .is_ok_and(|field| self.toggle_for::<E>(field))
    }
}

impl fmt::Display for SortKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.keys.iter().map(ToString::to_string).collect();
        f.write_str(&rendered.join(","))
    }
}

// ---------------------------------------------------------------------------
// Rank tables
// ---------------------------------------------------------------------------

/// Rank given to labels a table does not list.
pub const UNRANKED: u32 = u32::MAX;

/// Ordered labels; a label's rank is its position plus one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankTable {
    labels: Vec<String>,
}

impl RankTable {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Rank of `label`, or [`UNRANKED`] when the table does not list it.
    #[must_use]
    pub fn rank(&self, label: &str) -> u32 {
        self.labels
            .iter()
            .position(|known| known.eq_ignore_ascii_case(label))
            .and_then(|idx| u32::try_from(idx + 1).ok())
            .unwrap_or(UNRANKED)
    }
}

/// The rank tables one screen sorts status and priority with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankTables {
    pub status_natural: RankTable,
    pub status_custom: RankTable,
    pub priority_natural: RankTable,
    pub priority_custom: RankTable,
}

impl RankTables {
    /// Priority tables shared by every entity shape (status tables empty).
    ///
    /// Natural order ranks high=3, medium=2, low=1, so `asc` lists low
    /// first. Custom order is medium, high, low.
    #[must_use]
    pub fn priority_defaults() -> Self {
        Self {
            status_natural: RankTable::default(),
            status_custom: RankTable::default(),
            priority_natural: RankTable::new(["low", "medium", "high"]),
            priority_custom: RankTable::new(["medium", "high", "low"]),
        }
    }
}

// ---------------------------------------------------------------------------
// Comparator
// ---------------------------------------------------------------------------

/// Compare two entities under the active keys.
///
/// Keys are consulted in order and the first non-equal result wins. When
/// every key ties (or no key is active) the result is `Equal`, which a
/// stable sort turns into "keep insertion order".
pub fn compare<E: ListEntity>(a: &E, b: &E, keys: &SortKeys, ranks: &RankTables) -> Ordering {
    keys.iter()
        .map(|key| compare_key(a, b, *key, ranks))
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn compare_key<E: ListEntity>(a: &E, b: &E, key: SortKey, ranks: &RankTables) -> Ordering {
    match key {
        SortKey::Binary { field, direction } => {
            let ord = compare_binary(a, b, field);
            match direction {
                BinaryDirection::Asc => ord,
                BinaryDirection::Desc => ord.reverse(),
            }
        }
        SortKey::Status(direction) => compare_ranked(
            a.status_label(),
            b.status_label(),
            direction,
            &ranks.status_natural,
            &ranks.status_custom,
        ),
        SortKey::Priority(direction) => compare_ranked(
            a.priority_label(),
            b.priority_label(),
            direction,
            &ranks.priority_natural,
            &ranks.priority_custom,
        ),
    }
}

fn compare_ranked(
    a: &str,
    b: &str,
    direction: TernaryDirection,
    natural: &RankTable,
    custom: &RankTable,
) -> Ordering {
    match direction {
        TernaryDirection::Asc => natural.rank(a).cmp(&natural.rank(b)),
        TernaryDirection::Desc => natural.rank(a).cmp(&natural.rank(b)).reverse(),
        TernaryDirection::Custom => custom.rank(a).cmp(&custom.rank(b)),
    }
}

fn compare_binary<E: ListEntity>(a: &E, b: &E, field: BinaryField) -> Ordering {
    match field {
        BinaryField::Name => compare_folded(a.display_name(), b.display_name()),
        BinaryField::Members => compare_folded(&a.members_label(), &b.members_label()),
        BinaryField::MeetingLink => compare_folded(
            a.meeting_link().unwrap_or_default(),
            b.meeting_link().unwrap_or_default(),
        ),
        BinaryField::DueDate => {
            compare_missing_last(date_timestamp(a.due_date()), date_timestamp(b.due_date()))
        }
    }
}

fn compare_folded(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn compare_missing_last(a: Option<i64>, b: Option<i64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Seconds since the epoch for a `YYYY-MM-DD` or RFC 3339 due date.
fn date_timestamp(raw: Option<&str>) -> Option<i64> {
    let raw = raw?.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp());
    }
    DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.timestamp())
}

/// Stable in-place sort under the active keys.
pub fn sort_entities<E: ListEntity>(items: &mut [E], keys: &SortKeys, ranks: &RankTables) {
    if keys.is_empty() {
        return;
    }
    items.sort_by(|a, b| compare(a, b, keys, ranks));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Priority;
    use crate::model::project::{Project, ProjectStatus, TeamMember};
    use crate::model::work_item::WorkItem;
    use crate::model::User;
    use proptest::prelude::*;

    fn project(id: i64, name: &str, status: &str, priority: &str) -> Project {
        let mut p = Project::new(id, name);
        p.status = ProjectStatus::from(status.to_string());
        p.priority = Priority::from(priority.to_string());
        p
    }

    fn ids(items: &[Project]) -> Vec<i64> {
        items.iter().map(|p| p.id).collect()
    }

    fn sorted(mut items: Vec<Project>, keys: &SortKeys) -> Vec<i64> {
        sort_entities(&mut items, keys, &Project::default_ranks());
        ids(&items)
    }

    fn keys(fields: &[SortField]) -> SortKeys {
        let mut keys = SortKeys::new();
        for field in fields {
            keys.toggle(*field);
        }
        keys
    }

    // -----------------------------------------------------------------------
    // Toggle cycles
    // -----------------------------------------------------------------------

    #[test]
    fn binary_cycle_is_asc_desc_absent() {
        let mut k = SortKeys::new();
        k.toggle(SortField::Name);
        assert_eq!(k.direction_of(SortField::Name), Some(Direction::Asc));
        k.toggle(SortField::Name);
        assert_eq!(k.direction_of(SortField::Name), Some(Direction::Desc));
        k.toggle(SortField::Name);
        assert_eq!(k.direction_of(SortField::Name), None);
        assert!(k.is_empty());
    }

    #[test]
    fn ternary_cycle_is_asc_desc_custom_absent() {
        for field in [SortField::Status, SortField::Priority] {
            let mut k = SortKeys::new();
            let mut seen = Vec::new();
            for _ in 0..4 {
                k.toggle(field);
                seen.push(k.direction_of(field));
            }
            assert_eq!(
                seen,
                vec![
                    Some(Direction::Asc),
                    Some(Direction::Desc),
                    Some(Direction::Custom),
                    None
                ]
            );
        }
    }

    #[test]
    fn new_keys_append_and_existing_keys_keep_position() {
        let mut k = keys(&[SortField::Status, SortField::Priority]);
        k.toggle(SortField::Status);
        let fields: Vec<_> = k.iter().map(|key| key.field()).collect();
        assert_eq!(fields, vec![SortField::Status, SortField::Priority]);
        assert_eq!(k.direction_of(SortField::Status), Some(Direction::Desc));

        k.toggle(SortField::Name);
        assert_eq!(k.as_slice().last().map(|key| key.field()), Some(SortField::Name));
    }

    #[test]
    fn removed_key_readded_goes_to_end() {
        let mut k = keys(&[SortField::Name, SortField::DueDate]);
        k.toggle(SortField::Name);
        k.toggle(SortField::Name);
        k.toggle(SortField::Name);
        let fields: Vec<_> = k.iter().map(|key| key.field()).collect();
        assert_eq!(fields, vec![SortField::DueDate, SortField::Name]);
    }

    #[test]
    fn unknown_and_unsortable_fields_are_ignored() {
        let mut k = SortKeys::new();
        assert!(!k.toggle_named::<Project>("budget"));
        assert!(!k.toggle_for::<WorkItem>(SortField::MeetingLink));
        assert!(k.is_empty());
        assert!(k.toggle_named::<WorkItem>("title"));
        assert!(k.toggle_named::<WorkItem>("assigned_to"));
        assert_eq!(k.len(), 2);
    }

    #[test]
    fn toggled_leaves_original_untouched() {
        let k = SortKeys::new();
        let next = k.toggled(SortField::Priority);
        assert!(k.is_empty());
        assert_eq!(next.direction_of(SortField::Priority), Some(Direction::Asc));
    }

    #[test]
    fn display_lists_keys_in_order() {
        let mut k = keys(&[SortField::Status, SortField::DueDate]);
        k.toggle(SortField::Status);
        assert_eq!(k.to_string(), "status:desc,due_date:asc");
    }

    // -----------------------------------------------------------------------
    // Comparator
    // -----------------------------------------------------------------------

    #[test]
    fn no_keys_preserves_insertion_order() {
        let items = vec![
            project(3, "c", "completed", "low"),
            project(1, "a", "active", "high"),
            project(2, "b", "on_hold", "medium"),
        ];
        let ranks = Project::default_ranks();
        let empty = SortKeys::new();
        for a in &items {
            for b in &items {
                assert_eq!(compare(a, b, &empty, &ranks), Ordering::Equal);
            }
        }
        assert_eq!(sorted(items, &empty), vec![3, 1, 2]);
    }

    #[test]
    fn status_directions_use_their_tables() {
        let items = vec![
            project(1, "a", "completed", "low"),
            project(2, "b", "on_hold", "low"),
            project(3, "c", "active", "low"),
        ];
        let mut k = keys(&[SortField::Status]);
        assert_eq!(sorted(items.clone(), &k), vec![3, 2, 1]);
        k.toggle(SortField::Status);
        assert_eq!(sorted(items.clone(), &k), vec![1, 2, 3]);
        k.toggle(SortField::Status);
        assert_eq!(sorted(items, &k), vec![2, 3, 1]);
    }

    #[test]
    fn priority_directions_use_their_tables() {
        let items = vec![
            project(1, "a", "active", "high"),
            project(2, "b", "active", "low"),
            project(3, "c", "active", "medium"),
        ];
        let mut k = keys(&[SortField::Priority]);
        assert_eq!(sorted(items.clone(), &k), vec![2, 3, 1]);
        k.toggle(SortField::Priority);
        assert_eq!(sorted(items.clone(), &k), vec![1, 3, 2]);
        k.toggle(SortField::Priority);
        assert_eq!(sorted(items, &k), vec![3, 1, 2]);
    }

    #[test]
    fn multi_key_groups_by_status_then_priority_desc() {
        let items = vec![
            project(1, "a", "completed", "low"),
            project(2, "b", "active", "low"),
            project(3, "c", "on_hold", "high"),
            project(4, "d", "active", "high"),
            project(5, "e", "completed", "high"),
            project(6, "f", "active", "medium"),
            project(7, "g", "on_hold", "low"),
        ];
        let mut k = keys(&[SortField::Status, SortField::Priority]);
        k.toggle(SortField::Priority);
        assert_eq!(sorted(items, &k), vec![4, 6, 2, 3, 7, 5, 1]);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let items = vec![
            project(1, "x", "active", "high"),
            project(2, "y", "active", "high"),
            project(3, "z", "active", "high"),
        ];
        let k = keys(&[SortField::Status, SortField::Priority]);
        assert_eq!(sorted(items, &k), vec![1, 2, 3]);
    }

    #[test]
    fn names_compare_case_folded() {
        let items = vec![
            project(1, "beta", "active", "low"),
            project(2, "Alpha", "active", "low"),
            project(3, "GAMMA", "active", "low"),
        ];
        let mut k = keys(&[SortField::Name]);
        assert_eq!(sorted(items.clone(), &k), vec![2, 1, 3]);
        k.toggle(SortField::Name);
        assert_eq!(sorted(items, &k), vec![3, 1, 2]);
    }

    #[test]
    fn due_dates_compare_as_timestamps_missing_last() {
        let mut a = project(1, "a", "active", "low");
        a.due_date = Some("2024-03-01".to_string());
        let mut b = project(2, "b", "active", "low");
        b.due_date = Some("2023-12-31".to_string());
        let c = project(3, "c", "active", "low");
        let mut d = project(4, "d", "active", "low");
        d.due_date = Some("2024-01-15T09:30:00Z".to_string());

        let k = keys(&[SortField::DueDate]);
        assert_eq!(sorted(vec![a, b, c, d], &k), vec![2, 4, 1, 3]);
    }

    #[test]
    fn members_sort_by_joined_usernames() {
        let mut a = project(1, "a", "active", "low");
        a.team_members = vec![TeamMember::new(User::new(1, "zed"), "dev")];
        let mut b = project(2, "b", "active", "low");
        b.team_members = vec![TeamMember::new(User::new(2, "Amy"), "dev")];
        let k = keys(&[SortField::Members]);
        assert_eq!(sorted(vec![a, b], &k), vec![2, 1]);
    }

    #[test]
    fn unknown_enum_values_sort_last_ascending() {
        let items = vec![
            project(1, "a", "archived", "urgent"),
            project(2, "b", "completed", "low"),
            project(3, "c", "active", "high"),
        ];
        assert_eq!(sorted(items.clone(), &keys(&[SortField::Status])), vec![3, 2, 1]);
        assert_eq!(sorted(items.clone(), &keys(&[SortField::Priority])), vec![2, 3, 1]);

        let mut custom = keys(&[SortField::Status]);
        custom.toggle(SortField::Status);
        custom.toggle(SortField::Status);
        assert_eq!(sorted(items, &custom), vec![3, 2, 1]);
    }

    #[test]
    fn work_item_status_tables() {
        let ranks = WorkItem::default_ranks();
        assert_eq!(ranks.status_natural.rank("pending"), 1);
        assert_eq!(ranks.status_custom.rank("in_progress"), 1);
        assert_eq!(ranks.status_natural.rank("on_hold"), UNRANKED);
    }

    #[test]
    fn sort_field_parses_ui_names() {
        assert_eq!("title".parse::<SortField>().unwrap(), SortField::Name);
        assert_eq!("team_members".parse::<SortField>().unwrap(), SortField::Members);
        assert_eq!("Due-Date".parse::<SortField>().unwrap(), SortField::DueDate);
        assert!("budget".parse::<SortField>().is_err());
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    fn any_field() -> impl Strategy<Value = SortField> {
        prop_oneof![
            Just(SortField::Name),
            Just(SortField::DueDate),
            Just(SortField::Members),
            Just(SortField::MeetingLink),
            Just(SortField::Status),
            Just(SortField::Priority),
        ]
    }

    proptest! {
        #[test]
        fn full_cycle_returns_to_absent(
            prefix in proptest::collection::vec(any_field(), 0..6),
            field in any_field(),
        ) {
            let mut k = SortKeys::new();
            for f in &prefix {
                k.toggle(*f);
            }
            let before = k.direction_of(field);
            let cycle = match field.class() {
                SortClass::Binary => 3,
                SortClass::StatusTernary | SortClass::PriorityTernary => 4,
            };
            for _ in 0..cycle {
                k.toggle(field);
            }
            prop_assert_eq!(k.direction_of(field), before);
        }

        #[test]
        fn compare_is_total_and_antisymmetric(
            a_status in "[a-z_]{0,10}",
            b_status in "[a-z_]{0,10}",
            a_priority in prop_oneof![Just("high".to_string()), Just("low".to_string()), "[a-z]{0,6}"],
            b_priority in prop_oneof![Just("medium".to_string()), Just("low".to_string()), "[a-z]{0,6}"],
            fields in proptest::collection::vec(any_field(), 0..8),
        ) {
            let a = project(1, "a", &a_status, &a_priority);
            let b = project(2, "b", &b_status, &b_priority);
            let k = keys(&fields);
            let ranks = Project::default_ranks();
            prop_assert_eq!(compare(&a, &b, &k, &ranks), compare(&b, &a, &k, &ranks).reverse());
        }

        #[test]
        fn unknown_status_never_precedes_known_ascending(raw in "[a-z]{1,12}") {
            prop_assume!(!["active", "on_hold", "completed"].contains(&raw.as_str()));
            let unknown = project(1, "a", &raw, "low");
            let ranks = Project::default_ranks();
            let asc = keys(&[SortField::Status]);
            for known in ["active", "on_hold", "completed"] {
                let k = project(2, "b", known, "low");
                prop_assert_eq!(compare(&unknown, &k, &asc, &ranks), Ordering::Greater);
            }
        }
    }
}
