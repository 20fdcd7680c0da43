//! crates/kinderplan_core/src/domain.rs
//!
//! Defines the core data structures for the planner.
//! These structs double as the persisted wire format: the camelCase field
//! names and enum labels are what ends up in the storage slots and in
//! backup files, so renames here are breaking changes.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Mints an opaque record id with a collection-specific prefix.
pub fn mint_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

/// The age bracket a plan, template or activity targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeGroup {
    Infant,
    Toddler,
    Preschool,
    #[serde(rename = "Pre-K")]
    PreK,
    #[serde(rename = "Grade School")]
    GradeSchool,
}

impl std::fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            AgeGroup::Infant => "Infant",
            AgeGroup::Toddler => "Toddler",
            AgeGroup::Preschool => "Preschool",
            AgeGroup::PreK => "Pre-K",
            AgeGroup::GradeSchool => "Grade School",
        };
        f.write_str(label)
    }
}

/// The broad category of an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityType {
    Art,
    Sensory,
    #[serde(rename = "Circle Time")]
    CircleTime,
    Outdoor,
    Music,
    General,
    Literacy,
    #[serde(rename = "Fine Motor")]
    FineMotor,
    #[serde(rename = "Gross Motor")]
    GrossMotor,
}

impl ActivityType {
    /// Parses a free-form label, as returned by the generative backend.
    /// Unknown labels become `General` rather than an error.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "art" => ActivityType::Art,
            "sensory" => ActivityType::Sensory,
            "circle time" => ActivityType::CircleTime,
            "outdoor" => ActivityType::Outdoor,
            "music" => ActivityType::Music,
            "literacy" => ActivityType::Literacy,
            "fine motor" => ActivityType::FineMotor,
            "gross motor" => ActivityType::GrossMotor,
            _ => ActivityType::General,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    /// The five planning days, in display order.
    pub const ALL: [Weekday; 5] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];
}

/// A single activity, either a library template or a copy embedded in a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub objective: String,
    /// Stored as a simple text block for simplicity in V1.
    pub materials: String,
    pub description: String,
    pub age_group: AgeGroup,
    /// If true, lives in the library.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_template: bool,
}

fn is_false(v: &bool) -> bool {
    !v
}

impl Activity {
    /// Copies this activity into an independent record: all fields are
    /// cloned, a fresh id is minted and the template flag is cleared.
    ///
    /// Every cross-collection move (library -> plan, template -> plan,
    /// suggestion -> plan) goes through this; records are never shared by
    /// reference between collections.
    pub fn clone_detach(&self) -> Activity {
        Activity {
            id: mint_id("act"),
            is_template: false,
            ..self.clone()
        }
    }
}

/// One weekday inside a weekly plan. Not independently addressable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayEntry {
    pub day_of_week: Weekday,
    /// Optional specific date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub activities: Vec<Activity>,
    /// Logistical notes.
    pub notes: String,
    /// Pedagogical reflection (Did they like it? How did it work?).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflection: Option<String>,
    /// e.g. "8:00 AM - 5:00 PM"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_end_times: Option<String>,
}

impl DayEntry {
    pub fn empty(day_of_week: Weekday) -> Self {
        DayEntry {
            day_of_week,
            date: None,
            activities: Vec::new(),
            notes: String::new(),
            reflection: Some(String::new()),
            start_end_times: None,
        }
    }
}

/// A reusable day pattern. Activities are deep copies, never references
/// into the library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayTemplate {
    pub id: String,
    pub template_name: String,
    pub activities: Vec<Activity>,
    pub notes: String,
    pub age_group: AgeGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanStatus {
    Draft,
    Finalized,
}

/// The sentinel `weekOf` value marking a weekly template.
pub const TEMPLATE_WEEK: &str = "TEMPLATE";

/// A week of planning, Monday through Friday. Also the record type for
/// weekly templates (`is_template` set, `week_of` forced to the sentinel).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyPlan {
    pub id: String,
    /// YYYY-MM-DD of the Monday, or [`TEMPLATE_WEEK`].
    pub week_of: String,
    pub age_group: AgeGroup,
    /// Always exactly five entries, Monday..Friday, fixed at creation.
    pub days: Vec<DayEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    pub status: PlanStatus,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_template: bool,
}

impl WeeklyPlan {
    /// Creates an empty draft plan with its five fixed weekdays.
    pub fn new(week_of: impl Into<String>, age_group: AgeGroup) -> Self {
        WeeklyPlan {
            id: mint_id("plan"),
            week_of: week_of.into(),
            age_group,
            days: Weekday::ALL.iter().map(|d| DayEntry::empty(*d)).collect(),
            teacher_name: None,
            theme: Some(String::new()),
            status: PlanStatus::Draft,
            is_template: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    Admin,
    Substitute,
    Licensing,
    Planning,
    Observation,
}

/// One titled block of free text inside a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub content: String,
}

/// Generic document for licensing checklists, sub plans, monthly
/// overviews, etc. `last_modified` is stamped by the store on every save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub document_type: DocumentType,
    pub sections: Vec<Section>,
    pub last_modified: DateTime<Utc>,
}

impl Document {
    pub fn new(document_type: DocumentType, title: impl Into<String>) -> Self {
        Document {
            id: mint_id("doc"),
            title: title.into(),
            document_type,
            sections: vec![Section {
                title: "Notes".to_string(),
                content: String::new(),
            }],
            last_modified: Utc::now(),
        }
    }
}

/// A monthly parent newsletter. Flat record, no nested collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Newsletter {
    pub id: String,
    /// e.g. "October 2024"
    pub month: String,
    pub title: String,
    /// "What's going on for the month"
    pub overview: String,
    pub important_dates: String,
    pub reminders: String,
    pub created_date: DateTime<Utc>,
}

impl Newsletter {
    pub fn new() -> Self {
        let now = Utc::now();
        let month = format!("{} {}", month_name(now.month()), now.year());
        Newsletter {
            id: mint_id("nl"),
            title: format!("{} Newsletter", month),
            month,
            overview: String::new(),
            important_dates: String::new(),
            reminders: String::new(),
            created_date: now,
        }
    }
}

impl Default for Newsletter {
    fn default() -> Self {
        Newsletter::new()
    }
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        _ => "December",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_detach_mints_a_fresh_id_and_clears_the_template_flag() {
        let library_copy = Activity {
            id: mint_id("act"),
            title: "Finger Painting".to_string(),
            activity_type: ActivityType::Art,
            objective: "Fine motor skills".to_string(),
            materials: "Paper, paint".to_string(),
            description: "Explore mixing colors.".to_string(),
            age_group: AgeGroup::Toddler,
            is_template: true,
        };

        let detached = library_copy.clone_detach();
        assert_ne!(detached.id, library_copy.id);
        assert!(!detached.is_template);
        assert_eq!(detached.title, library_copy.title);
        assert_eq!(detached.age_group, library_copy.age_group);
    }

    #[test]
    fn new_plan_has_five_fixed_weekdays() {
        let plan = WeeklyPlan::new("2024-09-02", AgeGroup::Preschool);
        assert_eq!(plan.days.len(), 5);
        assert_eq!(plan.days[0].day_of_week, Weekday::Monday);
        assert_eq!(plan.days[4].day_of_week, Weekday::Friday);
        assert_eq!(plan.status, PlanStatus::Draft);
        assert!(!plan.is_template);
    }

    #[test]
    fn wire_format_uses_camel_case_and_original_labels() {
        let plan = WeeklyPlan::new("2024-09-02", AgeGroup::PreK);
        let json = serde_json::to_string(&plan).unwrap();
        assert!(json.contains("\"weekOf\":\"2024-09-02\""));
        assert!(json.contains("\"ageGroup\":\"Pre-K\""));
        assert!(json.contains("\"dayOfWeek\":\"Monday\""));

        let doc = Document::new(DocumentType::Substitute, "Sub Plan");
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("\"lastModified\""));
        assert!(json.contains("\"type\":\"Substitute\""));
    }

    #[test]
    fn unknown_activity_labels_fall_back_to_general() {
        assert_eq!(ActivityType::from_label("Gross Motor"), ActivityType::GrossMotor);
        assert_eq!(ActivityType::from_label("  music "), ActivityType::Music);
        assert_eq!(ActivityType::from_label("STEM"), ActivityType::General);
    }
}
