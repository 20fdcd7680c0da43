//! crates/kinderplan_core/src/seed.rs
//!
//! Built-in starter content. Seed records carry fixed ids (`*_seed_*`) so
//! the store can recognize them when reconciling an existing installation
//! against a newer seed set.

use chrono::Utc;

use crate::domain::{
    Activity, ActivityType, AgeGroup, DayEntry, DayTemplate, Document, DocumentType, PlanStatus,
    Section, Weekday, WeeklyPlan, TEMPLATE_WEEK,
};

fn activity(
    id: &str,
    title: &str,
    activity_type: ActivityType,
    objective: &str,
    materials: &str,
    description: &str,
    age_group: AgeGroup,
    is_template: bool,
) -> Activity {
    Activity {
        id: id.to_string(),
        title: title.to_string(),
        activity_type,
        objective: objective.to_string(),
        materials: materials.to_string(),
        description: description.to_string(),
        age_group,
        is_template,
    }
}

/// The starter activity library.
pub fn activities() -> Vec<Activity> {
    vec![
        activity(
            "act_seed_001",
            "Finger Painting",
            ActivityType::Art,
            "Develop fine motor skills and color recognition",
            "Paper, Non-toxic paint, Aprons",
            "Allow children to explore mixing primary colors on large sheets of paper.",
            AgeGroup::Toddler,
            true,
        ),
        activity(
            "act_seed_002",
            "Nature Walk & Sort",
            ActivityType::Sensory,
            "Explore textures and nature; Classification skills",
            "Collection bags, Bins for sorting",
            "Walk outside to collect leaves/rocks. Return to class and sort by size/color.",
            AgeGroup::Preschool,
            true,
        ),
        activity(
            "act_seed_003",
            "Parachute Play",
            ActivityType::GrossMotor,
            "Cooperation and large muscle movement",
            "Large Parachute",
            "Group lifts parachute up and down. Run underneath on cue.",
            AgeGroup::PreK,
            true,
        ),
        activity(
            "act_seed_004",
            "Tummy Time Sensory",
            ActivityType::Sensory,
            "Neck strength and visual tracking",
            "Sensory mat, mirror",
            "Place infant on stomach with mirror or high-contrast cards in front.",
            AgeGroup::Infant,
            true,
        ),
    ]
}

/// The starter day templates.
pub fn day_templates() -> Vec<DayTemplate> {
    vec![
        DayTemplate {
            id: "day_seed_001".to_string(),
            template_name: "Full-Day Schedule (Toddler)".to_string(),
            age_group: AgeGroup::Toddler,
            notes: "09:00 Snack | 12:00 Lunch | 12:30 Nap".to_string(),
            activities: vec![
                activity(
                    "t_01",
                    "Morning Circle",
                    ActivityType::CircleTime,
                    "Greeting & Song",
                    "Carpet",
                    "Welcome song and weather check.",
                    AgeGroup::Toddler,
                    false,
                ),
                activity(
                    "t_02",
                    "Outdoor Play",
                    ActivityType::Outdoor,
                    "Gross Motor",
                    "Playground",
                    "Free play on structure.",
                    AgeGroup::Toddler,
                    false,
                ),
                activity(
                    "t_03",
                    "Sensory Bin",
                    ActivityType::Sensory,
                    "Tactile exploration",
                    "Rice/Water bin",
                    "Scooping and pouring.",
                    AgeGroup::Toddler,
                    false,
                ),
            ],
        },
        DayTemplate {
            id: "day_seed_002".to_string(),
            template_name: "Rainy Day / Indoor Plan".to_string(),
            age_group: AgeGroup::Preschool,
            notes: "Indoor Recess Schedule Active".to_string(),
            activities: vec![
                activity(
                    "r_01",
                    "Indoor Obstacle Course",
                    ActivityType::GrossMotor,
                    "Movement",
                    "Cushions, Tunnels",
                    "Set up safe path in classroom.",
                    AgeGroup::Preschool,
                    false,
                ),
                activity(
                    "r_02",
                    "Freeze Dance",
                    ActivityType::Music,
                    "Listening skills",
                    "Music player",
                    "Dance until music stops.",
                    AgeGroup::Preschool,
                    false,
                ),
            ],
        },
    ]
}

fn weekly_template(age: AgeGroup, title: &str, default_activities: &[&str]) -> WeeklyPlan {
    let days = Weekday::ALL
        .iter()
        .map(|day| DayEntry {
            day_of_week: *day,
            date: None,
            notes: String::new(),
            reflection: Some(String::new()),
            start_end_times: None,
            activities: default_activities
                .iter()
                .enumerate()
                .map(|(i, act_title)| {
                    activity(
                        &format!("wt_{}_{:?}_{}", age, day, i),
                        act_title,
                        ActivityType::General,
                        "",
                        "",
                        "",
                        age,
                        false,
                    )
                })
                .collect(),
        })
        .collect();

    WeeklyPlan {
        id: format!("wt_seed_{}", age),
        week_of: TEMPLATE_WEEK.to_string(),
        age_group: age,
        teacher_name: Some(TEMPLATE_WEEK.to_string()),
        theme: Some(title.to_string()),
        status: PlanStatus::Draft,
        is_template: true,
        days,
    }
}

/// The starter weekly templates, one routine per major age group.
pub fn weekly_templates() -> Vec<WeeklyPlan> {
    vec![
        weekly_template(
            AgeGroup::Infant,
            "Infant Routine Template",
            &[
                "Arrival / Health Check",
                "Tummy Time",
                "Sensory Exploration",
                "Stroller Walk / Outdoor",
                "Music & Cuddle",
            ],
        ),
        weekly_template(
            AgeGroup::Toddler,
            "Toddler Activity Template",
            &[
                "Morning Circle",
                "Art Activity",
                "Outdoor Play",
                "Story Time",
                "Music & Movement",
            ],
        ),
        weekly_template(
            AgeGroup::Preschool,
            "Preschool Structured Template",
            &[
                "Morning Meeting",
                "Small Group Literacy",
                "Centers / Free Play",
                "Outdoor Gross Motor",
                "Math Activity",
            ],
        ),
    ]
}

fn document(id: &str, title: &str, document_type: DocumentType, sections: &[(&str, &str)]) -> Document {
    Document {
        id: id.to_string(),
        title: title.to_string(),
        document_type,
        last_modified: Utc::now(),
        sections: sections
            .iter()
            .map(|(title, content)| Section {
                title: (*title).to_string(),
                content: (*content).to_string(),
            })
            .collect(),
    }
}

/// The starter compliance and admin documents.
pub fn documents() -> Vec<Document> {
    vec![
        document(
            "doc_seed_001",
            "Substitute Teacher Instructions",
            DocumentType::Substitute,
            &[
                (
                    "Daily Schedule Overview",
                    "8:00 Arrival\n9:00 Breakfast\n10:00 Circle Time\n11:00 Outside\n12:00 Lunch\n1:00 Nap",
                ),
                (
                    "Medical / Allergies",
                    "See red binder on desk for specific EpiPen locations.\nList specific allergies here:",
                ),
                ("Emergency Contacts", "Director: 555-0100\nFront Desk: 555-0101"),
                (
                    "Key Rules",
                    "1. Never leave children unattended.\n2. Head count every 15 minutes.\n3. Hand washing before all meals.",
                ),
            ],
        ),
        document(
            "doc_seed_002",
            "Monthly Theme Overview",
            DocumentType::Planning,
            &[
                ("Month & Theme", "Month: \nTheme: "),
                ("Key Concepts / Goals", "1. \n2. \n3. "),
                ("Special Events / Holidays", ""),
                ("Book List", ""),
            ],
        ),
        document(
            "doc_seed_003",
            "Inspector Walk-In Summary",
            DocumentType::Licensing,
            &[
                (
                    "Ratios Check",
                    "Room: \nTime: \nStaff Present: \nChildren Present: \nRatio Met: Yes / No",
                ),
                (
                    "Environment Safety",
                    "[ ] Outlets covered\n[ ] Chemicals/Cleaners locked\n[ ] First Aid Kit accessible\n[ ] Walkways clear\n[ ] Heavy furniture secured",
                ),
                (
                    "Documentation Check",
                    "[ ] Attendance Log updated (Time In/Out)\n[ ] Allergy/Dietary list posted\n[ ] Daily Health Checks complete\n[ ] Emergency Cards accessible",
                ),
            ],
        ),
        document(
            "doc_seed_004",
            "Weekly Reflection Notes",
            DocumentType::Observation,
            &[
                ("What worked well this week?", ""),
                ("What did not work?", ""),
                ("Individual Child Notes", ""),
                ("Adjustments for next week", ""),
            ],
        ),
        document(
            "doc_seed_005",
            "Lesson Plan Coverage Summary",
            DocumentType::Licensing,
            &[
                (
                    "Social & Emotional Development",
                    "[ ] Cooperative Play\n[ ] Self-Regulation Activity\n[ ] Group Circle Time\n[ ] Sharing / Turn Taking",
                ),
                (
                    "Language & Literacy",
                    "[ ] Story Time\n[ ] Vocabulary Building\n[ ] Letter Recognition\n[ ] Rhyming / Songs",
                ),
                (
                    "Physical Development",
                    "[ ] Gross Motor (Running/Jumping)\n[ ] Fine Motor (Writing/Pinching)\n[ ] Sensory Exploration\n[ ] Outdoor Play",
                ),
                (
                    "Cognitive / Math",
                    "[ ] Counting/Sorting\n[ ] Pattern Recognition\n[ ] Science/Nature Discovery\n[ ] Problem Solving",
                ),
            ],
        ),
        document(
            "doc_seed_006",
            "Daily Activity Log",
            DocumentType::Licensing,
            &[
                ("Date", ""),
                ("Scheduled Activities Completed", "1. \n2. \n3. "),
                (
                    "Modifications Made",
                    "Changed outdoor play to indoor due to weather: Yes/No",
                ),
                ("Unusual Incidents", "None reported."),
            ],
        ),
        document(
            "doc_seed_007",
            "Materials & Safety Checklist",
            DocumentType::Licensing,
            &[
                (
                    "Indoor Safety",
                    "[ ] Electrical outlets covered\n[ ] Exits unblocked\n[ ] Floor clean/dry\n[ ] Heavy furniture secured",
                ),
                (
                    "Outdoor Safety",
                    "[ ] Fences secure\n[ ] Play equipment dry/safe\n[ ] No hazardous debris",
                ),
                (
                    "Emergency Supplies",
                    "[ ] First Aid Kit stocked\n[ ] Emergency contacts updated\n[ ] Flashlight working",
                ),
            ],
        ),
        document(
            "doc_seed_008",
            "Incident/Injury Report",
            DocumentType::Licensing,
            &[
                ("Child Name", ""),
                ("Date", ""),
                ("Time", ""),
                (
                    "Description of Incident",
                    "Where did it happen?\nWhat happened details:",
                ),
                ("Action Taken", "First aid administered:\nBy whom:"),
                (
                    "Parent Notification",
                    "Time notified:\nMethod (Phone/In-Person):\nPerson contacted:",
                ),
                ("Staff Signature", ""),
            ],
        ),
        document(
            "doc_seed_009",
            "Policy Acknowledgement",
            DocumentType::Admin,
            &[
                ("Policy Name", ""),
                (
                    "Employee Statement",
                    "I have read and understood the policies regarding...",
                ),
                ("Signature & Date", ""),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_ids_are_unique_within_each_collection() {
        let mut doc_ids: Vec<String> = documents().into_iter().map(|d| d.id).collect();
        doc_ids.sort();
        doc_ids.dedup();
        assert_eq!(doc_ids.len(), 9);

        let mut act_ids: Vec<String> = activities().into_iter().map(|a| a.id).collect();
        act_ids.sort();
        act_ids.dedup();
        assert_eq!(act_ids.len(), 4);
    }

    #[test]
    fn weekly_template_seeds_are_normalized_templates() {
        for template in weekly_templates() {
            assert!(template.is_template);
            assert_eq!(template.week_of, TEMPLATE_WEEK);
            assert_eq!(template.days.len(), 5);
        }
    }
}
