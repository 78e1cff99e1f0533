//! Prompt construction for plan generation.
//!
//! Two strings go to the provider: a fixed system instruction pinning the
//! JSON output contract, and a user prompt serializing the team, the budget
//! rules, and (only for `similar`/`reuse`) a digest of event history. The
//! conditional history block is what differentiates the three generation
//! modes.

use std::collections::HashMap;

use crate::types::history::SavedEvent;
use crate::types::plan::BASE_BUDGET_VND;
use crate::types::request::{GenerationMode, GenerationRequest};
use crate::types::team::TeamMember;

const MAX_HISTORY_DIGEST: usize = 5;

/// System instruction fixing the exact JSON contract the model must return.
pub fn system_instruction() -> String {
    [
        "You are a team bonding event planner for a small company in Ho Chi Minh City.",
        "Respond with JSON only: a single JSON object with a \"plans\" key holding an array of 3 to 5 plan objects.",
        "Each plan object has exactly these keys: \"id\", \"title\", \"theme\", \"phases\", \"totalCost\", \"bestFor\", \"rating\", \"fitAnalysis\".",
        "Each entry of \"phases\" has exactly these keys: \"name\", \"description\", \"address\", \"googleMapsLink\", \"cost\", \"isIndoor\", \"isOutdoor\", \"isVegetarianFriendly\", \"isAlcoholFriendly\", \"travelTime\", \"distance\".",
        "\"cost\" and \"totalCost\" are integers in VND per person, and \"totalCost\" must equal the sum of the phase costs.",
        "\"travelTime\" (minutes) and \"distance\" (km) describe the leg from the previous phase and must be null for the first phase.",
        "\"rating\" is an integer from 1 to 5. \"bestFor\" is an array of member names.",
        "Do not wrap the JSON in markdown fences and do not add any prose around it.",
    ]
    .join("\n")
}

/// User prompt serializing the request, the roster, and the business rules.
///
/// History is injected only for `similar` and `reuse`; `new` omits all
/// historical context.
pub fn build_user_prompt(
    request: &GenerationRequest,
    roster: &[TeamMember],
    history: &[SavedEvent],
) -> String {
    let mut sections = Vec::new();

    let mut header = vec![
        "Plan team bonding event options for the team below.".to_string(),
        String::new(),
        format!("Theme: {}", request.theme),
        format!("Base budget: {} VND per person", format_vnd(BASE_BUDGET_VND)),
    ];
    if let Some(contribution) = request.optional_contribution {
        header.push(format!(
            "Optional top-up contribution: {} VND per person",
            format_vnd(contribution)
        ));
    }
    if let Some(date) = &request.preferred_date {
        header.push(format!("Preferred date/time: {}", date));
    }
    if let Some(zone) = &request.preferred_zone {
        header.push(format!("Preferred location zone: {}", zone));
    }
    sections.push(header.join("\n"));

    sections.push(
        [
            "Budget rules (absolute ceilings per person, regardless of top-up):",
            "- 1-phase plan: total cost at most 300,000 VND",
            "- 2-phase plan: total cost at most 450,000 VND (300,000 + 150,000)",
            "- 3-phase plan: total cost at most 500,000 VND (300,000 + 150,000 + 50,000)",
        ]
        .join("\n"),
    );

    sections.push(
        [
            "Logistics rules:",
            "- Every plan has 1 to 3 phases.",
            "- Consecutive phases must be within 2 km and 15 minutes of travel from each other.",
        ]
        .join("\n"),
    );

    sections.push(format_roster(request, roster));

    match request.mode {
        GenerationMode::New => {}
        GenerationMode::Similar => {
            if let Some(digest) = history_digest(history) {
                sections.push(digest);
            }
        }
        GenerationMode::Reuse => {
            if let Some(patterns) = structural_patterns(history) {
                sections.push(patterns);
            }
        }
    }

    sections.join("\n\n")
}

fn format_roster(request: &GenerationRequest, roster: &[TeamMember]) -> String {
    let mut lines = vec!["Team members attending:".to_string()];
    for member in roster {
        if !request.available_members.is_empty()
            && !request.available_members.contains(&member.name)
        {
            continue;
        }
        let preferences = if member.preferences.is_empty() {
            "anything".to_string()
        } else {
            member.preferences.join(", ")
        };
        lines.push(format!(
            "• {} ({}): {} - Prefers: {}",
            member.name, member.vibe, member.location, preferences
        ));
    }
    if lines.len() == 1 {
        for name in &request.available_members {
            lines.push(format!("• {}", name));
        }
    }
    lines.join("\n")
}

/// Digest of recent events plus aggregate stats, for `similar` mode.
fn history_digest(history: &[SavedEvent]) -> Option<String> {
    if history.is_empty() {
        return None;
    }

    let mut recent: Vec<&SavedEvent> = history.iter().collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));

    let mut lines = vec!["Recent team events (most recent first):".to_string()];
    for event in recent.iter().take(MAX_HISTORY_DIGEST) {
        lines.push(format!(
            "- {} | {} | {} | {} VND | rated {}/5",
            event.date,
            event.theme,
            event.activities.join(", "),
            format_vnd(event.total_cost),
            event.rating
        ));
    }

    let mean_cost =
        history.iter().map(|e| e.total_cost).sum::<i64>() / history.len() as i64;
    let mean_rating =
        history.iter().map(|e| e.rating as f64).sum::<f64>() / history.len() as f64;
    lines.push(format!(
        "Aggregate: most frequent theme \"{}\"; average cost {} VND; average rating {:.1}/5.",
        most_frequent_theme(history),
        format_vnd(mean_cost),
        mean_rating
    ));
    lines.push(
        "Suggest plans in the same spirit as the highest-rated events above.".to_string(),
    );
    Some(lines.join("\n"))
}

/// Observed phase-count-by-theme structural pattern, for `reuse` mode.
fn structural_patterns(history: &[SavedEvent]) -> Option<String> {
    if history.is_empty() {
        return None;
    }

    // One representative per theme: the highest-rated event
    let mut best_by_theme: HashMap<&str, &SavedEvent> = HashMap::new();
    for event in history {
        match best_by_theme.get(event.theme.as_str()) {
            Some(current) if current.rating >= event.rating => {}
            _ => {
                best_by_theme.insert(event.theme.as_str(), event);
            }
        }
    }

    let mut themes: Vec<&&str> = best_by_theme.keys().collect();
    themes.sort();

    let mut lines =
        vec!["Reuse the structure of past events. Observed phase patterns by theme:".to_string()];
    for theme in themes {
        let event = best_by_theme[*theme];
        lines.push(format!(
            "- {}: {} phases ({})",
            theme,
            event.phase_count(),
            event.activities.join(" → ")
        ));
    }
    lines.push(
        "Keep the same phase count and activity flow; refresh venues as needed.".to_string(),
    );
    Some(lines.join("\n"))
}

fn most_frequent_theme(history: &[SavedEvent]) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for event in history {
        *counts.entry(event.theme.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by_key(|(theme, count)| (*count, std::cmp::Reverse(theme.to_string())))
        .map(|(theme, _)| theme.to_string())
        .unwrap_or_default()
}

/// Format a VND amount with thousands separators, e.g. 300000 -> "300,000".
pub(crate) fn format_vnd(amount: i64) -> String {
    let negative = amount < 0;
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if negative {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::team::Vibe;

    fn roster() -> Vec<TeamMember> {
        vec![
            TeamMember::new(
                "m1",
                "Ben",
                "District 1, Ho Chi Minh City",
                vec!["hotpot".to_string(), "karaoke".to_string()],
                Vibe::Chill,
            ),
            TeamMember::new("m2", "Cody", "Binh Thanh", Vec::new(), Vibe::Energetic),
            TeamMember::new("m3", "Big Thanh", "District 7", vec!["bbq".to_string()], Vibe::Mixed),
        ]
    }

    fn history() -> Vec<SavedEvent> {
        vec![
            SavedEvent {
                date: "2024-01-10".to_string(),
                theme: "fun".to_string(),
                location: Some("District 1".to_string()),
                participants: Vec::new(),
                activities: vec![
                    "Hotpot Dinner".to_string(),
                    "Karaoke".to_string(),
                    "Bar Hopping".to_string(),
                ],
                total_cost: 450_000,
                rating: 5,
            },
            SavedEvent {
                date: "2024-01-15".to_string(),
                theme: "chill".to_string(),
                location: Some("District 2".to_string()),
                participants: Vec::new(),
                activities: vec!["Cafe Meeting".to_string(), "Board Games".to_string()],
                total_cost: 200_000,
                rating: 4,
            },
        ]
    }

    fn request(mode: GenerationMode) -> GenerationRequest {
        GenerationRequest::new(
            "fun",
            vec!["Ben".to_string(), "Cody".to_string(), "Big Thanh".to_string()],
        )
        .with_contribution(150_000)
        .with_preferred_zone("District 1")
        .with_mode(mode)
    }

    #[test]
    fn test_system_instruction_pins_contract() {
        let instruction = system_instruction();
        assert!(instruction.contains("\"plans\""));
        assert!(instruction.contains("\"totalCost\""));
        assert!(instruction.contains("\"googleMapsLink\""));
        assert!(instruction.contains("\"isVegetarianFriendly\""));
        assert!(instruction.contains("null for the first phase"));
    }

    #[test]
    fn test_prompt_serializes_request_fields() {
        let prompt = build_user_prompt(&request(GenerationMode::New), &roster(), &[]);
        assert!(prompt.contains("Theme: fun"));
        assert!(prompt.contains("Base budget: 300,000 VND"));
        assert!(prompt.contains("Optional top-up contribution: 150,000 VND"));
        assert!(prompt.contains("Preferred location zone: District 1"));
        assert!(prompt.contains("- 3-phase plan: total cost at most 500,000 VND"));
        assert!(prompt.contains("within 2 km and 15 minutes"));
    }

    #[test]
    fn test_roster_lines() {
        let prompt = build_user_prompt(&request(GenerationMode::New), &roster(), &[]);
        assert!(prompt
            .contains("• Ben (chill): District 1, Ho Chi Minh City - Prefers: hotpot, karaoke"));
        assert!(prompt.contains("• Cody (energetic): Binh Thanh - Prefers: anything"));
    }

    #[test]
    fn test_roster_filters_unavailable_members() {
        let mut req = request(GenerationMode::New);
        req.available_members = vec!["Ben".to_string()];
        let prompt = build_user_prompt(&req, &roster(), &[]);
        assert!(prompt.contains("• Ben"));
        assert!(!prompt.contains("• Cody"));
    }

    #[test]
    fn test_new_mode_omits_history_entirely() {
        let prompt = build_user_prompt(&request(GenerationMode::New), &roster(), &history());
        assert!(!prompt.contains("Recent team events"));
        assert!(!prompt.contains("phase patterns"));
        assert!(!prompt.contains("Hotpot Dinner"));
    }

    #[test]
    fn test_similar_mode_includes_digest_and_aggregates() {
        let prompt = build_user_prompt(&request(GenerationMode::Similar), &roster(), &history());
        assert!(prompt.contains("Recent team events (most recent first):"));
        // Most recent first: chill event (01-15) before fun event (01-10)
        let chill_pos = prompt.find("2024-01-15 | chill").unwrap();
        let fun_pos = prompt.find("2024-01-10 | fun").unwrap();
        assert!(chill_pos < fun_pos);
        assert!(prompt.contains("average cost 325,000 VND"));
        assert!(prompt.contains("average rating 4.5/5"));
    }

    #[test]
    fn test_reuse_mode_includes_structural_pattern() {
        let prompt = build_user_prompt(&request(GenerationMode::Reuse), &roster(), &history());
        assert!(prompt.contains("Observed phase patterns by theme:"));
        assert!(prompt.contains("- fun: 3 phases (Hotpot Dinner → Karaoke → Bar Hopping)"));
        assert!(prompt.contains("- chill: 2 phases (Cafe Meeting → Board Games)"));
        assert!(!prompt.contains("Recent team events"));
    }

    #[test]
    fn test_history_modes_with_empty_history() {
        let prompt = build_user_prompt(&request(GenerationMode::Similar), &roster(), &[]);
        assert!(!prompt.contains("Recent team events"));
        let prompt = build_user_prompt(&request(GenerationMode::Reuse), &roster(), &[]);
        assert!(!prompt.contains("phase patterns"));
    }

    #[test]
    fn test_format_vnd() {
        assert_eq!(format_vnd(0), "0");
        assert_eq!(format_vnd(500), "500");
        assert_eq!(format_vnd(300_000), "300,000");
        assert_eq!(format_vnd(1_500_000), "1,500,000");
        assert_eq!(format_vnd(-450_000), "-450,000");
    }
}
