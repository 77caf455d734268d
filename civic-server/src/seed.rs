//! Sample projects and events for a fresh database.

use tracing::info;

use crate::model::{NewEvent, NewProject, ProjectStatus};
use crate::repository::{CivicRepository, RepositoryError};

/// How many rows `seed_if_empty` inserted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub projects: usize,
    pub events: usize,
}

#[allow(clippy::too_many_arguments)]
fn project(
    title_bn: &str,
    title_en: &str,
    description_bn: &str,
    description_en: &str,
    category: &str,
    budget: &str,
    status: ProjectStatus,
    image_text: &str,
    upvotes: i64,
) -> NewProject {
    NewProject {
        title_bn: title_bn.to_string(),
        title_en: title_en.to_string(),
        description_bn: description_bn.to_string(),
        description_en: description_en.to_string(),
        category: category.to_string(),
        budget: budget.to_string(),
        status,
        image_url: format!("https://placehold.co/800x400/333333/FFFFFF?text={}", image_text),
        upvotes,
    }
}

#[allow(clippy::too_many_arguments)]
fn event(
    title_bn: &str,
    title_en: &str,
    description_bn: &str,
    description_en: &str,
    category: &str,
    date: &str,
    location: &str,
    image_text: &str,
    counters: (i64, i64, i64),
) -> NewEvent {
    let (volunteers, going, helpful) = counters;
    NewEvent {
        title_bn: title_bn.to_string(),
        title_en: title_en.to_string(),
        description_bn: description_bn.to_string(),
        description_en: description_en.to_string(),
        category: category.to_string(),
        date: date.to_string(),
        location: location.to_string(),
        image_url: format!("https://placehold.co/800x400/999999/FFFFFF?text={}", image_text),
        volunteers,
        going,
        helpful,
    }
}

pub fn sample_projects() -> Vec<NewProject> {
    vec![
        project(
            "পদ্মা সেতু রেল সংযোগ প্রকল্প",
            "Padma Bridge Rail Link Project",
            "পদ্মা সেতুর মাধ্যমে ঢাকা থেকে যশোর পর্যন্ত রেললাইন নির্মাণ।",
            "Construction of a rail line from Dhaka to Jessore via the Padma Bridge.",
            "Infrastructure",
            "৳ ৩৯,২৪৬ কোটি",
            ProjectStatus::Implementation,
            "Padma+Rail+Link",
            789,
        ),
        project(
            "ঢাকা মেট্রোরেল প্রকল্প",
            "Dhaka Metro Rail Project",
            "ঢাকার যানজট নিরসনে নগর জুড়ে দ্রুতগতির গণপরিবহন ব্যবস্থা স্থাপন।",
            "Establishing a rapid mass transit system across Dhaka to alleviate traffic congestion.",
            "Infrastructure",
            "৳ ৩৩,৪৭২ কোটি",
            ProjectStatus::Active,
            "Dhaka+Metro",
            932,
        ),
        project(
            "রূপপুর পারমাণবিক বিদ্যুৎ কেন্দ্র",
            "Rooppur Nuclear Power Plant",
            "দেশের প্রথম পারমাণবিক বিদ্যুৎ কেন্দ্র স্থাপন করে দীর্ঘমেয়াদী বিদ্যুৎ চাহিদা পূরণ।",
            "Meeting long-term electricity demand by establishing the country's first nuclear power plant.",
            "Energy",
            "৳ ১,১৩,০৯৫ কোটি",
            ProjectStatus::Implementation,
            "Rooppur+NPP",
            612,
        ),
        project(
            "ঢাকা এলিভেটেড এক্সপ্রেসওয়ে",
            "Dhaka Elevated Expressway",
            "বিমানবন্দর থেকে কুতুবখালী পর্যন্ত বিস্তৃত ঢাকার প্রথম এলিভেটেড এক্সপ্রেসওয়ে।",
            "Dhaka's first elevated expressway, extending from the airport to Kutubkhali.",
            "Infrastructure",
            "৳ ৮,৯৪০ কোটি",
            ProjectStatus::PartiallyActive,
            "Elevated+Expressway",
            720,
        ),
        project(
            "মাতারবাড়ী গভীর সমুদ্র বন্দর",
            "Matarbari Deep Sea Port",
            "কক্সবাজারের মাতারবাড়ীতে দেশের প্রথম গভীর সমুদ্র বন্দর নির্মাণ।",
            "Construction of the country's first deep sea port at Matarbari, Cox's Bazar.",
            "Infrastructure",
            "৳ ১৭,৭৭৭ কোটি",
            ProjectStatus::Planning,
            "Matarbari+Port",
            680,
        ),
    ]
}

pub fn sample_events() -> Vec<NewEvent> {
    vec![
        event(
            "অমর একুশে বইমেলা",
            "Ekushey Book Fair",
            "ভাষা আন্দোলনের শহীদদের স্মরণে বাংলা একাডেমি প্রাঙ্গণে অনুষ্ঠিত বইমেলা।",
            "The book fair held every February on the Bangla Academy premises.",
            "Culture",
            "2025-02-01",
            "বাংলা একাডেমি, ঢাকা",
            "Ekushey+Book+Fair",
            (150, 1200, 850),
        ),
        event(
            "জাতীয় বৃক্ষরোপণ অভিযান",
            "National Tree Plantation Campaign",
            "পরিবেশ রক্ষায় দেশব্যাপী বৃক্ষরোপণ কর্মসূচি।",
            "A nationwide tree plantation program and public awareness campaign.",
            "Environment",
            "2025-07-05",
            "সারাদেশ",
            "Tree+Plantation",
            (500, 2500, 1800),
        ),
        event(
            "বিজয় দিবস উদযাপন",
            "Victory Day Celebration",
            "জাতীয় প্যারেড স্কয়ারে সামরিক কুচকাওয়াজ।",
            "A military parade at the National Parade Square and cultural events.",
            "National",
            "2025-12-16",
            "জাতীয় প্যারেড স্কয়ার, ঢাকা",
            "Victory+Day",
            (100, 3000, 2200),
        ),
        event(
            "আন্তর্জাতিক মাতৃভাষা দিবস",
            "International Mother Language Day",
            "কেন্দ্রীয় শহীদ মিনারে ভাষা শহীদদের প্রতি শ্রদ্ধা নিবেদন।",
            "Paying homage to the language martyrs at the Central Shaheed Minar.",
            "National",
            "2026-02-21",
            "কেন্দ্রীয় শহীদ মিনার, ঢাকা",
            "Ekushey+February",
            (300, 6000, 4500),
        ),
        event(
            "পহেলা বৈশাখ উদযাপন",
            "Pohela Boishakh Celebration",
            "রমনা বটমূলে বাংলা নববর্ষ উদযাপন।",
            "Celebrating the Bengali New Year at Ramna Batamul.",
            "Culture",
            "2026-04-14",
            "রমনা পার্ক, ঢাকা",
            "Pohela+Boishakh",
            (200, 5000, 3500),
        ),
    ]
}

/// Insert the sample projects and events into whichever of the two tables is
/// empty. Tables that already hold rows are left alone.
pub async fn seed_if_empty(repo: &dyn CivicRepository) -> Result<SeedReport, RepositoryError> {
    let mut report = SeedReport::default();

    if repo.list_projects().await?.is_empty() {
        for project in sample_projects() {
            repo.create_project(project).await?;
            report.projects += 1;
        }
    }

    if repo.list_events().await?.is_empty() {
        for event in sample_events() {
            repo.create_event(event, None).await?;
            report.events += 1;
        }
    }

    info!(
        projects = report.projects,
        events = report.events,
        "Seed complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::is_iso_date;
    use crate::repository::SqliteRepository;

    #[test]
    fn test_sample_event_dates_are_iso() {
        for event in sample_events() {
            assert!(is_iso_date(&event.date), "bad date {}", event.date);
        }
    }

    #[tokio::test]
    async fn test_seed_only_fills_empty_tables() {
        let repo = SqliteRepository::new_in_memory().unwrap();
        let first = seed_if_empty(&repo).await.unwrap();
        assert_eq!(first.projects, sample_projects().len());
        assert_eq!(first.events, sample_events().len());

        let second = seed_if_empty(&repo).await.unwrap();
        assert_eq!(second, SeedReport::default());
        assert_eq!(
            repo.list_projects().await.unwrap().len(),
            sample_projects().len()
        );
    }
}
