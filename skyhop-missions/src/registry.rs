//! Mission catalog: templates, objectives, categories and rewards.
//!
//! The catalog is defined in code and never changes after startup, so every client
//! sees the same mission set and the reward economy stays deterministic. Data-driven
//! catalogs can be loaded from JSON for tooling and tests.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::RegistryError;

/// What a mission measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectiveType {
    ReachScore,
    SurviveTime,
    PlayGames,
    AvoidObstacles,
    ReachHighScore,
    CollectCurrency,
    UsePlanet,
    DailyChallenge,
}

impl ObjectiveType {
    pub const ALL: [Self; 8] = [
        Self::ReachScore,
        Self::SurviveTime,
        Self::PlayGames,
        Self::AvoidObstacles,
        Self::ReachHighScore,
        Self::CollectCurrency,
        Self::UsePlanet,
        Self::DailyChallenge,
    ];

    /// Watermark objectives track a best value instead of a running count.
    #[must_use]
    pub const fn is_watermark(self) -> bool {
        matches!(
            self,
            Self::ReachScore | Self::SurviveTime | Self::ReachHighScore
        )
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::ReachScore => "reach_score",
            Self::SurviveTime => "survive_time",
            Self::PlayGames => "play_games",
            Self::AvoidObstacles => "avoid_obstacles",
            Self::ReachHighScore => "reach_high_score",
            Self::CollectCurrency => "collect_currency",
            Self::UsePlanet => "use_planet",
            Self::DailyChallenge => "daily_challenge",
        }
    }
}

impl fmt::Display for ObjectiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Error returned when parsing an unknown objective or category name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} `{value}`")]
pub struct ParseKindError {
    kind: &'static str,
    value: String,
}

fn normalize(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl FromStr for ObjectiveType {
    type Err = ParseKindError;

    /// Accepts both `reach_score` and `ReachScore` spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        Self::ALL
            .into_iter()
            .find(|objective| normalize(objective.key()) == wanted)
            .ok_or_else(|| ParseKindError {
                kind: "objective",
                value: s.to_string(),
            })
    }
}

/// Temporal scope of a mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissionCategory {
    Total,
    Daily,
    Weekly,
}

impl MissionCategory {
    pub const ALL: [Self; 3] = [Self::Daily, Self::Weekly, Self::Total];

    /// Display order in mission lists: daily first, permanent last.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Daily => 0,
            Self::Weekly => 1,
            Self::Total => 2,
        }
    }

    /// Whether missions in this category are wiped at a time boundary.
    #[must_use]
    pub const fn is_periodic(self) -> bool {
        !matches!(self, Self::Total)
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Total => "total",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
        }
    }
}

impl fmt::Display for MissionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for MissionCategory {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        Self::ALL
            .into_iter()
            .find(|category| category.key() == wanted)
            .ok_or_else(|| ParseKindError {
                kind: "category",
                value: s.to_string(),
            })
    }
}

/// Reward granted when a completed mission is claimed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RewardSpec {
    Currency { amount: i64 },
    UnlockItem { item_id: String },
}

impl RewardSpec {
    /// Human-readable reward line shown on mission cards.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Currency { amount } => format!("{amount} coins"),
            Self::UnlockItem { item_id } => format!("Unlock {item_id}"),
        }
    }
}

/// Immutable definition of a mission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionTemplate {
    pub id: String,
    pub title: String,
    pub description: String,
    pub objective: ObjectiveType,
    pub target: i64,
    pub reward: RewardSpec,
    pub category: MissionCategory,
    #[serde(default)]
    pub priority: i32,
}

impl MissionTemplate {
    #[must_use]
    pub fn new(
        id: &str,
        title: &str,
        description: &str,
        objective: ObjectiveType,
        target: i64,
        reward: RewardSpec,
        category: MissionCategory,
    ) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            objective,
            target,
            reward,
            category,
            priority: 0,
        }
    }

    #[must_use]
    pub const fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    fn validate(&self) -> Result<(), RegistryError> {
        if self.id.trim().is_empty() {
            return Err(RegistryError::EmptyId);
        }
        if self.target <= 0 {
            return Err(RegistryError::NonPositiveTarget {
                id: self.id.clone(),
                target: self.target,
            });
        }
        match &self.reward {
            RewardSpec::Currency { amount } if *amount <= 0 => {
                Err(RegistryError::NonPositiveReward {
                    id: self.id.clone(),
                    amount: *amount,
                })
            }
            RewardSpec::UnlockItem { item_id } if item_id.trim().is_empty() => {
                Err(RegistryError::EmptyUnlockItem {
                    id: self.id.clone(),
                })
            }
            _ => Ok(()),
        }
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    missions: Vec<MissionTemplate>,
}

/// Ordered, read-only mission catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissionRegistry {
    templates: Vec<MissionTemplate>,
    index: HashMap<String, usize>,
}

impl MissionRegistry {
    /// Build a catalog, keeping insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if an id is empty or repeated, a target is not positive, or
    /// a reward is empty.
    pub fn from_templates(templates: Vec<MissionTemplate>) -> Result<Self, RegistryError> {
        let mut index = HashMap::with_capacity(templates.len());
        for (position, template) in templates.iter().enumerate() {
            template.validate()?;
            if index.insert(template.id.clone(), position).is_some() {
                return Err(RegistryError::DuplicateId(template.id.clone()));
            }
        }
        Ok(Self { templates, index })
    }

    /// Load a catalog from `{ "missions": [...] }` JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or the catalog is invalid.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let file: CatalogFile =
            serde_json::from_str(json).map_err(|err| RegistryError::Json(err.to_string()))?;
        Self::from_templates(file.missions)
    }

    /// The catalog shipped with the game.
    #[must_use]
    pub fn builtin() -> Self {
        let templates = builtin_templates();
        let index = templates
            .iter()
            .enumerate()
            .map(|(position, template)| (template.id.clone(), position))
            .collect();
        Self { templates, index }
    }

    /// All templates in insertion order.
    #[must_use]
    pub fn templates(&self) -> &[MissionTemplate] {
        &self.templates
    }

    #[must_use]
    pub fn templates_by_category(&self, category: MissionCategory) -> Vec<&MissionTemplate> {
        self.templates
            .iter()
            .filter(|template| template.category == category)
            .collect()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&MissionTemplate> {
        self.position(id).map(|position| &self.templates[position])
    }

    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Default for MissionRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn coins(amount: i64) -> RewardSpec {
    RewardSpec::Currency { amount }
}

fn unlock(item_id: &str) -> RewardSpec {
    RewardSpec::UnlockItem {
        item_id: item_id.to_string(),
    }
}

fn builtin_templates() -> Vec<MissionTemplate> {
    use MissionCategory::{Daily, Total, Weekly};
    use ObjectiveType::{
        AvoidObstacles, CollectCurrency, DailyChallenge, PlayGames, ReachHighScore, ReachScore,
        SurviveTime, UsePlanet,
    };

    vec![
        // Permanent
        MissionTemplate::new(
            "score_50",
            "Warm Up",
            "Score 50 points in a single run",
            ReachScore,
            50,
            coins(100),
            Total,
        ),
        MissionTemplate::new(
            "score_150",
            "Liftoff",
            "Score 150 points in a single run",
            ReachScore,
            150,
            coins(250),
            Total,
        ),
        MissionTemplate::new(
            "highscore_300",
            "Record Breaker",
            "Set a high score of 300",
            ReachHighScore,
            300,
            coins(500),
            Total,
        )
        .with_priority(1),
        MissionTemplate::new(
            "survive_60",
            "Staying Power",
            "Survive 60 seconds in a single run",
            SurviveTime,
            60,
            coins(150),
            Total,
        ),
        MissionTemplate::new(
            "play_10",
            "Regular",
            "Play 10 games",
            PlayGames,
            10,
            coins(200),
            Total,
        ),
        MissionTemplate::new(
            "avoid_100",
            "Slipstream",
            "Dodge 100 obstacles",
            AvoidObstacles,
            100,
            coins(300),
            Total,
        ),
        MissionTemplate::new(
            "collect_1000",
            "Treasure Hunter",
            "Collect 1000 coins",
            CollectCurrency,
            1000,
            unlock("planet_saturn"),
            Total,
        )
        .with_priority(2),
        MissionTemplate::new(
            "use_planet_5",
            "Explorer",
            "Start 5 runs from a different planet",
            UsePlanet,
            5,
            unlock("skin_comet"),
            Total,
        ),
        // Daily
        MissionTemplate::new(
            "daily_play_5",
            "Daily Flights",
            "Play 5 games today",
            PlayGames,
            5,
            coins(50),
            Daily,
        )
        .with_priority(1),
        MissionTemplate::new(
            "daily_avoid_30",
            "Daily Dodger",
            "Dodge 30 obstacles today",
            AvoidObstacles,
            30,
            coins(40),
            Daily,
        ),
        MissionTemplate::new(
            "daily_score_75",
            "Daily Best",
            "Score 75 points in one run today",
            ReachScore,
            75,
            coins(60),
            Daily,
        ),
        MissionTemplate::new(
            "daily_challenge",
            "Daily Challenge",
            "Finish today's challenge run",
            DailyChallenge,
            1,
            coins(100),
            Daily,
        )
        .with_priority(2),
        // Weekly
        MissionTemplate::new(
            "weekly_play_25",
            "Frequent Flyer",
            "Play 25 games this week",
            PlayGames,
            25,
            coins(300),
            Weekly,
        )
        .with_priority(1),
        MissionTemplate::new(
            "weekly_collect_500",
            "Weekly Haul",
            "Collect 500 coins this week",
            CollectCurrency,
            500,
            coins(400),
            Weekly,
        ),
        MissionTemplate::new(
            "weekly_survive_180",
            "Endurance",
            "Survive 180 seconds in one run this week",
            SurviveTime,
            180,
            coins(350),
            Weekly,
        ),
        MissionTemplate::new(
            "weekly_planets_10",
            "Planet Hopper",
            "Start 10 runs from a different planet this week",
            UsePlanet,
            10,
            coins(250),
            Weekly,
        ),
    ]
}
