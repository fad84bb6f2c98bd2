//! Achievement table and evaluator.
//!
//! Diamond achievements get harder as the run's diamond total grows past the
//! knee; their threshold stops moving once they are reached. Level, energy and
//! kill achievements have fixed thresholds.

use crate::constants::{ACHIEVEMENT_KNEE, ACHIEVEMENT_SCALE_DIVISOR};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AchievementCategory {
    Diamonds,
    Level,
    Energy,
    Kills,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Achievement {
    pub id: &'static str,
    pub title: &'static str,
    pub description: String,
    pub icon: &'static str,
    pub category: AchievementCategory,
    pub base_threshold: u32,
    pub threshold: u32,
    pub reached: bool,
}

/// Snapshot of the counters achievements are judged on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Progress {
    pub total_diamonds: u32,
    pub level: u32,
    pub energy: f32,
    pub kills: u32,
}

const TABLE: &[(&str, &str, &str, AchievementCategory, u32)] = &[
    ("first_treasure", "First Treasure", "💎", AchievementCategory::Diamonds, 1),
    ("treasure_hunter", "Treasure Hunter", "🏆", AchievementCategory::Diamonds, 10),
    ("master_digger", "Master Digger", "⛏", AchievementCategory::Diamonds, 25),
    ("diamond_expert", "Diamond Expert", "👑", AchievementCategory::Diamonds, 50),
    ("millionaire", "Millionaire", "💰", AchievementCategory::Diamonds, 100),
    ("level_5", "Deep Explorer", "🔍", AchievementCategory::Level, 5),
    ("level_10", "Core Dweller", "🔥", AchievementCategory::Level, 10),
    ("energy_max", "Power Up", "⚡", AchievementCategory::Energy, 50),
    ("energy_super", "Super Charged", "⚡", AchievementCategory::Energy, 100),
    ("first_kill", "Scrap Maker", "🔧", AchievementCategory::Kills, 1),
    ("robot_hunter", "Robot Hunter", "🤖", AchievementCategory::Kills, 10),
    ("scrap_master", "Scrap Master", "⚙", AchievementCategory::Kills, 25),
];

fn describe(category: AchievementCategory, threshold: u32) -> String {
    match category {
        AchievementCategory::Diamonds if threshold == 1 => "Find your first treasure".to_string(),
        AchievementCategory::Diamonds => format!("Collect {threshold} diamonds"),
        AchievementCategory::Level => format!("Reach level {threshold}"),
        AchievementCategory::Energy => format!("Reach {threshold} energy"),
        AchievementCategory::Kills if threshold == 1 => "Destroy an enemy robot".to_string(),
        AchievementCategory::Kills => format!("Destroy {threshold} enemy robots"),
    }
}

/// Diamond threshold for a given run total. A base of 1 never moves.
pub fn dynamic_threshold(base_threshold: u32, total_diamonds: u32) -> u32 {
    if base_threshold <= 1 || total_diamonds < ACHIEVEMENT_KNEE {
        return base_threshold;
    }
    let scale = 1.0 + f64::from(total_diamonds) / ACHIEVEMENT_SCALE_DIVISOR;
    (f64::from(base_threshold) * scale).ceil() as u32
}

impl Achievement {
    fn is_met(&self, progress: &Progress) -> bool {
        match self.category {
            AchievementCategory::Diamonds => progress.total_diamonds >= self.threshold,
            AchievementCategory::Level => progress.level >= self.threshold,
            AchievementCategory::Energy => progress.energy >= self.threshold as f32,
            AchievementCategory::Kills => progress.kills >= self.threshold,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AchievementBook {
    achievements: Vec<Achievement>,
}

impl Default for AchievementBook {
    fn default() -> Self {
        Self::new()
    }
}

impl AchievementBook {
    pub fn new() -> Self {
        let achievements = TABLE
            .iter()
            .map(|&(id, title, icon, category, base)| Achievement {
                id,
                title,
                description: describe(category, base),
                icon,
                category,
                base_threshold: base,
                threshold: base,
                reached: false,
            })
            .collect();
        AchievementBook { achievements }
    }

    pub fn all(&self) -> &[Achievement] {
        &self.achievements
    }

    pub fn get(&self, id: &str) -> Option<&Achievement> {
        self.achievements.iter().find(|a| a.id == id)
    }

    pub fn reached(&self) -> impl Iterator<Item = &Achievement> {
        self.achievements.iter().filter(|a| a.reached)
    }

    /// Rescale open diamond thresholds and mark everything now satisfied.
    /// Returns the ids reached by this call.
    pub fn evaluate(&mut self, progress: Progress) -> Vec<&'static str> {
        let mut newly_reached = Vec::new();
        for achievement in self.achievements.iter_mut().filter(|a| !a.reached) {
            if achievement.category == AchievementCategory::Diamonds {
                let threshold =
                    dynamic_threshold(achievement.base_threshold, progress.total_diamonds);
                if threshold != achievement.threshold {
                    achievement.threshold = threshold;
                    achievement.description = describe(achievement.category, threshold);
                }
            }
            if achievement.is_met(&progress) {
                achievement.reached = true;
                newly_reached.push(achievement.id);
            }
        }
        newly_reached
    }
}
