//! Fixed vaccination and developmental-milestone schedules. Static data, not
//! computed; checklist identity is derived from it, so entries are
//! append-only in practice (reordering silently re-keys historical records).

pub struct VaccineGroup {
    pub age: &'static str,
    pub vaccines: &'static [&'static str],
}

/// Vaccine names double as record keys, so every name carries its dose label
/// to stay unique across the whole schedule.
pub const VACCINATION_SCHEDULE: &[VaccineGroup] = &[
    VaccineGroup {
        age: "At birth",
        vaccines: &[
            "Hepatitis B (birth dose)",
            "BCG (tuberculosis)",
            "Polio (birth dose)",
        ],
    },
    VaccineGroup {
        age: "2 months",
        vaccines: &[
            "Pentavalent dose 1 (DTP + Hib + hepatitis B)",
            "Polio dose 1",
            "Pneumococcal PCV13 dose 1",
            "Rotavirus dose 1",
        ],
    },
    VaccineGroup {
        age: "4 months",
        vaccines: &[
            "Pentavalent dose 2 (DTP + Hib + hepatitis B)",
            "Polio dose 2",
            "Pneumococcal PCV13 dose 2",
            "Rotavirus dose 2",
        ],
    },
    VaccineGroup {
        age: "6 months",
        vaccines: &[
            "Pentavalent dose 3 (DTP + Hib + hepatitis B)",
            "Polio dose 3",
            "Pneumococcal PCV13 dose 3",
            "Rotavirus dose 3",
        ],
    },
    VaccineGroup {
        age: "9 months",
        vaccines: &["MMR (measles, mumps, rubella) dose 1"],
    },
    VaccineGroup {
        age: "12 months",
        vaccines: &[
            "MMR (measles, mumps, rubella) dose 2",
            "Chickenpox (varicella)",
        ],
    },
    VaccineGroup {
        age: "18 months",
        vaccines: &[
            "Pentavalent booster (DTP + Hib + hepatitis B)",
            "Polio booster",
        ],
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MilestoneCategory {
    Physical,
    Social,
}

impl MilestoneCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MilestoneCategory::Physical => "physical",
            MilestoneCategory::Social => "social",
        }
    }
}

pub struct MilestoneGroup {
    pub age_range: &'static str,
    pub physical: &'static [&'static str],
    pub social: &'static [&'static str],
}

impl MilestoneGroup {
    pub fn items(&self, category: MilestoneCategory) -> &'static [&'static str] {
        match category {
            MilestoneCategory::Physical => self.physical,
            MilestoneCategory::Social => self.social,
        }
    }
}

pub const MILESTONES: &[MilestoneGroup] = &[
    MilestoneGroup {
        age_range: "0-3 months",
        physical: &[
            "Lifts head and neck when lying on the tummy",
            "Follows moving objects with the eyes",
            "Opens and closes the hands",
        ],
        social: &[
            "Smiles back at a smile",
            "Calms at a familiar voice",
            "Starts making sounds other than crying",
        ],
    },
    MilestoneGroup {
        age_range: "4-6 months",
        physical: &[
            "Rolls from back to tummy and back again",
            "Sits with support",
            "Starts grasping objects",
        ],
        social: &[
            "Laughs out loud",
            "Shows interest in toys",
            "Recognizes familiar faces",
        ],
    },
    MilestoneGroup {
        age_range: "7-9 months",
        physical: &[
            "Sits without support",
            "Starts to crawl",
            "Stands while holding on",
        ],
        social: &[
            "Responds to their own name",
            "Imitates simple sounds and gestures",
            "Shows wariness of strangers",
        ],
    },
    MilestoneGroup {
        age_range: "10-12 months",
        physical: &[
            "Stands alone for a short while",
            "Walks holding on to hands or furniture",
            "Picks up small objects with thumb and forefinger",
        ],
        social: &[
            "Says one or two words such as \"mama\" or \"dada\"",
            "Points at things they want",
            "Plays simple games such as peekaboo",
        ],
    },
];
