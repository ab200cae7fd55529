use std::{collections::BTreeMap, fmt};

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, Error as _},
    ser::SerializeMap,
};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

/// One of the five bipolar trait axes measured by the quiz.
///
/// Declaration order is the order letters appear in a character code.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS,
    EnumString, Display,
)]
pub enum Factor {
    #[serde(rename = "E/I")]
    #[strum(serialize = "E/I")]
    EI,
    #[serde(rename = "A/H")]
    #[strum(serialize = "A/H")]
    AH,
    #[serde(rename = "C/R")]
    #[strum(serialize = "C/R")]
    CR,
    #[serde(rename = "N/T")]
    #[strum(serialize = "N/T")]
    NT,
    #[serde(rename = "O/S")]
    #[strum(serialize = "O/S")]
    OS,
}

impl Factor {
    pub const ALL: [Factor; 5] = [Factor::EI, Factor::AH, Factor::CR, Factor::NT, Factor::OS];

    /// The two pole letters, in the order they are written in the axis name.
    pub const fn poles(self) -> (char, char) {
        match self {
            Factor::EI => ('E', 'I'),
            Factor::AH => ('A', 'H'),
            Factor::CR => ('C', 'R'),
            Factor::NT => ('N', 'T'),
            Factor::OS => ('O', 'S'),
        }
    }

    /// Letter an axis resolves to when both poles have the same tally.
    pub const fn tie_break(self) -> char {
        match self {
            Factor::EI => 'I',
            Factor::AH => 'H',
            Factor::CR => 'C',
            Factor::NT => 'N',
            Factor::OS => 'O',
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn contains(self, pole: char) -> bool {
        self.pole_slot(pole).is_some()
    }

    fn pole_slot(self, pole: char) -> Option<usize> {
        let (first, second) = self.poles();
        if pole == first {
            Some(0)
        } else if pole == second {
            Some(1)
        } else {
            None
        }
    }
}

/// Running tallies for all ten poles.
///
/// Serialized as `{"E/I": {"E": 0, "I": 0}, ...}` in axis order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FactorScoreboard {
    tallies: [[i64; 2]; 5],
}

impl FactorScoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `value` to `pole` on `factor`, saturating at `i64::MAX`. Returns
    /// `false`, leaving the board untouched, when `pole` is not one of the
    /// axis letters.
    pub fn add(&mut self, factor: Factor, pole: char, value: i64) -> bool {
        match factor.pole_slot(pole) {
            Some(slot) => {
                let tally = &mut self.tallies[factor.index()][slot];
                *tally = tally.saturating_add(value);
                true
            }
            None => false,
        }
    }

    /// Tally for `pole` on `factor`; zero for letters foreign to the axis.
    pub fn tally(&self, factor: Factor, pole: char) -> i64 {
        factor
            .pole_slot(pole)
            .map(|slot| self.tallies[factor.index()][slot])
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.tallies.iter().flatten().all(|tally| *tally == 0)
    }
}

struct PoleTallies {
    poles: (char, char),
    tallies: [i64; 2],
}

impl Serialize for PoleTallies {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(&self.poles.0, &self.tallies[0])?;
        map.serialize_entry(&self.poles.1, &self.tallies[1])?;
        map.end()
    }
}

impl Serialize for FactorScoreboard {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Factor::ALL.len()))?;
        for factor in Factor::ALL {
            map.serialize_entry(
                &factor,
                &PoleTallies {
                    poles: factor.poles(),
                    tallies: self.tallies[factor.index()],
                },
            )?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FactorScoreboard {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<Factor, BTreeMap<char, i64>>::deserialize(deserializer)?;

        let mut scoreboard = FactorScoreboard::new();
        for (factor, poles) in raw {
            for (pole, tally) in poles {
                if !scoreboard.add(factor, pole, tally) {
                    return Err(D::Error::invalid_value(
                        de::Unexpected::Char(pole),
                        &PoleOf(factor),
                    ));
                }
            }
        }
        Ok(scoreboard)
    }
}

struct PoleOf(Factor);

impl de::Expected for PoleOf {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        let (first, second) = self.0.poles();
        write!(formatter, "pole {first} or {second} of axis {}", self.0)
    }
}
