use std::collections::BTreeMap;
use std::fmt;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// One of the eight scored sub-disciplines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Caption {
    GE1,
    GE2,
    VP,
    VA,
    CG,
    B,
    MA,
    P,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptionGroup {
    GeneralEffect,
    Visual,
    Music,
}

impl Caption {
    pub const ALL: [Caption; 8] = [
        Caption::GE1,
        Caption::GE2,
        Caption::VP,
        Caption::VA,
        Caption::CG,
        Caption::B,
        Caption::MA,
        Caption::P,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Caption::GE1 => "GE1",
            Caption::GE2 => "GE2",
            Caption::VP => "VP",
            Caption::VA => "VA",
            Caption::CG => "CG",
            Caption::B => "B",
            Caption::MA => "MA",
            Caption::P => "P",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    pub fn group(&self) -> CaptionGroup {
        match self {
            Caption::GE1 | Caption::GE2 => CaptionGroup::GeneralEffect,
            Caption::VP | Caption::VA | Caption::CG => CaptionGroup::Visual,
            Caption::B | Caption::MA | Caption::P => CaptionGroup::Music,
        }
    }
}

impl fmt::Display for Caption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A caption pick, stored as `"entityName|pointCost|sourceYear"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineupSlot {
    pub entity_name: String,
    pub point_cost: u32,
    pub source_year: String,
}

impl LineupSlot {
    pub fn parse(raw: &str) -> Result<Self> {
        let parts: Vec<&str> = raw.split('|').map(str::trim).collect();
        let [entity_name, point_cost, source_year] = parts.as_slice() else {
            bail!("Lineup slot {:?} is not entity|cost|year", raw);
        };

        if entity_name.is_empty() || source_year.is_empty() {
            bail!("Lineup slot {:?} has an empty entity or year", raw);
        }

        let point_cost = point_cost
            .parse()
            .with_context(|| format!("Lineup slot {:?} has a bad point cost", raw))?;

        Ok(Self {
            entity_name: entity_name.to_string(),
            point_cost,
            source_year: source_year.to_string(),
        })
    }

    pub fn to_raw(&self) -> String {
        format!("{}|{}|{}", self.entity_name, self.point_cost, self.source_year)
    }
}

/// Caption → raw slot value, as registered by the participant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lineup {
    slots: BTreeMap<Caption, String>,
}

impl Lineup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slot(mut self, caption: Caption, slot: &LineupSlot) -> Self {
        self.slots.insert(caption, slot.to_raw());
        self
    }

    pub fn insert_raw(&mut self, caption: Caption, raw: impl Into<String>) {
        self.slots.insert(caption, raw.into());
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn raw(&self, caption: Caption) -> Option<&str> {
        self.slots.get(&caption).map(String::as_str)
    }

    pub fn slot(&self, caption: Caption) -> Result<Option<LineupSlot>> {
        self.raw(caption).map(LineupSlot::parse).transpose()
    }

    pub fn source_years(&self) -> impl Iterator<Item = String> + '_ {
        self.slots
            .values()
            .filter_map(|raw| LineupSlot::parse(raw).ok())
            .map(|slot| slot.source_year)
    }
}
