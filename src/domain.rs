use std::fmt;
use std::str::FromStr;

use crate::error::GfetchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Search,
    Fetch,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Search => write!(f, "search"),
            Action::Fetch => write!(f, "fetch"),
        }
    }
}

impl FromStr for Action {
    type Err = GfetchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "search" => Ok(Action::Search),
            "fetch" => Ok(Action::Fetch),
            _ => Err(GfetchError::InvalidAction(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssemblyStatus {
    Complete,
    GaplessChromosome,
    Chromosome,
    ChromosomeWithGaps,
    Scaffold,
    Contig,
}

impl AssemblyStatus {
    pub const ALL: [AssemblyStatus; 6] = [
        AssemblyStatus::Complete,
        AssemblyStatus::GaplessChromosome,
        AssemblyStatus::Chromosome,
        AssemblyStatus::ChromosomeWithGaps,
        AssemblyStatus::Scaffold,
        AssemblyStatus::Contig,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssemblyStatus::Complete => "complete",
            AssemblyStatus::GaplessChromosome => "gapless chromosome",
            AssemblyStatus::Chromosome => "chromosome",
            AssemblyStatus::ChromosomeWithGaps => "chromosome with gaps",
            AssemblyStatus::Scaffold => "scaffold",
            AssemblyStatus::Contig => "contig",
        }
    }

    pub fn token(&self) -> String {
        self.as_str().replace(' ', "_")
    }

    pub fn from_field(value: &str) -> Option<Self> {
        let normalized = value.trim().to_lowercase().replace('_', " ");
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
    }
}

impl fmt::Display for AssemblyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganismName(String);

impl OrganismName {
    pub fn new(genus: &str, species: &str) -> Result<Self, GfetchError> {
        let genus = genus.trim();
        let species = species.trim();
        if genus.is_empty() || species.is_empty() {
            return Err(GfetchError::InvalidName(format!("'{genus} {species}'")));
        }
        Ok(Self(capitalize_first(&format!("{genus} {species}"))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, name: &str) -> bool {
        name.to_lowercase().contains(&self.0.to_lowercase())
    }
}

impl fmt::Display for OrganismName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn capitalize_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.as_str().to_lowercase().chars())
            .collect(),
        None => String::new(),
    }
}
