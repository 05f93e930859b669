#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Sector taxonomy types shared across the company atlas.
//!
//! This crate defines the fixed sector-to-marker-category table used to
//! color map markers. The table is a closed taxonomy: sector strings found
//! in the data that match none of its keywords still filter normally and
//! simply render with the default category.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Visual category assigned to a map marker based on the record's sector.
///
/// Derived from the sector string by [`MarkerCategory::for_sector`]; each
/// category carries a fixed icon color via [`MarkerCategory::icon_color`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum MarkerCategory {
    /// Health care and related sectors
    Health,
    /// Information technology and communication services
    Technology,
    /// Financial sectors
    Financial,
    /// Energy sectors
    Energy,
    /// Materials sectors
    Materials,
    /// Industrials and utilities
    Industrial,
    /// Consumer discretionary and consumer staples
    Consumer,
    /// Real estate
    RealEstate,
    /// Sectors matching no keyword, or records without a sector
    Other,
}

/// Marker icon color keyed by [`MarkerCategory`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum IconColor {
    /// Blue marker icon.
    Blue,
    /// Violet marker icon.
    Violet,
    /// Green marker icon.
    Green,
    /// Orange marker icon.
    Orange,
    /// Grey marker icon (also the default).
    Grey,
    /// Black marker icon.
    Black,
    /// Yellow marker icon.
    Yellow,
    /// Red marker icon.
    Red,
}

/// Ordered keyword table mapping sector substrings to categories.
///
/// Matching is case-insensitive and the first matching row wins, so the
/// order here is part of the contract ("Communication Services" must land
/// on Technology, not fall through).
const KEYWORD_TABLE: &[(&[&str], MarkerCategory)] = &[
    (&["health"], MarkerCategory::Health),
    (&["technology", "communication"], MarkerCategory::Technology),
    (&["financial"], MarkerCategory::Financial),
    (&["energy"], MarkerCategory::Energy),
    (&["material"], MarkerCategory::Materials),
    (&["industrial", "utilities"], MarkerCategory::Industrial),
    (&["consumer"], MarkerCategory::Consumer),
    (&["real estate"], MarkerCategory::RealEstate),
];

impl MarkerCategory {
    /// Maps a raw sector string to its marker category.
    ///
    /// Case-insensitive keyword matching over the fixed table; the first
    /// matching row wins. Empty or unrecognized sectors map to
    /// [`MarkerCategory::Other`].
    #[must_use]
    pub fn for_sector(raw: &str) -> Self {
        let lower = raw.to_lowercase();
        for (keywords, category) in KEYWORD_TABLE {
            if keywords.iter().any(|keyword| lower.contains(keyword)) {
                return *category;
            }
        }
        Self::Other
    }

    /// Returns the fixed icon color for this category.
    #[must_use]
    pub const fn icon_color(self) -> IconColor {
        match self {
            Self::Health => IconColor::Blue,
            Self::Technology => IconColor::Violet,
            Self::Financial => IconColor::Green,
            Self::Energy => IconColor::Orange,
            Self::Materials | Self::Other => IconColor::Grey,
            Self::Industrial => IconColor::Black,
            Self::Consumer => IconColor::Yellow,
            Self::RealEstate => IconColor::Red,
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Health,
            Self::Technology,
            Self::Financial,
            Self::Energy,
            Self::Materials,
            Self::Industrial,
            Self::Consumer,
            Self::RealEstate,
            Self::Other,
        ]
    }
}
