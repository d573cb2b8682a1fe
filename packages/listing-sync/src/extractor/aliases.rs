//! Field-alias table: canonical field name to the label shown on the source page.

/// Fields read from the label/value pairs of the metadata section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataField {
    Category,
    DateAvailable,
    DatePosted,
    Shared,
    Sublet,
    Beds,
}

impl MetadataField {
    pub const ALL: [MetadataField; 6] = [
        Self::Category,
        Self::DateAvailable,
        Self::DatePosted,
        Self::Shared,
        Self::Sublet,
        Self::Beds,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::DateAvailable => "date_available",
            Self::DatePosted => "date_posted",
            Self::Shared => "shared",
            Self::Sublet => "sublet",
            Self::Beds => "beds",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Category => "Category",
            Self::DateAvailable => "Date Available",
            Self::DatePosted => "Date Posted",
            Self::Shared => "Shared",
            Self::Sublet => "Sublet",
            Self::Beds => "Beds",
        }
    }
}

/// Boolean fields presence-tested against the feature set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureFlag {
    Parking,
    NoSmoking,
    LaundryFacilities,
    CookingFacilities,
}

impl FeatureFlag {
    pub const ALL: [FeatureFlag; 4] = [
        Self::Parking,
        Self::NoSmoking,
        Self::LaundryFacilities,
        Self::CookingFacilities,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Parking => "parking",
            Self::NoSmoking => "no_smoking",
            Self::LaundryFacilities => "laundry_facilities",
            Self::CookingFacilities => "cooking_facilities",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Parking => "Parking",
            Self::NoSmoking => "No Smoking",
            Self::LaundryFacilities => "Laundry Facilities",
            Self::CookingFacilities => "Cooking Facilities",
        }
    }
}

/// The full alias table as `(field, label)` pairs.
pub fn field_aliases() -> impl Iterator<Item = (&'static str, &'static str)> {
    MetadataField::ALL
        .into_iter()
        .map(|f| (f.name(), f.label()))
        .chain(FeatureFlag::ALL.into_iter().map(|f| (f.name(), f.label())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_alias_names_are_unique() {
        let names: HashSet<_> = field_aliases().map(|(name, _)| name).collect();
        assert_eq!(names.len(), MetadataField::ALL.len() + FeatureFlag::ALL.len());
    }
}
